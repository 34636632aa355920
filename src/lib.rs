pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod render;
pub mod session;
pub mod store;
mod utils;


pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use error::{MalformedTableError, PersistError};
