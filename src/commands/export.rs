use crate::args::ExportArgs;
use crate::commands::{open_session, with_notice, Out};
use crate::store::{self, Export};
use crate::{utils, Config, Result};
use std::path::Path;

/// Serializes the current table in the data file format.
///
/// If `args.out()` names a directory, the file is written there as `verbrauchsdaten.csv`. If it
/// names a file, that file is written. Without `--out` the CSV is the body of the output, meaning
/// it goes to stdout.
///
/// # Errors
/// - Returns an error if the output file cannot be written.
pub async fn export(
    config: Config,
    upload: Option<&Path>,
    args: ExportArgs,
) -> Result<Out<Export>> {
    let session = open_session(&config, upload).await?;
    let exported = store::export(session.current())?;

    let Some(out) = args.out() else {
        let body = String::from_utf8_lossy(&exported.bytes).to_string();
        let message = with_notice(&session, format!("Exported {}", exported.filename));
        return Ok(Out::new(message, exported).with_body(body));
    };

    let path = if out.is_dir() {
        out.join(exported.filename)
    } else {
        out.to_path_buf()
    };
    utils::write(&path, &exported.bytes).await?;
    let message = with_notice(&session, format!("Exported the table to {}", path.display()));
    Ok(Out::new(message, exported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DATA_FILE;
    use crate::model::{record, ReadingTable};
    use crate::test::{sample_table, TestEnv};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_to_stdout() {
        let env = TestEnv::new().await;
        let upload = env.write_upload(&sample_table()).await;

        let out = export(env.config(), Some(upload.as_path()), ExportArgs::default())
            .await
            .unwrap();

        let body = out.body().unwrap();
        assert!(body.starts_with("Month,Water,HotWater,Heating\n"));
        assert_eq!(record::parse(body.as_bytes()).unwrap().table, sample_table());
        assert_eq!(out.structure().unwrap().mime, "text/csv");
    }

    #[tokio::test]
    async fn test_export_to_directory() {
        let env = TestEnv::new().await;
        let dir = TempDir::new().unwrap();
        let args = ExportArgs::new(Some(dir.path().to_path_buf()));

        let out = export(env.config(), None, args).await.unwrap();

        assert!(out.body().is_none());
        let written = utils::read_bytes(&dir.path().join(DATA_FILE)).await.unwrap();
        assert_eq!(record::parse(&written).unwrap().table, ReadingTable::new());
    }

    #[tokio::test]
    async fn test_export_to_file() {
        let env = TestEnv::new().await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readings.csv");
        let upload = env.write_upload(&sample_table()).await;
        let args = ExportArgs::new(Some(path.clone()));

        let out = export(env.config(), Some(upload.as_path()), args)
            .await
            .unwrap();

        assert!(out.message().contains("readings.csv"));
        let written = utils::read_bytes(&path).await.unwrap();
        assert_eq!(record::parse(&written).unwrap().table, sample_table());
    }
}
