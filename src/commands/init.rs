use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the receipts home directory and:
/// - Moves `secrets_file` into `.secrets/secrets.json`, readable only by the owner.
/// - Writes an initial `config.json` that uploads receipts into `drive_folder_id`.
///
/// # Arguments
/// - `receipts_home` - The directory that will hold the configuration, e.g. `$HOME/receipts`
/// - `secrets_file` - A JSON file with a `google` section (OAuth client and refresh token) and a
///   `general` section naming the spreadsheet.
/// - `drive_folder_id` - The ID of the Drive folder that receipt files are uploaded into, the
///   last path segment of `https://drive.google.com/drive/folders/<id>`.
///
/// # Errors
/// - Returns a config error if the secrets file is invalid, the folder ID is empty, or any file
///   operation fails.
pub async fn init(
    receipts_home: &Path,
    secrets_file: &Path,
    drive_folder_id: &str,
) -> Result<Out<()>> {
    let config = Config::create(receipts_home, secrets_file, drive_folder_id).await?;
    Ok(format!(
        "Successfully created the receipts directory at '{}'",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::SECRETS_CONTENT;
    use crate::ErrorType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let secrets = dir.path().join("secrets.json");
        std::fs::write(&secrets, SECRETS_CONTENT).unwrap();
        let home = dir.path().join("receipts");

        let out = init(&home, &secrets, "folder-abc").await.unwrap();

        assert!(out.message().starts_with("Successfully created"));
        assert!(out.structure().is_none());
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.drive_folder_id(), "folder-abc");
    }

    #[tokio::test]
    async fn test_init_missing_secrets() {
        let dir = TempDir::new().unwrap();
        let err = init(
            &dir.path().join("receipts"),
            &dir.path().join("nope.json"),
            "folder-abc",
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
