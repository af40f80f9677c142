//! Deserialization structures for the secrets file.
//!
//! Example:
//! ```json
//! {
//!   "google": {
//!     "client_id": "YOUR_CLIENT_ID.apps.googleusercontent.com",
//!     "client_secret": "YOUR_CLIENT_SECRET",
//!     "refresh_token": "YOUR_REFRESH_TOKEN",
//!     "token_uri": "https://oauth2.googleapis.com/token",
//!     "type": "authorized_user"
//!   },
//!   "general": {
//!     "SHEET_NAME": "Receipt_Entries"
//!   }
//! }
//! ```

use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::path::Path;
use tracing::warn;

/// The only credential type we know how to use.
const AUTHORIZED_USER: &str = "authorized_user";

/// The secrets needed to talk to Google and to find the receipts sheet.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct SecretsFile {
    google: GoogleSecrets,
    general: GeneralSecrets,
}

/// Credentials of an already-authorized user. The refresh token is exchanged for access tokens.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct GoogleSecrets {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    token_uri: String,
    #[serde(rename = "type")]
    credential_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GeneralSecrets {
    #[serde(rename = "SHEET_NAME")]
    sheet_name: String,
}

impl SecretsFile {
    /// Loads and checks the secrets file. Every key must be present and non-empty.
    pub(crate) async fn load(path: &Path) -> Res<SecretsFile> {
        let secrets: SecretsFile = utils::deserialize(path)
            .await
            .context("Unable to read the secrets file")?;
        secrets.validate()?;
        Ok(secrets)
    }

    fn validate(&self) -> Res<()> {
        let required = [
            ("google.client_id", &self.google.client_id),
            ("google.client_secret", &self.google.client_secret),
            ("google.refresh_token", &self.google.refresh_token),
            ("google.token_uri", &self.google.token_uri),
            ("google.type", &self.google.credential_type),
            ("general.SHEET_NAME", &self.general.sheet_name),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("The secrets file has an empty value for '{key}'");
            }
        }
        if self.google.credential_type != AUTHORIZED_USER {
            warn!(
                "Expected google.type to be '{AUTHORIZED_USER}' but found '{}'",
                self.google.credential_type
            );
        }
        Ok(())
    }

    pub(crate) fn google(&self) -> &GoogleSecrets {
        &self.google
    }

    pub(crate) fn sheet_name(&self) -> &str {
        &self.general.sheet_name
    }
}

impl GoogleSecrets {
    pub(crate) fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub(crate) fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub(crate) fn token_uri(&self) -> &str {
        &self.token_uri
    }
}

impl Debug for SecretsFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsFile")
            .field("google", &self.google)
            .field("general", &self.general)
            .finish()
    }
}

impl Debug for GoogleSecrets {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("refresh_token", &"***")
            .field("token_uri", &self.token_uri)
            .field("type", &self.credential_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::SECRETS_CONTENT;
    use tempfile::TempDir;

    async fn load_str(json: &str) -> Res<SecretsFile> {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("secrets.json");
        utils::write(&p, json).await.unwrap();
        SecretsFile::load(&p).await
    }

    #[tokio::test]
    async fn test_secrets_good() {
        let secrets = load_str(SECRETS_CONTENT).await.unwrap();
        assert_eq!(secrets.sheet_name(), "Receipt_Entries");
        assert_eq!(secrets.google().client_id(), "test-client-id");
        assert_eq!(
            secrets.google().token_uri(),
            "https://oauth2.googleapis.com/token"
        );
    }

    #[tokio::test]
    async fn test_secrets_missing_key() {
        let json = r#"
        {
            "google": {
                "client_id": "id",
                "client_secret": "secret",
                "token_uri": "https://oauth2.googleapis.com/token",
                "type": "authorized_user"
            },
            "general": { "SHEET_NAME": "Receipt_Entries" }
        }"#;
        let err = load_str(json).await.unwrap_err();
        assert!(format!("{err:#}").contains("refresh_token"));
    }

    #[tokio::test]
    async fn test_secrets_missing_general() {
        let json = r#"
        {
            "google": {
                "client_id": "id",
                "client_secret": "secret",
                "refresh_token": "refresh",
                "token_uri": "https://oauth2.googleapis.com/token",
                "type": "authorized_user"
            }
        }"#;
        let err = load_str(json).await.unwrap_err();
        assert!(format!("{err:#}").contains("general"));
    }

    #[tokio::test]
    async fn test_secrets_empty_sheet_name() {
        let json = SECRETS_CONTENT.replace("Receipt_Entries", " ");
        let err = load_str(&json).await.unwrap_err();
        assert!(err.to_string().contains("general.SHEET_NAME"));
    }

    #[tokio::test]
    async fn test_secrets_debug_is_redacted() {
        let secrets = load_str(SECRETS_CONTENT).await.unwrap();
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("test-refresh-token"));
        assert!(!debug.contains("test-secret"));
        assert!(debug.contains("test-client-id"));
    }
}
