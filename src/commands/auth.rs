//! The `receipts auth` command, which checks that the stored OAuth credentials work.

use crate::api::{Mode, SecretsFile, TokenProvider};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use tracing::debug;

/// Loads the secrets file and exchanges its refresh token for an access token.
///
/// This never opens a browser. If the refresh token has been revoked or has expired, a new one
/// has to be placed into the secrets file by hand.
///
/// In `Mode::Test` the secrets are loaded and validated but no request is made.
///
/// # Errors
/// - A config error if the secrets file is missing or incomplete.
/// - An auth error if Google rejects the credentials.
pub async fn auth(config: &Config, mode: Mode) -> Result<Out<()>> {
    let secrets = SecretsFile::load(&config.secrets_path())
        .await
        .pub_result(ErrorType::Config)?;

    match mode {
        Mode::Test => debug!("Test mode, skipping the token refresh"),
        Mode::Google => {
            let token_provider =
                TokenProvider::new(secrets.google()).pub_result(ErrorType::Auth)?;
            token_provider
                .refresh()
                .await
                .context("Unable to refresh the access token, check the refresh_token")
                .pub_result(ErrorType::Auth)?;
        }
    }
    Ok("Your OAuth credentials are valid!".into())
}
