//! Uploads receipt files to the configured Drive folder and makes them readable by link.

use crate::api::{Drive, FileMetadata};
use crate::error::Res;
use anyhow::Context;
use tracing::info;
use url::Url;

/// Uploads `bytes` as `filename` into `folder_id` in one request, grants read access to anyone
/// with the link, and returns the file's web view link.
///
/// Nothing is retried. If granting access fails the file stays in Drive, private.
pub(crate) async fn upload(
    drive: &mut (dyn Drive + Send),
    folder_id: &str,
    bytes: Vec<u8>,
    filename: &str,
    mime_type: &str,
) -> Res<String> {
    let metadata = FileMetadata {
        name: filename.to_string(),
        parents: vec![folder_id.to_string()],
        mime_type: mime_type.to_string(),
    };
    let created = drive
        .create_file(&metadata, bytes)
        .await
        .with_context(|| format!("Unable to upload '{filename}'"))?;
    drive
        .share_publicly(&created.id)
        .await
        .with_context(|| format!("Unable to share '{filename}'"))?;

    let link = created
        .web_view_link
        .with_context(|| format!("Google Drive did not return a link for '{filename}'"))?;
    Url::parse(&link).with_context(|| format!("Google Drive returned an invalid link '{link}'"))?;
    info!("Uploaded '{filename}' to Google Drive");
    Ok(link)
}
