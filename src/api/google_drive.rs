//! Implements the `Drive` trait with the Google Drive v3 REST API.

use crate::api::{
    check_response, Drive, DriveFile, FileMetadata, TokenProvider, SPREADSHEET_MIME_TYPE,
};
use crate::error::Res;
use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, trace};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

pub(super) struct GoogleDrive {
    token_provider: TokenProvider,
    http: reqwest::Client,
}

impl GoogleDrive {
    pub(super) fn new(token_provider: TokenProvider) -> Self {
        Self {
            token_provider,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[async_trait::async_trait]
impl Drive for GoogleDrive {
    async fn find_spreadsheets(&mut self, name: &str) -> Res<Vec<String>> {
        let token = self.token_provider.token().await?;
        let q = spreadsheet_query(name);
        trace!("Searching Drive with q={q}");
        let response = self
            .http
            .get(FILES_URL)
            .bearer_auth(token)
            .query(&[("q", q.as_str()), ("fields", "files(id)"), ("spaces", "drive")])
            .send()
            .await
            .context("Failed to send search request to Google Drive API")?;
        let list: FileList = check_response(response, "Google Drive API search")
            .await?
            .json()
            .await
            .context("Failed to parse Google Drive API search response")?;
        Ok(list.files.into_iter().map(|f| f.id).collect())
    }

    async fn create_file(&mut self, metadata: &FileMetadata, bytes: Vec<u8>) -> Res<DriveFile> {
        let token = self.token_provider.token().await?;
        let boundary = format!("receipts-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, metadata, bytes)?;
        debug!(
            "Uploading '{}' ({} bytes) to Google Drive",
            metadata.name,
            body.len()
        );
        let response = self
            .http
            .post(UPLOAD_URL)
            .bearer_auth(token)
            .query(&[("uploadType", "multipart"), ("fields", "id,webViewLink")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .context("Failed to send upload request to Google Drive API")?;
        check_response(response, "Google Drive API upload")
            .await?
            .json()
            .await
            .context("Failed to parse Google Drive API upload response")
    }

    async fn share_publicly(&mut self, file_id: &str) -> Res<()> {
        let token = self.token_provider.token().await?;
        let url = format!("{FILES_URL}/{file_id}/permissions");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "role": "reader",
                "type": "anyone"
            }))
            .send()
            .await
            .context("Failed to send permission request to Google Drive API")?;
        check_response(response, "Google Drive API permission create").await?;
        Ok(())
    }
}

/// A Drive search query matching non-trashed spreadsheets with exactly this name.
fn spreadsheet_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false")
}

/// Builds a `multipart/related` body: the JSON metadata part followed by the media part.
fn multipart_body(boundary: &str, metadata: &FileMetadata, bytes: Vec<u8>) -> Res<Vec<u8>> {
    let json = serde_json::to_string(metadata).context("Unable to serialize file metadata")?;
    let mut body = Vec::with_capacity(bytes.len() + json.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(json.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", metadata.mime_type).as_bytes());
    body.extend_from_slice(&bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_query() {
        assert_eq!(
            spreadsheet_query("Receipt_Entries"),
            "name = 'Receipt_Entries' and \
            mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
        );
    }

    #[test]
    fn test_spreadsheet_query_escapes_quotes() {
        let q = spreadsheet_query(r"Bob's \ receipts");
        assert!(q.starts_with(r"name = 'Bob\'s \\ receipts' and"));
    }

    #[test]
    fn test_multipart_body() {
        let metadata = FileMetadata {
            name: "20240101-120000_receipt.png".to_string(),
            parents: vec!["folder1".to_string()],
            mime_type: "image/png".to_string(),
        };
        let body = multipart_body("XYZ", &metadata, vec![0x89, b'P', b'N', b'G']).unwrap();
        let expected_head = "--XYZ\r\n\
            Content-Type: application/json; charset=UTF-8\r\n\r\n\
            {\"name\":\"20240101-120000_receipt.png\",\"parents\":[\"folder1\"],\"mimeType\":\"image/png\"}\r\n\
            --XYZ\r\n\
            Content-Type: image/png\r\n\r\n";
        assert!(body.starts_with(expected_head.as_bytes()));
        let tail = &body[expected_head.len()..];
        assert_eq!(tail, b"\x89PNG\r\n--XYZ--\r\n");
    }
}
