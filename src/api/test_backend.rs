//! Implements the `Drive` and `Sheets` traits with in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google.

use crate::api::{Drive, DriveFile, FileMetadata, Sheets, Worksheet};
use crate::error::Res;
use anyhow::{bail, Context};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// The title Google gives the first worksheet of a new spreadsheet.
const DEFAULT_WORKSHEET: &str = "Sheet1";

/// A stand-in for both Google Drive and Google Sheets. Clones share the same state, the same way
/// both real services see the same Google account.
#[derive(Debug, Clone, Default)]
pub(crate) struct TestBackend {
    state: Arc<Mutex<TestState>>,
}

/// Everything the `TestBackend` holds.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct TestState {
    pub(crate) files: Vec<TestFile>,
    pub(crate) spreadsheets: Vec<TestSpreadsheet>,
    /// When set, `append_row` fails, simulating a Sheets outage.
    pub(crate) fail_appends: bool,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct TestFile {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) parents: Vec<String>,
    pub(crate) mime_type: String,
    pub(crate) bytes: Vec<u8>,
    pub(crate) public: bool,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct TestSpreadsheet {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) worksheet: String,
    pub(crate) rows: Vec<Vec<String>>,
    pub(crate) public: bool,
}

impl TestBackend {
    /// Returns a snapshot of the current state.
    #[cfg(test)]
    pub(crate) async fn state(&self) -> TestState {
        self.state.lock().await.clone()
    }

    /// Replaces the current state.
    #[cfg(test)]
    pub(crate) async fn set_state(&self, state: TestState) {
        *self.state.lock().await = state;
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[async_trait::async_trait]
impl Drive for TestBackend {
    async fn find_spreadsheets(&mut self, name: &str) -> Res<Vec<String>> {
        let state = self.state.lock().await;
        Ok(state
            .spreadsheets
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.id.clone())
            .collect())
    }

    async fn create_file(&mut self, metadata: &FileMetadata, bytes: Vec<u8>) -> Res<DriveFile> {
        let id = new_id();
        debug!("Test mode: storing '{}' as {id}", metadata.name);
        self.state.lock().await.files.push(TestFile {
            id: id.clone(),
            name: metadata.name.clone(),
            parents: metadata.parents.clone(),
            mime_type: metadata.mime_type.clone(),
            bytes,
            public: false,
        });
        Ok(DriveFile {
            web_view_link: Some(format!(
                "https://drive.google.com/file/d/{id}/view?usp=drivesdk"
            )),
            id,
        })
    }

    async fn share_publicly(&mut self, file_id: &str) -> Res<()> {
        let mut state = self.state.lock().await;
        if let Some(file) = state.files.iter_mut().find(|f| f.id == file_id) {
            file.public = true;
            return Ok(());
        }
        let spreadsheet = state
            .spreadsheets
            .iter_mut()
            .find(|s| s.id == file_id)
            .with_context(|| format!("File not found: {file_id}"))?;
        spreadsheet.public = true;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheets for TestBackend {
    async fn create_spreadsheet(&mut self, title: &str) -> Res<String> {
        let id = new_id();
        self.state.lock().await.spreadsheets.push(TestSpreadsheet {
            id: id.clone(),
            name: title.to_string(),
            worksheet: DEFAULT_WORKSHEET.to_string(),
            rows: Vec::new(),
            public: false,
        });
        Ok(id)
    }

    async fn first_worksheet(&mut self, spreadsheet_id: &str) -> Res<String> {
        let state = self.state.lock().await;
        state
            .spreadsheets
            .iter()
            .find(|s| s.id == spreadsheet_id)
            .map(|s| s.worksheet.clone())
            .with_context(|| format!("Spreadsheet not found: {spreadsheet_id}"))
    }

    async fn append_row(&mut self, worksheet: &Worksheet, row: Vec<String>) -> Res<()> {
        let mut state = self.state.lock().await;
        if state.fail_appends {
            bail!("Test mode: append to {} failed", worksheet.range());
        }
        let spreadsheet = state
            .spreadsheets
            .iter_mut()
            .find(|s| s.id == worksheet.spreadsheet_id())
            .with_context(|| format!("Spreadsheet not found: {}", worksheet.spreadsheet_id()))?;
        if spreadsheet.worksheet != worksheet.title() {
            bail!("Worksheet not found: {}", worksheet.title());
        }
        spreadsheet.rows.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_state() {
        let backend = TestBackend::default();
        let mut sheets = backend.clone();
        let mut drive = backend.clone();
        let id = sheets.create_spreadsheet("Receipt_Entries").await.unwrap();
        assert_eq!(
            drive.find_spreadsheets("Receipt_Entries").await.unwrap(),
            vec![id.clone()]
        );
        assert!(drive.find_spreadsheets("Other").await.unwrap().is_empty());
        assert_eq!(sheets.first_worksheet(&id).await.unwrap(), "Sheet1");
    }

    #[tokio::test]
    async fn test_append_row() {
        let mut backend = TestBackend::default();
        let id = backend.create_spreadsheet("s").await.unwrap();
        let ws = Worksheet::new(&id, "Sheet1");
        backend
            .append_row(&ws, vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let state = backend.state().await;
        assert_eq!(state.spreadsheets[0].rows, vec![vec!["a", "b"]]);

        let missing = Worksheet::new(&id, "Nope");
        assert!(backend.append_row(&missing, vec![]).await.is_err());
    }

    #[tokio::test]
    async fn test_create_file_and_share() {
        let mut backend = TestBackend::default();
        let metadata = FileMetadata {
            name: "x.pdf".to_string(),
            parents: vec!["folder".to_string()],
            mime_type: "application/pdf".to_string(),
        };
        let file = backend.create_file(&metadata, vec![1, 2]).await.unwrap();
        assert!(file.web_view_link.unwrap().contains(&file.id));
        assert!(!backend.state().await.files[0].public);
        backend.share_publicly(&file.id).await.unwrap();
        assert!(backend.state().await.files[0].public);
        assert!(backend.share_publicly("missing").await.is_err());
    }
}
