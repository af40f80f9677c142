//! The seams between this app and Google: a `Drive` trait for file storage and a `Sheets` trait
//! for the spreadsheet. Each has a Google implementation and an in-memory implementation, which
//! one is used is decided by `Mode`.

mod files;
mod google_drive;
mod google_sheets;
mod oauth;
mod test_backend;

use crate::error::Res;
use serde::{Deserialize, Serialize};

pub(crate) use files::SecretsFile;
pub(crate) use oauth::TokenProvider;
pub(crate) use test_backend::TestBackend;
#[cfg(test)]
pub(crate) use test_backend::{TestSpreadsheet, TestState};

/// The environment variable that switches the app into `Mode::Test`.
pub const TEST_MODE_ENV: &str = "RECEIPTS_IN_TEST_MODE";

/// The MIME type Google uses for its spreadsheets.
pub(crate) const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

// drive.file only grants access to files this app created or opened, which covers both the
// uploaded receipts and the receipts sheet.
pub(crate) const OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/spreadsheets",
];

/// Whether to talk to Google or to use in-memory stand-ins.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Google,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// `Mode::Test` when `RECEIPTS_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// The first worksheet of a spreadsheet; rows are appended here.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Worksheet {
    spreadsheet_id: String,
    title: String,
}

impl Worksheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            title: title.into(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The A1 range covering all seven receipt columns of this worksheet.
    pub(crate) fn range(&self) -> String {
        format!("'{}'!A:G", self.title.replace('\'', "''"))
    }

    /// Where a person can open the spreadsheet in a browser.
    pub fn url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}",
            self.spreadsheet_id
        )
    }
}

/// Metadata sent along with the bytes of an uploaded file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileMetadata {
    pub(crate) name: String,
    pub(crate) parents: Vec<String>,
    pub(crate) mime_type: String,
}

/// The parts of a Drive file resource that we ask for.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveFile {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) web_view_link: Option<String>,
}

/// The file storage operations the app needs.
#[async_trait::async_trait]
pub(crate) trait Drive {
    /// Finds non-trashed spreadsheets named exactly `name`, returning their IDs in the order the
    /// service lists them.
    async fn find_spreadsheets(&mut self, name: &str) -> Res<Vec<String>>;

    /// Creates a file from `metadata` and `bytes` in a single request.
    async fn create_file(&mut self, metadata: &FileMetadata, bytes: Vec<u8>) -> Res<DriveFile>;

    /// Lets anyone with the link read the file.
    async fn share_publicly(&mut self, file_id: &str) -> Res<()>;
}

/// The spreadsheet operations the app needs.
#[async_trait::async_trait]
pub(crate) trait Sheets {
    /// Creates a new spreadsheet titled `title` and returns its ID.
    async fn create_spreadsheet(&mut self, title: &str) -> Res<String>;

    /// Returns the title of the first worksheet of the spreadsheet.
    async fn first_worksheet(&mut self, spreadsheet_id: &str) -> Res<String>;

    /// Appends `row` after the last row of `worksheet`.
    async fn append_row(&mut self, worksheet: &Worksheet, row: Vec<String>) -> Res<()>;
}

pub(crate) type DynDrive = Box<dyn Drive + Send>;
pub(crate) type DynSheets = Box<dyn Sheets + Send>;

/// Creates the `Drive` and `Sheets` implementations for `mode`. In `Mode::Google` both share one
/// `TokenProvider`, so the refresh token is exchanged at most once until the token expires.
pub(crate) fn services(secrets: &SecretsFile, mode: Mode) -> Res<(DynDrive, DynSheets)> {
    match mode {
        Mode::Google => {
            let token_provider = TokenProvider::new(secrets.google())?;
            let drive = google_drive::GoogleDrive::new(token_provider.clone());
            let sheets = google_sheets::GoogleSheets::new(token_provider);
            Ok((Box::new(drive), Box::new(sheets)))
        }
        Mode::Test => {
            let backend = TestBackend::default();
            Ok((Box::new(backend.clone()), Box::new(backend)))
        }
    }
}

/// Turns an unsuccessful HTTP response into an error that includes the status and body.
pub(crate) async fn check_response(
    response: reqwest::Response,
    what: &str,
) -> Res<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    anyhow::bail!("{what} failed with status {status}: {body}")
}
