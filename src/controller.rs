//! The form controller: validates a submitted receipt form, uploads the attached file if there is
//! one, and appends the receipt row.
//!
//! ```text
//!          submit            ok
//!   Idle ─────────▶ Validating ─────▶ Persisting
//!    ▲                  │                 │
//!    └──── empty ───────┘                 │
//!    └──────────── saved or failed ───────┘
//! ```

use crate::api::Worksheet;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{upload_name, ReceiptForm, ReceiptRow};
use crate::{upload, Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    /// Waiting for a submission.
    #[default]
    Idle,
    /// Checking the required fields.
    Validating,
    /// Uploading and appending.
    Persisting,
}

serde_plain::derive_display_from_serialize!(FormState);

/// What a successful submission produced.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Saved {
    row: ReceiptRow,
    worksheet: Worksheet,
}

impl Saved {
    pub fn row(&self) -> &ReceiptRow {
        &self.row
    }

    pub fn worksheet(&self) -> &Worksheet {
        &self.worksheet
    }

    /// The Drive link of the uploaded receipt, if a file was attached.
    pub fn link(&self) -> Option<&str> {
        Some(self.row.drive_link()).filter(|l| !l.is_empty())
    }
}

/// Drives one form through validation and persistence. Errors from Drive or Sheets are passed
/// back to the caller untouched; nothing is retried or rolled back.
pub struct FormController<'a> {
    context: &'a mut Context,
    state: FormState,
}

impl<'a> FormController<'a> {
    pub fn new(context: &'a mut Context) -> Self {
        Self {
            context,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Submits `form` at wall-clock time `now`. `now` is used both for the row's timestamp and
    /// for the uploaded file's name prefix.
    ///
    /// # Errors
    /// - `ErrorType::Validation` when amount or category is empty. Nothing is uploaded or
    ///   appended.
    /// - `ErrorType::Io` when the attached file cannot be read.
    /// - `ErrorType::Service` when the upload or the append fails. If the upload succeeded and the
    ///   append failed, the uploaded file is left in Drive.
    pub async fn submit(&mut self, form: &ReceiptForm, now: DateTime<Local>) -> Result<Saved> {
        self.transition(FormState::Validating);
        if let Err(message) = form.validate() {
            self.transition(FormState::Idle);
            return Err(Error::validation(message));
        }

        self.transition(FormState::Persisting);
        let result = self.persist(form, now).await;
        self.transition(FormState::Idle);
        result
    }

    async fn persist(&mut self, form: &ReceiptForm, now: DateTime<Local>) -> Result<Saved> {
        let drive_link = match form.attached() {
            Some(attachment) => {
                let bytes = attachment.read().await.pub_result(ErrorType::Io)?;
                let filename = upload_name(now, attachment.name());
                upload::upload(
                    self.context.drive.as_mut(),
                    &self.context.folder_id,
                    bytes,
                    &filename,
                    attachment.mime_type(),
                )
                .await
                .pub_result(ErrorType::Service)?
            }
            None => {
                debug!("No file attached, skipping upload");
                String::new()
            }
        };

        let row = ReceiptRow::new(now, form, drive_link);
        self.context
            .sheets
            .append_row(&self.context.worksheet, row.values())
            .await
            .pub_result(ErrorType::Service)?;

        Ok(Saved {
            row,
            worksheet: self.context.worksheet.clone(),
        })
    }

    fn transition(&mut self, to: FormState) {
        trace!("Form state {} -> {to}", self.state);
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestBackend;
    use crate::model::{Attachment, MISSING_FIELDS};
    use crate::test::test_context;
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// Rows appended after the header.
    async fn data_rows(backend: &TestBackend) -> Vec<Vec<String>> {
        let state = backend.state().await;
        state.spreadsheets[0].rows[1..].to_vec()
    }

    #[tokio::test]
    async fn test_no_file() {
        let (backend, mut context) = test_context().await;
        let mut controller = FormController::new(&mut context);
        let form = ReceiptForm::new(today())
            .amount("45.60")
            .currency("USD")
            .category("Meals")
            .notes("");

        let saved = controller.submit(&form, now()).await.unwrap();

        assert_eq!(controller.state(), FormState::Idle);
        assert_eq!(saved.link(), None);
        let expected = vec![
            "2024-01-01 12:00:00",
            "2024-01-01",
            "45.60",
            "USD",
            "Meals",
            "",
            "",
        ];
        assert_eq!(saved.row().values(), expected);
        assert_eq!(data_rows(&backend).await, vec![expected]);
        assert!(backend.state().await.files.is_empty());
    }

    #[tokio::test]
    async fn test_blank_amount() {
        let (backend, mut context) = test_context().await;
        let before = backend.state().await;
        let mut controller = FormController::new(&mut context);
        let form = ReceiptForm::new(today()).amount("").category("Travel");

        let err = controller.submit(&form, now()).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), MISSING_FIELDS);
        assert_eq!(
            err.to_string(),
            "Please enter at least an Amount and Category."
        );
        assert_eq!(controller.state(), FormState::Idle);
        assert_eq!(backend.state().await, before);
    }

    #[tokio::test]
    async fn test_whitespace_amount_is_appended() {
        let (backend, mut context) = test_context().await;
        let mut controller = FormController::new(&mut context);
        let form = ReceiptForm::new(today()).amount(" ").category("Travel");

        let saved = controller.submit(&form, now()).await.unwrap();

        assert_eq!(saved.row().amount(), " ");
        let rows = data_rows(&backend).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][2], " ");
        assert_eq!(rows[0][4], "Travel");
    }

    #[tokio::test]
    async fn test_blank_category_with_file_uploads_nothing() {
        let (backend, mut context) = test_context().await;
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("receipt.png");
        std::fs::write(&p, b"png").unwrap();
        let mut controller = FormController::new(&mut context);
        let form = ReceiptForm::new(today())
            .amount("12.00")
            .attachment(Some(Attachment::new(&p).unwrap()));

        let err = controller.submit(&form, now()).await.unwrap_err();

        assert!(err.is_validation());
        let state = backend.state().await;
        assert!(state.files.is_empty());
        assert!(data_rows(&backend).await.is_empty());
    }

    #[tokio::test]
    async fn test_png_upload() {
        let (backend, mut context) = test_context().await;
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("receipt.png");
        std::fs::write(&p, b"\x89PNG").unwrap();
        let mut controller = FormController::new(&mut context);
        let form = ReceiptForm::new(today())
            .amount("9.99")
            .category("Office")
            .notes("toner")
            .attachment(Some(Attachment::new(&p).unwrap()));

        let saved = controller.submit(&form, now()).await.unwrap();

        let state = backend.state().await;
        assert_eq!(state.files.len(), 1);
        let file = &state.files[0];
        assert_eq!(file.name, "20240101-120000_receipt.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.parents, vec!["test-folder-id"]);
        assert_eq!(file.bytes, b"\x89PNG".to_vec());
        assert!(file.public);

        let link = format!("https://drive.google.com/file/d/{}/view?usp=drivesdk", file.id);
        assert_eq!(saved.link(), Some(link.as_str()));
        let rows = data_rows(&backend).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][6], link);
        assert_eq!(rows[0][5], "toner");
    }

    #[tokio::test]
    async fn test_same_name_different_seconds() {
        let (backend, mut context) = test_context().await;
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("scan.pdf");
        std::fs::write(&p, b"%PDF").unwrap();
        let form = ReceiptForm::new(today())
            .amount("1")
            .category("Misc")
            .attachment(Some(Attachment::new(&p).unwrap()));
        let mut controller = FormController::new(&mut context);

        controller.submit(&form, now()).await.unwrap();
        let later = now() + chrono::Duration::seconds(1);
        controller.submit(&form, later).await.unwrap();

        let state = backend.state().await;
        let names: Vec<&str> = state.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["20240101-120000_scan.pdf", "20240101-120001_scan.pdf"]
        );
        assert_eq!(data_rows(&backend).await.len(), 2);
    }

    #[tokio::test]
    async fn test_append_failure_leaves_upload_orphaned() {
        let (backend, mut context) = test_context().await;
        let mut state = backend.state().await;
        state.fail_appends = true;
        backend.set_state(state).await;

        let dir = TempDir::new().unwrap();
        let p = dir.path().join("receipt.jpg");
        std::fs::write(&p, b"jpg").unwrap();
        let form = ReceiptForm::new(today())
            .amount("3.50")
            .category("Coffee")
            .attachment(Some(Attachment::new(&p).unwrap()));
        let mut controller = FormController::new(&mut context);

        let err = controller.submit(&form, now()).await.unwrap_err();

        assert_eq!(err.error_type(), ErrorType::Service);
        assert_eq!(controller.state(), FormState::Idle);
        let state = backend.state().await;
        assert_eq!(state.files.len(), 1);
        assert!(data_rows(&backend).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let (backend, mut context) = test_context().await;
        let dir = TempDir::new().unwrap();
        let form = ReceiptForm::new(today())
            .amount("3.50")
            .category("Coffee")
            .attachment(Some(
                Attachment::new(dir.path().join("gone.pdf")).unwrap(),
            ));
        let mut controller = FormController::new(&mut context);

        let err = controller.submit(&form, now()).await.unwrap_err();

        assert_eq!(err.error_type(), ErrorType::Io);
        assert!(backend.state().await.files.is_empty());
        assert!(data_rows(&backend).await.is_empty());
    }
}
