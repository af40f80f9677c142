//! The `receipts save` command.

use crate::api::Mode;
use crate::args::SaveArgs;
use crate::commands::Out;
use crate::error::Error;
use crate::model::ReceiptForm;
use crate::{Config, Context, FormController, Result, Saved};
use chrono::Local;
use tracing::debug;

/// Fills a `ReceiptForm` from `args` and submits it.
///
/// The form is checked before anything else, so a rejected form never loads the secrets or
/// opens (or creates) the receipts sheet.
///
/// # Returns
/// A message with a one-row preview of what was appended and, when a file was attached, the link
/// to the uploaded file. The structured output is the `Saved` row.
///
/// # Errors
/// - `ErrorType::Validation` when amount or category is missing. Nothing is uploaded or appended.
/// - `ErrorType::Config`, `ErrorType::Auth` or `ErrorType::Service` when the services cannot be
///   reached or reject a request.
pub async fn save(config: Config, mode: Mode, args: &SaveArgs) -> Result<Out<Saved>> {
    let form = form(args);
    debug!("Submitting {form:?}");
    form.validate().map_err(Error::validation)?;

    let mut context = Context::setup(&config, mode).await?;
    let mut controller = FormController::new(&mut context);
    let saved = controller.submit(&form, Local::now()).await?;

    let mut message = format!(
        "Entry saved to Google Sheets!\n\n{}",
        saved.row().preview().trim_end()
    );
    if let Some(link) = saved.link() {
        message.push_str(&format!("\n\nOpen uploaded file in Drive: {link}"));
    }
    Ok(Out::new(message, saved))
}

fn form(args: &SaveArgs) -> ReceiptForm {
    let date = args.date().unwrap_or_else(|| Local::now().date_naive());
    ReceiptForm::new(date)
        .amount(args.amount().unwrap_or_default())
        .currency(args.currency())
        .category(args.category().unwrap_or_default())
        .notes(args.notes().unwrap_or_default())
        .attachment(args.file().cloned())
}
