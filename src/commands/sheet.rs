use crate::api::{Mode, Worksheet};
use crate::commands::Out;
use crate::{Config, Context, Result};

/// Opens the receipts spreadsheet, creating it with its header row if it does not exist, and
/// reports where it is.
pub async fn sheet(config: Config, mode: Mode) -> Result<Out<Worksheet>> {
    let context = Context::setup(&config, mode).await?;
    let worksheet = context.worksheet().clone();
    Ok(Out::new(
        format!(
            "Receipts are appended to worksheet '{}' of {}",
            worksheet.title(),
            worksheet.url()
        ),
        worksheet,
    ))
}
