//! Finds the receipts spreadsheet by name, creating it when it does not exist yet.

use crate::api::{Drive, Sheets, Worksheet};
use crate::error::Res;
use crate::model::HEADER;
use anyhow::Context;
use tracing::{debug, info, warn};

/// Opens the spreadsheet named exactly `name` and returns its first worksheet.
///
/// When no such spreadsheet exists, a new one is created, shared so that anyone with the link can
/// view it, and given the header row before the handle is returned. When several spreadsheets
/// share the name, the first one listed by Drive wins.
pub(crate) async fn open_or_create(
    drive: &mut (dyn Drive + Send),
    sheets: &mut (dyn Sheets + Send),
    name: &str,
) -> Res<Worksheet> {
    let found = drive
        .find_spreadsheets(name)
        .await
        .with_context(|| format!("Unable to search for the spreadsheet '{name}'"))?;

    if let Some(spreadsheet_id) = found.first() {
        if found.len() > 1 {
            warn!(
                "Found {} spreadsheets named '{name}', using {spreadsheet_id}",
                found.len()
            );
        }
        let title = sheets.first_worksheet(spreadsheet_id).await?;
        debug!("Opened spreadsheet '{name}' ({spreadsheet_id}), worksheet '{title}'");
        return Ok(Worksheet::new(spreadsheet_id, title));
    }

    info!("Spreadsheet '{name}' not found, creating it");
    let spreadsheet_id = sheets
        .create_spreadsheet(name)
        .await
        .with_context(|| format!("Unable to create the spreadsheet '{name}'"))?;
    drive
        .share_publicly(&spreadsheet_id)
        .await
        .context("Unable to share the new spreadsheet")?;
    let title = sheets.first_worksheet(&spreadsheet_id).await?;
    let worksheet = Worksheet::new(spreadsheet_id, title);
    let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    sheets
        .append_row(&worksheet, header)
        .await
        .context("Unable to write the header row")?;
    Ok(worksheet)
}
