//! Implements the `Sheets` trait. Rows are appended with the `sheets::Client`; creating a
//! spreadsheet and reading its worksheet titles use the REST API directly.

use crate::api::{check_response, Sheets, TokenProvider, Worksheet};
use crate::error::Res;
use anyhow::Context;
use serde::Deserialize;
use sheets::types::{
    DateTimeRenderOption, Dimension, InsertDataOption, ValueInputOption, ValueRange,
    ValueRenderOption,
};
use sheets::ClientError;
use tracing::{debug, trace};

const SPREADSHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub(super) struct GoogleSheets {
    token_provider: TokenProvider,
    http: reqwest::Client,
}

impl GoogleSheets {
    pub(super) fn new(token_provider: TokenProvider) -> Self {
        Self {
            token_provider,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a sheets client with a current access token.
    async fn client(&self) -> Res<sheets::Client> {
        let access_token = self.token_provider.token().await?;

        // The sheets crate wants client_id, client_secret and redirect_uri, but only the access
        // token is used for API calls. Refresh is handled by the `TokenProvider`.
        Ok(sheets::Client::new(
            String::new(),
            String::new(),
            String::new(),
            access_token,
            String::new(),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResource {
    #[serde(default)]
    spreadsheet_id: String,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

impl SpreadsheetResource {
    fn first_title(&self) -> Option<&str> {
        self.sheets
            .iter()
            .min_by_key(|s| s.properties.index)
            .map(|s| s.properties.title.as_str())
    }
}

#[async_trait::async_trait]
impl Sheets for GoogleSheets {
    async fn create_spreadsheet(&mut self, title: &str) -> Res<String> {
        let token = self.token_provider.token().await?;
        let response = self
            .http
            .post(SPREADSHEETS_URL)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "properties": { "title": title }
            }))
            .send()
            .await
            .context("Failed to send create request to Google Sheets API")?;
        let created: SpreadsheetResource = check_response(response, "Google Sheets API create")
            .await?
            .json()
            .await
            .context("Failed to parse Google Sheets API create response")?;
        anyhow::ensure!(
            !created.spreadsheet_id.is_empty(),
            "Google Sheets API create response missing 'spreadsheetId' field"
        );
        debug!("Created spreadsheet '{title}' with ID {}", created.spreadsheet_id);
        Ok(created.spreadsheet_id)
    }

    async fn first_worksheet(&mut self, spreadsheet_id: &str) -> Res<String> {
        let token = self.token_provider.token().await?;
        let url = format!("{SPREADSHEETS_URL}/{spreadsheet_id}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("fields", "spreadsheetId,sheets.properties(title,index)")])
            .send()
            .await
            .context("Failed to send get request to Google Sheets API")?;
        let spreadsheet: SpreadsheetResource = check_response(response, "Google Sheets API get")
            .await?
            .json()
            .await
            .context("Failed to parse Google Sheets API get response")?;
        spreadsheet
            .first_title()
            .map(str::to_string)
            .with_context(|| format!("Spreadsheet {spreadsheet_id} has no worksheets"))
    }

    async fn append_row(&mut self, worksheet: &Worksheet, row: Vec<String>) -> Res<()> {
        let range = worksheet.range();
        trace!("append_row to {range}");
        let body = ValueRange {
            major_dimension: Some(Dimension::Rows),
            range: range.clone(),
            values: vec![row],
        };
        self.client()
            .await?
            .spreadsheets()
            .values_append(
                worksheet.spreadsheet_id(),
                &range,
                false,
                InsertDataOption::InsertRows,
                DateTimeRenderOption::FormattedString,
                ValueRenderOption::FormattedValue,
                ValueInputOption::Raw,
                &body,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to append a row to {range}"))?;
        Ok(())
    }
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}
