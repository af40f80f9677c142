use crate::model::ReceiptForm;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The fixed header row of the receipts sheet. The order here is the order of the columns.
pub const HEADER: [&str; 7] = [
    "Timestamp",
    "Date",
    "Amount",
    "Currency",
    "Category",
    "Notes",
    "DriveLink",
];

/// The format of the first column, the submission time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the receipts sheet, built from a single form submission and appended exactly once.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiptRow {
    timestamp: String,
    date: String,
    amount: String,
    currency: String,
    category: String,
    notes: String,
    /// Either the shareable Drive link of the uploaded receipt, or empty.
    drive_link: String,
}

impl ReceiptRow {
    /// Builds the row for `form`, submitted at `now`. `drive_link` is empty when nothing was
    /// uploaded.
    pub(crate) fn new(now: DateTime<Local>, form: &ReceiptForm, drive_link: String) -> Self {
        Self {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            date: form.date().to_string(),
            amount: form.amount_str().to_string(),
            currency: form.currency_str().to_string(),
            category: form.category_str().to_string(),
            notes: form.notes_str().to_string(),
            drive_link,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn drive_link(&self) -> &str {
        &self.drive_link
    }

    /// The cell values in `HEADER` order.
    pub fn values(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.date.clone(),
            self.amount.clone(),
            self.currency.clone(),
            self.category.clone(),
            self.notes.clone(),
            self.drive_link.clone(),
        ]
    }

    /// Renders a one-row table with the header, for showing the user what was saved.
    pub fn preview(&self) -> String {
        let values = self.values();
        // Notes may span lines; keep the table on one row.
        let values: Vec<String> = values
            .iter()
            .map(|v| v.replace(['\r', '\n'], " "))
            .collect();
        let widths: Vec<usize> = HEADER
            .iter()
            .zip(values.iter())
            .map(|(h, v)| h.chars().count().max(v.chars().count()))
            .collect();

        let mut out = String::new();
        push_line(&mut out, HEADER.iter().copied(), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, rule.iter().map(String::as_str), &widths);
        push_line(&mut out, values.iter().map(String::as_str), &widths);
        out
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    out.push('|');
    for (cell, &width) in cells.zip(widths) {
        let _ = write!(out, " {cell:<width$} |");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn form() -> ReceiptForm {
        ReceiptForm::new(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
            .amount("45.60")
            .currency("USD")
            .category("Meals")
    }

    #[test]
    fn test_header_order() {
        assert_eq!(
            HEADER.to_vec(),
            vec![
                "Timestamp",
                "Date",
                "Amount",
                "Currency",
                "Category",
                "Notes",
                "DriveLink"
            ]
        );
    }

    #[test]
    fn test_row_values_are_in_header_order() {
        let row = ReceiptRow::new(now(), &form(), String::new());
        assert_eq!(
            row.values(),
            vec![
                "2024-01-01 12:00:00",
                "2023-12-31",
                "45.60",
                "USD",
                "Meals",
                "",
                ""
            ]
        );
        assert_eq!(row.values().len(), HEADER.len());
    }

    #[test]
    fn test_row_keeps_link() {
        let link = "https://drive.google.com/file/d/abc/view";
        let row = ReceiptRow::new(now(), &form().notes("team lunch"), link.to_string());
        assert_eq!(row.drive_link(), link);
        assert_eq!(row.notes(), "team lunch");
    }

    #[test]
    fn test_preview() {
        let row = ReceiptRow::new(now(), &form().notes("line one\nline two"), String::new());
        let preview = row.preview();
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| Timestamp           | Date       | Amount |"));
        assert!(lines[1].starts_with("| ------------------- | ---------- | ------ |"));
        assert!(lines[2].contains("| 45.60  |"));
        assert!(lines[2].contains("line one line two"));
        // All lines have the same width.
        assert_eq!(lines[0].chars().count(), lines[2].chars().count());
    }

    #[test]
    fn test_serialize_uses_column_names() {
        let row = ReceiptRow::new(now(), &form(), String::new());
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Timestamp"], "2024-01-01 12:00:00");
        assert_eq!(json["DriveLink"], "");
    }
}
