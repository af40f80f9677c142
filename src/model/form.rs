use crate::model::Attachment;
use chrono::NaiveDate;

/// The message shown when a required field is missing.
pub const MISSING_FIELDS: &str = "Please enter at least an Amount and Category.";

/// The default currency code pre-filled in the form.
pub const DEFAULT_CURRENCY: &str = "USD";

/// The receipt form as the user filled it in. Nothing here has been validated; see `validate`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReceiptForm {
    date: NaiveDate,
    amount: String,
    currency: String,
    category: String,
    notes: String,
    attachment: Option<Attachment>,
}

impl ReceiptForm {
    /// An empty form for a transaction on `date`, with the default currency.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            amount: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            category: String::new(),
            notes: String::new(),
            attachment: None,
        }
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }

    /// Checks the presence of the required fields. Returns the user-facing message on failure.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.amount.is_empty() || self.category.is_empty() {
            return Err(MISSING_FIELDS);
        }
        Ok(())
    }

    pub(crate) fn date(&self) -> NaiveDate {
        self.date
    }

    pub(crate) fn amount_str(&self) -> &str {
        &self.amount
    }

    pub(crate) fn currency_str(&self) -> &str {
        &self.currency
    }

    pub(crate) fn category_str(&self) -> &str {
        &self.category
    }

    pub(crate) fn notes_str(&self) -> &str {
        &self.notes
    }

    pub(crate) fn attached(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_new_form_defaults() {
        let form = ReceiptForm::new(date());
        assert_eq!(form.currency_str(), "USD");
        assert_eq!(form.notes_str(), "");
        assert!(form.attached().is_none());
    }

    #[test]
    fn test_validate_ok() {
        let form = ReceiptForm::new(date()).amount("45.60").category("Meals");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_amount() {
        let form = ReceiptForm::new(date()).category("Travel");
        assert_eq!(form.validate(), Err(MISSING_FIELDS));
    }

    #[test]
    fn test_validate_missing_category() {
        let form = ReceiptForm::new(date()).amount("12");
        assert_eq!(form.validate(), Err(MISSING_FIELDS));
    }

    #[test]
    fn test_validate_whitespace_is_present() {
        let form = ReceiptForm::new(date()).amount("  ").category("Travel");
        assert!(form.validate().is_ok());
        let form = ReceiptForm::new(date()).amount("3").category("\t\n");
        assert!(form.validate().is_ok());
        let form = ReceiptForm::new(date()).amount("").category(" ");
        assert_eq!(form.validate(), Err(MISSING_FIELDS));
    }

    #[test]
    fn test_amount_is_not_parsed() {
        // Free text; only presence is checked.
        let form = ReceiptForm::new(date()).amount("about 20").category("Office");
        assert!(form.validate().is_ok());
    }
}
