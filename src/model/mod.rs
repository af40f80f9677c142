//! Types that represent the core data model: the receipt form and the row it becomes.
mod attachment;
mod form;
mod receipt;

pub use attachment::{
    mime_type, parse_attachment, upload_name, Attachment, FileKind, GENERIC_MIME_TYPE,
};
pub use form::{ReceiptForm, DEFAULT_CURRENCY, MISSING_FIELDS};
pub use receipt::{ReceiptRow, HEADER, TIMESTAMP_FORMAT};
