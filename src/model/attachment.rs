use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The MIME type used when the extension is not one we recognize.
pub const GENERIC_MIME_TYPE: &str = "application/octet-stream";

/// The prefix format for uploaded file names.
pub const UPLOAD_PREFIX_FORMAT: &str = "%Y%m%d-%H%M%S";

/// The kinds of receipt file that can be attached.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Png,
    Jpg,
    Jpeg,
}

serde_plain::derive_display_from_serialize!(FileKind);
serde_plain::derive_fromstr_from_deserialize!(FileKind);

impl FileKind {
    pub const ALL: [FileKind; 4] = [FileKind::Pdf, FileKind::Png, FileKind::Jpg, FileKind::Jpeg];

    /// Determines the kind from the file name's extension, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        extension.to_ascii_lowercase().parse().ok()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Png => "image/png",
            FileKind::Jpg | FileKind::Jpeg => "image/jpeg",
        }
    }
}

/// Guesses the content type from the suffix of `name`. The file's content is never inspected.
pub fn mime_type(name: &str) -> &'static str {
    FileKind::from_name(name)
        .map(|kind| kind.mime_type())
        .unwrap_or(GENERIC_MIME_TYPE)
}

/// The name a receipt is stored under: the submission time followed by the original name, e.g.
/// `20240101-120000_receipt.png`.
pub fn upload_name(now: DateTime<Local>, original: &str) -> String {
    format!("{}_{original}", now.format(UPLOAD_PREFIX_FORMAT))
}

/// A receipt file picked by the user.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Attachment {
    path: PathBuf,
    name: String,
}

impl Attachment {
    /// Accepts `path` only if it names a file with one of the `FileKind` extensions.
    pub fn new(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .with_context(|| format!("'{}' does not name a file", path.display()))?
            .to_str()
            .with_context(|| {
                format!(
                    "The file name of '{}' is not valid UTF-8, rename the file and try again",
                    path.display()
                )
            })?
            .to_string();
        if FileKind::from_name(&name).is_none() {
            let accepted: Vec<String> = FileKind::ALL.iter().map(|k| k.to_string()).collect();
            bail!(
                "Unsupported receipt file '{name}', expected one of: {}",
                accepted.join(", ")
            );
        }
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The original file name, without any directories.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &'static str {
        mime_type(&self.name)
    }

    /// Reads the whole file into memory.
    pub(crate) async fn read(&self) -> Res<Vec<u8>> {
        utils::read_bytes(&self.path).await
    }
}

/// A clap `value_parser` for the `--file` argument.
pub fn parse_attachment(s: &str) -> std::result::Result<Attachment, String> {
    Attachment::new(s).map_err(|e| e.to_string())
}
