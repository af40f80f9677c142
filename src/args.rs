//! These structs provide the CLI interface for the receipts CLI.

use crate::model::{parse_attachment, Attachment, DEFAULT_CURRENCY};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// receipts: Upload a receipt to Google Drive and record it in a Google Sheet.
///
/// Each call to `receipts save` uploads the attached receipt file (pdf, png, jpg or jpeg) into a
/// fixed Drive folder, makes it viewable by anyone with the link, and appends one row to the
/// receipts spreadsheet: Timestamp, Date, Amount, Currency, Category, Notes, DriveLink.
///
/// The spreadsheet is found by name and created, with a header row, if it does not exist yet.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need two things ready beforehand:
    ///
    /// - A secrets JSON file holding your Google OAuth client ID, client secret and refresh
    ///   token in a `google` section, and the name of the receipts spreadsheet as `SHEET_NAME`
    ///   in a `general` section. It will be moved into $RECEIPTS_HOME/.secrets.
    ///
    /// - The ID of the Google Drive folder that receipts should be uploaded into.
    Init(InitArgs),
    /// Check that the stored OAuth credentials can be exchanged for an access token.
    Auth,
    /// Upload a receipt and append it to the receipts spreadsheet.
    Save(SaveArgs),
    /// Open (or create) the receipts spreadsheet and print its URL.
    Sheet,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where receipts configuration and secrets are held. Defaults to ~/receipts
    #[arg(long, env = "RECEIPTS_HOME", default_value_t = default_receipts_home())]
    receipts_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, receipts_home: PathBuf) -> Self {
        Self {
            log_level,
            receipts_home: receipts_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn receipts_home(&self) -> &DisplayPath {
        &self.receipts_home
    }
}

/// (Not shown): Args for the `receipts init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to your secrets JSON file. It will be moved to
    /// $RECEIPTS_HOME/.secrets/secrets.json.
    #[arg(long)]
    secrets: PathBuf,

    /// The ID of the Drive folder that receipts are uploaded into. It is the last part of the
    /// folder's URL: https://drive.google.com/drive/folders/<ID>
    #[arg(long)]
    drive_folder_id: String,
}

impl InitArgs {
    pub fn new(secrets: impl Into<PathBuf>, drive_folder_id: impl Into<String>) -> Self {
        Self {
            secrets: secrets.into(),
            drive_folder_id: drive_folder_id.into(),
        }
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn drive_folder_id(&self) -> &str {
        &self.drive_folder_id
    }
}

/// (Not shown): Args for the `receipts save` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct SaveArgs {
    /// The receipt file to upload: pdf, png, jpg or jpeg.
    #[arg(long, value_parser = parse_attachment)]
    file: Option<Attachment>,

    /// The date of the purchase as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The amount, recorded exactly as typed. Required.
    #[arg(long)]
    amount: Option<String>,

    /// The currency code.
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,

    /// The expense category. Required.
    #[arg(long)]
    category: Option<String>,

    /// Free-form notes, may span several lines.
    #[arg(long)]
    notes: Option<String>,
}

impl SaveArgs {
    pub fn new(amount: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.into()),
            currency: DEFAULT_CURRENCY.to_string(),
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, file: Attachment) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn file(&self) -> Option<&Attachment> {
        self.file.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

fn default_receipts_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("receipts"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --receipts-home or RECEIPTS_HOME instead of relying on the \
                default receipts home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("receipts")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
