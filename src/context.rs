use crate::api::{self, DynDrive, DynSheets, Mode, SecretsFile, Worksheet};
use crate::error::{ErrorType, IntoResult};
use crate::{locator, Config, Result};
use tracing::debug;

/// The long-lived handles a submission needs: authorized service clients, the receipts
/// worksheet, and the Drive folder for uploads. Built once by `setup` and then handed to the
/// `FormController`.
pub struct Context {
    pub(crate) drive: DynDrive,
    pub(crate) sheets: DynSheets,
    pub(crate) worksheet: Worksheet,
    pub(crate) folder_id: String,
}

impl Context {
    /// Loads the secrets, builds the clients for `mode`, and opens (or creates) the receipts
    /// spreadsheet named by `general.SHEET_NAME`. Each of these happens exactly once.
    pub async fn setup(config: &Config, mode: Mode) -> Result<Self> {
        let secrets = SecretsFile::load(&config.secrets_path())
            .await
            .pub_result(ErrorType::Config)?;
        let (mut drive, mut sheets) = api::services(&secrets, mode).pub_result(ErrorType::Auth)?;
        debug!("Using {mode} services");

        let worksheet =
            locator::open_or_create(drive.as_mut(), sheets.as_mut(), secrets.sheet_name())
                .await
                .pub_result(ErrorType::Service)?;

        Ok(Self::new(
            drive,
            sheets,
            worksheet,
            config.drive_folder_id().to_string(),
        ))
    }

    pub(crate) fn new(
        drive: DynDrive,
        sheets: DynSheets,
        worksheet: Worksheet,
        folder_id: String,
    ) -> Self {
        Self {
            drive,
            sheets,
            worksheet,
            folder_id,
        }
    }

    /// The worksheet that receipt rows are appended to.
    pub fn worksheet(&self) -> &Worksheet {
        &self.worksheet
    }

    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }
}
