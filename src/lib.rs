mod api;
pub mod args;
pub mod commands;
mod config;
mod context;
mod controller;
mod error;
mod locator;
pub mod model;
mod upload;
mod utils;


pub use api::{Mode, Worksheet, TEST_MODE_ENV};
pub use config::Config;
pub use context::Context;
pub use controller::{FormController, FormState, Saved};
pub use error::{Error, ErrorType, Result};
