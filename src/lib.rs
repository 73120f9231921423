#![allow(async_fn_in_trait)]
pub mod acquire;
pub mod aoi;
pub mod cdse;
pub mod config;
pub mod download;
mod error;
pub mod selection;

pub use error::{AoiError, AuthError, ConfigError, DownloadError, SearchError};
