use std::path::PathBuf;

use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("start_date {start} is after end_date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Error, Debug)]
pub enum AoiError {
    #[error("unable to read AOI file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse AOI file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no usable geometry in AOI file {}", .0.display())]
    NoGeometry(PathBuf),
    #[error("unsupported AOI geometry type '{0}', expected Polygon or MultiPolygon")]
    UnsupportedGeometry(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token endpoint returned {0}")]
    Status(StatusCode),
    #[error("token response did not contain an access token")]
    MissingToken,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("catalog query returned {0}")]
    Status(StatusCode),
    #[error("malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed product entry: {0}")]
    Product(String),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("archive request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("archive request for product {product_id} returned {status}")]
    Status {
        product_id: String,
        status: StatusCode,
    },
    #[error("error writing archive to disk: {0}")]
    Io(#[from] std::io::Error),
}
