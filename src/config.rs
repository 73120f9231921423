use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::cdse::{Credentials, SearchCriteria};
use crate::download::OnFailure;
use crate::error::ConfigError;

#[derive(Deserialize, Clone, Debug)]
pub struct RunConfig {
    pub cdse: CdseSettings,
    pub paths: PathSettings,
    pub imagery: ImagerySettings,
    #[serde(default)]
    pub download: DownloadSettings,
}

#[derive(Deserialize, Clone)]
pub struct CdseSettings {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CdseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdseSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct PathSettings {
    pub aoi_path: PathBuf,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ImagerySettings {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_cloud_cover: f64,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub on_failure: OnFailure,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloads"),
            concurrency: 1,
            on_failure: OnFailure::Continue,
        }
    }
}

impl RunConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    #[allow(dead_code)]
    pub fn from_template(table: &toml::Table) -> Self {
        let config: Self =
            toml::from_str(&table.to_string()).expect("Error deserializing template");
        config
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.imagery.start_date > self.imagery.end_date {
            return Err(ConfigError::DateRange {
                start: self.imagery.start_date,
                end: self.imagery.end_date,
            });
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.cdse.username.clone(),
            password: self.cdse.password.clone(),
        }
    }

    pub fn criteria(&self, aoi_wkt: String) -> SearchCriteria {
        SearchCriteria {
            start_date: self.imagery.start_date,
            end_date: self.imagery.end_date,
            max_cloud_cover: self.imagery.max_cloud_cover,
            aoi_wkt,
        }
    }
}
