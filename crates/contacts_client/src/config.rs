//! Client configuration.

use std::env;
use std::path::PathBuf;

use crate::{ContactsError, ContactsResult};

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:54871/api";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server API; `contacts` is resolved against it.
    pub api_base_url: String,
    /// Directory holding demo-mode storage.
    pub demo_storage_dir: PathBuf,
}

impl ClientConfig {
    /// Creates a configuration for `api_base_url` with the default demo directory.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            demo_storage_dir: default_demo_storage_dir(),
        }
    }

    /// Sets the demo storage directory.
    pub fn with_demo_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.demo_storage_dir = dir.into();
        self
    }

    /// Loads configuration from `CRM_API_URL` and `CRM_DEMO_DIR`, reading a
    /// `.env` file first if one exists.
    pub fn from_env() -> ContactsResult<Self> {
        dotenvy::dotenv().ok();

        let api_base_url =
            env::var("CRM_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        if reqwest::Url::parse(&api_base_url).is_err() {
            return Err(ContactsError::Configuration(format!(
                "CRM_API_URL is not a valid URL: {api_base_url}"
            )));
        }

        let demo_storage_dir = env::var("CRM_DEMO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_demo_storage_dir());

        Ok(Self {
            api_base_url,
            demo_storage_dir,
        })
    }
}

/// `<data dir>/crm`, or `./.crm` where the platform has no data directory.
pub fn default_demo_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("crm"))
        .unwrap_or_else(|| PathBuf::from(".crm"))
}
