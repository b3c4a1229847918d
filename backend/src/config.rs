//! Data directory resolution and the configuration a fresh install starts with.

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use rust_decimal::Decimal;
use shared::{CommissionType, Employee, ServiceConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the data directory when set
pub const DATA_DIR_ENV: &str = "COMMISSION_TRACKER_DATA_DIR";

/// Folder created under the user's Documents directory
pub const DEFAULT_FOLDER_NAME: &str = "Commission Tracker";

/// File inside the default folder pointing at a relocated data directory
pub const REDIRECT_FILE_NAME: &str = ".tracker_redirect";

pub const DATA_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub data_directory: PathBuf,
}

impl TrackerConfig {
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            data_directory: data_directory.as_ref().to_path_buf(),
        }
    }

    /// Resolve the data directory from the environment, falling back to
    /// `~/Documents/Commission Tracker` (or its redirect target)
    pub fn resolve() -> Result<Self> {
        let from_env = std::env::var(DATA_DIR_ENV).ok();
        let documents = dirs::document_dir().or_else(dirs::home_dir);
        Self::from_sources(from_env, documents)
    }

    fn from_sources(from_env: Option<String>, documents: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = from_env.filter(|d| !d.trim().is_empty()) {
            info!("Using data directory from {}: {}", DATA_DIR_ENV, dir.trim());
            return Ok(Self::new(dir.trim()));
        }

        let documents = documents.ok_or_else(|| anyhow!("Could not determine home directory"))?;
        let default_dir = documents.join(DEFAULT_FOLDER_NAME);
        Ok(Self::new(follow_redirect(default_dir)))
    }
}

fn follow_redirect(default_dir: PathBuf) -> PathBuf {
    let redirect_file = default_dir.join(REDIRECT_FILE_NAME);
    if !redirect_file.exists() {
        info!("No redirect file found, using default data directory: {}", default_dir.display());
        return default_dir;
    }

    match fs::read_to_string(&redirect_file) {
        Ok(redirected_path) => {
            let path = PathBuf::from(redirected_path.trim());
            if path.exists() {
                info!("Found redirect file, using data directory: {}", path.display());
                path
            } else {
                warn!(
                    "Redirect file points to non-existent directory: {}. Using default.",
                    path.display()
                );
                default_dir
            }
        }
        Err(e) => {
            error!("Failed to read redirect file: {}. Using default directory.", e);
            default_dir
        }
    }
}

pub fn default_employees() -> Vec<Employee> {
    (1..=6)
        .map(|n| Employee::new(n.to_string(), format!("Employee {:02}", n)))
        .collect()
}

pub fn default_services() -> Vec<ServiceConfig> {
    let twenty_percent = Decimal::new(2, 1);
    let service = |id: &str, label: &str, amount: i64, commission_type, commission_value| {
        ServiceConfig {
            id: id.to_string(),
            label: label.to_string(),
            amount: Decimal::from(amount),
            commission_type,
            commission_value,
        }
    };

    vec![
        service("s1", "Service 128", 128, CommissionType::Percentage, twenty_percent),
        service("s2", "Service 48", 48, CommissionType::Fixed, Decimal::from(5)),
        service("s3", "Service 3", 158, CommissionType::Percentage, twenty_percent),
        service("s4", "Service 4", 198, CommissionType::Percentage, twenty_percent),
        service("s5", "Service 5", 98, CommissionType::Percentage, twenty_percent),
    ]
}
