// ⚙️ Configuration - file locations and bootstrap admin
// Loaded once at startup and handed to the stores, never read globally.

use std::path::PathBuf;

/// Store configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Accounts file (`username,password,isAdmin`)
    pub accounts_path: PathBuf,

    /// Reservations file (`username,category,nights,price,month`)
    pub reservations_path: PathBuf,

    /// Admin account created on first start if missing
    pub admin_username: String,

    pub admin_password: String,

    /// Log level
    pub log_level: String,
}

fn default_accounts_path() -> PathBuf {
    PathBuf::from("users.txt")
}

fn default_reservations_path() -> PathBuf {
    PathBuf::from("reservations.txt")
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            accounts_path: default_accounts_path(),
            reservations_path: default_reservations_path(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment (and `.env` if present)
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults plus whatever `lookup` returns for each
    /// `HOTEL_*` key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("HOTEL_ACCOUNTS_PATH") {
            config.accounts_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("HOTEL_RESERVATIONS_PATH") {
            config.reservations_path = PathBuf::from(path);
        }

        if let Some(username) = lookup("HOTEL_ADMIN_USERNAME") {
            config.admin_username = username;
        }

        if let Some(password) = lookup("HOTEL_ADMIN_PASSWORD") {
            config.admin_password = password;
        }

        if let Some(level) = lookup("HOTEL_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Same config with both data files placed under `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            accounts_path: dir.join(default_accounts_path()),
            reservations_path: dir.join(default_reservations_path()),
            ..Self::default()
        }
    }
}
