// 👤 Accounts - registration and login
//
// File format (headerless CSV): username,password,isAdmin ("1" or "0").
// Passwords are stored as entered.

use crate::error::AccountError;
use crate::store::{open_if_exists, replace_file};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::Write;
use std::path::{Path, PathBuf};

const ACCOUNT_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,

    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub is_admin: bool,
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "1" } else { "0" })
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.as_str() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "admin flag must be \"1\" or \"0\", got {:?}",
            other
        ))),
    }
}

/// Accounts file plus its in-memory copy
pub struct AccountStore {
    path: PathBuf,
    accounts: Vec<Account>,
}

impl AccountStore {
    /// Load accounts from `path`; a missing file means no accounts yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_if_exists(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut accounts = Vec::new();
        if let Some(file) = file {
            let mut rdr = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(file);

            for result in rdr.records() {
                let record: StringRecord = match result {
                    Ok(record) => record,
                    Err(e) if e.is_io_error() => {
                        return Err(e).with_context(|| format!("Failed to read {}", path.display()))
                    }
                    Err(e) => {
                        let line = e.position().map(|p| p.line()).unwrap_or(0);
                        log::warn!("Skipping unreadable account on line {}: {}", line, e);
                        continue;
                    }
                };
                let line = record.position().map(|p| p.line()).unwrap_or(0);

                match parse_account(&record) {
                    Ok(account) => accounts.push(account),
                    Err(reason) => log::warn!("Skipping malformed account on line {}: {}", line, reason),
                }
            }
        }

        Ok(AccountStore { path, accounts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn find(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// Create a regular (non-admin) account and persist it
    pub fn register(&mut self, username: &str, password: &str) -> Result<Account, AccountError> {
        let username = validate_username(username)?;
        if password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }
        if self.find(&username).is_some() {
            return Err(AccountError::UsernameTaken(username));
        }

        let account = Account {
            username,
            password: password.to_string(),
            is_admin: false,
        };
        self.push(account.clone())?;

        log::info!("Registered account {}", account.username);
        Ok(account)
    }

    /// Exact match on username and password
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Account, AccountError> {
        self.find(username.trim())
            .filter(|a| a.password == password)
            .cloned()
            .ok_or(AccountError::InvalidCredentials)
    }

    /// Create the admin account if `username` is not registered yet.
    /// Returns whether an account was created.
    pub fn ensure_admin(&mut self, username: &str, password: &str) -> Result<bool, AccountError> {
        let username = validate_username(username)?;
        if self.find(&username).is_some() {
            return Ok(false);
        }
        if password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }

        self.push(Account {
            username: username.clone(),
            password: password.to_string(),
            is_admin: true,
        })?;

        log::warn!("Created admin account {:?}; change its password", username);
        Ok(true)
    }

    fn push(&mut self, account: Account) -> Result<(), AccountError> {
        self.accounts.push(account);

        if let Err(e) = self.save() {
            self.accounts.pop();
            return Err(e);
        }
        Ok(())
    }

    fn save(&self) -> Result<(), AccountError> {
        replace_file(&self.path, |w| write_accounts(w, &self.accounts)).map_err(|source| {
            log::error!("Failed to write {}: {}", self.path.display(), source);
            AccountError::PersistenceWriteFailure {
                path: self.path.clone(),
                source,
            }
        })
    }
}

fn parse_account(record: &StringRecord) -> Result<Account, String> {
    if record.len() != ACCOUNT_FIELDS {
        return Err(format!(
            "expected {} fields, found {}",
            ACCOUNT_FIELDS,
            record.len()
        ));
    }
    record.deserialize(None).map_err(|e| e.to_string())
}

fn write_accounts<W: Write>(writer: W, accounts: &[Account]) -> csv::Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    for account in accounts {
        wtr.serialize(account)?;
    }
    wtr.flush()?;
    Ok(())
}

fn validate_username(username: &str) -> Result<String, AccountError> {
    let trimmed = username.trim();
    if trimmed.is_empty() || trimmed.contains(',') {
        return Err(AccountError::InvalidUsername(username.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> AccountStore {
        AccountStore::open(dir.path().join("users.txt")).unwrap()
    }

    #[test]
    fn test_register_and_login() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let account = store.register(" alice ", "secret").unwrap();
        assert_eq!(account.username, "alice");
        assert!(!account.is_admin);

        assert_eq!(store.authenticate("alice", "secret").unwrap(), account);
        assert!(matches!(
            store.authenticate("alice", "wrong"),
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            store.authenticate("bob", "secret"),
            Err(AccountError::InvalidCredentials)
        ));

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "alice,secret,0\n");
    }

    #[test]
    fn test_register_validation() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.register("alice", "secret").unwrap();

        assert!(matches!(
            store.register("alice", "other"),
            Err(AccountError::UsernameTaken(_))
        ));
        assert!(matches!(store.register("  ", "pw"), Err(AccountError::InvalidUsername(_))));
        assert!(matches!(store.register("a,b", "pw"), Err(AccountError::InvalidUsername(_))));
        assert!(matches!(store.register("bob", ""), Err(AccountError::EmptyPassword)));
        assert_eq!(store.accounts().len(), 1);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, b"alice,secret,0\n\xff\xfe,pw,0\nbob,pw,0\n").unwrap();

        let store = AccountStore::open(&path).unwrap();

        assert_eq!(store.accounts().len(), 2);
        assert!(store.authenticate("alice", "secret").is_ok());
        assert!(store.authenticate("bob", "pw").is_ok());
    }

    #[test]
    fn test_reload_and_admin_bootstrap() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, "alice,secret,0\nbroken line\nroot,toor,1\nmallory,x,2\n").unwrap();

        let mut store = AccountStore::open(&path).unwrap();
        assert_eq!(store.accounts().len(), 2);
        assert!(store.find("root").unwrap().is_admin);

        assert!(!store.ensure_admin("root", "ignored").unwrap());
        assert!(store.ensure_admin("admin", "admin").unwrap());

        let reloaded = AccountStore::open(&path).unwrap();
        assert!(reloaded.authenticate("admin", "admin").unwrap().is_admin);
        assert_eq!(reloaded.accounts().len(), 3);
    }
}
