//! Contest registrations and their six-digit access codes, kept in a local
//! JSON file.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ACCESS_CODE_LEN: usize = 6;
pub const REGISTRATION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub round_id: String,
    pub user_id: String,
    pub user_name: String,
    pub payment_id: String,
    pub access_code: String,
    pub registered_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AccessVerdict {
    #[strum(to_string = "Access granted")]
    Granted,
    #[strum(to_string = "Not registered for this contest")]
    NotRegistered,
    #[strum(to_string = "Registration expired")]
    Expired,
    #[strum(to_string = "Invalid access code")]
    InvalidCode,
}

impl AccessVerdict {
    pub fn is_granted(self) -> bool {
        self == AccessVerdict::Granted
    }
}

/// Random code in 100000..=999999.
pub fn generate_access_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Keep digits only, at most six of them.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(ACCESS_CODE_LEN)
        .collect()
}

fn key(round_id: &str, user_id: &str) -> String {
    format!("contest_registration_{}_{}", round_id, user_id)
}

#[derive(Debug, Clone)]
pub struct AccessStore {
    path: PathBuf,
}

impl AccessStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, Registration>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write(&self, entries: &BTreeMap<String, Registration>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }

    /// Register `user_id` for `round_id` and return the new access code.
    /// Registering again replaces the previous code.
    pub fn register(
        &self,
        round_id: &str,
        user_id: &str,
        user_name: &str,
        payment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Registration> {
        let registration = Registration {
            round_id: round_id.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            payment_id: payment_id.to_string(),
            access_code: generate_access_code(),
            registered_at: now,
            expires_at: now + Duration::days(REGISTRATION_TTL_DAYS),
        };
        let mut entries = self.read()?;
        entries.insert(key(round_id, user_id), registration.clone());
        self.write(&entries)?;
        info!(round = round_id, user = user_id, "registered for round");
        Ok(registration)
    }

    pub fn verify(
        &self,
        round_id: &str,
        user_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessVerdict> {
        let mut entries = self.read()?;
        let k = key(round_id, user_id);
        let found = entries
            .get(&k)
            .map(|r| (r.is_expired(now), r.access_code == code));
        let verdict = match found {
            None => AccessVerdict::NotRegistered,
            Some((true, _)) => {
                entries.remove(&k);
                self.write(&entries)?;
                AccessVerdict::Expired
            }
            Some((false, false)) => AccessVerdict::InvalidCode,
            Some((false, true)) => AccessVerdict::Granted,
        };
        debug!(round = round_id, user = user_id, %verdict, "access check");
        Ok(verdict)
    }

    /// Live registration for a round, pruning it if it has expired.
    pub fn registration(
        &self,
        round_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Registration>> {
        let mut entries = self.read()?;
        let k = key(round_id, user_id);
        match entries.remove(&k) {
            Some(r) if r.is_expired(now) => {
                self.write(&entries)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Every live registration of `user_id`; expired ones are removed.
    pub fn registrations_for(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Registration>> {
        let mut entries = self.read()?;
        let before = entries.len();
        entries.retain(|_, r| !(r.user_id == user_id && r.is_expired(now)));
        if entries.len() != before {
            self.write(&entries)?;
        }
        Ok(entries
            .into_values()
            .filter(|r| r.user_id == user_id)
            .collect())
    }
}
