//! Versioned registry of subject-credential signing keys.
//!
//! The whole table lives behind one [`arc_swap::ArcSwap`], so a verifier
//! always reads a complete, consistent snapshot: rotation and revocation
//! swap in a new table and can never be observed half-applied. Tokens
//! signed under an older, unrevoked version keep verifying after a
//! rotation until that version is revoked or swept.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

pub type KeyVersion = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyringError {
    UnknownVersion(KeyVersion),
    /// The current version must be rotated away before it can be revoked;
    /// otherwise no new credential could ever be issued.
    RevokeCurrent(KeyVersion),
}

impl Display for KeyringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            KeyringError::UnknownVersion(v) => write!(f, "unknown key version {v}"),
            KeyringError::RevokeCurrent(v) => {
                write!(f, "key version {v} is current and cannot be revoked")
            }
        }
    }
}

impl Error for KeyringError {}

#[derive(Debug, Clone)]
struct SigningKey {
    secret: [u8; 32],
    added_at: OffsetDateTime,
    /// Set when a rotation replaces this version as current. The grace
    /// window for sweeping counts from this instant.
    superseded_at: Option<OffsetDateTime>,
}

/// Metadata for one version, safe to expose over the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    pub version: KeyVersion,
    pub added_at: OffsetDateTime,
    pub current: bool,
    pub revoked: bool,
}

#[derive(Clone)]
struct KeyTable {
    current: KeyVersion,
    keys: BTreeMap<KeyVersion, SigningKey>,
    revoked: BTreeSet<KeyVersion>,
}

pub struct Keyring {
    table: ArcSwap<KeyTable>,
}

impl Keyring {
    /// Start a registry at version 1 with the given secret.
    pub fn new(initial_secret: [u8; 32], now: OffsetDateTime) -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(
            1,
            SigningKey {
                secret: initial_secret,
                added_at: now,
                superseded_at: None,
            },
        );
        Self {
            table: ArcSwap::from_pointee(KeyTable {
                current: 1,
                keys,
                revoked: BTreeSet::new(),
            }),
        }
    }

    pub fn current_version(&self) -> KeyVersion {
        self.table.load().current
    }

    /// Secret for a version, or `None` when the version was never issued
    /// or has been revoked. Revoked versions are indistinguishable from
    /// unknown ones on this path.
    pub fn secret_for(&self, version: KeyVersion) -> Option<[u8; 32]> {
        let table = self.table.load();
        if table.revoked.contains(&version) {
            return None;
        }
        table.keys.get(&version).map(|k| k.secret)
    }

    /// Install a new secret as the next version and make it current.
    /// Returns the version assigned to it.
    pub fn rotate(&self, new_secret: [u8; 32], now: OffsetDateTime) -> KeyVersion {
        let mut assigned = 0;
        self.table.rcu(|table| {
            let mut next = KeyTable::clone(table);
            if let Some(old) = next.keys.get_mut(&next.current) {
                old.superseded_at = Some(now);
            }
            assigned = next.current + 1;
            next.keys.insert(
                assigned,
                SigningKey {
                    secret: new_secret,
                    added_at: now,
                    superseded_at: None,
                },
            );
            next.current = assigned;
            Arc::new(next)
        });
        assigned
    }

    /// Revoke a non-current version. Credentials signed under it fail from
    /// the moment the swap lands.
    pub fn revoke(&self, version: KeyVersion) -> Result<(), KeyringError> {
        let mut outcome = Ok(());
        self.table.rcu(|table| {
            let mut next = KeyTable::clone(table);
            outcome = if !next.keys.contains_key(&version) {
                Err(KeyringError::UnknownVersion(version))
            } else if version == next.current {
                Err(KeyringError::RevokeCurrent(version))
            } else {
                next.revoked.insert(version);
                Ok(())
            };
            Arc::new(next)
        });
        outcome
    }

    /// Revoke every version that was superseded more than `grace` ago.
    /// Returns the versions revoked by this sweep.
    pub fn sweep(&self, now: OffsetDateTime, grace: Duration) -> Vec<KeyVersion> {
        let mut swept = Vec::new();
        self.table.rcu(|table| {
            let mut next = KeyTable::clone(table);
            swept.clear();
            for (version, key) in &next.keys {
                if next.revoked.contains(version) {
                    continue;
                }
                if let Some(superseded_at) = key.superseded_at {
                    if superseded_at + grace <= now {
                        swept.push(*version);
                    }
                }
            }
            next.revoked.extend(swept.iter().copied());
            Arc::new(next)
        });
        swept
    }

    /// Revoked versions in ascending order. Shipped to edge devices so
    /// they can reject stale credentials without holding any secrets.
    pub fn revoked_versions(&self) -> Vec<KeyVersion> {
        self.table.load().revoked.iter().copied().collect()
    }

    pub fn list(&self) -> Vec<KeyInfo> {
        let table = self.table.load();
        table
            .keys
            .iter()
            .map(|(version, key)| KeyInfo {
                version: *version,
                added_at: key.added_at,
                current: *version == table.current,
                revoked: table.revoked.contains(version),
            })
            .collect()
    }
}
