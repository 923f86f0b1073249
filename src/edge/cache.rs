//! Offline edge cache.
//!
//! A scanner that loses connectivity keeps working: it pulls a snapshot
//! while online, then decides scans locally against it and queues every
//! decision for replay. Snapshots carry no signing secrets, so the edge
//! can only check a credential's structure and key-version revocation;
//! its verdicts are provisional by construction and are appended to the
//! server audit log verbatim on replay, never re-evaluated.
//!
//! Default posture on any doubt is deny: no snapshot, a full queue, and an
//! unparseable credential all refuse entry.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::auth::codec;
use crate::auth::keyring::KeyVersion;
use crate::auth::session::SessionClaims;
use crate::domain::policy;
use crate::domain::slot::{ClosureEntry, Meal, MealSlot};
use crate::domain::subject::{SubjectId, SubjectState};
use crate::store::{verdict_of, DecisionOrigin, DecisionRecord, ReasonCode, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeError {
    /// No snapshot installed yet; the device has never synced.
    NoSnapshot,
    /// Pending queue is at capacity; sync before deciding more scans.
    QueueFull,
}

impl Display for EdgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EdgeError::NoSnapshot => write!(f, "no snapshot installed"),
            EdgeError::QueueFull => write!(f, "pending decision queue is full"),
        }
    }
}

impl Error for EdgeError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSubject {
    pub id: SubjectId,
    pub state: SubjectState,
}

/// Wire form of a snapshot pull. Everything an edge needs and nothing it
/// must not hold: key versions and revocations travel, key material never.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub taken_at: OffsetDateTime,
    pub current_key_version: KeyVersion,
    pub revoked_key_versions: Vec<KeyVersion>,
    pub subjects: Vec<EdgeSubject>,
    pub closures: Vec<ClosureEntry>,
}

struct IndexedSnapshot {
    taken_at: OffsetDateTime,
    revoked: BTreeSet<KeyVersion>,
    subjects: HashMap<SubjectId, SubjectState>,
    closures: Vec<ClosureEntry>,
}

impl From<EdgeSnapshot> for IndexedSnapshot {
    fn from(snapshot: EdgeSnapshot) -> Self {
        Self {
            taken_at: snapshot.taken_at,
            revoked: snapshot.revoked_key_versions.into_iter().collect(),
            subjects: snapshot
                .subjects
                .into_iter()
                .map(|s| (s.id, s.state))
                .collect(),
            closures: snapshot.closures,
        }
    }
}

pub struct EdgeCache {
    snapshot: ArcSwapOption<IndexedSnapshot>,
    queue: Mutex<VecDeque<DecisionRecord>>,
    capacity: usize,
    facility_offset: UtcOffset,
}

impl EdgeCache {
    pub fn new(capacity: usize, facility_offset: UtcOffset) -> Self {
        Self {
            snapshot: ArcSwapOption::const_empty(),
            queue: Mutex::new(VecDeque::new()),
            capacity,
            facility_offset,
        }
    }

    /// Install a fresh snapshot. Atomic: a decide running concurrently
    /// sees either the old or the new snapshot, never a blend.
    pub fn install(&self, snapshot: EdgeSnapshot) {
        self.snapshot
            .store(Some(Arc::new(IndexedSnapshot::from(snapshot))));
    }

    pub fn snapshot_taken_at(&self) -> Option<OffsetDateTime> {
        self.snapshot.load_full().map(|s| s.taken_at)
    }

    /// Decide one scan against the cached state and queue the record.
    ///
    /// Mirrors the server pipeline with one deliberate difference: the
    /// credential's MAC cannot be checked here, so a structurally valid
    /// token is taken at its word about subject and key version.
    pub fn decide(
        &self,
        session: &SessionClaims,
        credential: &str,
        meal: Meal,
        date: Option<Date>,
        now: OffsetDateTime,
    ) -> Result<DecisionRecord, EdgeError> {
        let snapshot = self.snapshot.load_full().ok_or(EdgeError::NoSnapshot)?;
        let slot = MealSlot {
            date: date.unwrap_or_else(|| now.to_offset(self.facility_offset).date()),
            meal,
        };

        let (subject, key_version, verdict, reason) =
            match codec::decode_claims_unverified(credential) {
                Err(_) => (None, None, Verdict::Deny, ReasonCode::InvalidCredential),
                Ok(claims) if snapshot.revoked.contains(&claims.v) => (
                    Some(claims.sub),
                    Some(claims.v),
                    Verdict::Deny,
                    ReasonCode::InvalidCredential,
                ),
                Ok(claims) => match snapshot.subjects.get(&claims.sub) {
                    None => (
                        Some(claims.sub),
                        Some(claims.v),
                        Verdict::Deny,
                        ReasonCode::SubjectUnknown,
                    ),
                    Some(state) => {
                        let decision = policy::evaluate(state, &snapshot.closures, slot);
                        let (verdict, reason) = verdict_of(decision);
                        (Some(claims.sub), Some(claims.v), verdict, reason)
                    }
                },
            };

        let record = DecisionRecord {
            record_id: Uuid::new_v4(),
            subject,
            key_version,
            slot,
            verdict,
            reason,
            decided_at: now,
            session_id: session.sid,
            device: session.dev.clone(),
            origin: DecisionOrigin::Offline,
        };

        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            // No room to record it, no entry. The device must sync.
            return Err(EdgeError::QueueFull);
        }
        queue.push_back(record.clone());
        Ok(record)
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Take every queued record, oldest first. The caller replays them to
    /// the server; on a failed replay, `restore` puts them back.
    pub fn drain(&self) -> Vec<DecisionRecord> {
        self.queue.lock().drain(..).collect()
    }

    /// Reinstate records at the front of the queue in their given order.
    pub fn restore(&self, records: Vec<DecisionRecord>) {
        let mut queue = self.queue.lock();
        for record in records.into_iter().rev() {
            queue.push_front(record);
        }
    }
}
