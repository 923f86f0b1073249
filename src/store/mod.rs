//! Storage ports for the decision engine.
//!
//! The engine talks to its backing store only through these traits, so the
//! scan path can be exercised against in-memory fakes and the persistence
//! choice stays swappable. Every method returns `StoreError::Unavailable`
//! rather than panicking when the backend is down; the decision service
//! turns that into a retriable `BACKEND_UNAVAILABLE`.

pub mod memory;

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::keyring::KeyVersion;
use crate::domain::policy::{Decision, DenyReason};
use crate::domain::slot::{ClosureEntry, MealSlot};
use crate::domain::subject::{LeaveRange, SubjectId, SubjectState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreError::Unavailable(detail) => write!(f, "store unavailable: {detail}"),
        }
    }
}

impl Error for StoreError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Grant,
    Deny,
}

/// Why a scan ended the way it did. Granted scans carry `Granted`; denial
/// reasons mirror the policy evaluator plus the two pre-policy rejections
/// (unreadable credential, unknown subject).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Granted,
    NotApproved,
    PaymentInvalid,
    OnLeave,
    FacilityClosed,
    InvalidCredential,
    SubjectUnknown,
}

impl From<DenyReason> for ReasonCode {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotApproved => ReasonCode::NotApproved,
            DenyReason::PaymentInvalid => ReasonCode::PaymentInvalid,
            DenyReason::OnLeave => ReasonCode::OnLeave,
            DenyReason::FacilityClosed => ReasonCode::FacilityClosed,
        }
    }
}

/// Split a policy decision into the verdict/reason pair an audit record
/// carries.
pub fn verdict_of(decision: Decision) -> (Verdict, ReasonCode) {
    match decision {
        Decision::Grant => (Verdict::Grant, ReasonCode::Granted),
        Decision::Deny(reason) => (Verdict::Deny, reason.into()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionOrigin {
    /// Decided by the server while the scanner was online.
    Live,
    /// Decided provisionally by an offline edge device against its cached
    /// snapshot, accepted later via replay. Never re-evaluated on the
    /// server.
    Offline,
}

/// One audit record: exactly one is appended per scan, granted or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub record_id: Uuid,
    /// `None` when the credential never yielded a subject (unreadable or
    /// forged token).
    pub subject: Option<SubjectId>,
    /// Key version the presented credential named, when one was readable.
    pub key_version: Option<KeyVersion>,
    pub slot: MealSlot,
    pub verdict: Verdict,
    pub reason: ReasonCode,
    pub decided_at: OffsetDateTime,
    /// Staff session that performed the scan.
    pub session_id: Uuid,
    /// Device label from the staff session.
    pub device: String,
    pub origin: DecisionOrigin,
}

/// Read access to subject eligibility state, plus the one write the engine
/// itself performs (leave submission).
#[async_trait]
pub trait SubjectDirectory: Send + Sync {
    async fn subject_state(&self, id: SubjectId) -> Result<Option<SubjectState>, StoreError>;

    /// Append a leave to a subject. Returns `false` when the subject does
    /// not exist.
    async fn record_leave(&self, id: SubjectId, leave: LeaveRange) -> Result<bool, StoreError>;

    /// Full directory dump for edge snapshots.
    async fn snapshot_all(&self) -> Result<Vec<(SubjectId, SubjectState)>, StoreError>;

    /// Cheap liveness probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ClosureCalendar: Send + Sync {
    /// Closures overlapping the inclusive date range.
    async fn closures_in(&self, from: Date, to: Date) -> Result<Vec<ClosureEntry>, StoreError>;
}

/// Append-only audit log.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one record. There is no update or delete; corrections are
    /// new records.
    async fn append(&self, record: DecisionRecord) -> Result<(), StoreError>;

    /// Records with `decided_at` in the inclusive range, ordered by time.
    /// Ties keep arrival order, so each device's records stay in the order
    /// that device produced them.
    async fn read_range(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<DecisionRecord>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
