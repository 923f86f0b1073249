//! Subject (member) eligibility state.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

pub type SubjectId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Pending,
    Approved,
    Denied,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    None,
    Uploaded,
    Verified,
    Denied,
}

/// One billing cycle with its payment state. Dates are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCycle {
    pub start: Date,
    pub end: Date,
    pub status: PaymentStatus,
}

impl PaymentCycle {
    pub fn covers(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliedBy {
    Member,
    Admin,
}

/// An approved absence range, inclusive on both ends.
///
/// `cutoff_ok` records whether the submission met the day-before cutoff;
/// admin overrides are stored with `cutoff_ok == false` so the exception
/// stays visible in billing reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRange {
    pub from: Date,
    pub to: Date,
    pub applied_by: AppliedBy,
    pub cutoff_ok: bool,
}

impl LeaveRange {
    pub fn covers(&self, date: Date) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Everything the policy evaluator needs to know about one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectState {
    pub display_name: String,
    pub membership: MembershipStatus,
    pub payments: Vec<PaymentCycle>,
    pub leaves: Vec<LeaveRange>,
}

impl SubjectState {
    /// A subject with no payment history and no leaves.
    pub fn new(display_name: impl Into<String>, membership: MembershipStatus) -> Self {
        Self {
            display_name: display_name.into(),
            membership,
            payments: Vec::new(),
            leaves: Vec::new(),
        }
    }

    pub fn has_verified_payment_for(&self, date: Date) -> bool {
        self.payments
            .iter()
            .any(|c| c.status == PaymentStatus::Verified && c.covers(date))
    }

    pub fn on_leave(&self, date: Date) -> bool {
        self.leaves.iter().any(|l| l.covers(date))
    }
}
