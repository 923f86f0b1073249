//! Eligibility policy evaluator.
//!
//! Pure and deterministic: a decision is a function of the subject state,
//! the closure calendar, and the slot. No clock and no I/O in here, so the
//! server and offline edge devices produce identical verdicts from the same
//! inputs.

use crate::domain::slot::{ClosureEntry, MealSlot};
use crate::domain::subject::{MembershipStatus, SubjectState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotApproved,
    PaymentInvalid,
    OnLeave,
    FacilityClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Grant,
    Deny(DenyReason),
}

/// Evaluate a subject against a slot.
///
/// Deny reasons are checked in a fixed order and the first match wins:
/// membership, then payment, then leave, then closure. A suspended member
/// who is also on leave is reported as `NotApproved`, never `OnLeave`.
pub fn evaluate(subject: &SubjectState, closures: &[ClosureEntry], slot: MealSlot) -> Decision {
    if subject.membership != MembershipStatus::Approved {
        return Decision::Deny(DenyReason::NotApproved);
    }
    if !subject.has_verified_payment_for(slot.date) {
        return Decision::Deny(DenyReason::PaymentInvalid);
    }
    if subject.on_leave(slot.date) {
        return Decision::Deny(DenyReason::OnLeave);
    }
    if closures.iter().any(|c| c.applies_to(slot)) {
        return Decision::Deny(DenyReason::FacilityClosed);
    }
    Decision::Grant
}
