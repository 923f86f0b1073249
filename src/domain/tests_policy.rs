//! Example-based tests for the eligibility evaluator.
//!
//! Evaluation contract:
//! - Deny reasons are checked membership → payment → leave → closure,
//!   first match wins.
//! - Only a Verified payment covering the slot date satisfies the payment
//!   check.
//! - Grant requires every check to pass.

use time::macros::date;

use crate::domain::policy::{evaluate, Decision, DenyReason};
use crate::domain::slot::{ClosureEntry, Meal, MealSlot};
use crate::domain::subject::{
    AppliedBy, LeaveRange, MembershipStatus, PaymentCycle, PaymentStatus, SubjectState,
};

fn slot() -> MealSlot {
    MealSlot {
        date: date!(2026 - 03 - 10),
        meal: Meal::Lunch,
    }
}

fn paid_member() -> SubjectState {
    let mut s = SubjectState::new("R. Sharma", MembershipStatus::Approved);
    s.payments.push(PaymentCycle {
        start: date!(2026 - 03 - 01),
        end: date!(2026 - 03 - 31),
        status: PaymentStatus::Verified,
    });
    s
}

fn leave_over_slot() -> LeaveRange {
    LeaveRange {
        from: date!(2026 - 03 - 09),
        to: date!(2026 - 03 - 12),
        applied_by: AppliedBy::Member,
        cutoff_ok: true,
    }
}

fn closure_over_slot() -> ClosureEntry {
    ClosureEntry {
        from: date!(2026 - 03 - 10),
        to: date!(2026 - 03 - 10),
        meals: None,
        reason: Some("festival".to_string()),
    }
}

#[test]
fn clean_subject_is_granted() {
    assert_eq!(evaluate(&paid_member(), &[], slot()), Decision::Grant);
}

#[test]
fn pending_denied_suspended_all_deny_as_not_approved() {
    for membership in [
        MembershipStatus::Pending,
        MembershipStatus::Denied,
        MembershipStatus::Suspended,
    ] {
        let mut s = paid_member();
        s.membership = membership;
        assert_eq!(
            evaluate(&s, &[], slot()),
            Decision::Deny(DenyReason::NotApproved),
            "membership {membership:?}"
        );
    }
}

#[test]
fn missing_payment_denies() {
    let mut s = paid_member();
    s.payments.clear();
    assert_eq!(
        evaluate(&s, &[], slot()),
        Decision::Deny(DenyReason::PaymentInvalid)
    );
}

#[test]
fn unverified_payment_denies() {
    let mut s = paid_member();
    s.payments[0].status = PaymentStatus::Uploaded;
    assert_eq!(
        evaluate(&s, &[], slot()),
        Decision::Deny(DenyReason::PaymentInvalid)
    );
}

#[test]
fn verified_payment_outside_slot_date_denies() {
    let mut s = paid_member();
    s.payments[0] = PaymentCycle {
        start: date!(2026 - 02 - 01),
        end: date!(2026 - 02 - 28),
        status: PaymentStatus::Verified,
    };
    assert_eq!(
        evaluate(&s, &[], slot()),
        Decision::Deny(DenyReason::PaymentInvalid)
    );
}

#[test]
fn leave_covering_slot_denies() {
    let mut s = paid_member();
    s.leaves.push(leave_over_slot());
    assert_eq!(
        evaluate(&s, &[], slot()),
        Decision::Deny(DenyReason::OnLeave)
    );
}

#[test]
fn leave_boundary_days_deny_but_neighbours_grant() {
    let mut s = paid_member();
    s.leaves.push(LeaveRange {
        from: date!(2026 - 03 - 10),
        to: date!(2026 - 03 - 11),
        applied_by: AppliedBy::Member,
        cutoff_ok: true,
    });

    let at = |date| MealSlot {
        date,
        meal: Meal::Lunch,
    };
    assert_eq!(
        evaluate(&s, &[], at(date!(2026 - 03 - 10))),
        Decision::Deny(DenyReason::OnLeave)
    );
    assert_eq!(
        evaluate(&s, &[], at(date!(2026 - 03 - 11))),
        Decision::Deny(DenyReason::OnLeave)
    );
    assert_eq!(evaluate(&s, &[], at(date!(2026 - 03 - 09))), Decision::Grant);
    assert_eq!(evaluate(&s, &[], at(date!(2026 - 03 - 12))), Decision::Grant);
}

#[test]
fn closure_denies_eligible_subject() {
    assert_eq!(
        evaluate(&paid_member(), &[closure_over_slot()], slot()),
        Decision::Deny(DenyReason::FacilityClosed)
    );
}

#[test]
fn closure_for_other_meal_does_not_deny() {
    let closure = ClosureEntry {
        meals: Some(vec![Meal::Dinner]),
        ..closure_over_slot()
    };
    assert_eq!(evaluate(&paid_member(), &[closure], slot()), Decision::Grant);
}

#[test]
fn membership_outranks_every_other_deny() {
    // Suspended member who is also unpaid, on leave, and facing a closure.
    let mut s = SubjectState::new("T. Rao", MembershipStatus::Suspended);
    s.leaves.push(leave_over_slot());
    assert_eq!(
        evaluate(&s, &[closure_over_slot()], slot()),
        Decision::Deny(DenyReason::NotApproved)
    );
}

#[test]
fn payment_outranks_leave_and_closure() {
    let mut s = paid_member();
    s.payments.clear();
    s.leaves.push(leave_over_slot());
    assert_eq!(
        evaluate(&s, &[closure_over_slot()], slot()),
        Decision::Deny(DenyReason::PaymentInvalid)
    );
}

#[test]
fn leave_outranks_closure() {
    let mut s = paid_member();
    s.leaves.push(leave_over_slot());
    assert_eq!(
        evaluate(&s, &[closure_over_slot()], slot()),
        Decision::Deny(DenyReason::OnLeave)
    );
}
