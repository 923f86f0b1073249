//! Property tests for the eligibility evaluator (pure domain, no I/O).
//!
//! Evaluator contract:
//! - Deterministic: same inputs always give the same decision.
//! - Total: every input combination yields exactly one verdict.
//! - Precedence: non-approved membership dominates all other reasons.
//! - Closure order is irrelevant: the calendar is a set, not a sequence.

use proptest::prelude::*;

use crate::domain::policy::{evaluate, Decision, DenyReason};
use crate::domain::subject::{MembershipStatus, PaymentStatus};
use crate::domain::test_gens;

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    #[test]
    fn prop_evaluator_is_deterministic(
        subject in test_gens::subject_state(),
        closures in test_gens::closures(),
        slot in test_gens::slot(),
    ) {
        let first = evaluate(&subject, &closures, slot);
        let second = evaluate(&subject, &closures, slot);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_non_approved_membership_dominates(
        mut subject in test_gens::subject_state(),
        closures in test_gens::closures(),
        slot in test_gens::slot(),
    ) {
        if subject.membership == MembershipStatus::Approved {
            subject.membership = MembershipStatus::Suspended;
        }
        prop_assert_eq!(
            evaluate(&subject, &closures, slot),
            Decision::Deny(DenyReason::NotApproved)
        );
    }

    #[test]
    fn prop_grant_implies_every_check_passed(
        subject in test_gens::subject_state(),
        closures in test_gens::closures(),
        slot in test_gens::slot(),
    ) {
        if evaluate(&subject, &closures, slot) == Decision::Grant {
            prop_assert_eq!(subject.membership, MembershipStatus::Approved);
            prop_assert!(subject.has_verified_payment_for(slot.date));
            prop_assert!(!subject.on_leave(slot.date));
            prop_assert!(!closures.iter().any(|c| c.applies_to(slot)));
        }
    }

    #[test]
    fn prop_closure_order_is_irrelevant(
        subject in test_gens::subject_state(),
        mut closures in test_gens::closures(),
        slot in test_gens::slot(),
    ) {
        let forward = evaluate(&subject, &closures, slot);
        closures.reverse();
        let reversed = evaluate(&subject, &closures, slot);
        prop_assert_eq!(forward, reversed);
    }

    #[test]
    fn prop_denied_payment_never_grants(
        mut subject in test_gens::subject_state(),
        slot in test_gens::slot(),
    ) {
        // Force every cycle to a non-verified status.
        for cycle in &mut subject.payments {
            if cycle.status == PaymentStatus::Verified {
                cycle.status = PaymentStatus::Denied;
            }
        }
        prop_assert_ne!(evaluate(&subject, &[], slot), Decision::Grant);
    }
}
