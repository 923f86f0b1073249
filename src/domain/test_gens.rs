// Proptest generators for domain types.
// Inputs are valid by construction: ranges are ordered and dates stay inside
// one calendar year so range arithmetic cannot overflow.

use proptest::prelude::*;
use time::{Date, Duration, Month};

use crate::domain::slot::{ClosureEntry, Meal, MealSlot};
use crate::domain::subject::{
    AppliedBy, LeaveRange, MembershipStatus, PaymentCycle, PaymentStatus, SubjectState,
};

pub fn proptest_config() -> ProptestConfig {
    let cases: u32 = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(32)
        .max(1);

    ProptestConfig {
        failure_persistence: None,
        cases,
        ..ProptestConfig::default()
    }
}

pub fn any_date() -> impl Strategy<Value = Date> {
    (1u8..=12u8, 1u8..=28u8).prop_map(|(m, d)| {
        Date::from_calendar_date(2026, Month::try_from(m).unwrap(), d).unwrap()
    })
}

pub fn meal() -> impl Strategy<Value = Meal> {
    prop_oneof![Just(Meal::Breakfast), Just(Meal::Lunch), Just(Meal::Dinner)]
}

pub fn slot() -> impl Strategy<Value = MealSlot> {
    (any_date(), meal()).prop_map(|(date, meal)| MealSlot { date, meal })
}

pub fn membership() -> impl Strategy<Value = MembershipStatus> {
    prop_oneof![
        Just(MembershipStatus::Pending),
        Just(MembershipStatus::Approved),
        Just(MembershipStatus::Denied),
        Just(MembershipStatus::Suspended),
    ]
}

pub fn payment_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::None),
        Just(PaymentStatus::Uploaded),
        Just(PaymentStatus::Verified),
        Just(PaymentStatus::Denied),
    ]
}

pub fn payment_cycle() -> impl Strategy<Value = PaymentCycle> {
    (any_date(), 0i64..60, payment_status()).prop_map(|(start, len, status)| PaymentCycle {
        start,
        end: start.saturating_add(Duration::days(len)),
        status,
    })
}

pub fn leave_range() -> impl Strategy<Value = LeaveRange> {
    (any_date(), 0i64..14, any::<bool>(), any::<bool>()).prop_map(
        |(from, len, by_admin, cutoff_ok)| LeaveRange {
            from,
            to: from.saturating_add(Duration::days(len)),
            applied_by: if by_admin {
                AppliedBy::Admin
            } else {
                AppliedBy::Member
            },
            cutoff_ok,
        },
    )
}

pub fn subject_state() -> impl Strategy<Value = SubjectState> {
    (
        membership(),
        prop::collection::vec(payment_cycle(), 0..4),
        prop::collection::vec(leave_range(), 0..3),
    )
        .prop_map(|(membership, payments, leaves)| SubjectState {
            display_name: "gen".to_string(),
            membership,
            payments,
            leaves,
        })
}

pub fn closure() -> impl Strategy<Value = ClosureEntry> {
    (
        any_date(),
        0i64..7,
        prop::option::of(prop::collection::vec(meal(), 1..=3)),
    )
        .prop_map(|(from, len, meals)| ClosureEntry {
            from,
            to: from.saturating_add(Duration::days(len)),
            meals,
            reason: None,
        })
}

pub fn closures() -> impl Strategy<Value = Vec<ClosureEntry>> {
    prop::collection::vec(closure(), 0..4)
}
