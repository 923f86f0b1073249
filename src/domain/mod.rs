//! Domain layer: pure eligibility types and rules.

pub mod cutoff;
pub mod policy;
pub mod slot;
pub mod subject;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_policy;
#[cfg(test)]
mod tests_props_policy;

// Re-exports for ergonomics
pub use cutoff::{check_submission, earliest_permitted_start, CutoffViolation};
pub use policy::{evaluate, Decision, DenyReason};
pub use slot::{ClosureEntry, Meal, MealSlot, MealWindow, MealWindows};
pub use subject::{
    AppliedBy, LeaveRange, MembershipStatus, PaymentCycle, PaymentStatus, SubjectId, SubjectState,
};
