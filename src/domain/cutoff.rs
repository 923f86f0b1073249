//! Day-before cutoff for leave submissions.
//!
//! A leave must be filed before the cutoff time on the day preceding its
//! first day, so the kitchen can plan the next day's headcount. All times
//! here are facility-local; callers convert from UTC before calling in.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use time::{Date, Duration, OffsetDateTime, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffViolation {
    StartsTooSoon { from: Date, earliest: Date },
}

impl Display for CutoffViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CutoffViolation::StartsTooSoon { from, earliest } => {
                write!(f, "leave starting {from} missed the cutoff; earliest permitted start is {earliest}")
            }
        }
    }
}

impl Error for CutoffViolation {}

/// Earliest leave start still submittable at `now_local`.
///
/// Before the cutoff a leave may start tomorrow; at or past the cutoff the
/// day-before window for tomorrow has closed and the earliest start moves
/// to the day after.
pub fn earliest_permitted_start(now_local: OffsetDateTime, cutoff: Time) -> Date {
    let days_ahead = if now_local.time() >= cutoff { 2 } else { 1 };
    now_local.date().saturating_add(Duration::days(days_ahead))
}

/// Check a submission against the cutoff rule.
pub fn check_submission(
    now_local: OffsetDateTime,
    cutoff: Time,
    from: Date,
) -> Result<(), CutoffViolation> {
    let earliest = earliest_permitted_start(now_local, cutoff);
    if from < earliest {
        return Err(CutoffViolation::StartsTooSoon { from, earliest });
    }
    Ok(())
}
