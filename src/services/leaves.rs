//! Leave submission.
//!
//! The engine owns the cutoff rule; the membership system owns everything
//! else about leaves. Submissions arrive here from the office console,
//! get checked against the facility-local cutoff, and are appended to the
//! subject's record. An admin may override a missed cutoff, but the
//! resulting leave keeps `cutoff_ok == false` so billing reviews can see
//! the exception.

use std::sync::Arc;

use time::{Date, OffsetDateTime};
use tracing::info;

use crate::config::engine::EngineConfig;
use crate::domain::cutoff;
use crate::domain::subject::{AppliedBy, LeaveRange, SubjectId};
use crate::store::SubjectDirectory;
use crate::AppError;

#[allow(clippy::too_many_arguments)]
pub async fn submit_leave(
    subjects: &Arc<dyn SubjectDirectory>,
    config: &EngineConfig,
    subject_id: SubjectId,
    from: Date,
    to: Date,
    applied_by: AppliedBy,
    override_cutoff: bool,
    now: OffsetDateTime,
) -> Result<LeaveRange, AppError> {
    if from > to {
        return Err(AppError::bad_request(
            "INVALID_LEAVE_RANGE",
            format!("leave range {from} to {to} is inverted"),
        ));
    }

    let now_local = now.to_offset(config.facility_offset);
    let cutoff_ok = match cutoff::check_submission(now_local, config.leave_cutoff, from) {
        Ok(()) => true,
        Err(violation) => {
            // Only an admin may push past the cutoff, and the exception is
            // recorded on the leave itself.
            if override_cutoff && applied_by == AppliedBy::Admin {
                false
            } else {
                return Err(AppError::bad_request(
                    "LEAVE_CUTOFF",
                    violation.to_string(),
                ));
            }
        }
    };

    let leave = LeaveRange {
        from,
        to,
        applied_by,
        cutoff_ok,
    };
    let recorded = super::store_call(
        config.store_timeout,
        "leave append",
        subjects.record_leave(subject_id, leave.clone()),
    )
    .await?;
    if !recorded {
        return Err(AppError::subject_not_found(format!(
            "no subject {subject_id} to record a leave for"
        )));
    }

    info!(
        subject = %subject_id,
        %from,
        %to,
        cutoff_ok,
        applied_by = ?applied_by,
        "leave recorded"
    );
    Ok(leave)
}
