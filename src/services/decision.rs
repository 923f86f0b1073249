//! Access decision service: the scan pipeline.
//!
//! Order of operations for one scan: decode the credential, fetch subject
//! state and closures (each under the store deadline), evaluate policy,
//! append the audit record, answer. Every scan that reaches a verdict
//! appends exactly one record, including scans rejected for an unreadable
//! credential or an unknown subject, which are audited with what little
//! identity they carried. Only two outcomes skip the log: staff-session
//! failures (rejected before this service runs) and store outages (no
//! verdict was reached, and the log may be the thing that is down).

use std::sync::Arc;

use time::{Date, OffsetDateTime, UtcOffset};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::codec::{self, CodecError};
use crate::auth::keyring::{KeyVersion, Keyring};
use crate::auth::session::SessionClaims;
use crate::config::engine::EngineConfig;
use crate::domain::policy;
use crate::domain::slot::{Meal, MealSlot};
use crate::domain::subject::SubjectId;
use crate::store::{
    verdict_of, AuditLog, ClosureCalendar, DecisionOrigin, DecisionRecord, ReasonCode,
    SubjectDirectory, Verdict,
};
use crate::AppError;

#[derive(Clone)]
pub struct DecisionService {
    keyring: Arc<Keyring>,
    subjects: Arc<dyn SubjectDirectory>,
    closures: Arc<dyn ClosureCalendar>,
    audit: Arc<dyn AuditLog>,
    store_timeout: std::time::Duration,
    facility_offset: UtcOffset,
}

impl DecisionService {
    pub fn new(
        keyring: Arc<Keyring>,
        subjects: Arc<dyn SubjectDirectory>,
        closures: Arc<dyn ClosureCalendar>,
        audit: Arc<dyn AuditLog>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            keyring,
            subjects,
            closures,
            audit,
            store_timeout: config.store_timeout,
            facility_offset: config.facility_offset,
        }
    }

    /// Decide one scan and record it.
    ///
    /// `date: None` stamps the slot with today's facility-local date. A
    /// policy denial is a successful call (`Ok` with a Deny record);
    /// errors are reserved for scans that never reached the evaluator.
    pub async fn scan(
        &self,
        session: &SessionClaims,
        credential: &str,
        meal: Meal,
        date: Option<Date>,
        now: OffsetDateTime,
    ) -> Result<DecisionRecord, AppError> {
        let slot = MealSlot {
            date: date.unwrap_or_else(|| now.to_offset(self.facility_offset).date()),
            meal,
        };

        let claims = match codec::decode_credential(credential, &self.keyring) {
            Ok(claims) => claims,
            Err(CodecError::Encode(detail)) => return Err(AppError::internal(detail)),
            Err(err) => {
                let key_version = match err {
                    CodecError::UnknownKeyVersion(v) => Some(v),
                    _ => None,
                };
                warn!(device = %session.dev, error = %err, "scan rejected: unreadable credential");
                self.append_audit(self.rejection(
                    None,
                    key_version,
                    slot,
                    ReasonCode::InvalidCredential,
                    now,
                    session,
                ))
                .await?;
                return Err(err.into());
            }
        };

        let subject_id = claims.sub;
        let state = super::store_call(
            self.store_timeout,
            "subject lookup",
            self.subjects.subject_state(subject_id),
        )
        .await?;
        let Some(state) = state else {
            warn!(subject = %subject_id, device = %session.dev, "scan rejected: unknown subject");
            self.append_audit(self.rejection(
                Some(subject_id),
                Some(claims.v),
                slot,
                ReasonCode::SubjectUnknown,
                now,
                session,
            ))
            .await?;
            return Err(AppError::subject_not_found(format!(
                "no eligibility state for subject {subject_id}"
            )));
        };

        let closures = super::store_call(
            self.store_timeout,
            "closure lookup",
            self.closures.closures_in(slot.date, slot.date),
        )
        .await?;

        let decision = policy::evaluate(&state, &closures, slot);
        let (verdict, reason) = verdict_of(decision);
        let record = DecisionRecord {
            record_id: Uuid::new_v4(),
            subject: Some(subject_id),
            key_version: Some(claims.v),
            slot,
            verdict,
            reason,
            decided_at: now,
            session_id: session.sid,
            device: session.dev.clone(),
            origin: DecisionOrigin::Live,
        };
        self.append_audit(record.clone()).await?;

        info!(
            subject = %subject_id,
            verdict = ?verdict,
            reason = ?reason,
            device = %session.dev,
            "scan decided"
        );
        Ok(record)
    }

    fn rejection(
        &self,
        subject: Option<SubjectId>,
        key_version: Option<KeyVersion>,
        slot: MealSlot,
        reason: ReasonCode,
        now: OffsetDateTime,
        session: &SessionClaims,
    ) -> DecisionRecord {
        DecisionRecord {
            record_id: Uuid::new_v4(),
            subject,
            key_version,
            slot,
            verdict: Verdict::Deny,
            reason,
            decided_at: now,
            session_id: session.sid,
            device: session.dev.clone(),
            origin: DecisionOrigin::Live,
        }
    }

    /// Append a record on its own task. If the request future is dropped
    /// mid-write (client gone, server timeout upstream), the write still
    /// runs to completion: a scan that reached a verdict must leave a
    /// record. A grant whose record cannot be written is converted to an
    /// error, so no one walks through an unlogged gate.
    async fn append_audit(&self, record: DecisionRecord) -> Result<(), AppError> {
        let audit = Arc::clone(&self.audit);
        let handle = tokio::spawn(async move { audit.append(record).await });
        match tokio::time::timeout(self.store_timeout, handle).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(store_err))) => Err(store_err.into()),
            Ok(Err(join_err)) => Err(AppError::internal(format!(
                "audit append task failed: {join_err}"
            ))),
            Err(_) => Err(AppError::backend_unavailable(
                "audit append timed out".to_string(),
            )),
        }
    }
}
