//! Test state with direct handles to the concrete in-memory stores, so
//! suites can seed subjects and closures and read the audit log without
//! going through the API.

use std::sync::Arc;

use messgate::auth::keyring::Keyring;
use messgate::config::engine::EngineConfig;
use messgate::domain::subject::{
    MembershipStatus, PaymentCycle, PaymentStatus, SubjectId, SubjectState,
};
use messgate::state::app_state::AppState;
use messgate::state::security_config::SecurityConfig;
use messgate::store::memory::{InMemoryAudit, InMemoryClosures, InMemorySubjects};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub struct TestState {
    pub app: AppState,
    pub subjects: Arc<InMemorySubjects>,
    pub closures: Arc<InMemoryClosures>,
    pub audit: Arc<InMemoryAudit>,
}

pub fn build_test_state() -> TestState {
    build_test_state_with(EngineConfig::default())
}

pub fn build_test_state_with(config: EngineConfig) -> TestState {
    let security = SecurityConfig::default();
    let keyring = Arc::new(Keyring::new(
        security.subject_key_seed(),
        OffsetDateTime::now_utc(),
    ));
    let subjects = Arc::new(InMemorySubjects::new());
    let closures = Arc::new(InMemoryClosures::new());
    let audit = Arc::new(InMemoryAudit::new());
    let app = AppState::new(
        security,
        config,
        keyring,
        subjects.clone(),
        closures.clone(),
        audit.clone(),
    );
    TestState {
        app,
        subjects,
        closures,
        audit,
    }
}

/// Seed an approved member whose verified payment covers the given date.
pub fn seed_paid_member(state: &TestState, name: &str, covering: Date) -> SubjectId {
    let mut subject = SubjectState::new(name, MembershipStatus::Approved);
    subject.payments.push(PaymentCycle {
        start: covering.replace_day(1).expect("first of month is valid"),
        end: covering
            .replace_day(covering.month().length(covering.year()))
            .expect("last of month is valid"),
        status: PaymentStatus::Verified,
    });
    let id = Uuid::new_v4();
    state.subjects.upsert(id, subject);
    id
}
