use std::sync::Arc;

use time::OffsetDateTime;

use super::security_config::SecurityConfig;
use crate::auth::keyring::Keyring;
use crate::config::engine::EngineConfig;
use crate::services::decision::DecisionService;
use crate::store::memory::{InMemoryAudit, InMemoryClosures, InMemorySubjects};
use crate::store::{AuditLog, ClosureCalendar, SubjectDirectory};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
    /// Engine configuration (cutoffs, timeouts, facility timezone)
    pub config: EngineConfig,
    /// Subject credential key registry
    pub keyring: Arc<Keyring>,
    pub subjects: Arc<dyn SubjectDirectory>,
    pub closures: Arc<dyn ClosureCalendar>,
    pub audit: Arc<dyn AuditLog>,
}

impl AppState {
    /// Create a new AppState over the given backing stores
    pub fn new(
        security: SecurityConfig,
        config: EngineConfig,
        keyring: Arc<Keyring>,
        subjects: Arc<dyn SubjectDirectory>,
        closures: Arc<dyn ClosureCalendar>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            security,
            config,
            keyring,
            subjects,
            closures,
            audit,
        }
    }

    /// Create an AppState backed by in-memory stores, with the first
    /// signing key derived from the security config's master-derived seed.
    pub fn in_memory(security: SecurityConfig, config: EngineConfig) -> Self {
        let keyring = Arc::new(Keyring::new(
            security.subject_key_seed(),
            OffsetDateTime::now_utc(),
        ));
        Self::new(
            security,
            config,
            keyring,
            Arc::new(InMemorySubjects::new()),
            Arc::new(InMemoryClosures::new()),
            Arc::new(InMemoryAudit::new()),
        )
    }

    /// Assemble the scan pipeline over this state's stores.
    pub fn decision_service(&self) -> DecisionService {
        DecisionService::new(
            self.keyring.clone(),
            self.subjects.clone(),
            self.closures.clone(),
            self.audit.clone(),
            &self.config,
        )
    }
}
