//! In-memory store implementations.
//!
//! The reference backend: a concurrent map for subjects, a small closure
//! calendar, and an append-only audit vector. Also the test double for the
//! whole engine; `set_available(false)` makes any store simulate an outage
//! without touching the code under test.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use time::{Date, OffsetDateTime};

use crate::domain::slot::ClosureEntry;
use crate::domain::subject::{LeaveRange, SubjectId, SubjectState};
use crate::store::{
    AuditLog, ClosureCalendar, DecisionRecord, StoreError, SubjectDirectory,
};

fn unavailable(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} store is offline"))
}

pub struct InMemorySubjects {
    subjects: DashMap<SubjectId, SubjectState>,
    available: AtomicBool,
}

impl InMemorySubjects {
    pub fn new() -> Self {
        Self {
            subjects: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Insert or replace a subject. Not part of the engine's own surface;
    /// membership onboarding lives in the upstream system this directory
    /// mirrors.
    pub fn upsert(&self, id: SubjectId, state: SubjectState) {
        self.subjects.insert(id, state);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(unavailable("subject"))
        }
    }
}

#[async_trait]
impl SubjectDirectory for InMemorySubjects {
    async fn subject_state(&self, id: SubjectId) -> Result<Option<SubjectState>, StoreError> {
        self.check_available()?;
        Ok(self.subjects.get(&id).map(|entry| entry.value().clone()))
    }

    async fn record_leave(&self, id: SubjectId, leave: LeaveRange) -> Result<bool, StoreError> {
        self.check_available()?;
        match self.subjects.get_mut(&id) {
            Some(mut entry) => {
                entry.leaves.push(leave);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn snapshot_all(&self) -> Result<Vec<(SubjectId, SubjectState)>, StoreError> {
        self.check_available()?;
        Ok(self
            .subjects
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

pub struct InMemoryClosures {
    closures: RwLock<Vec<ClosureEntry>>,
    available: AtomicBool,
}

impl InMemoryClosures {
    pub fn new() -> Self {
        Self {
            closures: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn add(&self, closure: ClosureEntry) {
        self.closures.write().push(closure);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClosureCalendar for InMemoryClosures {
    async fn closures_in(&self, from: Date, to: Date) -> Result<Vec<ClosureEntry>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(unavailable("closure"));
        }
        Ok(self
            .closures
            .read()
            .iter()
            .filter(|c| c.from <= to && from <= c.to)
            .cloned()
            .collect())
    }
}

pub struct InMemoryAudit {
    records: Mutex<Vec<DecisionRecord>>,
    available: AtomicBool,
}

impl InMemoryAudit {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Every record in arrival order. Test hook; the API reads ranges.
    pub fn all(&self) -> Vec<DecisionRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl AuditLog for InMemoryAudit {
    async fn append(&self, record: DecisionRecord) -> Result<(), StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(unavailable("audit"));
        }
        self.records.lock().push(record);
        Ok(())
    }

    async fn read_range(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<DecisionRecord>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(unavailable("audit"));
        }
        let mut out: Vec<DecisionRecord> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.decided_at >= from && r.decided_at <= to)
            .cloned()
            .collect();
        // Stable sort: equal timestamps keep arrival order, which preserves
        // per-device ordering.
        out.sort_by_key(|r| r.decided_at);
        Ok(out)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(unavailable("audit"));
        }
        Ok(self.records.lock().len())
    }
}
