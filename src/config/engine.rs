//! Engine configuration.
//!
//! Operational knobs loaded from `MESSGATE_*` environment variables, each
//! with a production-sensible default. The facility runs on local wall
//! time; `facility_offset` converts the server's UTC clock before any
//! date-sensitive rule (slot stamping, leave cutoff) is applied.

use std::env;

use time::format_description::BorrowedFormatItem;
use time::macros::{format_description, offset, time};
use time::{Duration, Time, UtcOffset};

use crate::domain::slot::MealWindows;
use crate::AppError;

const CUTOFF_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");
const OFFSET_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Facility-local cutoff time for next-day leave submissions.
    pub leave_cutoff: Time,
    /// Offset of facility wall time from UTC.
    pub facility_offset: UtcOffset,
    /// How long a superseded key version keeps verifying before sweeps
    /// revoke it.
    pub key_grace: Duration,
    /// Deadline for any single backing-store call on the scan path.
    pub store_timeout: std::time::Duration,
    /// How many days of closures an edge snapshot carries.
    pub snapshot_horizon_days: i64,
    /// Bounded size of an edge device's pending-decision queue.
    pub edge_queue_capacity: usize,
    /// Serving hours, reported to scanner devices.
    pub meal_windows: MealWindows,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            leave_cutoff: time!(23:00),
            facility_offset: offset!(+5:30),
            key_grace: Duration::days(7),
            store_timeout: std::time::Duration::from_millis(2000),
            snapshot_horizon_days: 14,
            edge_queue_capacity: 512,
            meal_windows: MealWindows::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for every unset variable. A set-but-unparseable variable is a
    /// config error; silently ignoring it would run the facility with the
    /// wrong cutoff or timezone.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(raw) = read_var("MESSGATE_LEAVE_CUTOFF") {
            config.leave_cutoff = parse_cutoff(&raw)?;
        }
        if let Some(raw) = read_var("MESSGATE_UTC_OFFSET") {
            config.facility_offset = parse_offset(&raw)?;
        }
        if let Some(raw) = read_var("MESSGATE_KEY_GRACE_DAYS") {
            config.key_grace = Duration::days(parse_int(&raw, "MESSGATE_KEY_GRACE_DAYS")?);
        }
        if let Some(raw) = read_var("MESSGATE_STORE_TIMEOUT_MS") {
            let ms: i64 = parse_int(&raw, "MESSGATE_STORE_TIMEOUT_MS")?;
            config.store_timeout = std::time::Duration::from_millis(ms.max(1) as u64);
        }
        if let Some(raw) = read_var("MESSGATE_SNAPSHOT_HORIZON_DAYS") {
            config.snapshot_horizon_days = parse_int(&raw, "MESSGATE_SNAPSHOT_HORIZON_DAYS")?;
        }
        if let Some(raw) = read_var("MESSGATE_EDGE_QUEUE_CAPACITY") {
            let capacity: i64 = parse_int(&raw, "MESSGATE_EDGE_QUEUE_CAPACITY")?;
            config.edge_queue_capacity = capacity.max(1) as usize;
        }

        Ok(config)
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_cutoff(raw: &str) -> Result<Time, AppError> {
    Time::parse(raw.trim(), CUTOFF_FORMAT)
        .map_err(|e| AppError::config(format!("MESSGATE_LEAVE_CUTOFF {raw:?}: {e}")))
}

fn parse_offset(raw: &str) -> Result<UtcOffset, AppError> {
    UtcOffset::parse(raw.trim(), OFFSET_FORMAT)
        .map_err(|e| AppError::config(format!("MESSGATE_UTC_OFFSET {raw:?}: {e}")))
}

fn parse_int(raw: &str, name: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| AppError::config(format!("{name} {raw:?}: {e}")))
}
