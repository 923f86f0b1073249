//! Request extractors.

pub mod staff_session;

pub use staff_session::{AdminSession, StaffSession};
