//! Offline operation for scanner devices.

pub mod cache;

pub use cache::{EdgeCache, EdgeError, EdgeSnapshot, EdgeSubject};
