//! Rate limiting middleware configuration helpers
//!
//! Provides configuration for different rate limit settings:
//! - Login endpoint: 5 requests per minute per IP
//! - Scan endpoint: 240 requests per minute per IP (meal-rush throughput)
//! - General API endpoints: 100 requests per minute per IP
//! - Health check: Exempt from rate limiting

use std::time::Duration;

use actix_extensible_rate_limit::backend::SimpleInputFunctionBuilder;

/// Configuration for login endpoint rate limiting.
/// Limits: 5 requests per 60 seconds per IP address.
pub fn login_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), 5).real_ip_key()
}

/// Configuration for scan endpoint rate limiting.
/// A busy gate peaks around two scans a second; the cap only exists to
/// stop a wedged device from flooding the audit path.
pub fn scan_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), 240).real_ip_key()
}

/// Configuration for general API endpoint rate limiting.
/// Limits: 100 requests per 60 seconds per IP address.
pub fn api_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), 100).real_ip_key()
}
