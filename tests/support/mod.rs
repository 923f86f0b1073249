pub mod app_builder;
pub mod auth;
pub mod state;

// Re-export only what current tests actually import
pub use app_builder::create_test_app;
pub use state::build_test_state;
