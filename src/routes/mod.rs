use actix_web::web;

pub mod audit;
pub mod credentials;
pub mod edge;
pub mod health;
pub mod keys;
pub mod leaves;
pub mod scan;
pub mod session;

/// Full route table without rate limiting. `main` mounts the same scopes
/// with per-scope limiters; tests use this assembly directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .service(web::scope("/api/session").configure(session::configure_routes))
        .service(web::scope("/api/scan").configure(scan::configure_routes))
        .service(web::scope("/api").configure(api_routes));
}

/// Admin, leave, edge, and audit routes, mounted under `/api`.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(keys::configure_routes)
        .configure(credentials::configure_routes)
        .configure(leaves::configure_routes)
        .configure(edge::configure_routes)
        .configure(audit::configure_routes);
}
