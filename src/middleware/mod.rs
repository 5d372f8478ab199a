/*
 * Responsibility
 * - middleware public surface
 * - cross-cutting layers applied once in app::build_router
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
