pub mod auth_ctx;
pub mod client_origin;

pub use auth_ctx::AuthCtx;
pub use client_origin::ClientOrigin;
