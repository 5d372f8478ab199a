/*!
 * Authenticated principal extractor
 *
 * Responsibility:
 * - Hand the Principal authenticated by `middleware::auth::access` to handlers
 * - Handlers never see the bearer token itself
 */

mod core;

pub use self::core::AuthCtx;
