pub mod extractor;
pub mod factory;
pub mod principal;
pub mod verifier;

pub use extractor::ClaimsExtractor;
pub use factory::build_token_verifier;
pub use principal::Principal;
pub use verifier::{SignatureVerifyingDecoder, TokenVerifier, UnverifiedDecoder, VerifyError};
