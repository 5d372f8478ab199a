/// Factory: build the configured `TokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::{TokenVerifierConfig, VerifierMode};
use crate::services::auth::verifier::{
    SignatureVerifyingDecoder, TokenVerifier, UnverifiedDecoder, VerifyError,
};

pub fn build_token_verifier(
    config: &TokenVerifierConfig,
) -> Result<Arc<dyn TokenVerifier>, VerifyError> {
    match config.mode {
        VerifierMode::Unverified => {
            tracing::warn!(
                "token signatures are NOT verified (TOKEN_VERIFIER=unverified); \
                 only run this behind a proxy that validates bearer tokens"
            );
            Ok(Arc::new(UnverifiedDecoder::new()))
        }
        VerifierMode::Signature => {
            let key = config
                .key
                .as_deref()
                .ok_or_else(|| VerifyError::InvalidKey("TOKEN_VERIFY_KEY is not set".into()))?;
            let verifier = SignatureVerifyingDecoder::new(
                config.algorithm,
                key,
                config.issuer.as_deref(),
                config.audience.as_deref(),
            )?;
            Ok(Arc::new(verifier))
        }
    }
}
