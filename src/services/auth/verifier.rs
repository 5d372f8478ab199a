//! Bearer token decoding.
//!
//! The extractor only needs the claims; how they are obtained is a pluggable
//! [`TokenVerifier`]:
//!
//! - [`UnverifiedDecoder`] decodes the payload WITHOUT checking the signature.
//!   This matches the behavior of the console this service replaces and is a
//!   known security gap: any caller able to craft a JWT can claim any role.
//!   Only use it behind an upstream layer that verifies signatures.
//! - [`SignatureVerifyingDecoder`] verifies the signature against a configured key
//!   (and optionally `iss` / `aud`) before returning claims.
//!
//! Expiry is deliberately NOT validated here. The extractor applies its own
//! inclusive `exp <= now` rule so both decoders behave identically.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// Entra ID access-token claims the gate cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub upn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("jwt decode failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("invalid verification key: {0}")]
    InvalidKey(String),
}

pub trait TokenVerifier: Send + Sync + fmt::Debug {
    /// Decode `token` into claims. Any failure means the token is unusable.
    fn decode(&self, token: &str) -> Result<TokenClaims, VerifyError>;

    /// Whether a successful decode implies a valid issuer signature.
    fn verifies_signature(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Claims-only decoder. Does not verify signatures (see module docs).
///
/// Any header `alg` is accepted, so real RS256 Entra tokens decode the same way
/// as test tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnverifiedDecoder;

impl UnverifiedDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl TokenVerifier for UnverifiedDecoder {
    fn decode(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        let data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)?;
        Ok(data.claims)
    }

    fn verifies_signature(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "unverified"
    }
}

/// Signature-checking decoder backed by a single configured key.
#[derive(Clone)]
pub struct SignatureVerifyingDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SignatureVerifyingDecoder {
    /// `key` is a PEM public key for asymmetric algorithms, or the shared secret
    /// for HMAC algorithms.
    pub fn new(
        algorithm: Algorithm,
        key: &str,
        issuer: Option<&str>,
        audience: Option<&str>,
    ) -> Result<Self, VerifyError> {
        let decoding_key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                if key.is_empty() {
                    return Err(VerifyError::InvalidKey("empty shared secret".into()));
                }
                DecodingKey::from_secret(key.as_bytes())
            }
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(key.as_bytes())
                .map_err(|e| VerifyError::InvalidKey(format!("rsa pem: {e}")))?,
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(key.as_bytes())
                .map_err(|e| VerifyError::InvalidKey(format!("ec pem: {e}")))?,
            Algorithm::EdDSA => DecodingKey::from_ed_pem(key.as_bytes())
                .map_err(|e| VerifyError::InvalidKey(format!("ed25519 pem: {e}")))?,
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

impl fmt::Debug for SignatureVerifyingDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("SignatureVerifyingDecoder")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenVerifier for SignatureVerifyingDecoder {
    fn decode(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    fn verifies_signature(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "signature"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn unverified_decoder_reads_claims_regardless_of_key() {
        let token = sign(
            json!({"upn": "a@contoso.com", "tid": "t1", "roles": ["Helpdesk"], "exp": 1}),
            "whatever",
        );
        let claims = UnverifiedDecoder::new().decode(&token).unwrap();
        assert_eq!(claims.upn.as_deref(), Some("a@contoso.com"));
        assert_eq!(claims.tid.as_deref(), Some("t1"));
        assert_eq!(claims.roles, Some(vec!["Helpdesk".to_string()]));
        // exp is reported, not enforced
        assert_eq!(claims.exp, Some(1));
    }

    fn b64(bytes: &[u8]) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    #[test]
    fn unverified_decoder_reads_rs256_tokens_without_a_key() {
        let header = b64(br#"{"alg":"RS256","typ":"JWT","kid":"entra-key-1"}"#);
        let payload = b64(
            json!({"upn": "a@contoso.com", "tid": "t", "roles": ["Global Administrator"]})
                .to_string()
                .as_bytes(),
        );
        let token = format!("{header}.{payload}.{}", b64(b"not-a-real-signature"));

        let claims = UnverifiedDecoder::new().decode(&token).unwrap();
        assert_eq!(claims.upn.as_deref(), Some("a@contoso.com"));
        assert_eq!(claims.roles, Some(vec!["Global Administrator".to_string()]));
    }

    #[test]
    fn unverified_decoder_rejects_garbage() {
        let decoder = UnverifiedDecoder::new();
        assert!(decoder.decode("not-a-jwt").is_err());
        assert!(decoder.decode("a.b.c").is_err());
        assert!(!decoder.verifies_signature());
    }

    #[test]
    fn unverified_decoder_accepts_missing_optional_claims() {
        let token = sign(json!({"sub": "x"}), "k");
        let claims = UnverifiedDecoder::new().decode(&token).unwrap();
        assert!(claims.upn.is_none());
        assert!(claims.exp.is_none());
    }

    #[test]
    fn signature_decoder_checks_key() {
        let decoder =
            SignatureVerifyingDecoder::new(Algorithm::HS256, "right-secret", None, None).unwrap();
        let good = sign(json!({"upn": "a@contoso.com"}), "right-secret");
        let bad = sign(json!({"upn": "a@contoso.com"}), "wrong-secret");

        assert!(decoder.decode(&good).is_ok());
        assert!(decoder.decode(&bad).is_err());
        assert!(decoder.verifies_signature());
    }

    #[test]
    fn signature_decoder_checks_issuer_and_audience_when_configured() {
        let decoder = SignatureVerifyingDecoder::new(
            Algorithm::HS256,
            "s",
            Some("https://sts.windows.net/t1/"),
            Some("api://runbook-gate"),
        )
        .unwrap();

        let ok = sign(
            json!({"upn": "a", "iss": "https://sts.windows.net/t1/", "aud": "api://runbook-gate"}),
            "s",
        );
        let wrong_aud = sign(
            json!({"upn": "a", "iss": "https://sts.windows.net/t1/", "aud": "api://other"}),
            "s",
        );
        assert!(decoder.decode(&ok).is_ok());
        assert!(decoder.decode(&wrong_aud).is_err());
    }

    #[test]
    fn signature_decoder_rejects_bad_key_material() {
        assert!(matches!(
            SignatureVerifyingDecoder::new(Algorithm::RS256, "not a pem", None, None),
            Err(VerifyError::InvalidKey(_))
        ));
        assert!(matches!(
            SignatureVerifyingDecoder::new(Algorithm::HS256, "", None, None),
            Err(VerifyError::InvalidKey(_))
        ));
    }
}
