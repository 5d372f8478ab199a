/*
 * Responsibility
 * - Read environment variables once at startup (AZURE_TENANT_ID, token verifier, limits, CORS)
 * - Validate values (missing or invalid => fail to start)
 * - Decision logic never reads the environment; it receives these values by injection
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::services::auth::extractor::DEFAULT_MAX_TOKEN_LENGTH;
use crate::services::authz::{RoleRequirementTable, RoleTableError};
use crate::services::jobs::DEFAULT_JOB_RETENTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    RoleTable(RoleTableError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::RoleTable(e) => write!(f, "invalid role table: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::RoleTable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RoleTableError> for ConfigError {
    fn from(e: RoleTableError) -> Self {
        ConfigError::RoleTable(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierMode {
    /// Claims are decoded without checking the signature.
    Unverified,
    Signature,
}

#[derive(Clone)]
pub struct TokenVerifierConfig {
    pub mode: VerifierMode,
    pub algorithm: Algorithm,
    /// PEM public key, or shared secret for HS* algorithms.
    pub key: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl fmt::Debug for TokenVerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifierConfig")
            .field("mode", &self.mode)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    /// Take the caller origin from `X-Forwarded-For` (a reverse proxy sits in front).
    pub trust_proxy: bool,

    pub expected_tenant_id: String,
    pub verifier: TokenVerifierConfig,
    pub max_token_length: usize,
    pub role_table_path: Option<PathBuf>,

    pub job_submit_timeout: Duration,
    pub job_retention: usize,
    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port: u16 = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if cors_allowed_origins
            .iter()
            .any(|origin| url::Url::parse(origin).is_err())
        {
            return Err(ConfigError::Invalid("CORS_ALLOWED_ORIGINS"));
        }

        let trust_proxy = parse_or(&var, "TRUST_PROXY", false)?;

        let expected_tenant_id =
            var("AZURE_TENANT_ID").ok_or(ConfigError::Missing("AZURE_TENANT_ID"))?;

        let verifier = Self::verifier_from(&var, app_env)?;

        let max_token_length = parse_or(&var, "MAX_TOKEN_LENGTH", DEFAULT_MAX_TOKEN_LENGTH)?;
        if max_token_length == 0 {
            return Err(ConfigError::Invalid("MAX_TOKEN_LENGTH"));
        }

        let role_table_path = var("ROLE_TABLE_PATH").map(PathBuf::from);

        let job_submit_timeout = seconds_or(&var, "JOB_SUBMIT_TIMEOUT_SECONDS", 30)?;
        let job_retention = parse_or(&var, "JOB_RETENTION_LIMIT", DEFAULT_JOB_RETENTION)?;
        if job_retention == 0 {
            return Err(ConfigError::Invalid("JOB_RETENTION_LIMIT"));
        }
        let request_timeout = seconds_or(&var, "REQUEST_TIMEOUT_SECONDS", 30)?;
        let request_body_limit_bytes = parse_or(&var, "REQUEST_BODY_LIMIT_BYTES", 64 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            trust_proxy,
            expected_tenant_id,
            verifier,
            max_token_length,
            role_table_path,
            job_submit_timeout,
            job_retention,
            request_timeout,
            request_body_limit_bytes,
        })
    }

    fn verifier_from(
        var: &impl Fn(&str) -> Option<String>,
        app_env: AppEnv,
    ) -> Result<TokenVerifierConfig, ConfigError> {
        let mode = match var("TOKEN_VERIFIER").map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("unverified") => VerifierMode::Unverified,
            Some("signature") => VerifierMode::Signature,
            Some(_) => return Err(ConfigError::Invalid("TOKEN_VERIFIER")),
            None if app_env.is_production() => VerifierMode::Signature,
            None => VerifierMode::Unverified,
        };

        let algorithm = match var("TOKEN_ALGORITHM") {
            Some(raw) => {
                Algorithm::from_str(&raw).map_err(|_| ConfigError::Invalid("TOKEN_ALGORITHM"))?
            }
            None => Algorithm::RS256,
        };

        let key = var("TOKEN_VERIFY_KEY").map(|k| k.replace("\\n", "\n"));
        if mode == VerifierMode::Signature && key.is_none() {
            return Err(ConfigError::Missing("TOKEN_VERIFY_KEY"));
        }

        Ok(TokenVerifierConfig {
            mode,
            algorithm,
            key,
            issuer: var("TOKEN_ISSUER"),
            audience: var("TOKEN_AUDIENCE"),
        })
    }

    /// Configured role table, or the built-in one when `ROLE_TABLE_PATH` is unset.
    pub fn load_role_table(&self) -> Result<RoleRequirementTable, ConfigError> {
        match &self.role_table_path {
            Some(path) => Ok(RoleRequirementTable::load(Path::new(path))?),
            None => Ok(RoleRequirementTable::builtin()),
        }
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Whole seconds; zero is invalid.
fn seconds_or(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match parse_or(var, key, default)? {
        0 => Err(ConfigError::Invalid(key)),
        secs => Ok(Duration::from_secs(secs)),
    }
}
