use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Upper bound for `JWT_EXPIRY_MINUTES` (one year).
pub const MAX_JWT_EXPIRY_MINUTES: i64 = 365 * 24 * 60;

/// Signing secret used when `JWT_SECRET` is unset outside production.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

pub const DEFAULT_HF_API_URL: &str =
    "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub jwt: JwtConfig,
    pub inference: InferenceConfig,
    pub rate_limit: RateLimitConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub expiry_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Bearer credential for the text-generation API. Chat requests fail
    /// with a configuration error while this is unset.
    pub api_key: Option<Secret<String>>,
    pub api_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
    /// Key rate limiting on `x-forwarded-for` instead of the peer address.
    /// Enable only behind a proxy that sets the header itself.
    pub trust_proxy_headers: bool,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = GatewayConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("chat-gateway"), false)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), false)?,
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            jwt: JwtConfig {
                secret: Secret::new(get_env("JWT_SECRET", Some(DEV_JWT_SECRET), is_prod)?),
                expiry_minutes: parse_env("JWT_EXPIRY_MINUTES", "120")?,
            },
            inference: InferenceConfig {
                api_key: env::var("HF_API_KEY")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(Secret::new),
                api_url: get_env("HF_API_URL", Some(DEFAULT_HF_API_URL), false)?,
                timeout_seconds: parse_env("INFERENCE_TIMEOUT_SECONDS", "30")?,
            },
            rate_limit: RateLimitConfig {
                requests: parse_env("RATE_LIMIT_REQUESTS", "30")?,
                window_seconds: parse_env("RATE_LIMIT_WINDOW_SECONDS", "60")?,
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("*"), false)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                trust_proxy_headers: parse_env("TRUST_PROXY_HEADERS", "false")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        let secret = self.jwt.secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must not be empty"
            )));
        }

        if self.jwt.expiry_minutes <= 0 || self.jwt.expiry_minutes > MAX_JWT_EXPIRY_MINUTES {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_EXPIRY_MINUTES must be between 1 and {}",
                MAX_JWT_EXPIRY_MINUTES
            )));
        }

        if self.rate_limit.requests == 0 || self.rate_limit.window_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "RATE_LIMIT_REQUESTS and RATE_LIMIT_WINDOW_SECONDS must be positive"
            )));
        }

        if self.inference.timeout_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "INFERENCE_TIMEOUT_SECONDS must be positive"
            )));
        }

        if self.environment == Environment::Prod {
            if secret == DEV_JWT_SECRET {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET must be changed from the development default in production"
                )));
            }

            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }
        }

        Ok(())
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt.secret.expose_secret() == DEV_JWT_SECRET
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), false)?
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("{} is invalid: {}", key, e)))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
