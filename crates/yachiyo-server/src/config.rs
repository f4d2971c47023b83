use std::net::SocketAddr;
use std::path::PathBuf;

/// Placeholder JWT secrets that MUST NOT be used in production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid port: {value:?}")]
    InvalidPort { var: &'static str, value: String },
    #[error("invalid bind address {0:?}")]
    InvalidAddr(String),
    #[error("YACHIYO_JWT_SECRET is unset or still a placeholder; refusing to start in production")]
    PlaceholderSecret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub production: bool,
    pub cors_origins: Vec<String>,
    pub seed_rooms: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get("YACHIYO_HOST").unwrap_or_else(|| "0.0.0.0".into());

        let (port_var, port_raw) = match get("YACHIYO_PORT") {
            Some(v) => ("YACHIYO_PORT", v),
            None => ("PORT", get("PORT").unwrap_or_else(|| "5000".into())),
        };
        let port: u16 = port_raw.parse().map_err(|_| ConfigError::InvalidPort {
            var: port_var,
            value: port_raw.clone(),
        })?;

        let addr_raw = format!("{}:{}", host, port);
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr(addr_raw.clone()))?;

        let production = get("YACHIYO_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let jwt_secret = get("YACHIYO_JWT_SECRET").unwrap_or_else(|| "dev-secret-change-me".into());
        let placeholder =
            jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str());
        if production && placeholder {
            return Err(ConfigError::PlaceholderSecret);
        }

        let cors_origins = get("YACHIYO_CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            addr,
            db_path: get("YACHIYO_DB_PATH")
                .unwrap_or_else(|| "yachiyo.db".into())
                .into(),
            jwt_secret,
            production,
            cors_origins,
            seed_rooms: get("YACHIYO_SEED_ROOMS").map(PathBuf::from),
        })
    }
}
