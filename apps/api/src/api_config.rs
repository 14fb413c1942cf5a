use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use selecta_application::ServiceConfig;
use selecta_core::AppError;
use selecta_domain::UserId;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub bootstrap_superadmin_id: Option<UserId>,
    pub service: ServiceConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = optional_non_empty_env("DATABASE_URL");
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let bootstrap_superadmin_id = optional_non_empty_env("BOOTSTRAP_SUPERADMIN_ID")
            .map(|value| {
                UserId::parse(value.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid BOOTSTRAP_SUPERADMIN_ID: {error}"))
                })
            })
            .transpose()?;

        let defaults = ServiceConfig::default();
        let service = ServiceConfig {
            store_timeout: duration_env(
                "STORE_TIMEOUT_MS",
                Duration::from_millis,
                defaults.store_timeout,
            )?,
            gate_staleness: duration_env(
                "GATE_STALENESS_MS",
                Duration::from_millis,
                defaults.gate_staleness,
            )?,
            mirror_reload_interval: duration_env(
                "MIRROR_RELOAD_SECONDS",
                Duration::from_secs,
                defaults.mirror_reload_interval,
            )?,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            bootstrap_superadmin_id,
            service,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn duration_env(
    name: &str,
    unit: fn(u64) -> Duration,
    default: Duration,
) -> Result<Duration, AppError> {
    let Some(value) = optional_non_empty_env(name) else {
        return Ok(default);
    };

    parse_duration(name, value.as_str(), unit)
}

fn parse_duration(name: &str, value: &str, unit: fn(u64) -> Duration) -> Result<Duration, AppError> {
    match value.trim().parse::<u64>() {
        Ok(amount) if amount > 0 => Ok(unit(amount)),
        _ => Err(AppError::Validation(format!(
            "{name} must be a positive integer, got '{value}'"
        ))),
    }
}
