use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use crate::instance::SortOrder;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub instance: InstanceConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            instance: InstanceConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const HOST_VAR: &'static str = "BOXBOUND_API_HOST";
    const PORT_VAR: &'static str = "BOXBOUND_API_PORT";
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;

    fn from_env() -> Self {
        Self::from_raw(env_string(Self::HOST_VAR), env_string(Self::PORT_VAR))
    }

    fn from_raw(host: Option<String>, port: Option<String>) -> Self {
        let host_value = host.unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = parse_or_default(
            Self::PORT_VAR,
            port,
            Self::DEFAULT_PORT,
            |value| *value != 0,
            "must not be 0",
        );

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Defaults applied to every instance the service builds.
#[derive(Clone, Debug)]
pub struct InstanceConfig {
    unoriented: bool,
    ordering: SortOrder,
    sweep_max_samples: usize,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            unoriented: false,
            ordering: SortOrder::default(),
            sweep_max_samples: Self::DEFAULT_SWEEP_MAX_SAMPLES,
        }
    }
}

impl InstanceConfig {
    const UNORIENTED_VAR: &'static str = "BOXBOUND_UNORIENTED";
    const ORDERING_VAR: &'static str = "BOXBOUND_ORDERING";
    const SWEEP_MAX_SAMPLES_VAR: &'static str = "BOXBOUND_SWEEP_MAX_SAMPLES";
    pub const DEFAULT_SWEEP_MAX_SAMPLES: usize = 512;

    fn from_env() -> Self {
        let unoriented = env_string(Self::UNORIENTED_VAR)
            .and_then(|raw| parse_bool(&raw, Self::UNORIENTED_VAR))
            .unwrap_or(false);

        let ordering_code = parse_or_default(
            Self::ORDERING_VAR,
            env_string(Self::ORDERING_VAR),
            SortOrder::default().code(),
            |code| SortOrder::from_code(*code).is_some(),
            "must be an ordering code between 0 and 8",
        );
        let ordering = SortOrder::from_code(ordering_code).unwrap_or_default();
        if ordering != SortOrder::default() {
            println!("💡 Instances are sorted by {:?} before analysis.", ordering);
        }

        let sweep_max_samples = parse_or_default(
            Self::SWEEP_MAX_SAMPLES_VAR,
            env_string(Self::SWEEP_MAX_SAMPLES_VAR),
            Self::DEFAULT_SWEEP_MAX_SAMPLES,
            |value| *value > 0,
            "must be greater than 0",
        );

        Self {
            unoriented,
            ordering,
            sweep_max_samples,
        }
    }

    /// Orientation policy for requests that do not choose one.
    pub fn unoriented(&self) -> bool {
        self.unoriented
    }

    /// Ordering for requests that do not choose one.
    pub fn ordering(&self) -> SortOrder {
        self.ordering
    }

    /// Upper limit on samples per bound sweep.
    pub fn sweep_max_samples(&self) -> usize {
        self.sweep_max_samples
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            eprintln!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

/// Parses an optional raw value, warning and falling back to `default` when it is
/// malformed or rejected by `validator`.
fn parse_or_default<T>(
    var_name: &str,
    raw: Option<String>,
    default: T,
    validator: impl Fn(&T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if validator(&value) => value,
        Ok(_) => {
            eprintln!(
                "⚠️ {} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            eprintln!(
                "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}
