//! Startup configuration
//!
//! Every value can come from a flag or from the environment (including a `.env`
//! file). A non-empty flag wins over the environment. Configuration is resolved
//! once, before the listener is bound, and never changes afterwards.

use clap::Parser;
use std::ffi::OsString;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

use crate::api::wise::WiseClient;
use crate::utils::AccessGate;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Command-line flags. All of them are optional here; required values are
/// enforced after the environment fallback in [`Config::from_cli`].
#[derive(Debug, Default, Parser)]
#[command(name = "wise-balances", version, about = "Re-exposes Wise account balances as JSON and plain text")]
pub struct Cli {
    /// API key for authorization (can also be set via API_KEY environment variable)
    #[arg(long = "api_key")]
    pub api_key: Option<String>,

    /// Profile ID to fetch data for (can also be set via PROFILE_ID environment variable)
    #[arg(long = "profile_id")]
    pub profile_id: Option<String>,

    /// Token callers must pass as ?user_token= (can also be set via USER_TOKEN environment variable)
    #[arg(long = "token")]
    pub token: Option<String>,

    /// Serve without a caller token (can also be set via OPEN_ACCESS=true)
    #[arg(long)]
    pub open: bool,

    /// Address to listen on (can also be set via LISTEN_ADDR environment variable)
    #[arg(long)]
    pub listen: Option<String>,

    /// Wise API base URL (can also be set via WISE_API_BASE environment variable)
    #[arg(long = "api_base")]
    pub api_base: Option<String>,

    /// Log raw upstream responses at debug level; they contain balances (LOG_RAW_BODY=true)
    #[arg(long = "log_raw_body")]
    pub log_raw_body: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} are required either as flags or environment variables")]
    MissingRequired(&'static str),
    #[error("Invalid listen address '{0}': {1}")]
    InvalidListenAddr(String, std::net::AddrParseError),
}

/// Resolved, immutable server configuration
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub profile_id: String,
    pub gate: AccessGate,
    pub listen_addr: SocketAddr,
    pub api_base: String,
    pub log_raw_body: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = match self.gate {
            AccessGate::Open => "open",
            AccessGate::Token(_) => "token",
        };
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("profile_id", &self.profile_id)
            .field("gate", &gate)
            .field("listen_addr", &self.listen_addr)
            .field("api_base", &self.api_base)
            .field("log_raw_body", &self.log_raw_body)
            .finish()
    }
}

/// Long flags that may also be spelled with a single dash (`-api_key=k`)
const LONG_FLAGS: &[&str] = &[
    "api_key",
    "profile_id",
    "token",
    "open",
    "listen",
    "api_base",
    "log_raw_body",
];

/// Rewrite `-name` / `-name=value` to `--name` for our long flags so scripts
/// written for single-dash flag parsers keep working. Stops at `--`.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut past_terminator = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || past_terminator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                past_terminator = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("-{}", text))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

/// First non-empty value of the flag, then the environment
pub fn resolve_value(flag: Option<String>, env: Option<String>) -> Option<String> {
    flag.filter(|v| !v.is_empty())
        .or_else(|| env.filter(|v| !v.is_empty()))
}

fn env_flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Config {
    /// Resolve flags against the process environment
    pub fn load(cli: Cli) -> Result<Self, ConfigError> {
        Self::from_cli(cli, |name| std::env::var(name).ok())
    }

    /// Resolve flags against an arbitrary environment lookup.
    ///
    /// Fails if any required value is empty in both sources; the error names
    /// every required value, not just the missing one.
    pub fn from_cli<F>(cli: Cli, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let open = cli.open || env_flag(lookup("OPEN_ACCESS"));

        let api_key = resolve_value(cli.api_key, lookup("API_KEY"));
        let profile_id = resolve_value(cli.profile_id, lookup("PROFILE_ID"));
        let token = resolve_value(cli.token, lookup("USER_TOKEN"));

        let (api_key, profile_id, gate) = if open {
            match (api_key, profile_id) {
                (Some(k), Some(p)) => (k, p, AccessGate::Open),
                _ => return Err(ConfigError::MissingRequired("API_KEY and PROFILE_ID")),
            }
        } else {
            match (api_key, profile_id, token) {
                (Some(k), Some(p), Some(t)) => (k, p, AccessGate::Token(t)),
                _ => {
                    return Err(ConfigError::MissingRequired(
                        "API_KEY, PROFILE_ID and USER_TOKEN",
                    ))
                }
            }
        };

        let listen = resolve_value(cli.listen, lookup("LISTEN_ADDR"))
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidListenAddr(listen.clone(), e))?;

        let api_base = resolve_value(cli.api_base, lookup("WISE_API_BASE"))
            .unwrap_or_else(|| WiseClient::DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            profile_id,
            gate,
            listen_addr,
            api_base,
            log_raw_body: cli.log_raw_body || env_flag(lookup("LOG_RAW_BODY")),
        })
    }
}
