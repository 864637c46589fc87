//! Command-line and environment configuration

use clap::Parser;
use std::time::Duration;

/// Port used when HTTP is requested without a usable port number
pub const DEFAULT_PORT: u16 = 3002;

/// Default idle timeout for HTTP sessions, in seconds
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 1800;

/// Dedalus MCP Server - DillyDally activity data for LLM clients
#[derive(Debug, Clone, Parser)]
#[command(name = "dedalus-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Serve over HTTP on this port (selects the HTTP transport)
    #[arg(long, env = "PORT", value_name = "PORT")]
    pub port: Option<String>,

    /// Force the stdio transport even when a port is configured
    #[arg(long)]
    pub stdio: bool,

    /// HTTP bind address (defaults to 0.0.0.0 in production, 127.0.0.1 otherwise)
    #[arg(long, env = "DEDALUS_HOST")]
    pub host: Option<String>,

    /// Deployment environment
    #[arg(long = "env", env = "NODE_ENV", default_value = "development")]
    pub environment: String,

    /// Seconds of inactivity before an HTTP session is reclaimed (0 disables)
    #[arg(long, env = "DEDALUS_SESSION_IDLE_TIMEOUT", default_value_t = DEFAULT_SESSION_IDLE_TIMEOUT_SECS)]
    pub session_idle_timeout: u64,

    /// Convex deployment URL of the DillyDally backend
    #[arg(long, env = "CONVEX_URL")]
    pub backend_url: Option<String>,

    /// Bearer token sent with backend queries
    #[arg(long, env = "CONVEX_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Log filter, e.g. `debug` or `dedalus_mcp=trace` (overrides RUST_LOG)
    #[arg(long, env = "DEDALUS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Selected transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Http(HttpConfig),
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// `None` keeps sessions until they are deleted or the server stops
    pub session_idle_timeout: Option<Duration>,
}

impl HttpConfig {
    /// `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Resolve which transport to run
    ///
    /// A configured, non-blank port selects HTTP unless `--stdio` is given. A
    /// port that does not parse (or is `0`) falls back to [`DEFAULT_PORT`].
    pub fn transport(&self) -> TransportMode {
        let Some(raw_port) = self.port.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            return TransportMode::Stdio;
        };
        if self.stdio {
            return TransportMode::Stdio;
        }

        let port = raw_port
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .unwrap_or(DEFAULT_PORT);

        let host = self.host.clone().unwrap_or_else(|| {
            if self.is_production() {
                "0.0.0.0".to_string()
            } else {
                "127.0.0.1".to_string()
            }
        });

        let session_idle_timeout =
            (self.session_idle_timeout > 0).then(|| Duration::from_secs(self.session_idle_timeout));

        TransportMode::Http(HttpConfig {
            host,
            port,
            session_idle_timeout,
        })
    }

    /// Backend URL, ignoring blank values
    pub fn backend_url(&self) -> Option<&str> {
        self.backend_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
