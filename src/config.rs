//! Configuration management for the treatment plan API.
//!
//! Configuration is loaded from environment variables following the
//! 12-factor app pattern. The database pool it describes is created once at
//! startup and injected into the application state; nothing reads connection
//! settings from ambient globals afterwards.

use crate::constants::{
    DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_LISTEN_ADDR, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MSSQL_PORT,
};
use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener configuration
    pub server: ServerConfig,

    /// Database connection configuration
    pub database: DatabaseConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQL Server hostname or IP address
    pub host: String,

    /// SQL Server port (default: 1433)
    pub port: u16,

    /// Database name
    pub database: Option<String>,

    /// SQL Server login
    pub username: String,

    /// SQL Server password
    pub password: String,

    /// Maximum connections in the pool
    pub max_connections: u32,

    /// Timeout for acquiring a pooled connection
    pub connection_timeout: Duration,

    /// Enable TLS encryption
    pub encrypt: bool,

    /// Trust server certificate (for self-signed certs)
    pub trust_server_certificate: bool,

    /// Application name sent to SQL Server
    pub application_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `MSSQL_HOST`: SQL Server hostname
    /// - `MSSQL_USER`: SQL Server username
    /// - `MSSQL_PASSWORD`: SQL Server password
    ///
    /// ## Optional
    /// - `MSSQL_PORT`: Port number (default: 1433)
    /// - `MSSQL_DATABASE`: Database name
    /// - `MSSQL_ENCRYPT`: Enable TLS (default: true)
    /// - `MSSQL_TRUST_CERT`: Trust server certificate (default: false)
    /// - `MSSQL_POOL_MAX`: Maximum pool connections (default: 10)
    /// - `MSSQL_CONNECT_TIMEOUT`: Connection timeout in seconds (default: 30)
    /// - `LISTEN_ADDR`: HTTP bind address (default: 0.0.0.0:3000)
    pub fn from_env() -> Result<Self, ServerError> {
        let host = std::env::var("MSSQL_HOST")
            .map_err(|_| ServerError::config("MSSQL_HOST environment variable is required"))?;

        let username = std::env::var("MSSQL_USER")
            .map_err(|_| ServerError::config("MSSQL_USER environment variable is required"))?;

        let password = std::env::var("MSSQL_PASSWORD")
            .map_err(|_| ServerError::config("MSSQL_PASSWORD environment variable is required"))?;

        let port = std::env::var("MSSQL_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_MSSQL_PORT);

        let database = std::env::var("MSSQL_DATABASE").ok();

        let encrypt = std::env::var("MSSQL_ENCRYPT")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        let trust_server_certificate = std::env::var("MSSQL_TRUST_CERT")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let max_connections = std::env::var("MSSQL_POOL_MAX")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let connection_timeout_secs = std::env::var("MSSQL_CONNECT_TIMEOUT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS);

        let listen_addr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .map_err(|e| ServerError::config(format!("Invalid LISTEN_ADDR: {}", e)))?;

        Ok(Config {
            server: ServerConfig { listen_addr },
            database: DatabaseConfig {
                host,
                port,
                database,
                username,
                password,
                max_connections,
                connection_timeout: Duration::from_secs(connection_timeout_secs),
                encrypt,
                trust_server_certificate,
                application_name: "treatment-plan-api".to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listen_addr_parses() {
        let addr: SocketAddr = DEFAULT_LISTEN_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 3000);
    }
}
