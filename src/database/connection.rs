//! Connection pool management for SQL Server.

use crate::config::DatabaseConfig;
use crate::error::ServerError;
use tiberius::{AuthMethod, EncryptionLevel};
use tracing::{debug, info};

/// Type alias for the connection pool.
pub type ConnectionPool = bb8::Pool<bb8_tiberius::ConnectionManager>;

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<ConnectionPool, ServerError> {
    info!(
        "Creating connection pool for {}:{} (max: {})",
        config.host, config.port, config.max_connections
    );

    let mut client_config = tiberius::Config::new();
    client_config.host(&config.host);
    client_config.port(config.port);
    if let Some(database) = &config.database {
        client_config.database(database);
    }
    client_config.authentication(AuthMethod::sql_server(&config.username, &config.password));
    client_config.application_name(&config.application_name);
    client_config.encryption(if config.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::NotSupported
    });
    if config.trust_server_certificate {
        client_config.trust_cert();
    }

    let manager = bb8_tiberius::ConnectionManager::build(client_config)
        .map_err(|e| ServerError::connection_with_source("Failed to build connection manager", e))?;

    let pool = bb8::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(config.connection_timeout)
        .build(manager)
        .await
        .map_err(|e| ServerError::connection_with_source("Failed to create connection pool", e))?;

    // Fail fast on bad credentials or an unreachable server.
    {
        let _conn = pool.get().await.map_err(|e| {
            ServerError::connection(format!("Failed to establish initial connection: {}", e))
        })?;
        debug!("Initial connection test successful");
        // Guard dropped here, returning the connection to the pool.
    }

    info!("Connection pool created successfully");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_CONNECTION_TIMEOUT;

    #[test]
    fn test_database_config_shape() {
        let config = DatabaseConfig {
            host: "localhost".to_string(),
            port: 1433,
            database: Some("DentalCare".to_string()),
            username: "sa".to_string(),
            password: "test".to_string(),
            max_connections: 10,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            encrypt: false,
            trust_server_certificate: true,
            application_name: "test".to_string(),
        };
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1433);
    }
}
