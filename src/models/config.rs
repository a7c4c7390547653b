use serde::Deserialize;

/// Configuration options for the test set admin service.
///
/// Loaded from `config/default.yaml` (optional) and `APP__*` environment
/// variables.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Interface the HTTP server binds to.
    pub address: String,
    pub port: u16,
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Session cookie signing key, at least 64 bytes.
    pub secret: String,
    /// Credentials of the single administrator allowed to sign in.
    pub admin_email: String,
    pub admin_password: String,
}

impl ServerConfig {
    /// Read `config/default.yaml` when present, then apply `APP__*`
    /// environment overrides (e.g. `APP__DATABASE_URL`).
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_url", "app.db")?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
