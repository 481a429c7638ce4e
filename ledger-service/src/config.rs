/// Process configuration, parsed from environment variables (and `.env`,
/// loaded by the caller before [`Config::parse`] runs) the same way the
/// teacher's `DataExtensionWorkerConfiguration` is parsed.
#[derive(Clone, Debug, clap::Parser)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[clap(long, env = "LEDGER_LISTEN_ADDR", default_value = "0.0.0.0")]
    pub listen_addr: std::net::IpAddr,

    /// Port the HTTP server binds to.
    #[clap(long, env = "LEDGER_LISTEN_PORT", default_value = "8080")]
    pub listen_port: u16,

    /// Deployment label included in structured logs (e.g. "production").
    #[clap(long, env = "LEDGER_ENVIRONMENT", default_value = "development")]
    pub environment: String,

    #[clap(long, env = "LEDGER_DB_HOST", default_value = "127.0.0.1")]
    pub db_host: String,
    #[clap(long, env = "LEDGER_DB_PORT", default_value = "5432")]
    pub db_port: u16,
    #[clap(long, env = "LEDGER_DB_NAME", default_value = "ledger")]
    pub db_name: String,
    #[clap(long, env = "LEDGER_DB_USER", default_value = "ledger")]
    pub db_user: String,
    #[clap(long, env = "LEDGER_DB_PASSWORD", default_value = "")]
    pub db_password: String,
    #[clap(long, env = "LEDGER_DB_MAX_CONNECTIONS", default_value = "10")]
    pub db_max_connections: u32,

    /// Enables the optional idempotency cache (C5). Disabled by default so
    /// tests and local runs don't require a Redis instance.
    #[clap(long, env = "LEDGER_CACHE_ENABLED")]
    pub cache_enabled: bool,
    #[clap(long, env = "LEDGER_CACHE_HOST", default_value = "127.0.0.1")]
    pub cache_host: String,
    #[clap(long, env = "LEDGER_CACHE_PORT", default_value = "6379")]
    pub cache_port: u16,
    #[clap(long, env = "LEDGER_CACHE_PASSWORD", default_value = "")]
    pub cache_password: String,
}

impl Config {
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    pub fn redis_url(&self) -> String {
        if self.cache_password.is_empty() {
            format!("redis://{}:{}", self.cache_host, self.cache_port)
        } else {
            format!(
                "redis://:{}@{}:{}",
                self.cache_password, self.cache_host, self.cache_port
            )
        }
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.listen_addr, self.listen_port)
    }
}
