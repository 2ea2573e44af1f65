use crate::query::TableNamePolicy;
use crate::schema::FaultIsolationMode;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Database login handed to the connection provider.
#[derive(Debug, Clone)]
pub struct DatabaseCredentials {
    pub user: String,
    pub password: String,
    /// `host:port/dbname`
    pub connect_string: String,
}

impl DatabaseCredentials {
    pub fn to_url(&self) -> String {
        // URL-encode password to handle special characters
        let encoded_password = urlencoding::encode(&self.password);
        format!(
            "postgres://{}:{}@{}",
            self.user, encoded_password, self.connect_string
        )
    }

    /// Database name part of the connect string, used in log and error messages.
    pub fn database_name(&self) -> &str {
        self.connect_string
            .rsplit_once('/')
            .map(|(_, db)| db)
            .unwrap_or(&self.connect_string)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_name: String,
    pub gateway_host: String,
    pub gateway_port: u16,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub statement_timeout: Option<Duration>,
    pub fault_isolation: FaultIsolationMode,
    pub table_name_policy: TableNamePolicy,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let credentials = DatabaseCredentials {
            user: env::var("DB_USER").unwrap_or_else(|_| "rideshare".to_string()),
            password: env::var("DB_PASSWORD").unwrap_or_else(|_| "password".to_string()),
            connect_string: env::var("DB_CONNECTION_STRING")
                .unwrap_or_else(|_| "localhost:5432/rideshare".to_string()),
        };

        // DATABASE_URL wins over the individual fields
        let (database_url, database_name) = match env::var("DATABASE_URL") {
            Ok(url) => {
                let name = database_name_from_url(&url).to_string();
                (url, name)
            }
            Err(_) => (
                credentials.to_url(),
                credentials.database_name().to_string(),
            ),
        };

        let gateway_host = env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let gateway_port = env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse()
            .unwrap_or(4000);

        let max_connections = env::var("MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let connect_timeout_secs: u64 = env::var("CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let statement_timeout = env::var("STATEMENT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis);

        let fault_isolation = match env::var("FAULT_ISOLATION") {
            Ok(v) => v.parse::<FaultIsolationMode>().map_err(|e: String| anyhow::anyhow!(e))?,
            Err(_) => FaultIsolationMode::default(),
        };

        let table_name_policy = match env::var("TABLE_NAME_POLICY") {
            Ok(v) => v.parse::<TableNamePolicy>().map_err(|e: String| anyhow::anyhow!(e))?,
            Err(_) => TableNamePolicy::default(),
        };

        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"));

        Ok(Config {
            database_url,
            database_name,
            gateway_host,
            gateway_port,
            max_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            statement_timeout,
            fault_isolation,
            table_name_policy,
            log_dir,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.gateway_host, self.gateway_port);
        addr.parse().map_err(|e| anyhow::anyhow!("Invalid socket address: {}", e))
    }
}

/// Database a `postgres://` URL connects to.
fn database_name_from_url(url: &str) -> &str {
    let without_query = url.split_once('?').map(|(head, _)| head).unwrap_or(url);
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);

    let (authority, db) = after_scheme.split_once('/').unwrap_or((after_scheme, ""));
    if !db.is_empty() {
        return db;
    }

    // the driver falls back to the user name
    match authority.split_once('@') {
        Some((userinfo, _)) => userinfo.split(':').next().unwrap_or(userinfo),
        None => "postgres",
    }
}
