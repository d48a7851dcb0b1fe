use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = DbConfig {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://users.db".into()),
            max_connections: env_or("DB_MAX_CONNECTIONS", 5),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 5),
            busy_timeout_secs: env_or("DB_BUSY_TIMEOUT_SECS", 5),
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            db,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_missing_or_garbage() {
        assert_eq!(parse_or::<u16>(None, 8080), 8080);
        assert_eq!(parse_or::<u16>(Some("not-a-port"), 8080), 8080);
        assert_eq!(parse_or::<u16>(Some(" 9090 "), 8080), 9090);
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let cfg = AppConfig {
            host: "127.0.0.1".into(),
            port: 3000,
            db: DbConfig {
                url: "sqlite::memory:".into(),
                max_connections: 1,
                acquire_timeout_secs: 1,
                busy_timeout_secs: 1,
            },
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }
}
