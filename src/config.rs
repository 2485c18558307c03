use std::env;

use crate::constants::{DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,
    pub log_requests: bool,
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/derive.sqlite".to_string());

        let allowed_origins = parse_origins(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| "SESSION_SECRET must be set for signing session cookies")?;
        if session_secret.is_empty() {
            return Err("SESSION_SECRET must not be empty".to_string());
        }

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => parse_ttl(&raw)?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let cookie_secure = parse_flag(env::var("COOKIE_SECURE").ok().as_deref());
        let log_requests = parse_flag(env::var("LOG_REQUESTS").ok().as_deref());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            session_secret,
            session_ttl_secs,
            cookie_secure,
            log_requests,
            environment,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Session lifetime in seconds, within `1..=MAX_SESSION_TTL_SECS`
fn parse_ttl(raw: &str) -> Result<i64, String> {
    let ttl: i64 = raw
        .trim()
        .parse()
        .map_err(|_| "Invalid SESSION_TTL_SECS".to_string())?;
    if ttl <= 0 {
        return Err("SESSION_TTL_SECS must be positive".to_string());
    }
    if ttl > MAX_SESSION_TTL_SECS {
        return Err(format!(
            "SESSION_TTL_SECS must be at most {}",
            MAX_SESSION_TTL_SECS
        ));
    }
    Ok(ttl)
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" ON ")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_parse_ttl_bounds() {
        assert_eq!(parse_ttl("3600").unwrap(), 3600);
        assert_eq!(parse_ttl(&MAX_SESSION_TTL_SECS.to_string()).unwrap(), MAX_SESSION_TTL_SECS);
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("-5").is_err());
        assert!(parse_ttl("soon").is_err());
        assert!(parse_ttl(&(MAX_SESSION_TTL_SECS + 1).to_string()).is_err());
        assert!(parse_ttl(&i64::MAX.to_string()).is_err());
    }

    #[test]
    fn test_server_address() {
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            database_path: String::new(),
            allowed_origins: vec![],
            session_secret: "s".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            cookie_secure: false,
            log_requests: false,
            environment: "test".to_string(),
        };
        assert_eq!(config.server_address(), "127.0.0.1:3000");
    }
}
