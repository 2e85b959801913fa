use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    /// `CHIRP_ENV=production` turns on `Secure` session cookies.
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("CHIRP_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("CHIRP_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let port = match lookup("CHIRP_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CHIRP_PORT is not a valid port: {}", raw))?,
            None => 3000,
        };

        Ok(Self {
            jwt_secret,
            db_path: lookup("CHIRP_DB_PATH").unwrap_or_else(|| "chirp.db".into()).into(),
            host: lookup("CHIRP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            upload_dir: lookup("CHIRP_UPLOAD_DIR")
                .unwrap_or_else(|| "./uploads/images".into())
                .into(),
            production: lookup("CHIRP_ENV").is_some_and(|env| env.eq_ignore_ascii_case("production")),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .with_context(|| format!("Invalid listen address {}", addr))
    }
}
