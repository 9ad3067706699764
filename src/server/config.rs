//! HTTP server configuration read from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::Key;
use tracing::warn;

/// Runtime configuration for the server binary.
///
/// | Variable | Default | Meaning |
/// |---|---|---|
/// | `BIND_ADDR` | `0.0.0.0:8080` | Listen address |
/// | `DATABASE_URL` | (required) | PostgreSQL connection string |
/// | `MEDIA_ROOT` | `./media` | Cover image storage root |
/// | `SESSION_KEY_FILE` | `/var/run/secrets/session_key` | Session signing key material |
/// | `SESSION_ALLOW_EPHEMERAL` | unset | `1` permits a generated key outside debug builds |
/// | `SESSION_COOKIE_SECURE` | `1` | Any value but `0` sets the `Secure` cookie flag |
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub media_root: PathBuf,
    pub session_key: Key,
    pub cookie_secure: bool,
}

impl ServerConfig {
    /// Assemble configuration from the process environment.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".into())
            .parse()
            .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR: {err}")))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;

        let media_root = PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".into()));

        let session_key = load_session_key()?;

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| v != "0")
            .unwrap_or(true);

        Ok(Self {
            bind_addr,
            database_url,
            media_root,
            session_key,
            cookie_secure,
        })
    }
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}
