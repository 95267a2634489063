//! Google Cloud access tokens
//!
//! Uses a pre-minted token from the environment when present, otherwise asks
//! the gcloud CLI for Application Default Credentials.

use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::{Config, Result, TutorError};

/// gcloud tokens live for an hour; refresh well before that
const TOKEN_LIFETIME: Duration = Duration::from_secs(45 * 60);

const GCLOUD_TOKEN_COMMANDS: &[&[&str]] = &[
    &["auth", "application-default", "print-access-token"],
    &["auth", "print-access-token"],
];

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Source of bearer tokens for Vertex AI calls
pub struct AccessTokenSource {
    fixed: Option<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl AccessTokenSource {
    /// Build from configuration (uses `google.access_token` if set)
    pub fn from_config(config: &Config) -> Self {
        Self {
            fixed: config.google.access_token.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Always hand out the same token
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            fixed: Some(token.into()),
            cached: Mutex::new(None),
        }
    }

    /// Get a valid access token, minting one through gcloud if needed
    pub async fn token(&self) -> Result<String> {
        if let Some(ref token) = self.fixed {
            return Ok(token.clone());
        }

        let mut cached = self.cached.lock().await;
        if let Some(ref entry) = *cached {
            if entry.fetched_at.elapsed() < TOKEN_LIFETIME {
                return Ok(entry.token.clone());
            }
        }

        let token = fetch_gcloud_token().await?;
        *cached = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }

    /// Drop the cached token (after a 401)
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

async fn fetch_gcloud_token() -> Result<String> {
    for args in GCLOUD_TOKEN_COMMANDS {
        let output = Command::new("gcloud").args(*args).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TutorError::auth(
                    "gcloud not found. Install the Google Cloud SDK or set GOOGLE_OAUTH_ACCESS_TOKEN",
                )
            } else {
                TutorError::auth(format!("Failed to execute gcloud: {}", e))
            }
        })?;

        if output.status.success() {
            let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !token.is_empty() {
                debug!("Minted access token via gcloud {}", args.join(" "));
                return Ok(token);
            }
        } else {
            debug!(
                "gcloud {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
    }

    Err(TutorError::auth(
        "gcloud could not mint an access token. Run: gcloud auth application-default login",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_token() {
        let source = AccessTokenSource::fixed("ya29.test");
        assert_eq!(source.token().await.unwrap(), "ya29.test");
        source.invalidate().await;
        assert_eq!(source.token().await.unwrap(), "ya29.test");
    }

    #[test]
    fn test_from_config_uses_env_token() {
        let mut config = Config::default();
        config.google.access_token = Some("from-env".to_string());
        let source = AccessTokenSource::from_config(&config);
        assert_eq!(source.fixed.as_deref(), Some("from-env"));
    }
}
