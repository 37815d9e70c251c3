use anyhow::{Context, Result};

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Client configuration loaded from environment variables.
/// Every value has a default, so a bare environment points at a local service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Ranking Service, without a trailing slash.
    pub backend_url: String,
    pub request_timeout_secs: u64,
    /// Also send the pending resume ids with every ranking request.
    pub send_resume_ids: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_url: normalize_base_url(
                &std::env::var("RANKER_BACKEND_URL")
                    .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            ),
            request_timeout_secs: match std::env::var("RANKER_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .parse::<u64>()
                    .context("RANKER_TIMEOUT_SECS must be a whole number of seconds")?,
                Err(_) => DEFAULT_TIMEOUT_SECS,
            },
            send_resume_ids: match std::env::var("RANKER_SEND_RESUME_IDS") {
                Ok(raw) => parse_flag(&raw)
                    .with_context(|| format!("RANKER_SEND_RESUME_IDS must be true or false, got '{raw}'"))?,
                Err(_) => false,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Replaces the backend URL, e.g. from a command-line override.
    pub fn with_backend_url(mut self, url: &str) -> Self {
        self.backend_url = normalize_base_url(url);
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognized flag value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_are_trimmed() {
        assert_eq!(
            normalize_base_url("http://ranker.local:8000//"),
            "http://ranker.local:8000"
        );
        assert_eq!(normalize_base_url(" http://x "), "http://x");
    }

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(!parse_flag("").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_with_backend_url_overrides() {
        let config = Config {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            send_resume_ids: false,
            rust_log: "info".to_string(),
        }
        .with_backend_url("http://10.0.0.5:9000/");
        assert_eq!(config.backend_url, "http://10.0.0.5:9000");
    }
}
