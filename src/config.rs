use std::path::PathBuf;

use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the task-tracking service.
    pub api_url: Url,
    /// Where the signed-in session (token + profile) is persisted.
    pub session_file: PathBuf,
    /// Whole-request timeout in seconds. Timeout policy lives in the
    /// transport; the core treats "no response" like any other failure.
    pub timeout_secs: u64,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let api_url =
        std::env::var("JOBDECK_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".into());
    let api_url = Url::parse(&api_url)
        .map_err(|e| anyhow::anyhow!("invalid JOBDECK_API_URL '{}': {}", api_url, e))?;

    let session_file = match std::env::var("JOBDECK_SESSION_FILE") {
        Ok(path) => PathBuf::from(path),
        Err(_) => default_session_file(),
    };

    Ok(Config {
        api_url,
        session_file,
        timeout_secs: std::env::var("JOBDECK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
    })
}

fn default_session_file() -> PathBuf {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".jobdeck").join("session.json")
}
