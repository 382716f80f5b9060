/// Default port when `PORT` is unset or unparseable.
const DEFAULT_PORT: u16 = 5000;

/// Default origin allowed to call the server cross-origin.
const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";

/// Server configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// The single origin allowed for cross-origin access (e.g. `http://localhost:5173`).
    pub client_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            client_url: std::env::var("CLIENT_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            client_url: DEFAULT_CLIENT_URL.to_string(),
        }
    }
}
