/// Meet API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// URL clients connect their media session to (handed out on join).
    pub transport_url: String,
    /// Base URL of the SFU's control API.
    pub transport_api_url: String,
    /// API key shared with the SFU.
    pub transport_api_key: String,
    /// API secret shared with the SFU; signs admission tokens.
    pub transport_api_secret: String,
    /// User ids that receive the `admin` role in every room.
    pub admin_user_ids: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables, with development
    /// defaults matching a locally running SFU.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4000),
            transport_url: var_or("TRANSPORT_URL", "ws://localhost:7880"),
            transport_api_url: var_or("TRANSPORT_API_URL", "http://localhost:7880"),
            transport_api_key: var_or("TRANSPORT_API_KEY", "devkey"),
            transport_api_secret: var_or("TRANSPORT_API_SECRET", "secret"),
            admin_user_ids: std::env::var("ADMIN_USER_IDS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
