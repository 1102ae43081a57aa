use std::fmt;
use std::time::Duration;

/// Highest accepted `--max-mana-cost`; every value up to the ceiling is sent upstream
pub const MAX_MANA_CEILING: i64 = 100;

/// Process configuration, read once at startup from flags or environment variables
///
/// Missing credentials or a missing/non-numeric mana ceiling abort startup.
#[derive(Clone, clap::Args)]
pub struct Config {
    /// Hearthstone API client id
    #[arg(long, env = "HS_API_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// Hearthstone API client secret
    #[arg(long, env = "HS_API_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Highest mana cost included in every card search
    #[arg(
        long,
        env = "HS_MAX_MANA_COST",
        value_parser = clap::value_parser!(u32).range(1..=MAX_MANA_CEILING)
    )]
    pub max_mana_cost: u32,

    /// Host to bind to
    #[arg(long, env = "CARDLIST_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "CARDLIST_PORT", default_value = "8080")]
    pub port: u16,

    /// Hearthstone API base URL
    #[arg(
        long,
        env = "HS_API_ENDPOINT_URL",
        default_value = "https://us.api.blizzard.com/hearthstone"
    )]
    pub endpoint_url: String,

    /// OAuth token URL used for the client-credentials grant
    #[arg(long, env = "HS_API_OAUTH_URL", default_value = "https://oauth.battle.net/token")]
    pub oauth_url: String,

    /// Locale passed to the catalog API
    #[arg(long, env = "HS_API_LOCALE", default_value = "en_US")]
    pub locale: String,

    /// Request timeout in seconds, applied to the server and the catalog client
    #[arg(long, env = "CARDLIST_TIMEOUT_SECS", default_value = "15")]
    pub timeout_secs: u64,

    /// Whether to display additional information.
    #[arg(long, env = "CARDLIST_VERBOSE", default_value = "false")]
    pub verbose: bool,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keep the secret out of logs and panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("max_mana_cost", &self.max_mana_cost)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("endpoint_url", &self.endpoint_url)
            .field("oauth_url", &self.oauth_url)
            .field("locale", &self.locale)
            .field("timeout_secs", &self.timeout_secs)
            .field("verbose", &self.verbose)
            .finish()
    }
}
