use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
const DEFAULT_VERIFY_TOKEN: &str = "dev-verify-token";
const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Process-wide relay configuration, read once from the environment at
/// startup. All fields are effectively read-only afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Shared secret checked during the webhook verification handshake.
    pub verify_token: String,
    /// Messenger Send API credential. Without it the relay still serves
    /// the webhook handshake and health probe, but every send fails fast.
    pub page_access_token: Option<String>,
    /// Graph API base URL, overridable so tests can point at a mock.
    pub graph_api_base: String,
    pub port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let verify_token = non_empty_var("VERIFY_TOKEN").unwrap_or_else(|| {
            warn!("VERIFY_TOKEN is not set, using the development default");
            DEFAULT_VERIFY_TOKEN.to_string()
        });

        let page_access_token = non_empty_var("PAGE_ACCESS_TOKEN");
        if page_access_token.is_none() {
            warn!("PAGE_ACCESS_TOKEN is not set, outbound sends will be rejected");
        }

        let graph_api_base = non_empty_var("GRAPH_API_BASE")
            .unwrap_or_else(|| DEFAULT_GRAPH_API_BASE.to_string());
        let port = non_empty_var("PORT")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            verify_token,
            page_access_token,
            graph_api_base,
            port,
        }
    }

    /// Short prefix of the page token for the health endpoint. Never the
    /// full credential.
    pub fn page_token_preview(&self) -> Option<String> {
        self.page_access_token.as_deref().map(token_preview)
    }
}

fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}...")
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
