use crate::error::Result;
use reqwest::blocking::{Client, ClientBuilder};
use std::env;
use std::time::Duration;

/// Admin API path appended to the site URL
pub const ADMIN_API_PATH: &str = "/ghost/api/admin/";

/// Pinned `Accept-Version` header value
pub const ACCEPT_VERSION: &str = "v5.109";

/// Fixed timeout applied to every HTTP call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the site URL
pub const ENV_API_URL: &str = "GHOST_API_URL";

/// Environment variable holding the `<id>:<secret>` staff API key
pub const ENV_STAFF_API_KEY: &str = "GHOST_STAFF_API_KEY";

/// Create the HTTP client used for Admin API requests
pub fn create_admin_client() -> Result<Client> {
    let client = ClientBuilder::new().timeout(REQUEST_TIMEOUT).build()?;
    Ok(client)
}

/// Configuration for the Admin API client.
///
/// Built once and handed to [`AdminClient`](crate::AdminClient); nothing in
/// the crate mutates it afterwards. Values are not validated here: an empty
/// URL or key only fails once a request is built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Site URL, e.g. `https://blog.example.com`
    pub base_url: String,
    /// Staff API key in `<id>:<secret>` form
    pub staff_api_key: String,
}

impl Config {
    /// Create a new configuration with the given site URL and staff API key
    pub fn new(base_url: impl Into<String>, staff_api_key: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into(),
            staff_api_key: staff_api_key.into(),
        }
    }

    /// Read `GHOST_API_URL` and `GHOST_STAFF_API_KEY` from the environment.
    /// Missing variables become empty strings.
    pub fn from_env() -> Self {
        Config {
            base_url: env::var(ENV_API_URL).unwrap_or_default(),
            staff_api_key: env::var(ENV_STAFF_API_KEY).unwrap_or_default(),
        }
    }

    /// Get the base URL for Admin API requests, without a trailing slash
    pub fn admin_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            ADMIN_API_PATH.trim_end_matches('/')
        )
    }
}

// Implement Debug manually to avoid exposing the staff API key secret
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key_id = self
            .staff_api_key
            .split(':')
            .next()
            .unwrap_or_default();
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("staff_api_key", &format!("{}:<redacted>", key_id))
            .finish()
    }
}
