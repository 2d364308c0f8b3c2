/// Configuration management
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Emails allowed to pass the admin membership check. Injected here so
    /// admin checks never read ambient process state.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    #[serde(default)]
    pub providers: ProviderConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub restream_client_id: Option<String>,
    pub restream_client_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Trivial membership predicate; anything richer is the caller's problem.
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(email))
    }
}
