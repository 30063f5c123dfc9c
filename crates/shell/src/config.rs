/// Shell configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Base URL of the remote collection service.
    pub api_base_url: String,
}

impl ShellConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var        | Default                     |
    /// |----------------|-----------------------------|
    /// | `API_BASE_URL` | `http://localhost:8080/api` |
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api".into());
        Self { api_base_url }
    }
}
