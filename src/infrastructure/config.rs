use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    /// Load the demo address space on startup
    pub seed_fixtures: bool,
    /// Bootstrap account created when no user exists yet
    pub admin_username: String,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::with_profile(env::var("PROFILE").ok())
    }

    /// Load from the environment, with an explicit profile (e.g. `--profile`)
    /// taking precedence over `PROFILE`.
    pub fn with_profile(profile: Option<String>) -> Self {
        let profile = profile.unwrap_or_else(|| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://gestioip.db?mode=rwc".to_string()
            } else {
                format!("sqlite://gestioip_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            seed_fixtures: env::var("SEED_FIXTURES")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(false),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            profile,
        }
    }
}
