use serde::Deserialize;

/// Upper bound on session lifetime: one year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    pub cookie_name: String,
}

/// Paths the route guard redirects between, and the prefixes it gates.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    pub login_path: String,
    pub landing_path: String,
    pub protected_prefixes: Vec<String>,
    pub public_only_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub guard: GuardConfig,
    pub pagination: PaginationConfig,
    pub min_password_len: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET")?,
            ttl_minutes: env_parse("SESSION_TTL_MINUTES", 60 * 24 * 30)
                .clamp(1, MAX_SESSION_TTL_MINUTES),
            cookie_name: std::env::var("SESSION_COOKIE").unwrap_or_else(|_| "session".into()),
        };
        let guard = GuardConfig {
            login_path: std::env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".into()),
            landing_path: std::env::var("LANDING_PATH").unwrap_or_else(|_| "/blogs".into()),
            protected_prefixes: env_list("PROTECTED_PREFIXES", &["/blogs"]),
            public_only_prefixes: env_list("PUBLIC_ONLY_PREFIXES", &["/login", "/register"]),
        };
        let pagination = PaginationConfig {
            default_limit: env_parse("DEFAULT_PAGE_SIZE", 10),
            max_limit: env_parse("MAX_PAGE_SIZE", 100),
        };
        Ok(Self {
            database_url,
            session,
            guard,
            pagination,
            min_password_len: env_parse("MIN_PASSWORD_LEN", 6),
        })
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".into(),
            landing_path: "/blogs".into(),
            protected_prefixes: vec!["/blogs".into()],
            public_only_prefixes: vec!["/login".into(), "/register".into()],
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => split_list(&raw),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
