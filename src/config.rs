use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,
    #[serde(default)]
    pub secret_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: default_session_ttl_days(),
            bcrypt_cost: default_bcrypt_cost(),
            cookie_name: default_cookie_name(),
            secure_cookie: false,
            secret_key_env: default_secret_key_env(),
            secret_key: None,
        }
    }
}

fn default_session_ttl_days() -> i64 {
    7
}
fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}
fn default_cookie_name() -> String {
    "bloomhub_session".to_string()
}
fn default_secret_key_env() -> String {
    "SECRET_KEY".to_string()
}

/// Development fallback used when neither `auth.secret_key` nor the
/// configured environment variable is set.
pub const DEV_SECRET_KEY: &str = "bloomhub-dev-secret";

impl AuthConfig {
    /// Resolves the cookie signing secret: inline value first, then the
    /// environment variable named by `secret_key_env`.
    pub fn resolve_secret(&self) -> Option<String> {
        self.secret_key
            .clone()
            .or_else(|| std::env::var(&self.secret_key_env).ok())
            .filter(|s| !s.is_empty())
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_source_deadline_secs")]
    pub source_deadline_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_chars: default_min_query_chars(),
            max_images: default_max_images(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            source_deadline_secs: default_source_deadline_secs(),
        }
    }
}

fn default_min_query_chars() -> usize {
    2
}
fn default_max_images() -> usize {
    6
}
fn default_max_concurrent_fetches() -> usize {
    16
}
fn default_source_deadline_secs() -> u64 {
    35
}

impl SearchConfig {
    pub fn source_deadline(&self) -> Duration {
        Duration::from_secs(self.source_deadline_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub perenual: PerenualConfig,
    #[serde(default)]
    pub pixabay: PixabayConfig,
    #[serde(default)]
    pub unsplash: UnsplashConfig,
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerenualConfig {
    #[serde(default = "default_perenual_url")]
    pub url: String,
    #[serde(default = "default_perenual_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_perenual_key_env")]
    pub api_key_env: String,
}

impl Default for PerenualConfig {
    fn default() -> Self {
        Self {
            url: default_perenual_url(),
            timeout_secs: default_perenual_timeout(),
            api_key: None,
            api_key_env: default_perenual_key_env(),
        }
    }
}

fn default_perenual_url() -> String {
    "https://perenual.com/api/species-list".to_string()
}
fn default_perenual_timeout() -> u64 {
    15
}
fn default_perenual_key_env() -> String {
    "PERENUAL_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PixabayConfig {
    #[serde(default = "default_pixabay_url")]
    pub url: String,
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_pixabay_key_env")]
    pub api_key_env: String,
}

impl Default for PixabayConfig {
    fn default() -> Self {
        Self {
            url: default_pixabay_url(),
            timeout_secs: default_image_timeout(),
            per_page: default_per_page(),
            api_key: None,
            api_key_env: default_pixabay_key_env(),
        }
    }
}

fn default_pixabay_url() -> String {
    "https://pixabay.com/api/".to_string()
}
fn default_pixabay_key_env() -> String {
    "PIXABAY_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnsplashConfig {
    #[serde(default = "default_unsplash_url")]
    pub url: String,
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_unsplash_key_env")]
    pub api_key_env: String,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            url: default_unsplash_url(),
            timeout_secs: default_image_timeout(),
            per_page: default_per_page(),
            api_key: None,
            api_key_env: default_unsplash_key_env(),
        }
    }
}

fn default_unsplash_url() -> String {
    "https://api.unsplash.com/search/photos".to_string()
}
fn default_unsplash_key_env() -> String {
    "UNSPLASH_API_KEY".to_string()
}
fn default_image_timeout() -> u64 {
    10
}
fn default_per_page() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct WikipediaConfig {
    #[serde(default = "default_wikipedia_url")]
    pub url: String,
    #[serde(default = "default_wikipedia_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,
    #[serde(default = "default_extract_chars")]
    pub extract_chars: usize,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            url: default_wikipedia_url(),
            timeout_secs: default_wikipedia_timeout(),
            user_agent: default_user_agent(),
            summary_chars: default_summary_chars(),
            extract_chars: default_extract_chars(),
        }
    }
}

fn default_wikipedia_url() -> String {
    "https://es.wikipedia.org/w/api.php".to_string()
}
fn default_wikipedia_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    "BloomHub/3.0".to_string()
}
fn default_summary_chars() -> usize {
    500
}
fn default_extract_chars() -> usize {
    1000
}

/// Reads an API key from an inline config value or, failing that, from
/// the named environment variable. Empty values count as missing.
pub fn resolve_api_key(inline: &Option<String>, env_var: &str) -> Option<String> {
    inline
        .clone()
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
}

impl PerenualConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl PixabayConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl UnsplashConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Search
    if config.search.min_query_chars == 0 {
        anyhow::bail!("search.min_query_chars must be > 0");
    }
    if config.search.max_images == 0 {
        anyhow::bail!("search.max_images must be > 0");
    }
    // One request fans out to four sources; fewer permits would serialize them.
    if config.search.max_concurrent_fetches < 4 {
        anyhow::bail!("search.max_concurrent_fetches must be >= 4");
    }
    if config.search.source_deadline_secs == 0 {
        anyhow::bail!("search.source_deadline_secs must be > 0");
    }

    // Sources
    let timeouts = [
        ("perenual", config.sources.perenual.timeout_secs),
        ("pixabay", config.sources.pixabay.timeout_secs),
        ("unsplash", config.sources.unsplash.timeout_secs),
        ("wikipedia", config.sources.wikipedia.timeout_secs),
    ];
    for (name, secs) in timeouts {
        if !(1..=60).contains(&secs) {
            anyhow::bail!("sources.{}.timeout_secs must be in [1, 60]", name);
        }
    }

    // Auth
    if !(4..=31).contains(&config.auth.bcrypt_cost) {
        anyhow::bail!("auth.bcrypt_cost must be in [4, 31]");
    }
    if config.auth.session_ttl_days < 1 {
        anyhow::bail!("auth.session_ttl_days must be >= 1");
    }
    if config.auth.cookie_name.trim().is_empty() {
        anyhow::bail!("auth.cookie_name must not be empty");
    }

    Ok(())
}
