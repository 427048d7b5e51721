use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Absolute base used for pagination links, e.g. `https://api.example.com`.
    /// When unset, links are `http://{Host}`; a `Host` that is not a bare
    /// authority (contains `/`, `?`, `#`, `@` or whitespace) becomes `localhost`.
    /// Set this when serving behind TLS or a proxy.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), public_url: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    /// Database name; falls back to the connection string's default database.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_idle_time")]
    pub max_idle_time_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            name: None,
            max_pool_size: default_max_pool_size(),
            min_pool_size: default_min_pool_size(),
            connect_timeout_secs: default_connect_timeout(),
            max_idle_time_secs: default_max_idle_time(),
        }
    }
}

fn default_max_pool_size() -> u32 { 10 }
fn default_min_pool_size() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_max_idle_time() -> u64 { 600 }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to environment-only
    /// configuration when the file is missing, then normalize and validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
        if self.public_url.is_none() {
            self.public_url = std::env::var("PUBLIC_URL").ok();
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        if let Some(url) = self.public_url.take() {
            let trimmed = url.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(anyhow!("server.public_url must start with http:// or https://"));
                }
                self.public_url = Some(trimmed.to_string());
            }
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // MONGO_URI first, DATABASE_URL as a generic fallback
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("MONGO_URI").or_else(|_| std::env::var("DATABASE_URL")) {
                self.url = url;
            }
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                self.name = None;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or via MONGO_URI"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!("database.url must start with mongodb:// or mongodb+srv://"));
        }
        if self.max_pool_size == 0 {
            return Err(anyhow!("database.max_pool_size must be >= 1"));
        }
        if self.max_pool_size < self.min_pool_size {
            return Err(anyhow!("database.max_pool_size must be >= min_pool_size"));
        }
        if self.connect_timeout_secs == 0 || self.max_idle_time_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}
