//! Configuration for the dunamis client and proxy.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DUNAMIS_API_URL, DUNAMIS_SITE_URL, ...)
//! 2. Config file (.dunamis/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .dunamis/config.yaml
//! - A relative `paths.home` is resolved against the .dunamis/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub mod paths;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Default backend REST API origin
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default site origin hosting `/api/og-metadata`
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Resources per category page when the caller does not choose
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Bound applied to every outbound request
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Address the Open Graph proxy binds to
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub youtube: YoutubeSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub paths: PathsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSection {
    /// Backend origin, without the `/api` prefix
    pub url: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSection {
    /// Origin serving the Open Graph proxy
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YoutubeSection {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsSection {
    /// Local state directory (relative to .dunamis/)
    pub home: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Backend REST API origin
    pub api_url: String,
    /// Site origin serving the Open Graph proxy
    pub site_url: String,
    /// YouTube Data API key (video lookups fail without it)
    pub youtube_api_key: Option<String>,
    /// Local state directory (session file lives here)
    pub home: PathBuf,
    /// Default category page size
    pub page_size: u32,
    /// Outbound request timeout
    pub request_timeout: Duration,
    /// Proxy bind address
    pub bind_address: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Defaults with the given state directory
    pub fn with_home(home: PathBuf) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            youtube_api_key: None,
            home,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".dunamis").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Parse a numeric override, ignoring zero and garbage
fn positive<T: std::str::FromStr + PartialEq + Default>(value: Option<String>) -> Option<T> {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v != T::default())
}

/// Merge environment, file and defaults.
///
/// `env` is a lookup so tests can run without touching the process
/// environment.
fn resolve(
    file: Option<(&Path, ConfigFile)>,
    default_home: PathBuf,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let (config_file, config) = match file {
        Some((path, config)) => (Some(path.to_path_buf()), config),
        None => (None, ConfigFile::default()),
    };

    let home = if let Some(env_home) = env("DUNAMIS_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(home_path), Some(path)) = (&config.paths.home, &config_file) {
        let dunamis_dir = path.parent().unwrap_or(Path::new("."));
        resolve_path(dunamis_dir, home_path)
    } else {
        default_home
    };

    let api_url = env("DUNAMIS_API_URL")
        .or(config.api.url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let site_url = env("DUNAMIS_SITE_URL")
        .or(config.site.url)
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

    let youtube_api_key = env("DUNAMIS_YOUTUBE_API_KEY")
        .or(config.youtube.api_key)
        .filter(|key| !key.trim().is_empty());

    let page_size = positive(env("DUNAMIS_PAGE_SIZE"))
        .or(config.api.page_size.filter(|size| *size > 0))
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let timeout_seconds = positive(env("DUNAMIS_TIMEOUT_SECONDS"))
        .or(config.api.timeout_seconds.filter(|secs| *secs > 0))
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    let bind_address = env("DUNAMIS_BIND")
        .or(config.server.bind)
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

    ResolvedConfig {
        api_url: api_url.trim_end_matches('/').to_string(),
        site_url: site_url.trim_end_matches('/').to_string(),
        youtube_api_key,
        home,
        page_size,
        request_timeout: Duration::from_secs(timeout_seconds),
        bind_address,
        config_file,
    }
}

/// Load configuration from all sources
pub fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".dunamis");

    let config_path = find_config_file();
    let file = match &config_path {
        Some(path) => Some((path.as_path(), load_config_file(path)?)),
        None => None,
    };

    Ok(resolve(file, default_home, |key| std::env::var(key).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = resolve(None, PathBuf::from("/home/u/.dunamis"), no_env);

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.site_url, DEFAULT_SITE_URL);
        assert_eq!(config.home, PathBuf::from("/home/u/.dunamis"));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.youtube_api_key.is_none());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dunamis_dir = temp.path().join(".dunamis");
        std::fs::create_dir_all(&dunamis_dir).unwrap();

        let config_path = dunamis_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
api:
  url: https://api.dunamis.example/
  page_size: 12
  timeout_seconds: 4
site:
  url: https://dunamis.example
youtube:
  api_key: yt-key
paths:
  home: ./state
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.api.page_size, Some(12));

        let config = resolve(
            Some((&config_path, parsed)),
            PathBuf::from("/unused"),
            no_env,
        );
        assert_eq!(config.api_url, "https://api.dunamis.example");
        assert_eq!(config.site_url, "https://dunamis.example");
        assert_eq!(config.youtube_api_key.as_deref(), Some("yt-key"));
        assert_eq!(config.page_size, 12);
        assert_eq!(config.request_timeout, Duration::from_secs(4));
        assert!(config.home.ends_with("state"));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            version: "1.0".to_string(),
            api: ApiSection {
                url: Some("https://from-file".to_string()),
                page_size: Some(12),
                timeout_seconds: None,
            },
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [
            ("DUNAMIS_API_URL", "https://from-env"),
            ("DUNAMIS_PAGE_SIZE", "0"),
            ("DUNAMIS_HOME", "/tmp/dunamis"),
        ]
        .into_iter()
        .collect();

        let config = resolve(
            Some((Path::new("/p/.dunamis/config.yaml"), file)),
            PathBuf::from("/unused"),
            |key| env.get(key).map(|v| v.to_string()),
        );

        assert_eq!(config.api_url, "https://from-env");
        // zero is not a usable page size, so the file value wins
        assert_eq!(config.page_size, 12);
        assert_eq!(config.home, PathBuf::from("/tmp/dunamis"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project/.dunamis");

        assert_eq!(
            resolve_path(&base, "./state"),
            PathBuf::from("/home/user/project/.dunamis/state")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
