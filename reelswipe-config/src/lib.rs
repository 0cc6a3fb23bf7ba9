//! Loader for service configuration with YAML + environment overlays.
//!
//! Precedence, lowest first: built-in defaults, YAML files (in the order
//! they were attached), `REELSWIPE__SECTION__KEY` environment variables, and
//! finally the plain `YOUTUBE_API_KEY` / `PEXELS_API_KEY` / `PIXABAY_API_KEY`
//! / `PORT` variables the service has always honoured. `${VAR}` placeholders
//! inside string values are expanded after merging.
use config::{Config, ConfigError, Environment, File, FileFormat};
use reelswipe_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Legacy variable name -> config key.
const LEGACY_ENV: [(&str, &str); 4] = [
    ("YOUTUBE_API_KEY", "providers.youtube.api_key"),
    ("PEXELS_API_KEY", "providers.pexels.api_key"),
    ("PIXABAY_API_KEY", "providers.pixabay.api_key"),
    ("PORT", "server.port"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReelSwipeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name reported by the health endpoint.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Directory of browser assets served for unmatched routes.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            app_name: default_app_name(),
            static_dir: None,
        }
    }
}

/// Outbound HTTP behaviour. Upstream calls have no timeout unless one is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            stderr: true,
            filter: default_filter(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub pexels: PexelsConfig,
    #[serde(default)]
    pub pixabay: PixabayConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_youtube_endpoint")]
    pub base_url: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_youtube_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PexelsConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_pexels_endpoint")]
    pub base_url: String,
}

impl Default for PexelsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_pexels_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PixabayConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_pixabay_endpoint")]
    pub base_url: String,
}

impl Default for PixabayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_pixabay_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    #[serde(default = "default_reddit_endpoint")]
    pub base_url: String,
    #[serde(default = "default_reddit_user_agent")]
    pub user_agent: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: default_reddit_endpoint(),
            user_agent: default_reddit_user_agent(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}
fn default_app_name() -> String {
    "ReelSwipe v2".into()
}
fn default_true() -> bool {
    true
}
fn default_filter() -> String {
    "info".into()
}
fn default_youtube_endpoint() -> String {
    "https://www.googleapis.com".into()
}
fn default_pexels_endpoint() -> String {
    "https://api.pexels.com".into()
}
fn default_pixabay_endpoint() -> String {
    "https://pixabay.com".into()
}
fn default_reddit_endpoint() -> String {
    "https://www.reddit.com".into()
}
fn default_reddit_user_agent() -> String {
    "ReelSwipe/1.0".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ReelSwipeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    legacy_env: bool,
}

impl Default for ReelSwipeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReelSwipeConfigLoader {
    /// Start with no files; environment overlays are applied at [`load`](Self::load).
    ///
    /// ```
    /// use reelswipe_config::ReelSwipeConfigLoader;
    ///
    /// let config = ReelSwipeConfigLoader::new()
    ///     .without_legacy_env()
    ///     .with_yaml_str("server:\n  port: 8080")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.port, 8080);
    /// assert_eq!(config.server.app_name, "ReelSwipe v2");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            legacy_env: true,
        }
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, for env-only deployments.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Ignore `YOUTUBE_API_KEY`, `PORT` and friends.
    pub fn without_legacy_env(mut self) -> Self {
        self.legacy_env = false;
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use reelswipe_config::ReelSwipeConfigLoader;
    ///
    /// let config = temp_env::with_var("YT_KEY", Some("injected-from-env"), || {
    ///     ReelSwipeConfigLoader::new()
    ///         .without_legacy_env()
    ///         .with_yaml_str(r#"
    /// providers:
    ///   youtube:
    ///     api_key: "${YT_KEY}"
    /// "#)
    ///         .load()
    ///         .expect("valid configuration")
    /// });
    ///
    /// assert_eq!(config.providers.youtube.api_key.as_deref(), Some("injected-from-env"));
    /// assert_eq!(config.providers.youtube.base_url, "https://www.googleapis.com");
    /// ```
    pub fn load(self) -> Result<ReelSwipeConfig, ConfigError> {
        let mut builder = self
            .builder
            .add_source(Environment::with_prefix("REELSWIPE").separator("__"));

        if self.legacy_env {
            for (var, key) in LEGACY_ENV {
                let value = std::env::var(var)
                    .ok()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty());
                builder = builder.set_override_option(key, value)?;
            }
        }

        let cfg = builder.build()?;

        // Convert to serde_json::Value first so placeholders can be expanded
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // Round-trip through the `config` deserializer, which coerces
        // env-provided strings such as "8080" into numeric fields.
        let json = serde_json::to_string(&v).map_err(|e| ConfigError::Message(e.to_string()))?;
        Config::builder()
            .add_source(File::from_str(&json, FileFormat::Json))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${STATE}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn built_in_defaults() {
        let cfg = ReelSwipeConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.app_name, "ReelSwipe v2");
        assert!(cfg.http.timeout_secs.is_none());
        assert_eq!(cfg.providers.reddit.user_agent, "ReelSwipe/1.0");
        assert_eq!(cfg.providers.pixabay.base_url, "https://pixabay.com");
        assert!(cfg.logging.stderr);
    }
}
