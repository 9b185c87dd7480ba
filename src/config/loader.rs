//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check against [`ConfigLimits`]
//! 2. Environment variable expansion (on raw text, before parsing)
//! 3. YAML or JSON parsing, chosen by file extension
//! 4. Validation
//! 5. Freeze with `Arc`

use std::path::Path;
use std::sync::Arc;

use crate::config::schema::ScoreConfig;
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Limits applied while loading configuration.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of attackable lines.
    pub max_lines: usize,

    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,

    /// Maximum number of steps a replayed episode may declare.
    pub max_episode_steps: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_lines: env_or("ALERT_TRUST_MAX_LINES", 10_000),
            max_config_size: env_or("ALERT_TRUST_MAX_CONFIG_SIZE", 1024 * 1024),
            max_episode_steps: env_or("ALERT_TRUST_MAX_EPISODE_STEPS", 1_000_000),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<ScoreConfig>,

    /// Warnings encountered during loading and validation.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl From<ValidationIssue> for LoadWarning {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            message: issue.message,
            location: Some(issue.path),
        }
    }
}

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    /// Creates a loader with the given limits.
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    /// Creates a loader with default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Returns the limits this loader enforces.
    #[must_use]
    pub const fn limits(&self) -> &ConfigLimits {
        &self.limits
    }

    /// Loads, validates and freezes a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the file is missing, too large or empty
    /// - the extension is not `.yaml`, `.yml` or `.json`
    /// - the content does not parse
    /// - validation reports any error
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let format = ConfigFormat::from_path(path)?;

        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let too_large = usize::try_from(metadata.len())
            .map_or(true, |size| size > self.limits.max_config_size);
        if too_large {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.limits.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let source = path.display().to_string();
        self.load_str(&raw, format, &source).map_err(|e| match e {
            ConfigError::Empty { .. } => ConfigError::Empty {
                path: path.to_path_buf(),
            },
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parses and validates configuration text.
    ///
    /// `source` names the text in errors and warnings.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file-system checks.
    pub fn load_str(
        &self,
        raw: &str,
        format: ConfigFormat,
        source: &str,
    ) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        if raw.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: source.into(),
            });
        }

        let mut warnings = Vec::new();
        let expanded = expand_env(raw, source, &mut warnings);

        let config: ScoreConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&expanded).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(&expanded).map_err(|e| e.to_string()),
        }
        .map_err(|message| ConfigError::ParseError {
            path: source.into(),
            message,
        })?;

        let config = self.validate(config, source, &mut warnings)?;
        Ok(LoadResult { config, warnings })
    }

    /// Validates an already-built configuration and freezes it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] listing every error found.
    pub fn validate(
        &self,
        config: ScoreConfig,
        source: &str,
        warnings: &mut Vec<LoadWarning>,
    ) -> Result<Arc<ScoreConfig>, ConfigError> {
        let result = Validator::new().validate(&config, &self.limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: source.to_string(),
                errors: result.errors,
            });
        }
        warnings.extend(result.warnings.into_iter().map(LoadWarning::from));
        Ok(Arc::new(config))
    }
}

// ============================================================================
// Environment expansion
// ============================================================================

/// Expands `${VAR}` and `${VAR:-default}` references; `$$` is a literal `$`.
///
/// An unset variable without a default expands to the empty string and
/// records a warning. An unterminated reference is copied through as-is.
fn expand_env(raw: &str, source: &str, warnings: &mut Vec<LoadWarning>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
            continue;
        }

        let Some(body_and_rest) = tail.strip_prefix('{') else {
            out.push('$');
            rest = tail;
            continue;
        };
        let Some(close) = body_and_rest.find('}') else {
            out.push_str(&rest[pos..]);
            rest = "";
            break;
        };

        let spec = &body_and_rest[..close];
        let (name, default) = spec
            .split_once(":-")
            .map_or((spec, None), |(n, d)| (n, Some(d)));

        match (std::env::var(name), default) {
            (Ok(value), _) => out.push_str(&value),
            (Err(_), Some(default)) => out.push_str(default),
            (Err(_), None) => warnings.push(LoadWarning {
                message: format!("environment variable '{name}' is not set, using empty string"),
                location: Some(source.to_string()),
            }),
        }
        rest = &body_and_rest[close + 1..];
    }

    out.push_str(rest);
    out
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LineId;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "score.yaml",
            "attackable_lines: [\"48_50_136\"]\nend_of_episode_bonus: 42\n",
        );
        let result = ConfigLoader::with_defaults().load(&path).unwrap();
        assert_eq!(result.config.attackable_lines, vec![LineId::new("48_50_136")]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "score.json",
            r#"{"attackable_lines": ["a", "b"], "risk_window": 3}"#,
        );
        let result = ConfigLoader::with_defaults().load(&path).unwrap();
        assert_eq!(result.config.risk_window, 3);
    }

    #[test]
    fn missing_file_reported() {
        let err = ConfigLoader::with_defaults()
            .load(Path::new("/nonexistent/score.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.yaml", "  \n");
        let err = ConfigLoader::with_defaults().load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Empty { path: p } if p == path));
    }

    #[test]
    fn unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "score.toml", "attackable_lines = []");
        let err = ConfigLoader::with_defaults().load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "big.yaml", &"# padding\n".repeat(20));
        let loader = ConfigLoader::new(ConfigLimits {
            max_config_size: 16,
            ..ConfigLimits::default()
        });
        let err = loader.load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { limit: 16, .. }));
    }

    #[test]
    fn parse_error_carries_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.yaml", "attackable_lines: [a\n");
        let err = ConfigLoader::with_defaults().load(&path).unwrap_err();
        match err {
            ConfigError::ParseError { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn validation_errors_surface() {
        let err = ConfigLoader::with_defaults()
            .load_str("attackable_lines: []\n", ConfigFormat::Yaml, "<inline>")
            .unwrap_err();
        match err {
            ConfigError::ValidationError { path, errors } => {
                assert_eq!(path, "<inline>");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validation_warnings_become_load_warnings() {
        let result = ConfigLoader::with_defaults()
            .load_str(
                "attackable_lines: [a]\nrisk_window: 6\n",
                ConfigFormat::Yaml,
                "<inline>",
            )
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location.as_deref(), Some("risk_window"));
    }

    #[test]
    fn env_default_used_when_unset() {
        let mut warnings = Vec::new();
        let out = expand_env(
            "bonus: ${ALERT_TRUST_TEST_SURELY_UNSET_VAR:-42}",
            "<t>",
            &mut warnings,
        );
        assert_eq!(out, "bonus: 42");
        assert!(warnings.is_empty());
    }

    #[test]
    fn env_unset_without_default_warns() {
        let mut warnings = Vec::new();
        let out = expand_env("x: ${ALERT_TRUST_TEST_SURELY_UNSET_VAR}!", "<t>", &mut warnings);
        assert_eq!(out, "x: !");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("ALERT_TRUST_TEST_SURELY_UNSET_VAR"));
    }

    #[test]
    fn env_escapes_and_unterminated_pass_through() {
        let mut warnings = Vec::new();
        assert_eq!(expand_env("cost: $$5", "<t>", &mut warnings), "cost: $5");
        assert_eq!(expand_env("a $b", "<t>", &mut warnings), "a $b");
        assert_eq!(expand_env("open ${VAR", "<t>", &mut warnings), "open ${VAR");
        assert!(warnings.is_empty());
    }

    #[test]
    fn bom_is_stripped() {
        let result = ConfigLoader::with_defaults()
            .load_str("\u{feff}attackable_lines: [a]\n", ConfigFormat::Yaml, "<inline>")
            .unwrap();
        assert_eq!(result.config.attackable_lines.len(), 1);
    }
}
