//! Configuration for the audit engine
//!
//! Reads configuration from:
//! - `.pageauditrc.yaml` / `.pageauditrc.json` (project-level)
//! - `~/.pageauditrc.yaml` (user-level)
//! - CLI flags merged on top

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run the stateless rule partition in parallel
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,

    /// Maximum pages audited per session. Bounds the O(N²)
    /// near-duplicate scan; extra pages are skipped.
    pub max_pages: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
            max_pages: 100,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color mode
    pub color: ColorMode,

    /// Verbose output
    pub verbose: bool,

    /// Show session statistics
    pub statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            verbose: false,
            statistics: true,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Rule selection configuration.
///
/// `enable` and `disable` hold the patterns resolved by
/// [`crate::matcher::filter_rules`]: `*`, `<category>/*`, or an exact rule
/// id. Disable always wins over enable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Patterns for rules to enable (default: everything)
    pub enable: Vec<String>,

    /// Patterns for rules to disable (default: none)
    pub disable: Vec<String>,

    /// Per-URL rule ignores (URL glob pattern -> rule ids, or "all")
    pub per_url: HashMap<String, Vec<String>>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            enable: vec!["*".to_string()],
            disable: Vec::new(),
            per_url: HashMap::new(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extend from other configuration files or presets
    #[serde(default)]
    pub extends: Vec<String>,

    /// Engine settings
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Rule selection
    pub rules: RulesConfig,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a preset configuration by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::preset_recommended()),
            "strict" => Some(Self::preset_strict()),
            "minimal" => Some(Self::preset_minimal()),
            _ => None,
        }
    }

    /// Recommended preset - everything except accessibility extras
    fn preset_recommended() -> Self {
        Self {
            rules: RulesConfig {
                enable: vec!["*".to_string()],
                ..RulesConfig::default()
            },
            ..Self::default()
        }
    }

    /// Strict preset - every rule, statistics on
    fn preset_strict() -> Self {
        Self {
            output: OutputConfig {
                statistics: true,
                ..OutputConfig::default()
            },
            ..Self::default()
        }
    }

    /// Minimal preset - only the SEO and security categories
    fn preset_minimal() -> Self {
        Self {
            rules: RulesConfig {
                enable: vec!["seo/*".to_string(), "security/*".to_string()],
                ..RulesConfig::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_depth(path, 0)
    }

    /// Load with recursion depth limit (to prevent infinite loops)
    fn load_with_depth(path: &Path, depth: usize) -> Result<Self, ConfigError> {
        const MAX_DEPTH: usize = 10;
        if depth >= MAX_DEPTH {
            return Err(ConfigError::Invalid(
                "Maximum config inheritance depth exceeded".to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        // Process extends
        if !config.extends.is_empty() {
            let base_dir = path.parent().unwrap_or(Path::new("."));
            let mut base_config = Self::default();

            for extend in &config.extends.clone() {
                let extended = if let Some(preset) = Self::preset(extend) {
                    preset
                } else {
                    let extend_path = if Path::new(extend).is_absolute() {
                        PathBuf::from(extend)
                    } else {
                        base_dir.join(extend)
                    };
                    Self::load_with_depth(&extend_path, depth + 1)?
                };
                base_config.merge(extended);
            }

            // Merge current config on top of base
            base_config.merge(config);
            config = base_config;
        }

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        // Extends are not inherited

        if other.engine.jobs != 0 {
            self.engine.jobs = other.engine.jobs;
        }
        self.engine.parallel = other.engine.parallel;
        if other.engine.max_pages != EngineConfig::default().max_pages {
            self.engine.max_pages = other.engine.max_pages;
        }

        if other.output.format != OutputFormat::Text {
            self.output.format = other.output.format;
        }
        if other.output.verbose {
            self.output.verbose = true;
        }
        if other.output.color != ColorMode::Auto {
            self.output.color = other.output.color;
        }

        if other.rules.enable != RulesConfig::default().enable {
            self.rules.enable = other.rules.enable;
        }
        self.rules.disable.extend(other.rules.disable);
        for (pattern, rules) in other.rules.per_url {
            self.rules.per_url.entry(pattern).or_default().extend(rules);
        }
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_names = [
            ".pageauditrc.yaml",
            ".pageauditrc.yml",
            ".pageauditrc.json",
            "pageaudit.yaml",
            "pageaudit.yml",
            "pageaudit.json",
        ];

        // Check current directory
        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            for name in &config_names {
                let path = home.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        jobs: Option<usize>,
        disable: Option<Vec<String>>,
        enable: Option<Vec<String>>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(v) = verbose {
            self.output.verbose = v;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        if let Some(disable) = disable {
            self.rules.disable.extend(disable);
        }
        if let Some(enable) = enable {
            self.rules.enable = enable;
        }
    }

    /// Check if a rule should be ignored for a URL
    pub fn should_ignore_rule_for_url(&self, rule_id: &str, url: &str) -> bool {
        for (pattern, rules) in &self.rules.per_url {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(url)
                    && (rules.contains(&"all".to_string()) || rules.contains(&rule_id.to_string()))
                {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert_eq!(config.engine.max_pages, 100);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.rules.enable, vec!["*"]);
        assert!(config.rules.disable.is_empty());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_presets() {
        assert!(Config::preset("recommended").is_some());
        assert!(Config::preset("strict").is_some());
        let minimal = Config::preset("minimal").unwrap();
        assert_eq!(minimal.rules.enable, vec!["seo/*", "security/*"]);
        assert!(Config::preset("nonsense").is_none());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            Some(true),
            Some(4),
            Some(vec!["seo-title-present".to_string()]),
            None,
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.engine.jobs, 4);
        assert!(config
            .rules
            .disable
            .contains(&"seo-title-present".to_string()));
        // Enable list untouched when not given
        assert_eq!(config.rules.enable, vec!["*"]);
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
output:
  format: json
  verbose: true
rules:
  enable:
    - "seo/*"
  disable:
    - seo-title-length
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.jobs, 4);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.rules.enable, vec!["seo/*"]);
        assert_eq!(config.rules.disable, vec!["seo-title-length"]);
    }

    #[test]
    fn test_merge_rules() {
        let mut base = Config::new();
        let other: Config = serde_yaml::from_str(
            r#"
rules:
  enable: ["content/*"]
  disable: ["content-word-count"]
"#,
        )
        .unwrap();

        base.merge(other);
        assert_eq!(base.rules.enable, vec!["content/*"]);
        assert_eq!(base.rules.disable, vec!["content-word-count"]);
    }

    #[test]
    fn test_per_url_ignores() {
        let mut config = Config::new();
        config.rules.per_url.insert(
            "https://example.com/legal/*".to_string(),
            vec!["content-near-duplicate".to_string()],
        );
        config
            .rules
            .per_url
            .insert("*/drafts/*".to_string(), vec!["all".to_string()]);

        assert!(config.should_ignore_rule_for_url(
            "content-near-duplicate",
            "https://example.com/legal/terms"
        ));
        assert!(!config.should_ignore_rule_for_url(
            "seo-title-present",
            "https://example.com/legal/terms"
        ));
        assert!(
            config.should_ignore_rule_for_url("anything", "https://example.com/drafts/wip")
        );
        assert!(!config.should_ignore_rule_for_url("anything", "https://example.com/blog/post"));
    }

    #[test]
    fn test_load_yaml_file() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pageaudit.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "engine:\n  jobs: 2\nrules:\n  disable: [a11y-img-alt]").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.engine.jobs, 2);
        assert_eq!(config.rules.disable, vec!["a11y-img-alt"]);
    }

    #[test]
    fn test_extends_preset() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pageaudit.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "extends: [minimal]\nrules:\n  disable: [seo-h1-present]").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.rules.enable, vec!["seo/*", "security/*"]);
        assert_eq!(config.rules.disable, vec!["seo-h1-present"]);
    }
}
