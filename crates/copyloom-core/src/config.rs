use crate::error::{CopyloomError, Result};
use crate::paths;
use crate::progress::{ProgressTiming, CHAT_STEPS, GENERATION_STEPS};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Where the remote generation and chat functions live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:54321/functions/v1".to_string()
}

fn default_api_key_env() -> String {
    "COPYLOOM_API_KEY".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl GenerationConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// ProgressConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_generation_step_ms")]
    pub generation_step_ms: u64,
    #[serde(default = "default_generation_total_ms")]
    pub generation_total_ms: u64,
    #[serde(default = "default_chat_step_ms")]
    pub chat_step_ms: u64,
    #[serde(default = "default_chat_total_ms")]
    pub chat_total_ms: u64,
}

fn default_generation_step_ms() -> u64 {
    10_000
}

fn default_generation_total_ms() -> u64 {
    60_000
}

fn default_chat_step_ms() -> u64 {
    4_000
}

fn default_chat_total_ms() -> u64 {
    15_000
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            generation_step_ms: default_generation_step_ms(),
            generation_total_ms: default_generation_total_ms(),
            chat_step_ms: default_chat_step_ms(),
            chat_total_ms: default_chat_total_ms(),
        }
    }
}

impl ProgressConfig {
    /// Timings from the workspace config, or the defaults when the workspace
    /// has no config yet.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Config::load(root) {
            Ok(config) => Ok(config.progress),
            Err(CopyloomError::NotInitialized) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn generation(&self) -> ProgressTiming {
        ProgressTiming::new(self.generation_step_ms, self.generation_total_ms)
    }

    pub fn chat(&self) -> ProgressTiming {
        ProgressTiming::new(self.chat_step_ms, self.chat_total_ms)
    }
}

// ---------------------------------------------------------------------------
// WorkspaceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(workspace_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            workspace: WorkspaceConfig {
                name: workspace_name.into(),
                description: None,
            },
            generation: GenerationConfig::default(),
            progress: ProgressConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CopyloomError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.generation.base_url.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "generation.base_url is empty".to_string(),
            });
        } else if !self.generation.base_url.starts_with("http://")
            && !self.generation.base_url.starts_with("https://")
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "generation.base_url '{}' must start with http:// or https://",
                    self.generation.base_url
                ),
            });
        }

        if self.generation.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "generation.timeout_seconds must be greater than 0".to_string(),
            });
        }

        let timings = [
            ("generation", self.progress.generation(), GENERATION_STEPS.len()),
            ("chat", self.progress.chat(), CHAT_STEPS.len()),
        ];
        for (name, timing, steps) in timings {
            if timing.step_duration_ms == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("progress.{name}_step_ms must be greater than 0"),
                });
                continue;
            }
            let stepping = timing.step_duration_ms * (steps as u64 - 1);
            if timing.total_estimated_ms <= stepping {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "progress.{name}_total_ms={} leaves no time for the bar fill \
                         ({steps} steps of {}ms)",
                        timing.total_estimated_ms, timing.step_duration_ms
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("agency");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.workspace.name, "agency");
        assert_eq!(parsed.progress.generation_step_ms, 10_000);
        assert_eq!(parsed.generation.timeout_seconds, 120);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("workspace:\n  name: studio\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.generation.api_key_env, "COPYLOOM_API_KEY");
        assert_eq!(cfg.progress.chat(), ProgressTiming::new(4_000, 15_000));
    }

    #[test]
    fn progress_timings_fall_back_without_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            ProgressConfig::load_or_default(dir.path()).unwrap(),
            ProgressConfig::default()
        );

        let mut cfg = Config::new("agency");
        cfg.progress.chat_step_ms = 1_000;
        cfg.save(dir.path()).unwrap();
        let loaded = ProgressConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.chat_step_ms, 1_000);
    }

    #[test]
    fn load_without_file_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(CopyloomError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("studio");
        cfg.generation.base_url = "https://example.test/functions/v1".into();
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.generation.base_url, "https://example.test/functions/v1");
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::new("studio").validate().is_empty());
    }

    #[test]
    fn validate_bad_base_url() {
        let mut cfg = Config::new("studio");
        cfg.generation.base_url = "ftp://nope".into();
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("http://")));
    }

    #[test]
    fn validate_zero_step_duration() {
        let mut cfg = Config::new("studio");
        cfg.progress.chat_step_ms = 0;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("progress.chat_step_ms")));
    }

    #[test]
    fn validate_total_shorter_than_steps() {
        let mut cfg = Config::new("studio");
        cfg.progress.generation_total_ms = 30_000;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| {
            w.level == WarnLevel::Warning && w.message.contains("progress.generation_total_ms=30000")
        }));
    }
}
