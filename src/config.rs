use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::translator::EvictionPolicy;
use crate::types::Language;
use crate::validator::{ProcessRunner, RunnerRegistry};

/// Default configuration filename
pub const CONFIG_FILENAME: &str = "codeshift.toml";

/// codeshift configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeshiftConfig {
    /// Configuration file version
    #[serde(default = "default_version")]
    pub version: String,

    /// Translation and correction loop settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Runtime execution settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for CodeshiftConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            translation: TranslationConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Validate/correct iterations before giving up
    #[serde(default = "default_max_attempts")]
    pub max_correction_attempts: usize,

    /// Translation memo cache
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_max_attempts() -> usize {
    3
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_correction_attempts: default_max_attempts(),
            cache: CacheConfig::default(),
        }
    }
}

/// Cache eviction policy name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    Unbounded,
    Lru,
    Ttl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// unbounded, lru or ttl
    #[serde(default = "default_cache_policy")]
    pub policy: CachePolicy,

    /// Maximum entries (lru, ttl)
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry lifetime in seconds (ttl)
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_policy() -> CachePolicy {
    CachePolicy::Unbounded
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: default_cache_policy(),
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn eviction_policy(&self) -> EvictionPolicy {
        match self.policy {
            CachePolicy::Unbounded => EvictionPolicy::Unbounded,
            CachePolicy::Lru => EvictionPolicy::Lru {
                capacity: self.capacity,
            },
            CachePolicy::Ttl => EvictionPolicy::Ttl {
                capacity: self.capacity,
                ttl: Duration::from_secs(self.ttl_secs),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Kill a runtime after this many seconds; absent = wait forever.
    /// `init` writes the 30 second default explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Interpreters used to execute translated code
    #[serde(default = "default_runtimes")]
    pub runtimes: Vec<RuntimeConfig>,
}

fn default_timeout() -> Option<u64> {
    Some(30)
}

fn default_runtimes() -> Vec<RuntimeConfig> {
    vec![
        RuntimeConfig {
            language: Language::Python,
            program: "python".to_string(),
            inline_flag: "-c".to_string(),
        },
        RuntimeConfig {
            language: Language::JavaScript,
            program: "node".to_string(),
            inline_flag: "-e".to_string(),
        },
    ]
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            runtimes: default_runtimes(),
        }
    }
}

impl ValidationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Each language may name at most one runtime
    pub fn check_runtimes(&self) -> anyhow::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for runtime in &self.runtimes {
            if !seen.insert(&runtime.language) {
                anyhow::bail!(
                    "Runtime for {} configured more than once",
                    runtime.language.tag()
                );
            }
        }
        Ok(())
    }

    /// Build a runner registry from the configured runtimes
    pub fn registry(&self) -> RunnerRegistry {
        let mut registry = RunnerRegistry::empty();
        for runtime in &self.runtimes {
            registry.register(Box::new(
                ProcessRunner::new(runtime.language.clone(), &runtime.program, &runtime.inline_flag)
                    .with_timeout(self.timeout()),
            ));
        }
        registry
    }
}

/// One interpreter invocation: `<program> <inline_flag> <code>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub language: Language,
    pub program: String,
    pub inline_flag: String,
}

impl CodeshiftConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validation.check_runtimes()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ============================================================================
    // DEFAULT VALUE TESTS
    // ============================================================================

    #[test]
    fn test_codeshift_config_default() {
        let config = CodeshiftConfig::default();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.translation.max_correction_attempts, 3);
        assert_eq!(config.translation.cache.policy, CachePolicy::Unbounded);
        assert_eq!(config.validation.timeout_secs, Some(30));
        assert_eq!(config.validation.runtimes.len(), 2);
    }

    #[test]
    fn test_eviction_policy_mapping() {
        let mut cache = CacheConfig::default();
        assert_eq!(cache.eviction_policy(), EvictionPolicy::Unbounded);

        cache.policy = CachePolicy::Lru;
        cache.capacity = 8;
        assert_eq!(cache.eviction_policy(), EvictionPolicy::Lru { capacity: 8 });

        cache.policy = CachePolicy::Ttl;
        cache.ttl_secs = 5;
        assert_eq!(
            cache.eviction_policy(),
            EvictionPolicy::Ttl {
                capacity: 8,
                ttl: Duration::from_secs(5)
            }
        );
    }

    #[test]
    fn test_registry_from_config() {
        let config = ValidationConfig::default();
        let registry = config.registry();
        assert_eq!(
            registry.languages(),
            vec![Language::JavaScript, Language::Python]
        );
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    // ============================================================================
    // FILE TESTS
    // ============================================================================

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        let mut config = CodeshiftConfig::default();
        config.translation.max_correction_attempts = 5;
        config.translation.cache.policy = CachePolicy::Lru;
        config.save(&path).unwrap();

        let loaded = CodeshiftConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[translation]
max_correction_attempts = 1

[[validation.runtimes]]
language = "py"
program = "python3"
inline_flag = "-c"
"#,
        )
        .unwrap();

        let config = CodeshiftConfig::load(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.translation.max_correction_attempts, 1);
        assert_eq!(config.translation.cache, CacheConfig::default());
        assert_eq!(config.validation.timeout_secs, None);
        assert_eq!(config.validation.runtimes.len(), 1);
        assert_eq!(config.validation.runtimes[0].language, Language::Python);
        assert_eq!(config.validation.runtimes[0].program, "python3");
    }

    #[test]
    fn test_omitted_timeout_waits_forever() {
        let config: CodeshiftConfig = toml::from_str("[validation]\n").unwrap();
        assert_eq!(config.validation.timeout_secs, None);
        assert_eq!(config.validation.timeout(), None);
        assert_eq!(config.validation.runtimes.len(), 2);
    }

    #[test]
    fn test_no_timeout_survives_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        let mut config = CodeshiftConfig::default();
        config.validation.timeout_secs = None;
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("timeout_secs"));
        let loaded = CodeshiftConfig::load(&path).unwrap();
        assert_eq!(loaded.validation.timeout_secs, None);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_config_writes_timeout() {
        let content = toml::to_string_pretty(&CodeshiftConfig::default()).unwrap();
        assert!(content.contains("timeout_secs = 30"));
    }

    #[test]
    fn test_duplicate_runtime_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[[validation.runtimes]]
language = "python"
program = "python"
inline_flag = "-c"

[[validation.runtimes]]
language = "py"
program = "python3"
inline_flag = "-c"
"#,
        )
        .unwrap();

        let err = CodeshiftConfig::load(&path).unwrap_err();
        assert!(err
            .to_string()
            .contains("Runtime for python configured more than once"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = CodeshiftConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CodeshiftConfig::default());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "translation = [").unwrap();
        assert!(CodeshiftConfig::load(&path).is_err());
    }
}
