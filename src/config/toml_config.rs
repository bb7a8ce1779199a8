use crate::utils::error::{CouponError, Result};
use crate::utils::validation::{validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_CONFIG_FILE: &str = "coupon-prefs.toml";
pub const DEFAULT_PREFERENCES_FILE: &str = "coupon_preferences.json";
pub const DEFAULT_EXCLUSIONS_FILE: &str = "coupon_exclusions.json";
pub const DEFAULT_OUTPUT_PATH: &str = "./data";

/// 控制是否套用偏好判斷的環境變數
pub const USE_PREFERENCES_ENV: &str = "USE_PREFERENCES";

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub preferences: PreferencesSection,
    #[serde(default)]
    pub exclusions: ExclusionsSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesSection {
    #[serde(default = "default_preferences_file")]
    pub file: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionsSection {
    #[serde(default = "default_exclusions_file")]
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_preferences_file() -> String {
    DEFAULT_PREFERENCES_FILE.to_string()
}

fn default_exclusions_file() -> String {
    DEFAULT_EXCLUSIONS_FILE.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for PreferencesSection {
    fn default() -> Self {
        Self {
            file: default_preferences_file(),
            enabled: default_enabled(),
        }
    }
}

impl Default for ExclusionsSection {
    fn default() -> Self {
        Self {
            file: default_exclusions_file(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CouponError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CouponError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// `USE_PREFERENCES` overrides `preferences.enabled` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(USE_PREFERENCES_ENV) {
            self.preferences.enabled = parse_env_flag(&value);
            tracing::debug!(
                "{}={} -> preferences enabled: {}",
                USE_PREFERENCES_ENV,
                value,
                self.preferences.enabled
            );
        }
    }

    pub fn use_preferences(&self) -> bool {
        self.preferences.enabled
    }
}

/// `true`, `1`, `t` (any case) are truthy; everything else is false.
pub fn parse_env_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "t")
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_path("preferences.file", &self.preferences.file)?;
        validate_path("exclusions.file", &self.exclusions.file)?;
        validate_path("output.path", &self.output.path)?;

        if self.preferences.file == self.exclusions.file {
            return Err(CouponError::InvalidConfigValueError {
                field: "exclusions.file".to_string(),
                value: self.exclusions.file.clone(),
                reason: "Must differ from preferences.file".to_string(),
            });
        }

        Ok(())
    }
}
