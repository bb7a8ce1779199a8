use crate::config::toml_config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::utils::error::Result;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// List every preference category
    List,
    /// Add or update a category (--name, --keywords, --level)
    Add,
    /// Remove a category (--name)
    Remove,
    /// Classify a coupon (--title, optional --description/--store)
    Analyze,
    /// Learn a category from a coupon title (--title, --level)
    Learn,
    /// Show category counts per level
    Stats,
    /// Classify a scraped CSV and write a report (--input, optional --output)
    Process,
    /// List exclusion/emphasis keywords
    Exclusions,
    /// Never activate coupons containing --keyword
    Exclude,
    /// Highlight coupons containing --keyword
    Emphasize,
    /// Drop an exclusion/emphasis --keyword
    Unmark,
}

/// Level and keyword flags stay as plain strings so that missing or
/// invalid values are reported by the command instead of by clap.
#[derive(Debug, Clone, Parser)]
#[command(name = "coupon-prefs")]
#[command(about = "Manage coupon preferences and activation rules")]
pub struct CliConfig {
    #[arg(value_enum)]
    pub action: Action,

    #[arg(long, help = "Preference category name")]
    pub name: Option<String>,

    #[arg(long, help = "Comma-separated keywords")]
    pub keywords: Option<String>,

    #[arg(long, help = "high, medium or not_at_all")]
    pub level: Option<String>,

    #[arg(long, help = "Optional notes")]
    pub notes: Option<String>,

    #[arg(long, help = "Coupon title to analyze")]
    pub title: Option<String>,

    #[arg(long, help = "Coupon description")]
    pub description: Option<String>,

    #[arg(long, help = "Store name")]
    pub store: Option<String>,

    #[arg(long, help = "Exclusion/emphasis keyword")]
    pub keyword: Option<String>,

    #[arg(long, help = "Scraped coupons CSV to process")]
    pub input: Option<String>,

    #[arg(long, help = "Report CSV path (default: timestamped file in the output path)")]
    pub output: Option<String>,

    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, help = "TOML configuration file")]
    pub config: String,

    #[arg(long, help = "Override the preference file location")]
    pub preferences_file: Option<String>,

    #[arg(long, help = "Override the exclusion file location")]
    pub exclusions_file: Option<String>,

    #[arg(long, help = "Override the report output directory")]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// TOML 檔 -> 環境變數 -> 命令列旗標，後者覆蓋前者
    pub fn resolve_app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load_or_default(&self.config)?;
        config.apply_env_overrides();

        if let Some(file) = &self.preferences_file {
            config.preferences.file = file.clone();
        }
        if let Some(file) = &self.exclusions_file {
            config.exclusions.file = file.clone();
        }
        if let Some(path) = &self.output_path {
            config.output.path = path.clone();
        }

        Ok(config)
    }
}
