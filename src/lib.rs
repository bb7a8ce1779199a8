pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{Action, CliConfig};

pub use crate::config::{AppConfig, LocalStorage};
pub use crate::core::{
    batch::{BatchProcessor, BatchSummary},
    classifier::CouponClassifier,
    exclusions::{ExclusionRules, RuleKind, RuleMark},
    store::{PreferenceStats, PreferenceStore},
};
pub use crate::domain::model::{Classification, Coupon, PreferenceCategory, PreferenceLevel, ProcessedCoupon};
pub use crate::utils::error::{CouponError, Result};
