use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::CouponError;

/// 優惠券的三段式偏好等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceLevel {
    High,
    Medium,
    NotAtAll,
}

impl PreferenceLevel {
    pub const ALL: [PreferenceLevel; 3] = [
        PreferenceLevel::High,
        PreferenceLevel::Medium,
        PreferenceLevel::NotAtAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceLevel::High => "high",
            PreferenceLevel::Medium => "medium",
            PreferenceLevel::NotAtAll => "not_at_all",
        }
    }

    /// 除了 not_at_all 以外都值得啟用
    pub fn is_activation_worthy(&self) -> bool {
        *self != PreferenceLevel::NotAtAll
    }
}

impl fmt::Display for PreferenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PreferenceLevel {
    type Err = CouponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "high" => Ok(PreferenceLevel::High),
            "medium" => Ok(PreferenceLevel::Medium),
            "not_at_all" => Ok(PreferenceLevel::NotAtAll),
            other => Err(CouponError::UnknownLevel {
                value: other.to_string(),
            }),
        }
    }
}

/// A named keyword rule. The name is the key in the store and is not repeated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceCategory {
    pub keywords: Vec<String>,
    pub level: PreferenceLevel,
    #[serde(default)]
    pub notes: String,
}

impl PreferenceCategory {
    pub fn new(keywords: Vec<String>, level: PreferenceLevel, notes: impl Into<String>) -> Self {
        Self {
            keywords,
            level,
            notes: notes.into(),
        }
    }

    /// 回傳第一個命中的關鍵字 (`text` 需已轉小寫)
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| text.contains(&keyword.to_lowercase()))
            .map(String::as_str)
    }
}

/// Coupon record handed over by the scraper or a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Older exports carry the subtitle text under `description`.
    #[serde(default, skip_serializing)]
    pub description: String,
    #[serde(default)]
    pub store: String,
    #[serde(default, rename = "dateValid", alias = "date_valid")]
    pub date_valid: String,
    #[serde(default)]
    pub restrictions: String,
}

impl Coupon {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = store.into();
        self
    }

    pub fn with_restrictions(mut self, restrictions: impl Into<String>) -> Self {
        self.restrictions = restrictions.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub level: PreferenceLevel,
    pub category: String,
}

impl Classification {
    pub const DEFAULT_CATEGORY: &'static str = "default";

    /// 沒有任何類別命中時的預設結果
    pub fn fallback() -> Self {
        Self {
            level: PreferenceLevel::Medium,
            category: Self::DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.category == Self::DEFAULT_CATEGORY
    }

    pub fn should_activate(&self) -> bool {
        self.level.is_activation_worthy()
    }
}

/// 批次處理後的一筆結果，對應輸出 CSV 的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedCoupon {
    pub title: String,
    pub subtitle: String,
    pub store: String,
    #[serde(rename = "dateValid")]
    pub date_valid: String,
    pub restrictions: String,
    pub activated: bool,
    pub preference_level: PreferenceLevel,
    pub preference_category: String,
    pub is_excluded: bool,
    pub is_emphasized: bool,
    pub processed_at: DateTime<Utc>,
}
