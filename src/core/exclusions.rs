use crate::config::storage::LocalStorage;
use crate::domain::model::Coupon;
use crate::domain::ports::Storage;
use crate::utils::error::{CouponError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Exclude,
    Emphasize,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Exclude => f.write_str("exclude"),
            RuleKind::Emphasize => f.write_str("emphasize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub kind: RuleKind,
    pub created_at: DateTime<Utc>,
}

/// 一張優惠券最多只會被標記一種狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMark {
    Excluded,
    Emphasized,
    None,
}

impl RuleMark {
    pub fn is_excluded(&self) -> bool {
        matches!(self, RuleMark::Excluded)
    }

    pub fn is_emphasized(&self) -> bool {
        matches!(self, RuleMark::Emphasized)
    }
}

/// Exclude/emphasize keyword list kept next to the preference file.
///
/// Independent of preference categories: an excluded coupon is skipped even
/// when its category would activate it.
pub struct ExclusionRules<S: Storage> {
    storage: S,
    file_name: String,
    rules: Vec<KeywordRule>,
}

impl ExclusionRules<LocalStorage> {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let (storage, file_name) = LocalStorage::for_file(path);
        Self::new(storage, file_name)
    }
}

impl<S: Storage> ExclusionRules<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let rules = if storage.exists(&file_name) {
            match Self::read_rules(&storage, &file_name) {
                Ok(rules) => rules,
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Error loading exclusion rules from {}: {}. Starting empty",
                        file_name,
                        e
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Self {
            storage,
            file_name,
            rules,
        }
    }

    fn read_rules(storage: &S, file_name: &str) -> Result<Vec<KeywordRule>> {
        let data = storage.read_file(file_name)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save(&self) -> Result<()> {
        self.write_rules(&self.rules)
    }

    fn write_rules(&self, rules: &[KeywordRule]) -> Result<()> {
        let json = serde_json::to_string_pretty(rules)?;
        self.storage.write_file(&self.file_name, json.as_bytes())
    }

    pub fn add(&mut self, keyword: &str, kind: RuleKind) -> Result<&KeywordRule> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(CouponError::ValidationError {
                message: "Keyword is required".to_string(),
            });
        }
        if self.rules.iter().any(|r| r.keyword == keyword) {
            return Err(CouponError::DuplicateKeyword {
                keyword: keyword.to_string(),
            });
        }

        // 寫檔成功後才更新記憶體中的規則
        let mut candidate = self.rules.clone();
        candidate.push(KeywordRule {
            keyword: keyword.to_string(),
            kind,
            created_at: Utc::now(),
        });
        self.write_rules(&candidate)?;
        self.rules = candidate;
        tracing::info!("➕ {} keyword '{}' added", kind, keyword);

        Ok(&self.rules[self.rules.len() - 1])
    }

    pub fn remove(&mut self, keyword: &str) -> Result<bool> {
        let keyword = keyword.trim();
        if !self.rules.iter().any(|r| r.keyword == keyword) {
            return Ok(false);
        }

        let candidate: Vec<KeywordRule> = self
            .rules
            .iter()
            .filter(|r| r.keyword != keyword)
            .cloned()
            .collect();
        self.write_rules(&candidate)?;
        self.rules = candidate;
        tracing::info!("➖ keyword '{}' removed", keyword);
        Ok(true)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn keywords(&self, kind: RuleKind) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.keyword.as_str())
            .collect()
    }

    fn any_match(&self, kind: RuleKind, title: &str, subtitle: &str, restrictions: &str) -> bool {
        let text = format!("{} {} {}", title, subtitle, restrictions).to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.kind == kind)
            .any(|r| text.contains(&r.keyword.to_lowercase()))
    }

    pub fn is_excluded(&self, title: &str, subtitle: &str, restrictions: &str) -> bool {
        self.any_match(RuleKind::Exclude, title, subtitle, restrictions)
    }

    pub fn is_emphasized(&self, title: &str, subtitle: &str, restrictions: &str) -> bool {
        self.any_match(RuleKind::Emphasize, title, subtitle, restrictions)
    }

    /// Exclusion takes precedence over emphasis.
    pub fn evaluate(&self, coupon: &Coupon) -> RuleMark {
        if self.is_excluded(&coupon.title, &coupon.subtitle, &coupon.restrictions) {
            RuleMark::Excluded
        } else if self.is_emphasized(&coupon.title, &coupon.subtitle, &coupon.restrictions) {
            RuleMark::Emphasized
        } else {
            RuleMark::None
        }
    }
}
