use crate::config::storage::LocalStorage;
use crate::core::defaults::default_preferences;
use crate::domain::model::{PreferenceCategory, PreferenceLevel};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use indexmap::IndexMap;
use std::path::Path;

pub type Preferences = IndexMap<String, PreferenceCategory>;

/// 各等級的類別數量統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceStats {
    pub total_categories: usize,
    pub total_keywords: usize,
    pub high: usize,
    pub medium: usize,
    pub not_at_all: usize,
}

/// File-backed, insertion-ordered collection of preference categories.
///
/// Iteration order is the match precedence used by the classifier, so the
/// on-disk JSON object keeps the same key order as memory.
pub struct PreferenceStore<S: Storage> {
    storage: S,
    file_name: String,
    preferences: Preferences,
}

impl PreferenceStore<LocalStorage> {
    /// 以單一 JSON 檔案作為 backing location 開啟
    pub fn open(path: impl AsRef<Path>) -> Self {
        let (storage, file_name) = LocalStorage::for_file(path);
        Self::new(storage, file_name)
    }
}

impl<S: Storage> PreferenceStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            file_name: file_name.into(),
            preferences: Preferences::new(),
        };
        store.load();
        store
    }

    /// Reloads from storage. Missing or unreadable files are replaced with the
    /// default set, which is written back immediately.
    pub fn load(&mut self) {
        if !self.storage.exists(&self.file_name) {
            tracing::info!(
                "📁 No preference file at {}, creating defaults",
                self.file_name
            );
            self.reset_to_defaults();
            return;
        }

        match self.try_load() {
            Ok(preferences) => {
                tracing::debug!(
                    "Loaded {} preference categories from {}",
                    preferences.len(),
                    self.file_name
                );
                self.preferences = preferences;
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Error loading preferences from {}: {}. Falling back to defaults",
                    self.file_name,
                    e
                );
                self.reset_to_defaults();
            }
        }
    }

    /// 讀取並解析檔案，不做任何回復處理
    pub fn try_load(&self) -> Result<Preferences> {
        let data = self.storage.read_file(&self.file_name)?;
        let preferences: Preferences = serde_json::from_slice(&data)?;
        Ok(preferences)
    }

    /// Persists the whole mapping. Failures are logged; memory stays authoritative.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            tracing::warn!(
                "⚠️ Error saving preferences to {}: {}",
                self.file_name,
                e
            );
        }
    }

    pub fn try_save(&self) -> Result<()> {
        // serde_json 不跳脫非 ASCII 字元，希伯來文會原樣寫出
        let json = serde_json::to_string_pretty(&self.preferences)?;
        self.storage.write_file(&self.file_name, json.as_bytes())?;
        tracing::debug!(
            "Saved {} preference categories to {}",
            self.preferences.len(),
            self.file_name
        );
        Ok(())
    }

    fn reset_to_defaults(&mut self) {
        self.preferences = default_preferences();
        self.save();
    }

    /// Inserts or replaces `name`. A replaced category keeps its position.
    pub fn add_or_update(
        &mut self,
        name: impl Into<String>,
        keywords: Vec<String>,
        level: PreferenceLevel,
        notes: impl Into<String>,
    ) {
        let name = name.into();
        tracing::info!("➕ Preference {} set to {} ({} keywords)", name, level, keywords.len());
        self.preferences
            .insert(name, PreferenceCategory::new(keywords, level, notes));
        self.save();
    }

    pub fn remove(&mut self, name: &str) -> bool {
        // shift_remove 保留其餘類別的相對順序
        if self.preferences.shift_remove(name).is_some() {
            tracing::info!("➖ Preference {} removed", name);
            self.save();
            true
        } else {
            false
        }
    }

    pub fn list(&self) -> Preferences {
        self.preferences.clone()
    }

    pub fn get(&self, name: &str) -> Option<&PreferenceCategory> {
        self.preferences.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PreferenceCategory)> {
        self.preferences.iter()
    }

    pub fn len(&self) -> usize {
        self.preferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty()
    }

    pub fn statistics(&self) -> PreferenceStats {
        self.preferences.values().fold(
            PreferenceStats {
                total_categories: self.preferences.len(),
                ..Default::default()
            },
            |mut stats, category| {
                stats.total_keywords += category.keywords.len();
                match category.level {
                    PreferenceLevel::High => stats.high += 1,
                    PreferenceLevel::Medium => stats.medium += 1,
                    PreferenceLevel::NotAtAll => stats.not_at_all += 1,
                }
                stats
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CouponError;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStorage {
        files: RefCell<HashMap<String, Vec<u8>>>,
        writes: Cell<usize>,
        fail_writes: bool,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let storage = Self::default();
            storage
                .files
                .borrow_mut()
                .insert(path.to_string(), data.as_bytes().to_vec());
            storage
        }

        fn get_file(&self, path: &str) -> Option<String> {
            self.files
                .borrow()
                .get(path)
                .map(|d| String::from_utf8_lossy(d).into_owned())
        }
    }

    impl Storage for MockStorage {
        fn exists(&self, path: &str) -> bool {
            self.files.borrow().contains_key(path)
        }

        fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.borrow().get(path).cloned().ok_or_else(|| {
                CouponError::IoError(std::io::Error::from(std::io::ErrorKind::NotFound))
            })
        }

        fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.fail_writes {
                return Err(CouponError::IoError(std::io::Error::from(
                    std::io::ErrorKind::PermissionDenied,
                )));
            }
            self.writes.set(self.writes.get() + 1);
            self.files
                .borrow_mut()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_missing_file_seeds_and_persists_defaults() {
        let storage = MockStorage::default();
        let store = PreferenceStore::new(&storage, "prefs.json");

        assert_eq!(store.list(), default_preferences());
        assert_eq!(storage.writes.get(), 1);
        assert!(storage.get_file("prefs.json").is_some());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let storage = MockStorage::with_file("prefs.json", "{ not json");
        let store = PreferenceStore::new(&storage, "prefs.json");

        assert!(store.get("dairy_high").is_some());
        assert_eq!(store.len(), default_preferences().len());
        assert!(store.try_load().is_ok(), "defaults should have been rewritten");
    }

    #[test]
    fn test_unknown_level_in_file_falls_back_to_defaults() {
        let storage = MockStorage::with_file(
            "prefs.json",
            r#"{"custom": {"keywords": ["x"], "level": "sometimes", "notes": ""}}"#,
        );
        let store = PreferenceStore::new(&storage, "prefs.json");

        assert!(store.get("custom").is_none());
        assert!(store.get("alcohol_not_at_all").is_some());
    }

    #[test]
    fn test_existing_file_is_loaded_without_write() {
        let storage = MockStorage::with_file(
            "prefs.json",
            r#"{"b_rule": {"keywords": ["b"], "level": "high"}, "a_rule": {"keywords": ["a"], "level": "not_at_all", "notes": "n"}}"#,
        );
        let store = PreferenceStore::new(&storage, "prefs.json");

        let names: Vec<&String> = store.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b_rule", "a_rule"]);
        assert_eq!(store.get("a_rule").unwrap().notes, "n");
        assert_eq!(storage.writes.get(), 0);
    }

    #[test]
    fn test_save_keeps_hebrew_unescaped() {
        let storage = MockStorage::default();
        let _store = PreferenceStore::new(&storage, "prefs.json");

        let content = storage.get_file("prefs.json").unwrap();
        assert!(content.contains("גבינה"));
        assert!(!content.contains("\\u05"));
    }

    #[test]
    fn test_remove_missing_does_not_write() {
        let storage = MockStorage::default();
        let mut store = PreferenceStore::new(&storage, "prefs.json");
        let before = store.list();
        let writes = storage.writes.get();

        assert!(!store.remove("no_such_category"));
        assert_eq!(storage.writes.get(), writes);
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_remove_preserves_order_of_remaining() {
        let storage = MockStorage::default();
        let mut store = PreferenceStore::new(&storage, "prefs.json");

        assert!(store.remove("bread_high"));
        let names: Vec<&str> = store.iter().map(|(name, _)| name.as_str()).take(3).collect();
        assert_eq!(names, vec!["dairy_high", "cleaning_medium", "snacks_medium"]);
    }

    #[test]
    fn test_update_keeps_position() {
        let storage = MockStorage::default();
        let mut store = PreferenceStore::new(&storage, "prefs.json");

        store.add_or_update(
            "bread_high",
            vec!["באגט".to_string()],
            PreferenceLevel::Medium,
            "",
        );

        let (index, _, category) = store.preferences.get_full("bread_high").unwrap();
        assert_eq!(index, 1);
        assert_eq!(category.level, PreferenceLevel::Medium);
        assert_eq!(category.keywords, vec!["באגט"]);
    }

    #[test]
    fn test_list_returns_independent_copy() {
        let storage = MockStorage::default();
        let store = PreferenceStore::new(&storage, "prefs.json");

        let mut copy = store.list();
        copy.clear();

        assert!(!store.is_empty());
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let storage = MockStorage {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = PreferenceStore::new(&storage, "prefs.json");

        store.add_or_update("fruits_high", vec!["תפוח".to_string()], PreferenceLevel::High, "");

        assert!(store.get("fruits_high").is_some());
        assert!(storage.get_file("prefs.json").is_none());
        assert!(store.try_save().is_err());
    }

    #[test]
    fn test_statistics_of_defaults() {
        let storage = MockStorage::default();
        let store = PreferenceStore::new(&storage, "prefs.json");

        let stats = store.statistics();
        assert_eq!(stats.total_categories, 7);
        assert_eq!(stats.high, 2);
        assert_eq!(stats.medium, 2);
        assert_eq!(stats.not_at_all, 3);
        assert_eq!(stats.total_keywords, 8 + 5 + 6 + 5 + 6 + 5 + 4);
    }
}
