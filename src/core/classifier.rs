use crate::core::learning;
use crate::core::store::PreferenceStore;
use crate::domain::model::{Classification, Coupon, PreferenceLevel};
use crate::domain::ports::Storage;

/// Keyword classifier over a [`PreferenceStore`].
///
/// Matching is first-match-wins: categories are scanned in store order and
/// keywords in list order, and the first substring hit decides the result.
pub struct CouponClassifier<S: Storage> {
    store: PreferenceStore<S>,
}

impl<S: Storage> CouponClassifier<S> {
    pub fn new(store: PreferenceStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PreferenceStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PreferenceStore<S> {
        &mut self.store
    }

    pub fn analyze(&self, title: &str, description: &str, store: &str) -> Classification {
        let text = format!("{} {} {}", title, description, store).to_lowercase();

        for (name, category) in self.store.iter() {
            if let Some(keyword) = category.first_match(&text) {
                tracing::debug!("🏷️ '{}' matched {} via '{}'", title, name, keyword);
                return Classification {
                    level: category.level,
                    category: name.clone(),
                };
            }
        }

        tracing::debug!("🏷️ '{}' matched no category, using default", title);
        Classification::fallback()
    }

    pub fn analyze_coupon(&self, coupon: &Coupon) -> Classification {
        self.analyze(&coupon.title, &coupon.subtitle, &coupon.store)
    }

    pub fn should_activate(&self, title: &str, description: &str, store: &str) -> bool {
        self.analyze(title, description, store).should_activate()
    }

    /// Adds a category built from the title's leading keywords.
    ///
    /// Returns the new category name, or `None` when the title has no usable
    /// keywords. Existing categories are never merged or removed.
    pub fn learn_from_feedback(
        &mut self,
        coupon_title: &str,
        new_level: PreferenceLevel,
    ) -> Option<String> {
        let keywords = learning::extract_keywords(coupon_title);
        if keywords.is_empty() {
            tracing::info!("No usable keywords in '{}', nothing learned", coupon_title);
            return None;
        }

        let name = learning::learned_category_name(coupon_title);
        self.store.add_or_update(
            name.clone(),
            keywords,
            new_level,
            learning::learned_notes(coupon_title),
        );
        Some(name)
    }
}
