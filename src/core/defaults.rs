use crate::domain::model::{PreferenceCategory, PreferenceLevel};
use indexmap::IndexMap;

/// 預設類別，順序即比對優先順序
const DEFAULT_CATEGORIES: &[(&str, &[&str], PreferenceLevel, &str)] = &[
    (
        "dairy_high",
        &["חלב", "גבינה", "יוגורט", "חלב", "דניאלה", "יטבתה", "שטראוס", "תנובה"],
        PreferenceLevel::High,
        "Dairy products - frequently used",
    ),
    (
        "bread_high",
        &["לחם", "לחמניה", "בייגל", "פיתה", "מלווח"],
        PreferenceLevel::High,
        "Bread and bakery products",
    ),
    (
        "cleaning_medium",
        &["ניקוי", "סבון", "אל סבון", "מדיח", "כביסה", "פיניש"],
        PreferenceLevel::Medium,
        "Cleaning products - occasional need",
    ),
    (
        "snacks_medium",
        &["חטיף", "עוגיות", "ביסקוויט", "שוקולד", "גלידה"],
        PreferenceLevel::Medium,
        "Snacks and sweets",
    ),
    (
        "alcohol_not_at_all",
        &["בירה", "יין", "וודקה", "וויסקי", "ליקר", "אלכוהול"],
        PreferenceLevel::NotAtAll,
        "Alcohol - not interested",
    ),
    (
        "pet_food_not_at_all",
        &["מזון לכלבים", "מזון לחתולים", "בונזו", "לה קט", "חיות"],
        PreferenceLevel::NotAtAll,
        "Pet food - no pets",
    ),
    (
        "baby_products_not_at_all",
        &["תינוק", "חיתול", "מזון תינוקות", "בייבי"],
        PreferenceLevel::NotAtAll,
        "Baby products - not needed",
    ),
];

/// Seed set written when no usable preference file exists.
pub fn default_preferences() -> IndexMap<String, PreferenceCategory> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, keywords, level, notes)| {
            (
                name.to_string(),
                PreferenceCategory::new(
                    keywords.iter().map(|k| k.to_string()).collect(),
                    *level,
                    *notes,
                ),
            )
        })
        .collect()
}
