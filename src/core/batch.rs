use crate::config::storage::LocalStorage;
use crate::core::classifier::CouponClassifier;
use crate::core::exclusions::{ExclusionRules, RuleMark};
use crate::domain::model::{Classification, Coupon, PreferenceLevel, ProcessedCoupon};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Local, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub activated: usize,
    pub skipped: usize,
    pub excluded: usize,
    pub emphasized: usize,
    pub high: usize,
    pub medium: usize,
    pub not_at_all: usize,
}

impl BatchSummary {
    fn record(&mut self, processed: &ProcessedCoupon) {
        self.total += 1;
        if processed.activated {
            self.activated += 1;
        } else {
            self.skipped += 1;
        }
        if processed.is_excluded {
            self.excluded += 1;
        }
        if processed.is_emphasized {
            self.emphasized += 1;
        }
        match processed.preference_level {
            PreferenceLevel::High => self.high += 1,
            PreferenceLevel::Medium => self.medium += 1,
            PreferenceLevel::NotAtAll => self.not_at_all += 1,
        }
    }

    /// 0..=100，總數為 0 時回傳 0
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Runs the activation decision over a batch of scraped coupons.
pub struct BatchProcessor<'a, S: Storage, E: Storage = LocalStorage> {
    classifier: &'a CouponClassifier<S>,
    exclusions: Option<&'a ExclusionRules<E>>,
    use_preferences: bool,
}

impl<'a, S: Storage> BatchProcessor<'a, S> {
    pub fn new(classifier: &'a CouponClassifier<S>) -> Self {
        Self {
            classifier,
            exclusions: None,
            use_preferences: true,
        }
    }
}

impl<'a, S: Storage, E: Storage> BatchProcessor<'a, S, E> {
    pub fn with_exclusions<R: Storage>(
        self,
        exclusions: &'a ExclusionRules<R>,
    ) -> BatchProcessor<'a, S, R> {
        BatchProcessor {
            classifier: self.classifier,
            exclusions: Some(exclusions),
            use_preferences: self.use_preferences,
        }
    }

    /// 關閉偏好判斷時所有優惠券都以 default 類別處理
    pub fn with_preferences(mut self, enabled: bool) -> Self {
        self.use_preferences = enabled;
        self
    }

    pub fn process_one(&self, coupon: &Coupon, processed_at: DateTime<Utc>) -> ProcessedCoupon {
        let classification = if self.use_preferences {
            self.classifier.analyze_coupon(coupon)
        } else {
            Classification::fallback()
        };
        let mark = self
            .exclusions
            .map(|rules| rules.evaluate(coupon))
            .unwrap_or(RuleMark::None);

        let activated = classification.should_activate() && !mark.is_excluded();
        tracing::debug!(
            "{} [{:<10}] {}",
            if activated { "✓" } else { "✗" },
            classification.level,
            coupon.title
        );

        ProcessedCoupon {
            title: coupon.title.clone(),
            subtitle: coupon.subtitle.clone(),
            store: coupon.store.clone(),
            date_valid: coupon.date_valid.clone(),
            restrictions: coupon.restrictions.clone(),
            activated,
            preference_level: classification.level,
            preference_category: classification.category,
            is_excluded: mark.is_excluded(),
            is_emphasized: mark.is_emphasized(),
            processed_at,
        }
    }

    pub fn process(&self, coupons: &[Coupon]) -> (Vec<ProcessedCoupon>, BatchSummary) {
        let processed_at = Utc::now();
        let mut summary = BatchSummary::default();

        let processed: Vec<ProcessedCoupon> = coupons
            .iter()
            .map(|coupon| {
                let result = self.process_one(coupon, processed_at);
                summary.record(&result);
                result
            })
            .collect();

        tracing::info!(
            "📊 Processed {} coupons: {} activated, {} skipped",
            summary.total,
            summary.activated,
            summary.skipped
        );
        (processed, summary)
    }
}

/// Reads scraped coupons from CSV. Rows without a title are skipped and
/// duplicates by (title, subtitle) keep the first occurrence.
pub fn read_coupons_csv(path: impl AsRef<Path>) -> Result<Vec<Coupon>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    // Excel 匯出的檔案常帶 UTF-8 BOM
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut seen = HashSet::new();
    let mut coupons = Vec::new();

    for row in reader.deserialize::<Coupon>() {
        let mut coupon = row?;
        coupon.title = coupon.title.trim().to_string();
        coupon.subtitle = coupon.subtitle.trim().to_string();
        let description = std::mem::take(&mut coupon.description);
        if coupon.subtitle.is_empty() {
            coupon.subtitle = description.trim().to_string();
        }
        coupon.store = coupon.store.trim().to_string();
        coupon.date_valid = coupon.date_valid.trim().to_string();
        coupon.restrictions = coupon.restrictions.trim().to_string();

        if coupon.title.is_empty() {
            continue;
        }
        if !seen.insert((coupon.title.clone(), coupon.subtitle.clone())) {
            tracing::debug!("Skipping duplicate coupon '{}'", coupon.title);
            continue;
        }
        coupons.push(coupon);
    }

    tracing::info!(
        "📥 Read {} coupons from {}",
        coupons.len(),
        path.as_ref().display()
    );
    Ok(coupons)
}

pub fn write_report_csv(path: impl AsRef<Path>, processed: &[ProcessedCoupon]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in processed {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!("💾 Wrote {} rows to {}", processed.len(), path.display());
    Ok(())
}

/// `coupons_08_28_2025_23_32_02.csv` style report name.
pub fn default_report_path(output_dir: impl AsRef<Path>, now: DateTime<Local>) -> PathBuf {
    output_dir
        .as_ref()
        .join(format!("coupons_{}.csv", now.format("%m_%d_%Y_%H_%M_%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exclusions::RuleKind;
    use crate::core::store::PreferenceStore;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_coupons() -> Vec<Coupon> {
        vec![
            Coupon::new("ממגוון מעדן גבינה 88-103 גרם")
                .with_store("דניאלה")
                .with_subtitle("גבינה טעימה"),
            Coupon::new("ממגוון בירה ויינשטפן 500 מל").with_subtitle("בירה איכותית"),
            Coupon::new("נייר טואלט לילי לבן").with_subtitle("נייר רך"),
            Coupon::new("מזון לכלבים בונזו 3 קג")
                .with_store("לה קט")
                .with_subtitle("מזון חיות"),
            Coupon::new("לחם פרוס").with_subtitle("לחם טרי"),
        ]
    }

    #[test]
    fn test_process_counts_activation() {
        let dir = TempDir::new().unwrap();
        let classifier = CouponClassifier::new(PreferenceStore::open(dir.path().join("p.json")));
        let processor = BatchProcessor::new(&classifier);

        let (processed, summary) = processor.process(&sample_coupons());

        assert_eq!(summary.total, 5);
        assert_eq!(summary.activated, 3);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.high, 2);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.not_at_all, 2);

        let beer = processed.iter().find(|c| c.title.contains("בירה")).unwrap();
        assert_eq!(beer.preference_category, "alcohol_not_at_all");
        assert!(!beer.activated);
    }

    #[test]
    fn test_exclusion_blocks_activation() {
        let dir = TempDir::new().unwrap();
        let classifier = CouponClassifier::new(PreferenceStore::open(dir.path().join("p.json")));
        let mut rules = ExclusionRules::open(dir.path().join("e.json"));
        rules.add("פרוס", RuleKind::Exclude).unwrap();
        rules.add("טואלט", RuleKind::Emphasize).unwrap();

        let processor = BatchProcessor::new(&classifier).with_exclusions(&rules);
        let (processed, summary) = processor.process(&sample_coupons());

        let bread = processed.iter().find(|c| c.title == "לחם פרוס").unwrap();
        assert_eq!(bread.preference_level, PreferenceLevel::High);
        assert!(bread.is_excluded);
        assert!(!bread.activated);

        let paper = processed.iter().find(|c| c.title.contains("טואלט")).unwrap();
        assert!(paper.is_emphasized);
        assert!(paper.activated);

        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.emphasized, 1);
        assert_eq!(summary.activated, 2);
    }

    #[test]
    fn test_disabled_preferences_activate_everything() {
        let dir = TempDir::new().unwrap();
        let classifier = CouponClassifier::new(PreferenceStore::open(dir.path().join("p.json")));
        let processor = BatchProcessor::new(&classifier).with_preferences(false);

        let (processed, summary) = processor.process(&sample_coupons());

        assert_eq!(summary.activated, 5);
        assert!(processed.iter().all(|c| c.preference_category == "default"));
    }

    #[test]
    fn test_read_coupons_csv_handles_bom_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scraped.csv");
        std::fs::write(
            &path,
            "\u{feff}title,subtitle,dateValid,restrictions,percent\n\
             לחם פרוס,לחם טרי,תקף עד: 29/08/2025,מוגבל למימוש אחד,8 יח ב- 26₪\n\
             לחם פרוס,לחם טרי,תקף עד: 29/08/2025,,\n\
             ,ללא כותרת,,,\n\
             לחם פרוס,לחם מלא,,,\n",
        )
        .unwrap();

        let coupons = read_coupons_csv(&path).unwrap();

        assert_eq!(coupons.len(), 2);
        assert_eq!(coupons[0].title, "לחם פרוס");
        assert_eq!(coupons[0].date_valid, "תקף עד: 29/08/2025");
        assert_eq!(coupons[0].restrictions, "מוגבל למימוש אחד");
        assert_eq!(coupons[1].subtitle, "לחם מלא");
    }

    #[test]
    fn test_read_coupons_csv_with_subtitle_and_description() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scraped.csv");
        std::fs::write(
            &path,
            "title,subtitle,description,store\n\
             לחם פרוס,לחם טרי,תיאור ארוך,שופרסל\n\
             ממגוון בירה ויינשטפן 500 מל,,בירה איכותית,\n",
        )
        .unwrap();

        let coupons = read_coupons_csv(&path).unwrap();

        assert_eq!(coupons.len(), 2);
        assert_eq!(coupons[0].subtitle, "לחם טרי");
        assert_eq!(coupons[0].store, "שופרסל");
        assert_eq!(coupons[1].subtitle, "בירה איכותית");
        assert!(coupons.iter().all(|c| c.description.is_empty()));
    }

    #[test]
    fn test_read_coupons_csv_description_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(&path, "title,description\nנייר טואלט לילי,נייר רך\n").unwrap();

        let coupons = read_coupons_csv(&path).unwrap();

        assert_eq!(coupons.len(), 1);
        assert_eq!(coupons[0].subtitle, "נייר רך");
    }

    #[test]
    fn test_report_round_trips_through_csv() {
        let dir = TempDir::new().unwrap();
        let classifier = CouponClassifier::new(PreferenceStore::open(dir.path().join("p.json")));
        let processor = BatchProcessor::new(&classifier);
        let (processed, _) = processor.process(&sample_coupons()[..2]);

        let report = dir.path().join("out/report.csv");
        write_report_csv(&report, &processed).unwrap();

        let mut reader = csv::Reader::from_path(&report).unwrap();
        let rows: Vec<ProcessedCoupon> = reader
            .deserialize::<ProcessedCoupon>()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows, processed);

        let text = std::fs::read_to_string(&report).unwrap();
        assert!(text.starts_with("title,subtitle,store,dateValid,restrictions,activated,preference_level"));
        assert!(text.contains("not_at_all"));
    }

    #[test]
    fn test_default_report_path_format() {
        let now = Local.with_ymd_and_hms(2025, 8, 28, 23, 32, 2).unwrap();
        assert_eq!(
            default_report_path("data", now),
            PathBuf::from("data/coupons_08_28_2025_23_32_02.csv")
        );
    }
}
