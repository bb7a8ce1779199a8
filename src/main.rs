use anyhow::Context;
use chrono::Local;
use clap::Parser;
use coupon_prefs::core::batch::{self, BatchProcessor, BatchSummary};
use coupon_prefs::utils::validation::{
    parse_keyword_list, validate_file_extension, validate_level, validate_required_text, Validate,
};
use coupon_prefs::utils::{error::CouponError, logger};
use coupon_prefs::{
    Action, AppConfig, CliConfig, CouponClassifier, ExclusionRules, LocalStorage, PreferenceStore,
    RuleKind,
};
use std::path::PathBuf;

type Classifier = CouponClassifier<LocalStorage>;

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve_app_config() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    match cli.action {
        Action::List => list_preferences(&open_classifier(&config)),
        Action::Add => add_preference(&mut open_classifier(&config), &cli),
        Action::Remove => remove_preference(&mut open_classifier(&config), &cli),
        Action::Analyze => analyze_coupon(&open_classifier(&config), &cli),
        Action::Learn => learn_preference(&mut open_classifier(&config), &cli),
        Action::Stats => show_statistics(&open_classifier(&config)),
        Action::Process => process_csv(&open_classifier(&config), &config, &cli)?,
        Action::Exclusions => list_exclusions(&open_exclusions(&config)),
        Action::Exclude => mark_keyword(&mut open_exclusions(&config), &cli, RuleKind::Exclude)?,
        Action::Emphasize => {
            mark_keyword(&mut open_exclusions(&config), &cli, RuleKind::Emphasize)?
        }
        Action::Unmark => unmark_keyword(&mut open_exclusions(&config), &cli)?,
    }

    Ok(())
}

fn fail(e: &CouponError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

/// 使用者輸入錯誤只印訊息，不視為程式失敗
fn input_error(e: &CouponError) {
    println!("Error: {}", e.user_friendly_message());
}

fn open_classifier(config: &AppConfig) -> Classifier {
    tracing::debug!("📁 Preferences file: {}", config.preferences.file);
    CouponClassifier::new(PreferenceStore::open(&config.preferences.file))
}

fn open_exclusions(config: &AppConfig) -> ExclusionRules<LocalStorage> {
    tracing::debug!("📁 Exclusions file: {}", config.exclusions.file);
    ExclusionRules::open(&config.exclusions.file)
}

fn list_preferences(classifier: &Classifier) {
    let preferences = classifier.store().list();
    if preferences.is_empty() {
        println!("No preferences found.");
        return;
    }

    for (name, pref) in &preferences {
        println!("\n{}:", name);
        println!("  Level: {}", pref.level);
        println!("  Keywords: {}", pref.keywords.join(", "));
        println!("  Notes: {}", pref.notes);
    }
}

fn add_preference(classifier: &mut Classifier, cli: &CliConfig) {
    let (Some(name), Some(keywords), Some(level)) = (&cli.name, &cli.keywords, &cli.level) else {
        println!("Error: --name, --keywords, and --level are required for add");
        return;
    };

    // 先完整驗證，避免部分寫入
    let level = match validate_level(level) {
        Ok(level) => level,
        Err(e) => return input_error(&e),
    };
    let keywords = match parse_keyword_list("--keywords", keywords) {
        Ok(keywords) => keywords,
        Err(e) => return input_error(&e),
    };
    if let Err(e) = validate_required_text("--name", &cli.name) {
        return input_error(&e);
    }

    classifier.store_mut().add_or_update(
        name.trim(),
        keywords,
        level,
        cli.notes.clone().unwrap_or_default(),
    );
    println!("Added preference: {}", name.trim());
}

fn remove_preference(classifier: &mut Classifier, cli: &CliConfig) {
    let name = match validate_required_text("--name", &cli.name) {
        Ok(name) => name,
        Err(_) => {
            println!("Error: --name is required for remove");
            return;
        }
    };

    if classifier.store_mut().remove(name) {
        println!("Removed preference: {}", name);
    } else {
        println!("Preference not found: {}", name);
    }
}

fn analyze_coupon(classifier: &Classifier, cli: &CliConfig) {
    let title = match validate_required_text("--title", &cli.title) {
        Ok(title) => title,
        Err(_) => {
            println!("Error: --title is required for analyze");
            return;
        }
    };
    let description = cli.description.as_deref().unwrap_or_default();
    let store = cli.store.as_deref().unwrap_or_default();

    let result = classifier.analyze(title, description, store);
    println!("Title: {}", title);
    println!("Preference Level: {}", result.level);
    println!("Matched Category: {}", result.category);
    println!("Should Activate: {}", result.should_activate());

    if result.is_fallback() {
        println!(
            "\nThis coupon matched no specific preferences. Run 'learn --title ... --level ...' to add one."
        );
    }
}

fn learn_preference(classifier: &mut Classifier, cli: &CliConfig) {
    let (Ok(title), Some(level)) = (validate_required_text("--title", &cli.title), &cli.level)
    else {
        println!("Error: --title and --level are required for learn");
        return;
    };
    let level = match validate_level(level) {
        Ok(level) => level,
        Err(e) => return input_error(&e),
    };

    match classifier.learn_from_feedback(title, level) {
        Some(name) => {
            let keywords = classifier
                .store()
                .get(&name)
                .map(|c| c.keywords.join(", "))
                .unwrap_or_default();
            println!("Learned preference: {}", name);
            println!("  Level: {}", level);
            println!("  Keywords: {}", keywords);
        }
        None => println!("No usable keywords found in: {}", title),
    }
}

fn show_statistics(classifier: &Classifier) {
    let stats = classifier.store().statistics();
    if stats.total_categories == 0 {
        println!("No preferences found.");
        return;
    }

    println!("Preference Statistics:");
    println!("{}", "-".repeat(30));
    println!("Total categories: {}", stats.total_categories);
    println!("Total keywords: {}", stats.total_keywords);
    println!("High preference: {} categories", stats.high);
    println!("Medium preference: {} categories", stats.medium);
    println!("Not interested: {} categories", stats.not_at_all);
}

fn process_csv(classifier: &Classifier, config: &AppConfig, cli: &CliConfig) -> anyhow::Result<()> {
    let input = match validate_required_text("--input", &cli.input) {
        Ok(input) => input,
        Err(_) => {
            println!("Error: --input is required for process");
            return Ok(());
        }
    };
    if let Err(e) = validate_file_extension("--input", input, &["csv"]) {
        input_error(&e);
        return Ok(());
    }

    let coupons = batch::read_coupons_csv(input)
        .with_context(|| format!("failed to read coupons from {}", input))?;
    let exclusions = open_exclusions(config);

    if !config.use_preferences() {
        tracing::info!("Preferences disabled, every coupon uses the default level");
    }
    let processor = BatchProcessor::new(classifier)
        .with_exclusions(&exclusions)
        .with_preferences(config.use_preferences());
    let (processed, summary) = processor.process(&coupons);

    let output = cli
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| batch::default_report_path(&config.output.path, Local::now()));
    batch::write_report_csv(&output, &processed)
        .with_context(|| format!("failed to write report to {}", output.display()))?;

    print_summary(&summary);
    println!("📁 Report saved to: {}", output.display());
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!("Preference Analysis Results:");
    println!("  {:<21} {:3}", "Total coupons:", summary.total);
    for (label, count) in [
        ("High preference:", summary.high),
        ("Medium preference:", summary.medium),
        ("Not interested:", summary.not_at_all),
        ("Excluded:", summary.excluded),
        ("Emphasized:", summary.emphasized),
        ("Would activate:", summary.activated),
        ("Would skip:", summary.skipped),
    ] {
        println!(
            "  {:<21} {:3} ({:.1}%)",
            label,
            count,
            summary.percent(count)
        );
    }
}

fn list_exclusions(rules: &ExclusionRules<LocalStorage>) {
    if rules.rules().is_empty() {
        println!("No exclusion or emphasis keywords.");
        return;
    }

    for kind in [RuleKind::Exclude, RuleKind::Emphasize] {
        println!("{}: {}", kind, rules.keywords(kind).join(", "));
    }
}

fn mark_keyword(
    rules: &mut ExclusionRules<LocalStorage>,
    cli: &CliConfig,
    kind: RuleKind,
) -> anyhow::Result<()> {
    let keyword = match validate_required_text("--keyword", &cli.keyword) {
        Ok(keyword) => keyword,
        Err(_) => {
            println!("Error: --keyword is required for {}", kind);
            return Ok(());
        }
    };

    match rules.add(keyword, kind) {
        Ok(rule) => println!("Added {} keyword: {}", rule.kind, rule.keyword),
        Err(e @ CouponError::DuplicateKeyword { .. }) => input_error(&e),
        Err(e) => return Err(e).context("failed to save exclusion rules"),
    }
    Ok(())
}

fn unmark_keyword(rules: &mut ExclusionRules<LocalStorage>, cli: &CliConfig) -> anyhow::Result<()> {
    let keyword = match validate_required_text("--keyword", &cli.keyword) {
        Ok(keyword) => keyword,
        Err(_) => {
            println!("Error: --keyword is required for unmark");
            return Ok(());
        }
    };

    if rules.remove(keyword).context("failed to save exclusion rules")? {
        println!("Removed keyword: {}", keyword);
    } else {
        println!("Keyword not found: {}", keyword);
    }
    Ok(())
}
