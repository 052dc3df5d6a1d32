//! `food-checkr`: normalize food product data, score it, and check it against a health profile.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and load config ([`config::load_config`]).
//! 2. Initialise `tracing` on stderr.
//! 3. Load the health profile and apply `--allergy` edits ([`profile`]).
//! 4. Read product payloads from files and/or look them up online ([`registry`]).
//! 5. Normalize every payload into a [`models::Product`] ([`normalizer`]).
//! 6. Score concern, match allergy warnings and flag banned ingredients
//!    ([`scoring`], [`profile::matcher`], [`regulatory`]).
//! 7. Render the requested report ([`report`]).
//! 8. Exit `0`, or `1` when nothing loaded or any product is high concern or
//!    carries a high-severity allergy warning.

mod cli;
mod config;
mod detector;
mod models;
mod normalizer;
mod profile;
mod registry;
mod regulatory;
mod report;
mod scoring;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::{load_config, LogFormat, LoggingConfig, LookupConfig, RegulatoryConfig};
use models::{HealthProfile, Product, ProductReport};
use profile::{FileProfileStore, ProfileStore};
use registry::{Fetched, Query};
use scoring::rules::RuleTable;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = load_config(&base_dir, cli.config.as_deref())?;
    init_logging(&config.logging)?;

    let profile = load_profile(&cli, &base_dir)?;

    // Gather products: local payload files first, then online lookups
    let mut loaded: Vec<(String, Product)> = Vec::new();

    for path in &cli.inputs {
        let payloads = read_payloads(path)?;
        if !cli.quiet {
            eprintln!(
                "  {} {} {} product{}",
                "→".cyan(),
                path.display(),
                payloads.len(),
                if payloads.len() == 1 { "" } else { "s" }
            );
        }
        loaded.extend(payloads.into_iter().map(|(origin, raw)| (origin, normalizer::normalize(&raw))));
    }

    let client = if cli.has_lookups() || cli.insight {
        Some(build_client(&config.lookup)?)
    } else {
        None
    };

    if let Some(client) = &client {
        if cli.has_lookups() {
            let fetched = lookup_online(client, &cli, &config.lookup).await?;
            loaded.extend(
                fetched
                    .into_iter()
                    .map(|(origin, f)| (origin, normalizer::normalize_as(f.source, &f.raw))),
            );
        }
    }

    if loaded.is_empty() {
        eprintln!("No products to check. Pass payload files, --barcode or --search.");
        std::process::exit(1);
    }

    // Score and personalize
    let rules = RuleTable::from_config(&config.scoring);
    tracing::debug!(rules = rules.rules().len(), products = loaded.len(), "scoring products");
    let mut reports: Vec<ProductReport> = loaded
        .into_iter()
        .map(|(origin, product)| check_product(origin, product, &rules, &profile, &config.regulatory))
        .collect();

    if cli.insight {
        if let Some(client) = &client {
            attach_insights(client, &mut reports, &config.lookup, cli.quiet).await?;
        }
    }

    // Resolve effective report format: --pdf implies PDF format
    let report_format = match &cli.pdf {
        Some(_) => ReportFormat::Pdf,
        None => cli.report,
    };
    let pdf_path = cli.pdf.unwrap_or_else(|| PathBuf::from("food-report.pdf"));

    match report_format {
        ReportFormat::Terminal => report::terminal::render(&reports, &profile, cli.verbose, cli.quiet)?,
        ReportFormat::Json => report::render_json(&reports)?,
        ReportFormat::Pdf => report::pdf::render(&reports, &pdf_path)?,
    }

    if reports.iter().any(ProductReport::needs_attention) {
        std::process::exit(1);
    }

    Ok(())
}

/// `FOOD_CHECKR_LOG` (EnvFilter syntax) wins over `[logging].level`.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_env("FOOD_CHECKR_LOG") {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level '{}'", config.level))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

fn load_profile(cli: &Cli, base_dir: &Path) -> Result<HealthProfile> {
    let store = FileProfileStore::discover(base_dir, cli.profile.as_deref());
    let mut profile = store.load()?;

    for token in &cli.allergies {
        profile.select_allergy(token);
    }
    if let Some(detail) = &cli.other_allergy {
        profile.set_other_allergy(detail);
    }
    profile.validate()?;

    if cli.save_profile {
        store.save(&profile)?;
        if !cli.quiet {
            eprintln!("  {} profile saved to {}", "→".cyan(), store.path().display());
        }
    }

    tracing::debug!(terms = ?profile.match_terms(), "health profile ready");
    Ok(profile)
}

/// Read a payload file holding one JSON payload or an array of them.
fn read_payloads(path: &Path) -> Result<Vec<(String, Value)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(split_payloads(&path.display().to_string(), value))
}

fn split_payloads(origin: &str, value: Value) -> Vec<(String, Value)> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, raw)| (format!("{}#{}", origin, i + 1), raw))
            .collect(),
        raw => vec![(origin.to_string(), raw)],
    }
}

fn build_client(config: &LookupConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()?)
}

/// Score, personalize and screen one product.
fn check_product(
    origin: String,
    product: Product,
    rules: &RuleTable,
    profile: &HealthProfile,
    regulatory_config: &RegulatoryConfig,
) -> ProductReport {
    ProductReport {
        origin,
        assessment: scoring::concern::assess(&product, rules),
        health_score: scoring::nutrition::health_score(&product.nutriments),
        warnings: profile::matcher::match_warnings(&product, profile),
        alerts: regulatory::check_banned(&product, regulatory_config),
        insight: None,
        product,
    }
}

async fn lookup_online(
    client: &Client,
    cli: &Cli,
    config: &LookupConfig,
) -> Result<Vec<(String, Fetched)>> {
    let mut queries: Vec<Query> = cli
        .barcode
        .iter()
        .map(|code| Query::Barcode(code.trim().to_string()))
        .collect();
    if let Some(search) = &cli.search {
        queries.push(registry::classify_query(search)?);
    }

    let pb = progress_bar(queries.len(), cli.quiet)?;
    let batch_size = config.batch_size.max(1);
    let mut found = Vec::new();

    for batch in queries.chunks(batch_size) {
        let futures: Vec<_> = batch
            .iter()
            .map(|query| async move {
                match query {
                    Query::Barcode(code) => registry::lookup_barcode(client, config, code, cli.backend)
                        .await
                        .map(|hit| hit.into_iter().collect::<Vec<_>>()),
                    Query::Text(text) => {
                        registry::search(client, config, text, cli.limit, cli.backend).await
                    }
                }
            })
            .collect();

        let results = join_all(futures).await;

        for (query, result) in batch.iter().zip(results) {
            let origin = match query {
                Query::Barcode(code) => format!("barcode {}", code),
                Query::Text(text) => format!("search \"{}\"", text),
            };
            match result {
                Ok(hits) if hits.is_empty() => {
                    tracing::warn!(%origin, "no product found");
                    if !cli.quiet {
                        eprintln!("  {} {}: not found", "✗".red(), origin);
                    }
                }
                Ok(hits) => found.extend(hits.into_iter().map(|hit| (origin.clone(), hit))),
                Err(err) => {
                    tracing::warn!(%origin, error = %err, "lookup failed");
                    if !cli.quiet {
                        eprintln!("  {} {}: lookup failed ({})", "✗".red(), origin, err);
                    }
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(found)
}

async fn attach_insights(
    client: &Client,
    reports: &mut [ProductReport],
    config: &LookupConfig,
    quiet: bool,
) -> Result<()> {
    let pb = progress_bar(reports.len(), quiet)?;

    for batch in reports.chunks_mut(config.batch_size.max(1)) {
        let futures: Vec<_> = batch
            .iter()
            .map(|report| registry::backend::fetch_insight(client, &config.backend_url, &report.product))
            .collect();

        let results = join_all(futures).await;

        for (report, result) in batch.iter_mut().zip(results) {
            match result {
                Ok(insight) => report.insight = insight,
                Err(err) => {
                    tracing::warn!(product = %report.product.name, error = %err, "insight request failed")
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(())
}

fn progress_bar(len: usize, quiet: bool) -> Result<Option<ProgressBar>> {
    if quiet {
        return Ok(None);
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{ConcernLevel, ProfileStatus, WarningSeverity};
    use serde_json::json;

    #[test]
    fn test_split_payloads() {
        let single = split_payloads("a.json", json!({"product_name": "Cola"}));
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].0, "a.json");

        let many = split_payloads("b.json", json!([{"name": "x"}, {"name": "y"}]));
        let origins: Vec<&str> = many.iter().map(|(o, _)| o.as_str()).collect();
        assert_eq!(origins, vec!["b.json#1", "b.json#2"]);
    }

    #[test]
    fn test_read_payloads_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_payloads(&path).unwrap_err().to_string();
        assert!(err.contains("Invalid JSON"));
    }

    #[test]
    fn test_check_product_end_to_end() {
        let raw = json!({
            "status": 1,
            "product": {
                "product_name": "Choco Spread",
                "brands": "Acme",
                "nutriscore_grade": "e",
                "ingredients_text": "Sugar, palm oil, hazelnuts, BHT",
                "allergens_tags": ["en:milk", "en:nuts"],
                "traces_tags": ["en:peanuts"],
                "nutriments": {"sugars_100g": 56.3, "salt_100g": 0.1}
            }
        });
        let product = normalizer::normalize(&raw);

        let mut profile = HealthProfile::default();
        profile.select_allergy("milk");
        profile.select_allergy("peanuts");

        let report = check_product(
            "test".to_string(),
            product,
            &RuleTable::default(),
            &profile,
            &RegulatoryConfig::default(),
        );

        // 100 - 40 (grade e) - 10 (palm oil)
        assert_eq!(report.assessment.score, 50);
        assert_eq!(report.assessment.level, ConcernLevel::Moderate);
        assert_eq!(report.warnings.status, ProfileStatus::Checked);
        let severities: Vec<(&str, WarningSeverity)> = report
            .warnings
            .warnings
            .iter()
            .map(|w| (w.allergen_token.as_str(), w.severity))
            .collect();
        assert_eq!(
            severities,
            vec![("milk", WarningSeverity::High), ("peanuts", WarningSeverity::Moderate)]
        );
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].ingredient, "BHT");
        assert!(report.health_score.is_some());
        assert!(report.needs_attention());
    }
}
