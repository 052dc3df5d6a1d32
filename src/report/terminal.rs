use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{
    ConcernLevel, HealthProfile, Nutriments, ProductReport, ProfileStatus, WarningSeverity,
};

use super::{format_amount, Summary, NUTRITION_ROWS};

/// Render a colored terminal report.
pub fn render(
    reports: &[ProductReport],
    profile: &HealthProfile,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let summary = Summary::of(reports);

    if quiet {
        println!(
            "Total: {}  Low: {}  Moderate: {}  High: {}  Warnings: {}",
            summary.total,
            summary.low.to_string().green(),
            summary.moderate.to_string().yellow(),
            summary.high.to_string().red(),
            summary.with_warnings.to_string().magenta(),
        );
        return Ok(());
    }

    println!("\n {} v{}\n", "food-checkr".bold(), env!("CARGO_PKG_VERSION"));

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Products checked   : {}", summary.total));
    println!(
        " │  {:<48} │",
        format!("{}  Low concern      : {:>4}", "✓".green(), summary.low)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Moderate concern : {:>4}", "⚠".yellow(), summary.moderate)
    );
    println!(
        " │  {:<48} │",
        format!("{}  High concern     : {:>4}", "✗".red(), summary.high)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Allergy warnings : {:>4}", "!".magenta(), summary.with_warnings)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    let profile_block = profile_lines(profile);
    if !profile_block.is_empty() {
        println!(" {}", "Health profile".bold());
        for line in &profile_block {
            println!("   {}", line);
        }
        println!();
    }

    for report in reports {
        render_product(report, verbose);
    }

    Ok(())
}

fn render_product(report: &ProductReport, verbose: bool) {
    let product = &report.product;
    let assessment = &report.assessment;

    println!(" {} {}", product.name.bold(), format!("({})", product.brand).dimmed());
    let mut origin = format!(" {} · {}", report.origin, product.source);
    if !product.barcode.is_empty() {
        origin.push_str(&format!(" · barcode {}", product.barcode));
    }
    println!("{}\n", origin.dimmed());

    let badge = format!("[{}]", assessment.label.to_uppercase());
    let badge = match assessment.level {
        ConcernLevel::Low => badge.green().bold(),
        ConcernLevel::Moderate => badge.yellow().bold(),
        ConcernLevel::High => badge.red().bold(),
    };
    println!(" {} {}/100  {}", badge, assessment.score, assessment.explanation);
    println!(" Nutri-Score: {}", product.nutriscore_grade.to_string().to_uppercase());

    if verbose {
        let health = report
            .health_score
            .map(|s| format!("{}/100", s))
            .unwrap_or_else(|| "N/A".to_string());
        println!(" Health score: {}", health);
        if assessment.fired_rules.is_empty() {
            println!(" Rules fired: none");
        } else {
            let fired: Vec<String> = assessment
                .fired_rules
                .iter()
                .map(|r| format!("{} (-{})", r.id, r.penalty))
                .collect();
            println!(" Rules fired: {}", fired.join(", "));
        }
    }
    println!();

    render_nutrition_table(&product.nutriments);

    println!(" {}", "Ingredients".bold());
    println!("   {}", product.display_ingredients().join(", "));

    println!(" {}", "Additives".bold());
    println!("   {}", list_or_none(&product.additives));

    println!(" {}", "Allergens".bold());
    let allergens = product.allergen_risk_texts();
    if allergens.is_empty() {
        println!("   {}", "None declared".dimmed());
    } else {
        println!("   {}", allergens.join("; "));
    }
    println!();

    match report.warnings.status {
        ProfileStatus::NoProfileData => {
            println!(
                " {} Complete your health profile to see personal allergy warnings (--allergy).",
                "ℹ".cyan()
            );
        }
        ProfileStatus::Checked if report.warnings.warnings.is_empty() => {
            println!(" {} No conflicts with your health profile.", "✓".green());
        }
        ProfileStatus::Checked => {
            println!(" {} Personal allergy warnings:\n", "[WARNING]".red().bold());
            render_warning_table(report);
        }
    }

    if !report.alerts.is_empty() {
        println!("\n {} Regulatory alerts:", "[BANNED]".yellow().bold());
        for alert in &report.alerts {
            println!("   {} banned in {}", alert.ingredient.bold(), alert.banned_in.join(", "));
        }
    }

    if let Some(insight) = &report.insight {
        println!("\n {}", "Insight".bold());
        println!("   {}", insight);
    }

    println!("\n {}\n", "─".repeat(52).dimmed());
}

fn render_nutrition_table(nutriments: &Nutriments) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Nutrition").add_attribute(Attribute::Bold),
            Cell::new("per 100 g").add_attribute(Attribute::Bold),
        ]);

    for (label, key, unit) in NUTRITION_ROWS {
        let value = nutriments.get(key);
        let cell = Cell::new(format_amount(value, unit)).set_alignment(CellAlignment::Right);
        let cell = if value.is_none() { cell.fg(Color::DarkGrey) } else { cell };
        table.add_row(vec![Cell::new(*label), cell]);
    }

    println!("{}", table);
}

fn render_warning_table(report: &ProductReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Allergy").add_attribute(Attribute::Bold),
            Cell::new("Label says").add_attribute(Attribute::Bold),
            Cell::new("Severity").add_attribute(Attribute::Bold),
        ]);

    for warning in &report.warnings.warnings {
        let color = match warning.severity {
            WarningSeverity::High => Color::Red,
            WarningSeverity::Moderate => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(&warning.allergen_token),
            Cell::new(&warning.matched_text),
            Cell::new(warning.severity.to_string())
                .fg(color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}

/// Declared profile fields, one `label: value` line each. Diet and
/// sensitivities are shown for context only; matching uses allergies.
fn profile_lines(profile: &HealthProfile) -> Vec<String> {
    let mut lines = Vec::new();
    if profile.has_declared_allergies() {
        lines.push(format!("Allergies     : {}", profile.match_terms().join(", ")));
    }
    if let Some(diet) = profile.dietary_preference.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(format!("Diet          : {}", diet.trim()));
    }
    if let Some(sens) = profile.sensitivities.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("Sensitivities : {}", sens.trim()));
    }
    lines
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None listed".to_string()
    } else {
        items.join(", ")
    }
}
