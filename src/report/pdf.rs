use std::path::Path;

use anyhow::{Context, Result};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use crate::models::{ConcernLevel, ProductReport, ProfileStatus, WarningSeverity};

use super::{format_amount, Summary, NUTRITION_ROWS};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const RIGHT: f32 = PAGE_W - MARGIN;
const COVER_BAND: f32 = 72.0;
const FOOTER_TOP: f32 = 28.0;

const RADIUS_PANEL: f32 = 2.5;
const RADIUS_BADGE: f32 = 1.5;

const LINE_H: f32 = 4.6;
const BODY_WRAP: usize = 100;
const SECTION_MAX_LINES: usize = 8;

/// An RGB fill or stroke colour, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Shade(f32, f32, f32);

impl Shade {
    fn color(self) -> Color {
        Color::Rgb(Rgb { r: self.0, g: self.1, b: self.2, icc_profile: None })
    }

    /// Linear mix towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    fn blend(self, other: Shade, t: f32) -> Shade {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Shade(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

mod ink {
    use super::Shade;

    pub(super) const PAGE: Shade = Shade(1.00, 1.00, 1.00);
    pub(super) const STRIPE: Shade = Shade(0.95, 0.97, 0.96);
    pub(super) const BORDER: Shade = Shade(0.85, 0.89, 0.87);
    pub(super) const LEAF: Shade = Shade(0.13, 0.60, 0.38);
    pub(super) const LAGOON: Shade = Shade(0.10, 0.48, 0.62);
    pub(super) const BODY: Shade = Shade(0.07, 0.09, 0.10);
    pub(super) const SOFT: Shade = Shade(0.34, 0.41, 0.44);
    pub(super) const FAINT: Shade = Shade(0.56, 0.63, 0.66);
    pub(super) const ON_BAND: Shade = Shade(1.00, 1.00, 1.00);
    pub(super) const ON_BAND_DIM: Shade = Shade(0.84, 0.95, 0.92);
}

/// Background and foreground for a concern or severity badge.
#[derive(Debug, Clone, Copy)]
struct Tone {
    bg: Shade,
    fg: Shade,
}

const TONE_LOW: Tone = Tone { bg: Shade(0.90, 0.98, 0.92), fg: Shade(0.07, 0.52, 0.22) };
const TONE_MODERATE: Tone = Tone { bg: Shade(1.00, 0.95, 0.87), fg: Shade(0.70, 0.40, 0.02) };
const TONE_HIGH: Tone = Tone { bg: Shade(1.00, 0.91, 0.91), fg: Shade(0.76, 0.09, 0.13) };

fn tone(level: ConcernLevel) -> Tone {
    match level {
        ConcernLevel::Low => TONE_LOW,
        ConcernLevel::Moderate => TONE_MODERATE,
        ConcernLevel::High => TONE_HIGH,
    }
}

/// Axis-aligned box in millimetres, origin at the bottom-left of the page.
#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    fn corners(self) -> [(f32, f32); 4] {
        [
            (self.x, self.y),
            (self.x + self.w, self.y),
            (self.x + self.w, self.y + self.h),
            (self.x, self.y + self.h),
        ]
    }

    /// Outline with each corner replaced by an eight-segment arc.
    fn rounded_outline(self, radius: f32) -> Vec<(Point, bool)> {
        const ARC_STEPS: usize = 8;
        let r = radius.min(self.w / 2.0).min(self.h / 2.0);
        let (left, bottom) = (self.x + r, self.y + r);
        let (right, top) = (self.x + self.w - r, self.y + self.h - r);
        [(right, bottom, -90.0f32), (right, top, 0.0), (left, top, 90.0), (left, bottom, 180.0)]
            .into_iter()
            .flat_map(|(cx, cy, from)| {
                (0..=ARC_STEPS).map(move |step| {
                    let a = (from + 90.0 * step as f32 / ARC_STEPS as f32).to_radians();
                    (Point::new(Mm(cx + r * a.cos()), Mm(cy + r * a.sin())), false)
                })
            })
            .collect()
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

#[derive(Clone, Copy)]
enum Weight {
    Regular,
    Bold,
}

/// One page layer plus the document fonts.
struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
}

impl<'a> Canvas<'a> {
    fn new_page(doc: &PdfDocumentReference, fonts: &'a Fonts, name: &str) -> Self {
        let (page, layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), name);
        let canvas = Canvas { layer: doc.get_page(page).get_layer(layer), fonts };
        canvas.fill(Rect::new(0.0, 0.0, PAGE_W, PAGE_H), ink::PAGE);
        canvas
    }

    fn text(&self, text: impl Into<String>, size: f32, x: f32, y: f32, weight: Weight, shade: Shade) {
        let font = match weight {
            Weight::Regular => &self.fonts.regular,
            Weight::Bold => &self.fonts.bold,
        };
        self.layer.set_fill_color(shade.color());
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    /// Small bold uppercase heading.
    fn caption(&self, text: &str, x: f32, y: f32) {
        self.text(text, 6.5, x, y, Weight::Bold, ink::FAINT);
    }

    fn shape(&self, outline: Vec<(Point, bool)>, mode: PaintMode, shade: Shade) {
        match mode {
            PaintMode::Stroke => {
                self.layer.set_outline_color(shade.color());
                self.layer.set_outline_thickness(0.4);
            }
            _ => self.layer.set_fill_color(shade.color()),
        }
        self.layer.add_polygon(Polygon {
            rings: vec![outline],
            mode,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn fill(&self, rect: Rect, shade: Shade) {
        let outline = rect
            .corners()
            .iter()
            .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
            .collect();
        self.shape(outline, PaintMode::Fill, shade);
    }

    fn fill_rounded(&self, rect: Rect, radius: f32, shade: Shade) {
        self.shape(rect.rounded_outline(radius), PaintMode::Fill, shade);
    }

    fn stroke_rounded(&self, rect: Rect, radius: f32, shade: Shade) {
        self.shape(rect.rounded_outline(radius), PaintMode::Stroke, shade);
    }

    /// Hairline across the content width.
    fn rule(&self, y: f32) {
        self.layer.set_outline_color(ink::BORDER.color());
        self.layer.set_outline_thickness(0.3);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    /// Left-to-right blend drawn as `strips` slightly overlapping bands.
    fn gradient(&self, rect: Rect, from: Shade, to: Shade, strips: usize) {
        let strip_w = rect.w / strips as f32;
        let last = strips.saturating_sub(1).max(1) as f32;
        for i in 0..strips {
            let x = rect.x + i as f32 * strip_w;
            self.fill(Rect::new(x, rect.y, strip_w + 0.6, rect.h), from.blend(to, i as f32 / last));
        }
    }
}

/// Render a PDF report: cover page with overview, then one page per product.
pub fn render(reports: &[ProductReport], output_path: &Path) -> Result<()> {
    let doc = PdfDocument::empty("Food Safety Report");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    add_cover_page(&Canvas::new_page(&doc, &fonts, "Cover"), reports);
    for report in reports {
        add_product_page(&Canvas::new_page(&doc, &fonts, "Product"), report);
    }

    let bytes = doc.save_to_bytes()?;
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", output_path.display()))?;

    println!("PDF report written to: {}", output_path.display());
    Ok(())
}

fn add_cover_page(canvas: &Canvas, reports: &[ProductReport]) {
    let summary = Summary::of(reports);
    let band_bottom = PAGE_H - COVER_BAND;
    canvas.gradient(Rect::new(0.0, band_bottom, PAGE_W, COVER_BAND), ink::LEAF, ink::LAGOON, 28);

    canvas.text(
        format!("food-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5, RIGHT - 40.0, PAGE_H - 10.5, Weight::Regular, ink::ON_BAND_DIM,
    );
    canvas.text("Food Safety", 28.0, MARGIN, PAGE_H - 26.0, Weight::Bold, ink::ON_BAND);
    canvas.text("Report", 28.0, MARGIN, PAGE_H - 41.0, Weight::Bold, ink::ON_BAND_DIM);
    canvas.text(
        format!("Checked  {}", checked_on()),
        9.0, MARGIN, band_bottom - 12.0, Weight::Regular, ink::SOFT,
    );

    let overview_y = band_bottom - 20.0;
    canvas.rule(overview_y);
    canvas.caption("OVERVIEW", MARGIN, overview_y - 7.0);

    let cards = [
        StatCard { label: "PRODUCTS", value: summary.total, accent: ink::LAGOON },
        StatCard { label: "LOW", value: summary.low, accent: TONE_LOW.fg },
        StatCard { label: "MODERATE", value: summary.moderate, accent: TONE_MODERATE.fg },
        StatCard { label: "HIGH", value: summary.high, accent: TONE_HIGH.fg },
        StatCard { label: "ALLERGY", value: summary.with_warnings, accent: TONE_HIGH.fg },
    ];
    let gap = 4.0;
    let card_w = (RIGHT - MARGIN - gap * (cards.len() - 1) as f32) / cards.len() as f32;
    let card_y = overview_y - 42.0;
    for (i, card) in cards.iter().enumerate() {
        let x = MARGIN + (card_w + gap) * i as f32;
        card.draw(canvas, Rect::new(x, card_y, card_w, 26.0));
    }

    draw_product_index(canvas, reports, card_y - 13.0);
    draw_footer(canvas);
}

struct StatCard {
    label: &'static str,
    value: usize,
    accent: Shade,
}

impl StatCard {
    fn draw(&self, canvas: &Canvas, at: Rect) {
        canvas.fill_rounded(at, RADIUS_BADGE, ink::PAGE);
        canvas.stroke_rounded(at, RADIUS_BADGE, ink::BORDER);
        canvas.fill(Rect::new(at.x, at.y + at.h - 2.0, at.w, 2.0), self.accent);
        canvas.text(self.value.to_string(), 20.0, at.x + 4.0, at.y + at.h * 0.38, Weight::Bold, self.accent);
        canvas.text(self.label, 6.0, at.x + 4.0, at.y + 3.5, Weight::Regular, ink::FAINT);
    }
}

/// Product / brand / score / concern table, capped at `INDEX_ROWS` rows.
fn draw_product_index(canvas: &Canvas, reports: &[ProductReport], top: f32) {
    const INDEX_ROWS: usize = 14;
    const ROW_H: f32 = 6.5;
    let columns = [
        ("PRODUCT", MARGIN + 2.0),
        ("BRAND", MARGIN + 78.0),
        ("SCORE", MARGIN + 126.0),
        ("CONCERN", MARGIN + 146.0),
    ];
    let [name_x, brand_x, score_x, level_x] = columns.map(|(_, x)| x);

    canvas.rule(top);
    canvas.caption("PRODUCTS CHECKED", MARGIN, top - 7.5);

    let heading_y = top - 14.0;
    for (title, x) in columns {
        canvas.caption(title, x, heading_y);
    }
    canvas.rule(heading_y - 2.0);

    let first_row = heading_y - 7.5;
    for (i, report) in reports.iter().take(INDEX_ROWS).enumerate() {
        let y = first_row - i as f32 * ROW_H;
        if i % 2 == 0 {
            canvas.fill(Rect::new(MARGIN, y - 1.5, RIGHT - MARGIN, ROW_H), ink::STRIPE);
        }
        canvas.text(truncate(&report.product.name, 40), 8.0, name_x, y, Weight::Regular, ink::BODY);
        canvas.text(truncate(&report.product.brand, 26), 8.0, brand_x, y, Weight::Regular, ink::SOFT);
        canvas.text(report.assessment.score.to_string(), 8.0, score_x, y, Weight::Regular, ink::SOFT);

        let badge = tone(report.assessment.level);
        canvas.fill_rounded(Rect::new(level_x - 0.5, y - 1.2, 24.0, 4.5), RADIUS_BADGE, badge.bg);
        canvas.text(
            report.assessment.level.to_string().to_uppercase(),
            7.0, level_x + 1.5, y, Weight::Bold, badge.fg,
        );
    }

    if let Some(hidden) = reports.len().checked_sub(INDEX_ROWS).filter(|n| *n > 0) {
        let y = first_row - INDEX_ROWS as f32 * ROW_H;
        canvas.text(format!("+ {} more...", hidden), 7.5, name_x, y, Weight::Regular, ink::FAINT);
    }
}

fn add_product_page(canvas: &Canvas, report: &ProductReport) {
    let product = &report.product;
    let assessment = &report.assessment;

    canvas.gradient(Rect::new(0.0, PAGE_H - 2.5, PAGE_W, 2.5), ink::LEAF, ink::LAGOON, 21);

    canvas.text(truncate(&product.name, 44), 20.0, MARGIN, 278.5, Weight::Bold, ink::BODY);
    let mut subtitle = format!("{}  ·  {}", product.brand, product.source);
    if !product.barcode.is_empty() {
        subtitle.push_str(&format!("  ·  {}", product.barcode));
    }
    canvas.text(truncate(&subtitle, 90), 9.0, MARGIN, 271.5, Weight::Regular, ink::SOFT);
    canvas.rule(267.5);

    // concern panel
    let panel = Rect::new(MARGIN, 236.0, RIGHT - MARGIN, 26.0);
    let level = tone(assessment.level);
    canvas.fill_rounded(panel, RADIUS_PANEL, level.bg);
    canvas.text(format!("{}/100", assessment.score), 24.0, panel.x + 5.0, panel.y + 13.0, Weight::Bold, level.fg);
    canvas.text(assessment.label.to_uppercase(), 8.0, panel.x + 5.0, panel.y + 5.0, Weight::Bold, level.fg);

    let detail_x = panel.x + 52.0;
    for (j, line) in wrap_text(&assessment.explanation, 70).into_iter().take(3).enumerate() {
        canvas.text(line, 8.5, detail_x, panel.y + 18.0 - j as f32 * LINE_H, Weight::Regular, ink::SOFT);
    }
    let health = report
        .health_score
        .map(|s| format!("{}/100", s))
        .unwrap_or_else(|| "N/A".to_string());
    canvas.text(
        format!(
            "Nutri-Score {}   ·   Health score {}",
            product.nutriscore_grade.to_string().to_uppercase(),
            health
        ),
        8.0, detail_x, panel.y + 4.0, Weight::Bold, ink::BODY,
    );

    let mut y = draw_nutrition_grid(canvas, report, panel.y - 10.0);

    y = draw_section(canvas, y, "INGREDIENTS", &[product.display_ingredients().join(", ")], ink::BODY);

    let additives = if product.additives.is_empty() {
        "None listed".to_string()
    } else {
        product.additives.join(", ")
    };
    y = draw_section(canvas, y, "ADDITIVES", &[additives], ink::BODY);

    let allergens = product.allergen_risk_texts();
    let allergens = if allergens.is_empty() {
        "None declared".to_string()
    } else {
        allergens.join("; ")
    };
    y = draw_section(canvas, y, "ALLERGENS", &[allergens], ink::BODY);

    let (warning_lines, warning_shade) = warning_lines(report);
    y = draw_section(canvas, y, "PERSONAL WARNINGS", &warning_lines, warning_shade);

    if !report.alerts.is_empty() {
        let lines: Vec<String> = report
            .alerts
            .iter()
            .map(|a| format!("{}: banned in {}", a.ingredient, a.banned_in.join(", ")))
            .collect();
        y = draw_section(canvas, y, "REGULATORY ALERTS", &lines, TONE_MODERATE.fg);
    }

    if let Some(insight) = &report.insight {
        draw_section(canvas, y, "INSIGHT", &[insight.clone()], ink::SOFT);
    }

    draw_footer(canvas);
}

/// Two-column per-100 g grid; returns the `y` below it.
fn draw_nutrition_grid(canvas: &Canvas, report: &ProductReport, top: f32) -> f32 {
    const ROW_H: f32 = 6.0;
    canvas.caption("NUTRITION PER 100 G", MARGIN, top);

    let col_w = (RIGHT - MARGIN) / 2.0;
    let per_col = NUTRITION_ROWS.len().div_ceil(2);
    let first_row = top - 8.5;
    for (i, (label, key, unit)) in NUTRITION_ROWS.iter().enumerate() {
        let (col, row) = (i / per_col, i % per_col);
        let x = MARGIN + col as f32 * col_w;
        let y = first_row - row as f32 * ROW_H;
        if row % 2 == 0 {
            canvas.fill(Rect::new(x, y - 1.8, col_w - 2.0, ROW_H), ink::STRIPE);
        }
        canvas.text(label.trim(), 8.0, x + 2.0, y, Weight::Regular, ink::SOFT);
        canvas.text(
            format_amount(report.product.nutriments.get(key), unit),
            8.0, x + col_w - 30.0, y, Weight::Bold, ink::BODY,
        );
    }
    first_row - per_col as f32 * ROW_H - 1.0
}

/// Lines and colour for the personal warnings section.
fn warning_lines(report: &ProductReport) -> (Vec<String>, Shade) {
    let outcome = &report.warnings;
    match outcome.status {
        ProfileStatus::NoProfileData => (
            vec!["Complete your health profile to see personal allergy warnings.".to_string()],
            ink::SOFT,
        ),
        ProfileStatus::Checked if outcome.warnings.is_empty() => {
            (vec!["No conflicts with your health profile.".to_string()], TONE_LOW.fg)
        }
        ProfileStatus::Checked => {
            let lines = outcome
                .warnings
                .iter()
                .map(|w| {
                    let tag = match w.severity {
                        WarningSeverity::High => "HIGH",
                        WarningSeverity::Moderate => "MODERATE",
                    };
                    format!("[{}] {}: {}", tag, w.allergen_token, w.matched_text)
                })
                .collect();
            let shade = if outcome.has_high_severity() { TONE_HIGH.fg } else { TONE_MODERATE.fg };
            (lines, shade)
        }
    }
}

/// Draw a titled block of wrapped paragraphs and return the next free `y`.
///
/// Each section shows at most [`SECTION_MAX_LINES`] lines and nothing is drawn
/// below the footer area.
fn draw_section(canvas: &Canvas, y: f32, title: &str, paragraphs: &[String], shade: Shade) -> f32 {
    if y - LINE_H * 2.0 < FOOTER_TOP {
        return y;
    }

    canvas.rule(y);
    canvas.caption(title, MARGIN, y - 5.5);

    let mut lines: Vec<String> = paragraphs.iter().flat_map(|p| wrap_text(p, BODY_WRAP)).collect();
    if lines.len() > SECTION_MAX_LINES {
        lines.truncate(SECTION_MAX_LINES);
        if let Some(last) = lines.last_mut() {
            last.push_str(" ...");
        }
    }

    let mut cur = y - 5.5 - LINE_H;
    for line in lines {
        if cur < FOOTER_TOP {
            break;
        }
        canvas.text(line, 8.0, MARGIN + 2.0, cur, Weight::Regular, shade);
        cur -= LINE_H;
    }
    cur - 2.5
}

fn draw_footer(canvas: &Canvas) {
    canvas.rule(22.0);
    canvas.text(
        format!("Generated by food-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5, MARGIN, 15.0, Weight::Regular, ink::FAINT,
    );
    canvas.text(
        "Informational only, not medical advice.",
        7.5, RIGHT - 52.0, 15.0, Weight::Regular, ink::FAINT,
    );
}

/// Local date stamped on the cover, `YYYY-MM-DD`.
fn checked_on() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Cut `s` to `max` characters, ending in `...` when shortened.
fn truncate(s: &str, max: usize) -> String {
    if s.char_indices().nth(max).is_none() {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .nth(max.saturating_sub(3))
        .map_or(s.len(), |(i, _)| i);
    format!("{}...", &s[..cut])
}

/// Greedy word wrap on character counts. Words longer than a line stay whole.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    text.split_whitespace().fold(Vec::new(), |mut lines: Vec<String>, word| {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 1 + word.chars().count() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
        lines
    })
}
