use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "food-checkr",
    about = "Score packaged food products and check them against your allergies",
    version
)]
pub struct Cli {
    /// JSON files holding one product payload or an array of payloads
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Look up a product by barcode (repeatable)
    #[arg(long, value_name = "CODE")]
    pub barcode: Vec<String>,

    /// Search products by name; an 8-14 digit query is treated as a barcode
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Maximum number of search results
    #[arg(long, default_value_t = 5, value_name = "N")]
    pub limit: usize,

    /// Query the local backend instead of the public databases
    #[arg(long)]
    pub backend: bool,

    /// Ask the backend for a written insight on each product
    #[arg(long)]
    pub insight: bool,

    /// Health profile file [default: ./.food-checkr/profile.toml, fallback ~/.config/food-checkr/profile.toml]
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Declare an allergy for this run (repeatable); `none` clears the others
    #[arg(long = "allergy", value_name = "TOKEN")]
    pub allergies: Vec<String>,

    /// Free-text allergies not in the list, comma separated
    #[arg(long, value_name = "TEXT")]
    pub other_allergy: Option<String>,

    /// Write the edited profile back to the profile file
    #[arg(long)]
    pub save_profile: bool,

    /// Config file [default: ./.food-checkr/config.toml, fallback ~/.config/food-checkr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// PDF output path; use without value to default to food-report.pdf
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "food-report.pdf")]
    pub pdf: Option<PathBuf>,

    /// Show fired scoring rules and the nutrient health score
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn has_lookups(&self) -> bool {
        !self.barcode.is_empty() || self.search.is_some()
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Pdf,
}
