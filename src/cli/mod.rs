// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod report;
pub mod run;

use clap::{Args, Parser, Subcommand};

use crate::core::types::{BudgetTier, GeoPoint, ItineraryRequest, Strategy};

#[derive(Parser)]
#[command(
    name = "wayfare",
    about = "Compare LLM itinerary strategies on route efficiency and judged quality",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Model for every role (provider/model format), overrides config
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Debug logging for wayfare
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate with every selected strategy, evaluate, and print the report
    Compare {
        #[command(flatten)]
        trip: TripArgs,

        /// Where to save the run (defaults to ~/.wayfare/runs/)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the records as JSON instead of the table
        #[arg(long)]
        json: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Generate only and save the run for a later `evaluate`
    Generate {
        #[command(flatten)]
        trip: TripArgs,

        #[arg(short, long)]
        output: Option<String>,

        #[arg(short, long)]
        quiet: bool,
    },
    /// Score a saved run and print the report
    Evaluate {
        /// Run file written by `compare` or `generate`
        run: String,

        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        quiet: bool,
    },
    /// Geodesic length of a route, no LLM involved
    Distance {
        /// A stop as `lat,lon`, in visiting order (repeatable)
        #[arg(short, long = "point", value_parser = parse_point)]
        points: Vec<GeoPoint>,
    },
}

/// Trip constraints shared by `compare` and `generate`.
#[derive(Args, Debug, Clone)]
pub struct TripArgs {
    /// Destination, as named in the knowledge directory (e.g. New_York)
    #[arg(short, long)]
    pub destination: String,

    /// Traveler profile (Family, Couple, Solo, Friends...)
    #[arg(long, default_value = "Family")]
    pub profile: String,

    #[arg(long, default_value_t = 3)]
    pub days: u8,

    /// low, medium or high
    #[arg(long, default_value = "medium")]
    pub budget: BudgetTier,

    /// relaxed, balanced, intense, or free text
    #[arg(long, default_value = "balanced")]
    pub pace: String,

    /// Interest (repeatable). Defaults to food.
    #[arg(long = "interest")]
    pub interests: Vec<String>,

    #[arg(long, default_value_t = 2)]
    pub adults: u32,

    #[arg(long, default_value_t = 0)]
    pub children: u32,

    /// Comma-separated strategies (mode_1..mode_4). Defaults to all four.
    #[arg(long, value_delimiter = ',')]
    pub strategies: Vec<Strategy>,
}

impl TripArgs {
    pub fn to_request(&self) -> ItineraryRequest {
        let mut req = ItineraryRequest::new(self.destination.trim());
        req.profile = self.profile.clone();
        req.days = self.days;
        req.budget = self.budget;
        req.pace = expand_pace(&self.pace);
        if !self.interests.is_empty() {
            req.interests = self.interests.clone();
        }
        req.adults = self.adults;
        req.children = self.children;
        req
    }

    /// Selected strategies in run order, duplicates dropped.
    pub fn selected_strategies(&self) -> Vec<Strategy> {
        if self.strategies.is_empty() {
            return Strategy::ALL.to_vec();
        }
        let mut out: Vec<Strategy> = Vec::with_capacity(self.strategies.len());
        for s in &self.strategies {
            if !out.contains(s) {
                out.push(*s);
            }
        }
        out
    }
}

/// Known pace keywords get their descriptive form; anything else is kept verbatim.
pub fn expand_pace(pace: &str) -> String {
    match pace.trim().to_lowercase().as_str() {
        "relaxed" => "relaxed (1-2 places a day)".into(),
        "balanced" => "balanced (3 places a day)".into(),
        "intense" => "intense (marathon)".into(),
        _ => pace.trim().to_string(),
    }
}

/// Parse `lat,lon` into an unnamed point.
pub fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon, got '{s}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinates out of range: {lat},{lon}"));
    }
    Ok(GeoPoint::new(format!("{lat},{lon}"), lat, lon))
}
