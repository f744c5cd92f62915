use crate::common::errors::AppError;
use crate::report::fields::FieldSet;
use crate::report::rating_export::RatingExport;
use crate::report::reference_rates::normalize;
use std::path::PathBuf;
use tracing::{info, warn};

pub const INDIA: &str = "India";

// Identifiers the ratings source is queried with, as read from the input workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingInputs {
    pub program: String,
    pub demographic: String,
    pub region: String,
    pub time_period: String,
    pub channel_regular: String,
    pub channel_hd: String,
}

impl RatingInputs {
    pub fn from_fields(fields: &FieldSet) -> Self {
        Self {
            program: fields.trimmed("pd_b1"),
            demographic: fields.trimmed("pd_b36"),
            region: fields.trimmed("pd_b37"),
            time_period: fields.trimmed("pd_b45"),
            channel_regular: fields.trimmed("cp_c5"),
            channel_hd: fields.trimmed("cp_c6"),
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("Program", &self.program),
            ("Region", &self.region),
            ("Demographic", &self.demographic),
            ("Time Period", &self.time_period),
            ("Channels", &self.channel_regular),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty() || value.eq_ignore_ascii_case("nan"))
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingQuery {
    pub channels: Vec<String>,
    pub program: String,
    pub region: String,
    pub demographic: String,
    pub period_start: i64,
    pub period_end: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingRow {
    pub channel: String,
    pub tvr: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingValues {
    pub region_regular: f64,
    pub region_hd: f64,
    pub india_regular: f64,
    pub india_hd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingResult {
    Values(RatingValues),
    Empty,
}

impl RatingResult {
    pub fn values_or_zero(&self) -> RatingValues {
        match self {
            RatingResult::Values(values) => *values,
            RatingResult::Empty => RatingValues::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RatingResult::Empty)
    }
}

// One open session against the ratings source. Dropping it releases the connection.
pub trait RatingConnection {
    fn fetch(&mut self, query: &RatingQuery) -> Result<Vec<RatingRow>, AppError>;
}

pub trait RatingStore {
    fn connect(&self) -> Result<Box<dyn RatingConnection + '_>, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRatings {
    pub regular: f64,
    pub hd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRatings {
    pub region: String,
    pub channel_regular: String,
    pub channel_hd: String,
    pub local: Option<RegionRatings>,
    pub india: Option<RegionRatings>,
}

impl FetchedRatings {
    pub fn result(&self) -> RatingResult {
        if self.local.is_none() && self.india.is_none() {
            return RatingResult::Empty;
        }
        let local = self.local.unwrap_or(RegionRatings { regular: 0.0, hd: 0.0 });
        let india = self.india.unwrap_or(RegionRatings { regular: 0.0, hd: 0.0 });
        RatingResult::Values(RatingValues {
            region_regular: local.regular,
            region_hd: local.hd,
            india_regular: india.regular,
            india_hd: india.hd,
        })
    }
}

pub struct RatingLookup<'a> {
    store: Option<&'a dyn RatingStore>,
    attempts: u32,
    export_dir: Option<PathBuf>,
}

impl<'a> RatingLookup<'a> {
    pub fn new(store: Option<&'a dyn RatingStore>, attempts: u32) -> Self {
        Self {
            store,
            attempts: attempts.max(1),
            export_dir: None,
        }
    }

    pub fn with_export_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.export_dir = dir;
        self
    }

    // Never fails: every problem degrades to an empty result.
    pub fn fetch_ratings(&self, inputs: &RatingInputs) -> RatingResult {
        let Some(store) = self.store else {
            warn!("no ratings source configured, ratings default to 0");
            return RatingResult::Empty;
        };

        let missing = inputs.missing();
        if !missing.is_empty() {
            warn!(missing = %missing.join(", "), "rating lookup skipped, missing required fields");
            return RatingResult::Empty;
        }

        let Some((period_start, period_end)) = parse_period(&inputs.time_period) else {
            warn!(time_period = %inputs.time_period, "rating lookup skipped, invalid time period");
            return RatingResult::Empty;
        };

        let mut channels = vec![inputs.channel_regular.clone()];
        if !inputs.channel_hd.is_empty() {
            channels.push(inputs.channel_hd.clone());
        }
        let mut query = RatingQuery {
            channels,
            program: inputs.program.clone(),
            region: inputs.region.clone(),
            demographic: inputs.demographic.clone(),
            period_start,
            period_end,
        };

        info!(region = %query.region, program = %query.program, "querying ratings");
        let local = self.fetch_region(store, &query, inputs);
        query.region = INDIA.to_string();
        info!(region = INDIA, program = %query.program, "querying ratings");
        let india = self.fetch_region(store, &query, inputs);

        let fetched = FetchedRatings {
            region: inputs.region.clone(),
            channel_regular: inputs.channel_regular.clone(),
            channel_hd: inputs.channel_hd.clone(),
            local,
            india,
        };
        let result = fetched.result();
        if let (Some(dir), false) = (&self.export_dir, result.is_empty()) {
            if let Err(e) = RatingExport::write(dir, &inputs.program, &fetched) {
                warn!(error = %e, "failed to export rating data");
            }
        }
        result
    }

    fn fetch_region(
        &self,
        store: &dyn RatingStore,
        query: &RatingQuery,
        inputs: &RatingInputs,
    ) -> Option<RegionRatings> {
        for attempt in 1..=self.attempts {
            // The connection lives only for this attempt.
            let rows = store.connect().and_then(|mut conn| conn.fetch(query));
            match rows {
                Ok(rows) => {
                    let ratings = RegionRatings {
                        regular: first_rating(&rows, &inputs.channel_regular),
                        hd: first_rating(&rows, &inputs.channel_hd),
                    };
                    info!(
                        region = %query.region,
                        regular = ratings.regular,
                        hd = ratings.hd,
                        "retrieved ratings"
                    );
                    return Some(ratings);
                }
                Err(e) => warn!(
                    region = %query.region,
                    attempt,
                    attempts = self.attempts,
                    error = %e,
                    "rating query failed"
                ),
            }
        }
        warn!(region = %query.region, "rating lookup gave up after all attempts");
        None
    }
}

// "202501-202504" -> (202501, 202504). Without a hyphen both bounds are the whole text;
// more than one hyphen is rejected.
pub fn parse_period(text: &str) -> Option<(i64, i64)> {
    let parts: Vec<&str> = text.split('-').collect();
    let (start, end) = match parts.as_slice() {
        [single] => (*single, *single),
        [start, end] => (*start, *end),
        _ => return None,
    };
    Some((digits(start)?, digits(end)?))
}

fn digits(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn first_rating(rows: &[RatingRow], channel: &str) -> f64 {
    if channel.trim().is_empty() {
        return 0.0;
    }
    let wanted = normalize(channel);
    rows.iter()
        .find(|row| normalize(&row.channel) == wanted)
        .map(|row| row.tvr)
        .unwrap_or(0.0)
}
