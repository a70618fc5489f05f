//! Review sources.
//!
//! A [`Fetcher`] yields reviews that already satisfy [`Review::validate`].
//! Rows that cannot be coerced into a valid review are skipped and logged,
//! never passed on with an out-of-range score.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use polarity_types::{PolarityError, Result, Review};

/// Source of review records.
pub trait Fetcher {
    /// Every available review, in source order.
    fn fetch(&self) -> Result<Vec<Review>>;
}

/// Serves reviews held in memory.
#[derive(Debug, Clone, Default)]
pub struct VecFetcher {
    reviews: Vec<Review>,
}

impl VecFetcher {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self { reviews }
    }
}

impl Fetcher for VecFetcher {
    fn fetch(&self) -> Result<Vec<Review>> {
        Ok(self.reviews.clone())
    }
}

/// Columns a review file must carry.
const REQUIRED_COLUMNS: [&str; 5] = ["Id", "ProductId", "UserId", "Score", "Text"];

/// Reads the fine-food review CSV layout.
#[derive(Debug, Clone)]
pub struct CsvFetcher {
    path: PathBuf,
    limit: Option<usize>,
}

impl CsvFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: None,
        }
    }

    /// Reads at most `limit` data rows.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Fetcher for CsvFetcher {
    fn fetch(&self) -> Result<Vec<Review>> {
        let file = File::open(&self.path)?;
        let reviews = parse_reviews(BufReader::new(file), self.limit)?;
        info!(path = %self.path.display(), reviews = reviews.len(), "fetched reviews");
        Ok(reviews)
    }
}

/// One CSV row before coercion. Every cell may be blank.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "ProductId")]
    product_id: Option<String>,
    #[serde(rename = "UserId")]
    user_id: Option<String>,
    #[serde(rename = "ProfileName")]
    profile_name: Option<String>,
    #[serde(rename = "HelpfulnessNumerator")]
    helpfulness_numerator: Option<String>,
    #[serde(rename = "HelpfulnessDenominator")]
    helpfulness_denominator: Option<String>,
    #[serde(rename = "Score")]
    score: Option<String>,
    #[serde(rename = "Time")]
    time: Option<String>,
    #[serde(rename = "Summary")]
    summary: Option<String>,
    #[serde(rename = "Text")]
    text: Option<String>,
}

/// Parses an integer cell, accepting a float spelling such as `"5.0"`.
fn coerce_int(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    let f = cell.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

impl RawRow {
    fn into_review(self, row: usize) -> Result<Review> {
        let id = non_blank(self.id).unwrap_or_else(|| format!("row-{row}"));

        let invalid = |reason: String| PolarityError::InvalidRecord {
            id: id.clone(),
            reason,
        };

        let score = match non_blank(self.score) {
            None => return Err(invalid("missing score".to_owned())),
            Some(cell) => coerce_int(&cell).ok_or_else(|| invalid(format!("score {cell:?} is not a number")))?,
        };
        let score = u8::try_from(score)
            .ok()
            .filter(|s| (Review::MIN_SCORE..=Review::MAX_SCORE).contains(s))
            .ok_or_else(|| invalid(format!("score {score} outside 1..=5")))?;

        let counter = |cell: Option<String>| {
            non_blank(cell)
                .as_deref()
                .and_then(coerce_int)
                .and_then(|v| u32::try_from(v).ok())
        };

        let review = Review {
            product_id: non_blank(self.product_id).unwrap_or_default(),
            user_id: non_blank(self.user_id).unwrap_or_default(),
            profile_name: non_blank(self.profile_name),
            helpfulness_numerator: counter(self.helpfulness_numerator),
            helpfulness_denominator: counter(self.helpfulness_denominator),
            score,
            time: non_blank(self.time).as_deref().and_then(coerce_int),
            summary: non_blank(self.summary),
            text: self.text.unwrap_or_default(),
            id,
        };
        review.validate()?;
        Ok(review)
    }
}

fn csv_error(err: csv::Error) -> PolarityError {
    PolarityError::Csv(err.to_string())
}

/// Parses review rows from CSV with a header line.
///
/// `limit` caps the number of data rows read. Rows that fail to parse or
/// validate are skipped with a warning.
///
/// # Errors
///
/// [`PolarityError::Csv`] if the header cannot be read or lacks a required
/// column.
pub fn parse_reviews<R: Read>(reader: R, limit: Option<usize>) -> Result<Vec<Review>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv.headers().map_err(csv_error)?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h.trim() == **col))
    {
        return Err(PolarityError::Csv(format!("missing column {missing:?}")));
    }

    let mut reviews = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in csv
        .deserialize::<RawRow>()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
    {
        let parsed = record
            .map_err(csv_error)
            .and_then(|raw| raw.into_review(row));
        match parsed {
            Ok(review) => reviews.push(review),
            Err(err) => {
                skipped += 1;
                warn!(row, error = %err, "skipping review row");
            }
        }
    }

    if skipped > 0 {
        info!(kept = reviews.len(), skipped, "parsed review rows");
    }
    Ok(reviews)
}
