//! Aggregations feeding the dashboard charts.
//!
//! Every query is a pure function of a [`PitchTable`]. Missing columns never
//! raise: the query comes back as [`Outcome::Skipped`] carrying the message to
//! show in place of the chart.

use std::collections::BTreeMap;

use super::model::{CellValue, PitchTable};
use super::schema::{INDUSTRY, SEASON_NUMBER};
use crate::error::ColumnMissing;

// ---------------------------------------------------------------------------
// Outcome – result or placeholder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ready(T),
    Skipped(ColumnMissing),
}

impl<T> Outcome<T> {
    /// Run a query body; a missing column becomes the placeholder.
    pub fn attempt(body: impl FnOnce() -> Result<T, ColumnMissing>) -> Self {
        body().into()
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }
}

impl<T> From<Result<T, ColumnMissing>> for Outcome<T> {
    fn from(result: Result<T, ColumnMissing>) -> Self {
        match result {
            Ok(v) => Outcome::Ready(v),
            Err(missing) => Outcome::Skipped(missing),
        }
    }
}

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonCount {
    pub season: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndustryCount {
    pub industry: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonIndustryCount {
    pub season: i64,
    pub industry: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestorTotal {
    pub investor: String,
    pub total: f64,
}

/// Industry × investor totals; `cells[row][col]` belongs to
/// `industries[row]` and `investors[col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryMatrix {
    pub industries: Vec<String>,
    pub investors: Vec<String>,
    pub cells: Vec<Vec<f64>>,
}

impl IndustryMatrix {
    pub fn get(&self, industry: &str, investor: &str) -> Option<f64> {
        let row = self.industries.iter().position(|i| i == industry)?;
        let col = self.investors.iter().position(|i| i == investor)?;
        Some(self.cells[row][col])
    }

    /// Largest cell, used to scale the heatmap colours.
    pub fn max_value(&self) -> f64 {
        self.cells
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Number of distinct non-null values in `column`.
pub fn count_distinct(table: &PitchTable, column: &str) -> Outcome<usize> {
    table
        .distinct_values(column)
        .map(|values| values.len())
        .ok_or_else(|| ColumnMissing::Column(column.to_string()))
        .into()
}

/// Pitches per season, ascending by season.
pub fn counts_by_season(table: &PitchTable) -> Outcome<Vec<SeasonCount>> {
    Outcome::attempt(|| {
        let seasons = table.required_column(SEASON_NUMBER)?;
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for season in seasons.iter().filter_map(season_key) {
            *counts.entry(season).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(season, count)| SeasonCount { season, count })
            .collect())
    })
}

/// Pitches per industry, most frequent first. Equal counts keep the order in
/// which the industries first appear in the table.
pub fn counts_by_industry(table: &PitchTable) -> Outcome<Vec<IndustryCount>> {
    Outcome::attempt(|| {
        let industries = table.required_column(INDUSTRY)?;
        let mut counts: Vec<IndustryCount> = Vec::new();
        for industry in industries.iter().filter_map(industry_key) {
            match counts.iter_mut().find(|c| c.industry == industry) {
                Some(entry) => entry.count += 1,
                None => counts.push(IndustryCount { industry, count: 1 }),
            }
        }
        // `sort_by` is stable, so ties stay in first-appearance order.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    })
}

/// Pitches per (season, industry), ascending by season then industry.
pub fn counts_by_season_and_industry(table: &PitchTable) -> Outcome<Vec<SeasonIndustryCount>> {
    Outcome::attempt(|| {
        table.require(&[SEASON_NUMBER, INDUSTRY])?;
        let seasons = table.required_column(SEASON_NUMBER)?;
        let industries = table.required_column(INDUSTRY)?;

        let mut counts: BTreeMap<(i64, String), usize> = BTreeMap::new();
        for (season, industry) in seasons.iter().zip(industries) {
            if let (Some(season), Some(industry)) = (season_key(season), industry_key(industry)) {
                *counts.entry((season, industry)).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|((season, industry), count)| SeasonIndustryCount {
                season,
                industry,
                count,
            })
            .collect())
    })
}

/// Sum of every available investor presence column.
pub fn investment_totals(table: &PitchTable) -> Outcome<Vec<InvestorTotal>> {
    Outcome::attempt(|| {
        let investors = available_investors(table)?;
        investors
            .iter()
            .map(|investor| {
                let cells = table.required_column(investor)?;
                Ok(InvestorTotal {
                    investor: investor.clone(),
                    total: cells.iter().filter_map(CellValue::as_f64).sum(),
                })
            })
            .collect()
    })
}

/// Investor presence summed per industry (industries ascending).
pub fn investments_by_industry(table: &PitchTable) -> Outcome<IndustryMatrix> {
    Outcome::attempt(|| {
        table.require(&[INDUSTRY])?;
        let investors = available_investors(table)?.to_vec();
        let industries = table.required_column(INDUSTRY)?;
        let presence = investors
            .iter()
            .map(|investor| table.required_column(investor))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sums: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (row, industry) in industries.iter().enumerate() {
            let Some(industry) = industry_key(industry) else {
                continue;
            };
            let totals = sums
                .entry(industry)
                .or_insert_with(|| vec![0.0; investors.len()]);
            for (total, cells) in totals.iter_mut().zip(&presence) {
                *total += cells[row].as_f64().unwrap_or(0.0);
            }
        }

        let (industries, cells) = sums.into_iter().unzip();
        Ok(IndustryMatrix {
            industries,
            investors,
            cells,
        })
    })
}

// -- helpers --

fn available_investors(table: &PitchTable) -> Result<&[String], ColumnMissing> {
    let investors = table.capabilities().investors();
    if investors.is_empty() {
        Err(ColumnMissing::NoInvestors)
    } else {
        Ok(investors)
    }
}

fn season_key(value: &CellValue) -> Option<i64> {
    if value.is_null() {
        return None;
    }
    let season = value.as_i64();
    if season.is_none() {
        log::debug!("Ignoring non-integer season value {value}");
    }
    season
}

fn industry_key(value: &CellValue) -> Option<String> {
    (!value.is_null()).then(|| value.to_string())
}
