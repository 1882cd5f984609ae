use std::fmt;

use crate::data::model::PitchTable;
use crate::data::query::{
    count_distinct, counts_by_industry, counts_by_season, counts_by_season_and_industry,
    investment_totals, investments_by_industry, IndustryCount, IndustryMatrix, InvestorTotal,
    Outcome, SeasonCount, SeasonIndustryCount,
};
use crate::data::schema::{INDUSTRY, SEASON_NUMBER, STARTUP_NAME};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The views listed in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    IndustryAnalysis,
    SharkParticipation,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::IndustryAnalysis, Page::SharkParticipation];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::IndustryAnalysis => "Industry Analysis",
            Page::SharkParticipation => "Shark Participation",
        }
    }

    /// Run this page's queries against the table.
    pub fn report(self, table: &PitchTable) -> PageReport {
        log::debug!("Building '{}' report over {} pitches", self.title(), table.len());
        match self {
            Page::Home => PageReport::Home(HomeReport {
                total_startups: count_distinct(table, STARTUP_NAME),
                total_industries: count_distinct(table, INDUSTRY),
                total_seasons: count_distinct(table, SEASON_NUMBER),
                by_season: counts_by_season(table),
            }),
            Page::IndustryAnalysis => PageReport::Industry(IndustryReport {
                by_industry: counts_by_industry(table),
                by_season_and_industry: counts_by_season_and_industry(table),
            }),
            Page::SharkParticipation => PageReport::Sharks(SharkReport {
                totals: investment_totals(table),
                by_industry: investments_by_industry(table),
            }),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Reports – everything one page draws
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum PageReport {
    Home(HomeReport),
    Industry(IndustryReport),
    Sharks(SharkReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeReport {
    pub total_startups: Outcome<usize>,
    pub total_industries: Outcome<usize>,
    pub total_seasons: Outcome<usize>,
    pub by_season: Outcome<Vec<SeasonCount>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndustryReport {
    pub by_industry: Outcome<Vec<IndustryCount>>,
    pub by_season_and_industry: Outcome<Vec<SeasonIndustryCount>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SharkReport {
    pub totals: Outcome<Vec<InvestorTotal>>,
    pub by_industry: Outcome<IndustryMatrix>,
}

/// Metric tile text: the count, or `N/A` when the column is missing.
pub fn metric_text(outcome: &Outcome<usize>) -> String {
    match outcome {
        Outcome::Ready(n) => n.to_string(),
        Outcome::Skipped(_) => "N/A".to_string(),
    }
}

/// Chart label for an investor presence column: `namita_present` → `Namita`.
pub fn investor_display_name(column: &str) -> String {
    let name = column.strip_suffix("_present").unwrap_or(column);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => column.to_string(),
    }
}
