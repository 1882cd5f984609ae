use std::path::PathBuf;
use std::sync::Arc;

use crate::color::CategoryColors;
use crate::data::model::PitchTable;
use crate::data::schema::{ColumnSchema, INDUSTRY};
use crate::data::source::DataSource;
use crate::pages::{Page, PageReport};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Schema applied to every dataset this session opens.
    pub schema: ColumnSchema,

    /// Where the current table came from.
    pub source: Option<DataSource>,

    /// Loaded table (None until a load succeeds).
    pub table: Option<Arc<PitchTable>>,

    /// Page selected in the sidebar.
    pub page: Page,

    /// Query results for `page`, computed once per selection.
    pub report: Option<PageReport>,

    /// Colours shared by every chart keyed on industry.
    pub industry_colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(schema: ColumnSchema) -> Self {
        Self {
            schema,
            source: None,
            table: None,
            page: Page::default(),
            report: None,
            industry_colors: CategoryColors::default(),
            status_message: None,
        }
    }

    /// Open a dataset file; on failure the previous table is dropped, since
    /// no page can be drawn from data the user did not ask for.
    pub fn open(&mut self, path: impl Into<PathBuf>) {
        let source = DataSource::new(path, self.schema.clone());
        match source.table() {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.table = None;
                self.report = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.source = Some(source);
    }

    /// Ingest a newly loaded table and rebuild the current page.
    pub fn set_table(&mut self, table: Arc<PitchTable>) {
        self.industry_colors = CategoryColors::new(
            table
                .column(INDUSTRY)
                .unwrap_or_default()
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| v.to_string()),
        );
        self.report = Some(self.page.report(&table));
        self.table = Some(table);
        self.status_message = None;
    }

    /// Switch page; the report is recomputed only when the page changes.
    pub fn select_page(&mut self, page: Page) {
        if page == self.page && self.report.is_some() {
            return;
        }
        self.page = page;
        self.report = self.table.as_ref().map(|t| page.report(t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_navigate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pitches.csv");
        std::fs::write(&path, "Industry,Season Number\nFood,1\nTech,2\n").unwrap();

        let mut state = AppState::new(ColumnSchema::default());
        state.open(&path);

        assert!(state.status_message.is_none());
        assert!(matches!(state.report, Some(PageReport::Home(_))));

        state.select_page(Page::IndustryAnalysis);
        assert_eq!(state.page, Page::IndustryAnalysis);
        assert!(matches!(state.report, Some(PageReport::Industry(_))));
    }

    #[test]
    fn test_open_missing_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(ColumnSchema::default());
        state.open(dir.path().join("absent.csv"));

        assert!(state.table.is_none());
        assert!(state.report.is_none());
        let msg = state.status_message.expect("status message");
        assert!(msg.contains("absent.csv"));
    }
}
