use std::collections::BTreeSet;

use super::loader::normalize_column_name;

// ---------------------------------------------------------------------------
// Known column identifiers (normalized form)
// ---------------------------------------------------------------------------

pub const STARTUP_NAME: &str = "startup_name";
pub const INDUSTRY: &str = "industry";
pub const SEASON_NUMBER: &str = "season_number";
pub const DEAL_STATUS: &str = "deal_status";

/// Label columns: their cells are kept as source text, never type-guessed.
pub const TEXT_COLUMNS: [&str; 3] = [STARTUP_NAME, INDUSTRY, DEAL_STATUS];

/// One presence column per investor on the panel.
pub const DEFAULT_INVESTOR_COLUMNS: [&str; 7] = [
    "namita_present",
    "vineeta_present",
    "anupam_present",
    "aman_present",
    "peyush_present",
    "amit_present",
    "ashneer_present",
];

// ---------------------------------------------------------------------------
// ColumnSchema – what the queries know how to use
// ---------------------------------------------------------------------------

/// Descriptor of every column the query layer may reference.
///
/// The fixed columns are always part of the schema; the investor presence
/// columns are configurable and kept in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    investor_columns: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::new(DEFAULT_INVESTOR_COLUMNS)
    }
}

impl ColumnSchema {
    /// Investor names go through the same normalization as table headers,
    /// so `"Namita Present"` and `"namita_present"` describe the same column.
    pub fn new<I, S>(investor_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let investor_columns = investor_columns
            .into_iter()
            .map(|c| normalize_column_name(c.as_ref()))
            .filter(|c| !c.is_empty() && seen.insert(c.clone()))
            .collect();
        Self { investor_columns }
    }

    pub fn investor_columns(&self) -> &[String] {
        &self.investor_columns
    }

    /// All known identifiers: fixed columns first, then investors.
    pub fn known_columns(&self) -> impl Iterator<Item = &str> {
        [STARTUP_NAME, INDUSTRY, SEASON_NUMBER, DEAL_STATUS]
            .into_iter()
            .chain(self.investor_columns.iter().map(String::as_str))
    }

    pub fn is_text_column(&self, column: &str) -> bool {
        TEXT_COLUMNS.contains(&column)
    }

    /// Check the schema against a normalized header.
    pub fn capabilities<'a, I>(&self, header: I) -> Capabilities
    where
        I: IntoIterator<Item = &'a str>,
    {
        let header: BTreeSet<&str> = header.into_iter().collect();
        let present = self
            .known_columns()
            .filter(|c| header.contains(c))
            .map(str::to_string)
            .collect();
        let investors = self
            .investor_columns
            .iter()
            .filter(|c| header.contains(c.as_str()))
            .cloned()
            .collect();
        Capabilities { present, investors }
    }
}

// ---------------------------------------------------------------------------
// Capabilities – the schema intersected with a loaded header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    present: BTreeSet<String>,
    investors: Vec<String>,
}

impl Capabilities {
    pub fn has(&self, column: &str) -> bool {
        self.present.contains(column)
    }

    /// Available investor presence columns, in schema order.
    pub fn investors(&self) -> &[String] {
        &self.investors
    }

    /// Required columns that are absent, in the order they were asked for.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required.iter().copied().filter(|c| !self.has(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_normalizes_investor_names() {
        let schema = ColumnSchema::new([" Namita Present", "namita_present", "AMAN PRESENT"]);
        assert_eq!(
            schema.investor_columns(),
            &["namita_present".to_string(), "aman_present".to_string()]
        );
    }

    #[test]
    fn test_capabilities_keep_schema_order() {
        let schema = ColumnSchema::default();
        let caps = schema.capabilities(["ashneer_present", "industry", "namita_present", "extra"]);

        assert!(caps.has(INDUSTRY));
        assert!(!caps.has(SEASON_NUMBER));
        assert!(!caps.has("extra"));
        assert_eq!(
            caps.investors(),
            &["namita_present".to_string(), "ashneer_present".to_string()]
        );
        assert_eq!(caps.missing(&[SEASON_NUMBER, INDUSTRY]), vec![SEASON_NUMBER]);
    }
}
