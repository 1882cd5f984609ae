use std::collections::BTreeSet;
use std::fmt;

use anyhow::{bail, Result};

use super::loader::normalize_column_name;
use super::schema::{Capabilities, ColumnSchema};
use crate::error::ColumnMissing;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the pitch table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common CSV / Pandas dtypes.
/// Grouping uses `BTreeMap` / `BTreeSet`, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Guess the type of a text cell. `inf` and `Infinity` stay text.
    pub fn parse(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_nan() {
                return CellValue::Null;
            }
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return CellValue::Bool(s.eq_ignore_ascii_case("true"));
        }
        CellValue::String(s.to_string())
    }

    /// Label form for text columns: source text is kept verbatim, other
    /// values use their display form, blank text is null.
    pub fn into_label(self) -> CellValue {
        match self {
            CellValue::String(s) if s.trim().is_empty() => CellValue::Null,
            CellValue::String(s) => CellValue::String(s),
            CellValue::Null => CellValue::Null,
            other => CellValue::String(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view used for summing presence columns; booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integral view used for season numbers. `2.0` is season 2, `2.5` is not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column / PitchTable
// ---------------------------------------------------------------------------

/// One named column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// The loaded pitch records, one row per pitch.
///
/// Immutable once built; [`PitchTable::from_raw_columns`] is the only way in
/// and the only place where header names are normalized.
#[derive(Debug, Clone)]
pub struct PitchTable {
    columns: Vec<Column>,
    rows: usize,
    capabilities: Capabilities,
}

impl PitchTable {
    /// Build the table from loader output, normalizing every header and
    /// checking the schema against the result.
    pub fn from_raw_columns(raw: Vec<(String, Vec<CellValue>)>, schema: &ColumnSchema) -> Result<Self> {
        let rows = raw.first().map(|(_, v)| v.len()).unwrap_or(0);

        let mut columns: Vec<Column> = Vec::with_capacity(raw.len());
        for (raw_name, values) in raw {
            if values.len() != rows {
                bail!(
                    "column '{raw_name}' has {} values but the table has {rows} rows",
                    values.len()
                );
            }
            let name = normalize_column_name(&raw_name);
            if columns.iter().any(|c| c.name == name) {
                log::warn!("Duplicate column '{name}' (from '{raw_name}'); the first one is used");
            }
            let values = if schema.is_text_column(&name) {
                values.into_iter().map(CellValue::into_label).collect()
            } else {
                typed_cells(values)
            };
            columns.push(Column { name, values });
        }

        let capabilities = schema.capabilities(columns.iter().map(|c| c.name.as_str()));

        Ok(PitchTable {
            columns,
            rows,
            capabilities,
        })
    }

    /// Number of pitches (rows).
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Normalized column names in file order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Cells of a column by normalized name; the first column wins on duplicates.
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Fail with the placeholder unless every listed column is present.
    pub fn require(&self, columns: &[&str]) -> Result<(), ColumnMissing> {
        if self.capabilities.missing(columns).is_empty() {
            Ok(())
        } else {
            Err(ColumnMissing::for_columns(columns))
        }
    }

    /// Like [`PitchTable::column`] but reporting absence as [`ColumnMissing`].
    pub fn required_column(&self, name: &str) -> Result<&[CellValue], ColumnMissing> {
        self.column(name)
            .ok_or_else(|| ColumnMissing::Column(name.to_string()))
    }

    /// Distinct non-null values of a column.
    pub fn distinct_values(&self, name: &str) -> Option<BTreeSet<&CellValue>> {
        self.column(name)
            .map(|values| values.iter().filter(|v| !v.is_null()).collect())
    }
}

/// Guess types for text cells, then widen integers to floats when the column
/// holds any float, so `2` and `2.0` are one value.
fn typed_cells(values: Vec<CellValue>) -> Vec<CellValue> {
    let mut values: Vec<CellValue> = values
        .into_iter()
        .map(|v| match v {
            CellValue::String(s) => CellValue::parse(&s),
            other => other,
        })
        .collect();

    if values.iter().any(|v| matches!(v, CellValue::Float(_))) {
        for v in values.iter_mut() {
            if let CellValue::Integer(i) = *v {
                *v = CellValue::Float(i as f64);
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_guesses_types() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse(" 3 "), CellValue::Integer(3));
        assert_eq!(CellValue::parse("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::parse("True"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("Food"), CellValue::String("Food".into()));
        assert_eq!(CellValue::parse("NaN"), CellValue::Null);
    }

    #[test]
    fn test_parse_keeps_non_finite_as_text() {
        assert_eq!(CellValue::parse("inf"), CellValue::String("inf".into()));
        assert_eq!(CellValue::parse("Infinity"), CellValue::String("Infinity".into()));
        assert_eq!(CellValue::parse("-inf"), CellValue::String("-inf".into()));
    }

    #[test]
    fn test_mixed_numeric_column_is_widened() {
        let raw = vec![(
            "season_number".to_string(),
            ["1", "2", "2.0", ""].map(|s| CellValue::String(s.to_string())).to_vec(),
        )];
        let table = PitchTable::from_raw_columns(raw, &ColumnSchema::default()).unwrap();
        assert_eq!(
            table.column("season_number").unwrap(),
            &[
                CellValue::Float(1.0),
                CellValue::Float(2.0),
                CellValue::Float(2.0),
                CellValue::Null
            ][..]
        );
        assert_eq!(table.distinct_values("season_number").map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_text_columns_keep_source_text() {
        let raw = vec![(
            "Industry".to_string(),
            ["True", "1.50", "inf", " "].map(|s| CellValue::String(s.to_string())).to_vec(),
        )];
        let table = PitchTable::from_raw_columns(raw, &ColumnSchema::default()).unwrap();
        assert_eq!(
            table.column("industry").unwrap(),
            &[
                CellValue::String("True".into()),
                CellValue::String("1.50".into()),
                CellValue::String("inf".into()),
                CellValue::Null
            ][..]
        );
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let raw = vec![("industry".to_string(), Vec::new())];
        let table = PitchTable::from_raw_columns(raw, &ColumnSchema::default()).unwrap();
        assert!(table.is_empty());
        assert!(table.capabilities().has("industry"));
    }

    #[test]
    fn test_as_i64_only_for_integral_values() {
        assert_eq!(CellValue::Float(2.0).as_i64(), Some(2));
        assert_eq!(CellValue::Float(2.5).as_i64(), None);
        assert_eq!(CellValue::String("2".into()).as_i64(), None);
    }

    #[test]
    fn test_table_normalizes_headers_once() {
        let raw = vec![
            ("  Season Number ".to_string(), vec![CellValue::Integer(1)]),
            ("Industry".to_string(), vec![CellValue::String("Food".into())]),
        ];
        let table = PitchTable::from_raw_columns(raw, &ColumnSchema::default()).unwrap();

        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["season_number", "industry"]
        );
        assert!(table.capabilities().has("season_number"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ragged_columns_are_rejected() {
        let raw = vec![
            ("a".to_string(), vec![CellValue::Integer(1), CellValue::Integer(2)]),
            ("b".to_string(), vec![CellValue::Integer(1)]),
        ];
        assert!(PitchTable::from_raw_columns(raw, &ColumnSchema::default()).is_err());
    }

    #[test]
    fn test_duplicate_column_first_wins() {
        let raw = vec![
            ("Industry".to_string(), vec![CellValue::String("Food".into())]),
            ("industry".to_string(), vec![CellValue::String("Tech".into())]),
        ];
        let table = PitchTable::from_raw_columns(raw, &ColumnSchema::default()).unwrap();
        assert_eq!(
            table.column("industry"),
            Some(&[CellValue::String("Food".into())][..])
        );
    }

    #[test]
    fn test_distinct_values_skip_nulls() {
        let raw = vec![(
            "startup_name".to_string(),
            vec![
                CellValue::String("A".into()),
                CellValue::Null,
                CellValue::String("A".into()),
                CellValue::String("B".into()),
            ],
        )];
        let table = PitchTable::from_raw_columns(raw, &ColumnSchema::default()).unwrap();
        assert_eq!(table.distinct_values("startup_name").map(|s| s.len()), Some(2));
        assert!(table.distinct_values("industry").is_none());
    }
}
