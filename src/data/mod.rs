/// Data layer: table model, loading, schema checks and queries.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌────────────┐
///   │ DataSource  │  load once per file, share as Arc
///   └────────────┘
///        │  loader: parse file → raw columns
///        ▼
///   ┌────────────┐
///   │ PitchTable  │  normalized headers + Capabilities (from ColumnSchema)
///   └────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │   query     │  group-by / count / sum → Outcome (result or placeholder)
///   └────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod query;
pub mod schema;
pub mod source;
