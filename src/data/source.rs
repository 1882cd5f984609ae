use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::loader::load_table;
use super::model::PitchTable;
use super::schema::ColumnSchema;
use crate::error::DataError;

// ---------------------------------------------------------------------------
// DataSource – load once, then reuse
// ---------------------------------------------------------------------------

/// Owner of one dataset file and, after the first successful read, of its
/// table. Every caller that needs the table goes through [`DataSource::table`];
/// storage is read at most once per source.
#[derive(Debug)]
pub struct DataSource {
    path: PathBuf,
    schema: ColumnSchema,
    table: OnceCell<Arc<PitchTable>>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, schema: ColumnSchema) -> Self {
        Self {
            path: path.into(),
            schema,
            table: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The loaded table. A failure is returned as-is and not remembered, so
    /// the next call tries the file again.
    pub fn table(&self) -> Result<Arc<PitchTable>, DataError> {
        self.table
            .get_or_try_init(|| {
                let table = load_table(&self.path, &self.schema)?;
                log::info!(
                    "Loaded {} pitches with columns {:?} from {}",
                    table.len(),
                    table.column_names().collect::<Vec<_>>(),
                    self.path.display()
                );
                Ok::<_, DataError>(Arc::new(table))
            })
            .cloned()
    }

    /// Whether the table has already been read.
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_table_is_read_once() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Industry\nFood\nTech").unwrap();
        file.flush().unwrap();
        let path = file.path().to_path_buf();

        let source = DataSource::new(&path, ColumnSchema::default());
        assert!(!source.is_loaded());
        let first = source.table().unwrap();

        // Storage is gone; the cached table must still be served.
        drop(file);
        assert!(!path.exists());

        let second = source.table().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let source = DataSource::new(&path, ColumnSchema::default());

        assert!(matches!(source.table(), Err(DataError::DataUnavailable { .. })));
        assert!(!source.is_loaded());

        std::fs::write(&path, "season_number\n1\n").unwrap();
        assert_eq!(source.table().unwrap().len(), 1);
    }
}
