//! Catalog module for the catalog indexer pipeline.
//!
//! Reads the product catalog, a delimited file with a header row containing
//! at least `id`, `name` and `description`, into ordered [`CatalogRecord`]s.

use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use catalog_indexer_shared::CatalogRecord;

/// Columns every catalog must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["id", "name", "description"];

/// Positions of the required columns in the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    id: usize,
    name: usize,
    description: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, PipelineError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}') == column)
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| find(column).is_none())
            .collect();

        match (find("id"), find("name"), find("description")) {
            (Some(id), Some(name), Some(description)) => Ok(Self {
                id,
                name,
                description,
            }),
            _ => Err(PipelineError::format(format!(
                "catalog is missing required column(s): {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Loads product catalogs from delimited files.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    delimiter: u8,
}

impl CatalogLoader {
    /// Create a loader for comma-separated catalogs.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Create a loader for catalogs separated by `delimiter`.
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load every record of the catalog at `path`.
    ///
    /// # Errors
    ///
    /// * `PipelineError::NotFound` - If `path` does not exist
    /// * `PipelineError::FormatError` - If the file is unreadable, a required
    ///   column is missing, or a row has an empty or duplicated `id`
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load_path(&self, path: &Path) -> Result<Vec<CatalogRecord>, PipelineError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
            _ => PipelineError::format(format!("cannot read {}: {}", path.display(), e)),
        })?;

        let records = self.load_reader(file)?;
        info!(records = records.len(), "Loaded product catalog");
        Ok(records)
    }

    /// Load every record from an already opened catalog source.
    ///
    /// Applies the same validation as [`load_path`](Self::load_path).
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<CatalogRecord>, PipelineError> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| PipelineError::format(format!("unreadable header row: {}", e)))?
            .clone();
        let columns = ColumnIndex::from_headers(&headers)?;

        let mut records = Vec::new();
        let mut seen: HashMap<String, u64> = HashMap::new();

        for row in csv_reader.records() {
            let row = row.map_err(|e| PipelineError::format(format!("unreadable row: {}", e)))?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let id = row.get(columns.id).unwrap_or_default().trim();
            if id.is_empty() {
                return Err(PipelineError::format(format!("line {}: id is empty", line)));
            }

            if let Some(first_line) = seen.insert(id.to_string(), line) {
                return Err(PipelineError::format(format!(
                    "duplicate id '{}' on lines {} and {}",
                    id, first_line, line
                )));
            }

            records.push(CatalogRecord::new(
                id,
                row.get(columns.name).unwrap_or_default(),
                row.get(columns.description).unwrap_or_default(),
            ));
        }

        debug!(records = records.len(), "Parsed catalog rows");
        Ok(records)
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(csv: &str) -> Result<Vec<CatalogRecord>, PipelineError> {
        CatalogLoader::new().load_reader(csv.as_bytes())
    }

    #[test]
    fn test_load_in_file_order() {
        let records = load(
            "id,name,price,description\n\
             1,Trail Mug,12.5,Insulated steel mug\n\
             2,Sun Hat,20,Wide-brim sun hat\n",
        )
        .unwrap();

        assert_eq!(
            records,
            vec![
                CatalogRecord::new("1", "Trail Mug", "Insulated steel mug"),
                CatalogRecord::new("2", "Sun Hat", "Wide-brim sun hat"),
            ]
        );
    }

    #[test]
    fn test_column_order_and_header_whitespace() {
        let records = load(" description , id ,name\n\"Warm, dry tent\",10,Alpine Tent\n").unwrap();

        assert_eq!(records[0].id, "10");
        assert_eq!(records[0].name, "Alpine Tent");
        assert_eq!(records[0].description, "Warm, dry tent");
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let records = load("\u{feff}id,name,description\n1,Trail Mug,Mug\n").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let err = load("id,name\n1,Trail Mug\n").unwrap_err();

        assert!(matches!(err, PipelineError::FormatError(_)));
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_empty_id() {
        let err = load("id,name,description\n1,Trail Mug,Mug\n  ,Sun Hat,Hat\n").unwrap_err();

        assert!(matches!(err, PipelineError::FormatError(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_duplicate_id() {
        let err = load("id,name,description\n1,Trail Mug,Mug\n1,Sun Hat,Hat\n").unwrap_err();

        assert!(matches!(err, PipelineError::FormatError(_)));
        assert!(err.to_string().contains("duplicate id '1'"));
    }

    #[test]
    fn test_unequal_row_length() {
        let err = load("id,name,description\n1,Trail Mug\n").unwrap_err();
        assert!(matches!(err, PipelineError::FormatError(_)));
    }

    #[test]
    fn test_empty_description_is_loaded() {
        // Rejected later by the document builder, not here
        let records = load("id,name,description\n1,Trail Mug,\n").unwrap();
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn test_custom_delimiter() {
        let records = CatalogLoader::with_delimiter(b';')
            .load_reader("id;name;description\n1;Trail Mug;Mug, steel\n".as_bytes())
            .unwrap();

        assert_eq!(records[0].description, "Mug, steel");
    }

    #[test]
    fn test_load_path_not_found() {
        let err = CatalogLoader::new()
            .load_path(Path::new("/definitely/not/here/products.csv"))
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn test_load_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,description").unwrap();
        writeln!(file, "1,Trail Mug,Insulated steel mug").unwrap();

        let records = CatalogLoader::new().load_path(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Trail Mug");
    }
}
