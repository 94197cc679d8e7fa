//! Keyword catalog ingestion.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{IndexerError, Result};

/// Ordered, duplicate-free list of recommendable keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    keywords: Vec<String>,
}

impl Catalog {
    /// Build a catalog from raw keywords.
    ///
    /// Keywords are trimmed, blank ones are dropped and duplicates collapse
    /// onto their first occurrence. Identity is case-sensitive.
    pub fn from_keywords<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let keywords = raw
            .into_iter()
            .map(Into::<String>::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.clone()))
            .collect();
        Self { keywords }
    }

    /// Read the `column` of a CSV file with a header row.
    pub fn from_csv(path: impl AsRef<Path>, column: &str) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path)?;
        let catalog = Self::from_csv_reader(reader, column)?;
        info!(
            "Loaded {} distinct keywords from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Read the `column` of CSV data from any reader.
    pub fn from_reader<R: Read>(reader: R, column: &str) -> Result<Self> {
        Self::from_csv_reader(csv::Reader::from_reader(reader), column)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>, column: &str) -> Result<Self> {
        let position = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| IndexerError::MissingColumn(column.to_string()))?;

        let mut raw = Vec::new();
        let mut rows = 0usize;
        for record in reader.records() {
            let record = record?;
            rows += 1;
            if let Some(value) = record.get(position) {
                raw.push(value.to_string());
            }
        }

        let catalog = Self::from_keywords(raw);
        debug!("{rows} catalog rows yielded {} keywords", catalog.len());

        if catalog.is_empty() {
            return Err(IndexerError::EmptyCatalog);
        }
        Ok(catalog)
    }

    /// Keywords in catalog order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
