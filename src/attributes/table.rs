// Speaker attributes table.
//
// One row per Wikidata entity, keyed by the `id` column. Every other
// column holds a list of raw values (often further QIDs, sometimes dates
// or free text) or nothing at all. The table is loaded wholesale and only
// read afterwards.
//
// The reference dataset is `speaker_attributes.parquet`; small tables can
// also be loaded from JSON lines or built in memory.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value;
use tracing::{info, warn};

use crate::quotes::codec::JsonLinesReader;

/// Column holding the entity identifier.
pub const ID_COLUMN: &str = "id";

/// Present cells of one entity, column name → values.
/// A column missing from the map is an absent cell.
pub type AttributeRow = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    columns: Vec<String>,
    rows: HashMap<String, AttributeRow>,
}

impl AttributeTable {
    /// Empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: HashMap::new(),
        }
    }

    /// Add a row. Returns false (and keeps the existing row) if `id` is
    /// already present. Cells for columns outside the schema are dropped.
    pub fn insert_row(&mut self, id: impl Into<String>, mut row: AttributeRow) -> bool {
        let id = id.into();
        if self.rows.contains_key(&id) {
            return false;
        }
        row.retain(|column, _| self.columns.iter().any(|c| c == column));
        self.rows.insert(id, row);
        true
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn row(&self, id: &str) -> Option<&AttributeRow> {
        self.rows.get(id)
    }

    /// Values of one cell, `None` when the row or the cell is absent.
    pub fn cell(&self, id: &str, column: &str) -> Option<&[String]> {
        self.rows
            .get(id)
            .and_then(|row| row.get(column))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Load the table from a parquet file.
    ///
    /// List columns become value lists, scalar columns become one-element
    /// lists, nulls become absent cells. Non-string values are rendered
    /// with Arrow's display formatting.
    pub fn from_parquet(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("Failed to read parquet metadata of {}", path.display()))?;

        let schema = builder.schema().clone();
        let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let id_idx = schema
            .index_of(ID_COLUMN)
            .with_context(|| format!("{} has no `{ID_COLUMN}` column", path.display()))?;

        let mut table = Self::new(columns);
        let mut duplicates = 0usize;
        for batch in builder.build()? {
            let batch = batch.context("Failed to decode parquet record batch")?;
            duplicates += table.append_batch(&batch, id_idx)?;
        }

        if duplicates > 0 {
            warn!(duplicates = duplicates, "Duplicate ids in attributes table, kept first rows");
        }
        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            "Loaded speaker attributes"
        );
        Ok(table)
    }

    /// Append one Arrow record batch, returning how many duplicate ids were dropped.
    pub fn append_batch(&mut self, batch: &RecordBatch, id_idx: usize) -> Result<usize> {
        let schema = batch.schema();
        let ids = batch.column(id_idx);
        let mut duplicates = 0;

        for row_idx in 0..batch.num_rows() {
            if ids.is_null(row_idx) {
                warn!(row = row_idx, "Attributes row without id, skipping");
                continue;
            }
            let id = scalar_to_string(ids.as_ref(), row_idx)?;

            let mut row = AttributeRow::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                if let Some(values) = cell_values(batch.column(col_idx).as_ref(), row_idx)? {
                    row.insert(field.name().clone(), values);
                }
            }

            if !self.insert_row(id, row) {
                duplicates += 1;
            }
        }

        Ok(duplicates)
    }

    /// Load the table from (possibly compressed) JSON lines, one object per
    /// entity with an `id` field. Columns are the union of keys in
    /// first-seen order.
    pub fn from_json_lines(path: &Path) -> Result<Self> {
        let mut table = Self::default();

        for record in JsonLinesReader::open(path)? {
            let record = record?;
            let Some(id) = record.get(ID_COLUMN).and_then(Value::as_str) else {
                anyhow::bail!("Attributes record without string `{ID_COLUMN}` in {}", path.display());
            };
            let id = id.to_string();

            let mut row = AttributeRow::new();
            for (column, value) in record.fields() {
                if !table.has_column(column) {
                    table.columns.push(column.clone());
                }
                if let Some(values) = json_cell_values(value) {
                    row.insert(column.clone(), values);
                }
            }

            if !table.insert_row(id.clone(), row) {
                warn!(id = %id, "Duplicate id in attributes table, keeping first row");
            }
        }

        info!(
            path = %path.display(),
            rows = table.len(),
            "Loaded speaker attributes"
        );
        Ok(table)
    }

    /// Load by extension: `.parquet` through Arrow, anything else as JSON lines.
    pub fn load(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("parquet") => Self::from_parquet(path),
            _ => Self::from_json_lines(path),
        }
    }
}

fn cell_values(array: &dyn Array, row: usize) -> Result<Option<Vec<String>>> {
    if array.is_null(row) {
        return Ok(None);
    }
    let values = match array.data_type() {
        DataType::List(_) => list_strings(array.as_list::<i32>().value(row).as_ref())?,
        DataType::LargeList(_) => list_strings(array.as_list::<i64>().value(row).as_ref())?,
        _ => vec![scalar_to_string(array, row)?],
    };
    Ok(Some(values))
}

fn list_strings(values: &dyn Array) -> Result<Vec<String>> {
    (0..values.len())
        .filter(|&i| !values.is_null(i))
        .map(|i| scalar_to_string(values, i))
        .collect()
}

fn scalar_to_string(array: &dyn Array, row: usize) -> Result<String> {
    let value = match array.data_type() {
        DataType::Utf8 => array.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => array.as_string::<i64>().value(row).to_string(),
        _ => array_value_to_string(array, row).context("Failed to render attribute value")?,
    };
    Ok(value)
}

fn json_cell_values(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(json_scalar_to_string)
                .collect(),
        ),
        other => Some(vec![json_scalar_to_string(other)]),
    }
}

fn json_scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
