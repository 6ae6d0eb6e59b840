// Tabular data
//
// A `Table` is an ordered set of named columns over rows of JSON values.
// It is the unit of exchange between the screening stages: CSV files load
// into tables, matchers and topic models derive new tables from them, and
// results serialize back out as CSV. Cells are `serde_json::Value` so a
// table can carry text, counts, and probabilities side by side.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row: column name to cell value.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Copy of this table with `values` as column `name`. An existing
    /// column is overwritten in place; a new one lands at the end.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<Table> {
        if values.len() != self.rows.len() {
            bail!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            );
        }
        let mut out = self.clone();
        if !out.has_column(name) {
            out.columns.push(name.to_string());
        }
        for (row, value) in out.rows.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }
        Ok(out)
    }

    /// Copy of this table keeping only rows the predicate accepts.
    /// Row order is preserved.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Row) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    pub fn from_csv_path(path: &Path) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::from_csv_reader(file)
    }

    /// Parse a CSV stream. The first record names the columns; every
    /// cell loads as a string value.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Table> {
        let mut csv = csv::Reader::from_reader(reader);
        let columns: Vec<String> = csv
            .headers()
            .context("reading CSV header")?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in csv.records() {
            let record = record.context("reading CSV record")?;
            let mut row = Row::new();
            for (column, field) in columns.iter().zip(record.iter()) {
                row.insert(column.clone(), Value::from(field));
            }
            rows.push(row);
        }
        Ok(Table { columns, rows })
    }

    pub fn to_csv_path(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_csv(file)
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.columns).context("writing CSV header")?;
        for row in &self.rows {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|column| cell_to_string(row.get(column)))
                .collect();
            csv.write_record(&record).context("writing CSV record")?;
        }
        csv.flush().context("flushing CSV output")?;
        Ok(())
    }
}

/// Text content of a cell. Missing, null, and non-string cells all read
/// as the empty string, so text operations never fail on sparse data.
pub fn cell_text<'a>(row: &'a Row, column: &str) -> &'a str {
    match row.get(column) {
        Some(Value::String(s)) => s.as_str(),
        _ => "",
    }
}

fn cell_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
