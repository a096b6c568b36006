use std::collections::{BTreeSet, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Typed cell storage for a column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnValues::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// A named column of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    /// Numeric column without missing cells.
    pub fn numbers(name: impl Into<String>, values: &[f64]) -> Self {
        Self::numeric(name, values.iter().copied().map(Some).collect())
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Categorical(values),
        }
    }

    /// Categorical column without missing cells.
    pub fn labels(name: impl Into<String>, values: &[&str]) -> Self {
        Self::categorical(
            name,
            values.iter().map(|value| Some(value.to_string())).collect(),
        )
    }

    pub fn kind(&self) -> ColumnKind {
        self.values.kind()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-missing numeric cells, or `None` for categorical columns.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        match &self.values {
            ColumnValues::Numeric(values) => Some(values.iter().flatten().copied().collect()),
            ColumnValues::Categorical(_) => None,
        }
    }
}

/// A table of uniquely named, equally long columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !names.insert(column.name.as_str()) {
                return Err(Error::InvalidDataset(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }

        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(column) = columns.iter().find(|column| column.len() != row_count) {
            return Err(Error::InvalidDataset(format!(
                "column '{}' has {} row(s), expected {}",
                column.name,
                column.len(),
                row_count
            )));
        }

        Ok(Self { columns, row_count })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
        }
    }

    /// Build a dataset from row-oriented cells.
    ///
    /// A column is numeric when every non-missing cell is a number; any text
    /// cell makes it categorical and numbers are kept as their text form.
    pub fn from_rows(header: &[&str], rows: &[Vec<Value>]) -> Result<Self> {
        let mut cells: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); header.len()];
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(Error::InvalidDataset(format!(
                    "row {} has {} cell(s), expected {}",
                    row_idx + 1,
                    row.len(),
                    header.len()
                )));
            }
            for (col_idx, value) in row.iter().enumerate() {
                cells[col_idx].push(value.clone());
            }
        }

        let columns = header
            .iter()
            .zip(cells)
            .map(|(name, values)| column_from_values(name, values))
            .collect();
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of all categorical columns.
    pub fn categorical_columns(&self) -> BTreeSet<String> {
        self.columns
            .iter()
            .filter(|column| !column.is_numeric())
            .map(|column| column.name.clone())
            .collect()
    }

    /// Copy of the dataset without `name`. Unknown names are ignored.
    pub fn without_column(&self, name: &str) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|column| column.name != name)
                .cloned()
                .collect(),
            row_count: self.row_count,
        }
    }
}

fn column_from_values(name: &str, values: Vec<Value>) -> Column {
    let all_numeric = values
        .iter()
        .all(|value| matches!(value, Value::Null | Value::Number(_)));
    if all_numeric {
        return Column::numeric(name, values.iter().map(Value::as_f64).collect());
    }

    Column::categorical(
        name,
        values
            .into_iter()
            .map(|value| match value {
                Value::Null => None,
                Value::Number(_) => Some(value.to_csv()),
                Value::Text(text) => Some(text),
            })
            .collect(),
    )
}
