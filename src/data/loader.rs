use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Cell, Dataset, Passenger, PassengerRecord, Pclass, Port, Sex};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data source not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("malformed source: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the passenger table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the Kaggle column names
/// * `.json`    – `[{ "Name": "...", "Sex": "male", ... }, ...]`
/// * `.parquet` – one column per field, as written by Pandas or Polars
///
/// Title, Family Size and Survival are derived for every row before the
/// dataset is returned.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let dataset = build_dataset(table, path.display().to_string())?;
    log::info!(
        "Loaded {} passengers from {}",
        dataset.len(),
        dataset.source()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Untyped table → typed passengers
// ---------------------------------------------------------------------------

/// Rows of untyped cells under named columns, independent of file format.
#[derive(Debug, Default)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Positions of the known columns within a [`RawTable`].
struct ColumnIndex {
    passenger_id: Option<usize>,
    name: usize,
    sex: usize,
    age: usize,
    pclass: usize,
    sib_sp: usize,
    parch: usize,
    fare: usize,
    embarked: usize,
    survived: usize,
}

impl ColumnIndex {
    fn resolve(columns: &[String]) -> Result<Self, LoadError> {
        let find = |name: &'static str| {
            columns
                .iter()
                .position(|c| c.trim() == name)
                .ok_or(LoadError::MissingColumn(name))
        };
        Ok(ColumnIndex {
            passenger_id: find("PassengerId").ok(),
            name: find("Name")?,
            sex: find("Sex")?,
            age: find("Age")?,
            pclass: find("Pclass")?,
            sib_sp: find("SibSp")?,
            parch: find("Parch")?,
            fare: find("Fare")?,
            embarked: find("Embarked")?,
            survived: find("Survived")?,
        })
    }
}

fn build_dataset(table: RawTable, source: String) -> Result<Dataset, LoadError> {
    let index = ColumnIndex::resolve(&table.columns)?;
    let passengers = table
        .rows
        .iter()
        .enumerate()
        .map(|(row, cells)| parse_passenger(row, cells, &index).map(Passenger::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Dataset::new(passengers, source))
}

static NULL_CELL: Cell = Cell::Null;

fn parse_passenger(
    row: usize,
    cells: &[Cell],
    index: &ColumnIndex,
) -> Result<PassengerRecord, LoadError> {
    let cell = |i: usize| cells.get(i).unwrap_or(&NULL_CELL);
    let invalid = |column: &'static str, cell: &Cell| LoadError::InvalidValue {
        row,
        column,
        value: cell.to_string(),
    };

    let name = cell(index.name);
    let name = match name {
        Cell::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        other => return Err(invalid("Name", other)),
    };

    let sex = cell(index.sex);
    let sex = Sex::from_cell(sex).ok_or_else(|| invalid("Sex", sex))?;

    let pclass = cell(index.pclass);
    let pclass = pclass
        .as_i64()
        .and_then(Pclass::from_number)
        .ok_or_else(|| invalid("Pclass", pclass))?;

    let count = |column: &'static str, i: usize| {
        let c = cell(i);
        c.as_i64()
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| invalid(column, c))
    };
    let sib_sp = count("SibSp", index.sib_sp)?;
    let parch = count("Parch", index.parch)?;

    let optional_f64 = |column: &'static str, i: usize| {
        let c = cell(i);
        if c.is_null() {
            return Ok(None);
        }
        c.as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(column, c))
    };
    let age = optional_f64("Age", index.age)?;
    let fare = optional_f64("Fare", index.fare)?;

    let embarked = cell(index.embarked);
    let embarked = if embarked.is_null() {
        None
    } else {
        let port = embarked
            .as_str()
            .and_then(|code| Port::from_code(&code.to_ascii_uppercase()))
            .ok_or_else(|| invalid("Embarked", embarked))?;
        Some(port)
    };

    let survived = cell(index.survived);
    let survived = match survived {
        Cell::Bool(b) => *b,
        other => match other.as_i64() {
            Some(0) => false,
            Some(1) => true,
            _ => return Err(invalid("Survived", other)),
        },
    };

    let passenger_id = match index.passenger_id.map(cell) {
        Some(c) if !c.is_null() => Some(c.as_i64().ok_or_else(|| invalid("PassengerId", c))?),
        _ => None,
    };

    Ok(PassengerRecord {
        passenger_id,
        name,
        sex,
        age,
        pclass,
        sib_sp,
        parch,
        fare,
        embarked,
        survived,
    })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, one passenger per record.
/// Empty fields are read as missing values.
fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { columns, rows })
}

fn guess_cell_type(s: &str) -> Cell {
    let s = s.trim();
    if s.is_empty() {
        return Cell::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Cell::Float(f);
    }
    if s == "true" || s == "false" {
        return Cell::Bool(s == "true");
    }
    Cell::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Name": "Braund, Mr. Owen Harris", "Sex": "male", "Age": 22.0, ... },
///   ...
/// ]
/// ```
///
/// Keys missing from an object are read as missing values.
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        objects.push(obj);
    }

    let mut seen = BTreeSet::new();
    let mut columns = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Columns of unsupported Arrow types are
/// read as missing values.
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    for field in schema.fields() {
        if !is_supported(field.data_type()) {
            log::warn!(
                "Parquet column '{}' has unsupported type {:?}; reading as missing",
                field.name(),
                field.data_type()
            );
        }
    }

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { columns, rows })
}

fn is_supported(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        _ => Cell::Null,
    }
}
