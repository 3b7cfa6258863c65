use std::collections::HashSet;
use std::path::Path;

use csv_async::{AsyncReaderBuilder, StringRecord};
use tokio::io::AsyncRead;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::error::{BoxError, EtlError, Result};
use crate::models::{Record, Scalar};

/// Cells the parser treats as missing values, whatever the column type.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reads the CSV file at `path` and converts each data row into a [`Record`].
pub async fn csv_to_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| EtlError::conversion(path, e))?;

    let records = read_records(tokio::io::BufReader::new(file))
        .await
        .map_err(|e| EtlError::conversion(path, e))?;

    info!(
        path = %path.display(),
        records = records.len(),
        "Successfully converted data from csv to records"
    );
    Ok(records)
}

/// Parses CSV with a header row from any async reader.
///
/// Column types are inferred over the whole column before any record is
/// built, so a column mixing `1` and `x` yields text for every row.
/// Numbers and booleans are parsed with surrounding spaces ignored; text
/// cells are kept verbatim.
///
/// An integer column with missing cells stays integer and the missing cells
/// become `Null`; they are not widened to floats.
pub async fn read_records<R>(reader: R) -> std::result::Result<Vec<Record>, BoxError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .create_reader(reader);

    let headers = reader.headers().await?.clone();
    if headers.is_empty() {
        return Err("no header row found".into());
    }
    let columns = column_names(&headers);

    let mut rows: Vec<StringRecord> = Vec::new();
    let mut lines = reader.into_records();
    while let Some(row) = lines.next().await {
        rows.push(row?);
    }

    let types: Vec<ColumnType> = (0..columns.len())
        .map(|i| {
            rows.iter()
                .map(|row| ColumnType::of(row.get(i).unwrap_or_default()))
                .fold(ColumnType::Empty, ColumnType::widen)
        })
        .collect();
    debug!(?columns, ?types, rows = rows.len(), "Inferred column types");

    let records: Vec<Record> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .zip(&types)
                .enumerate()
                .map(|(i, (name, column))| {
                    (name.as_str(), column.scalar(row.get(i).unwrap_or_default()))
                })
                .collect::<Record>()
        })
        .collect();

    Ok(records)
}

/// Header names, with blank names replaced by `Unnamed: <index>` and
/// repeated names suffixed `.1`, `.2`, ... so every column keeps its own key.
fn column_names(headers: &StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name.to_string()
            };
            let mut candidate = name.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                candidate = format!("{name}.{n}");
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn is_null(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Empty,
    Bool,
    Int,
    Float,
    Text,
}

impl ColumnType {
    fn of(cell: &str) -> ColumnType {
        if is_null(cell) {
            ColumnType::Empty
        } else if parse_bool(cell).is_some() {
            ColumnType::Bool
        } else if cell.trim().parse::<i64>().is_ok() {
            ColumnType::Int
        } else if cell.trim().parse::<f64>().is_ok() {
            ColumnType::Float
        } else {
            ColumnType::Text
        }
    }

    fn widen(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (Empty, t) | (t, Empty) => t,
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }

    fn scalar(self, cell: &str) -> Scalar {
        if is_null(cell) {
            return Scalar::Null;
        }
        let parsed = match self {
            ColumnType::Bool => parse_bool(cell).map(Scalar::Bool),
            ColumnType::Int => cell.trim().parse().ok().map(Scalar::Int),
            ColumnType::Float => cell.trim().parse().ok().map(Scalar::Float),
            ColumnType::Empty | ColumnType::Text => None,
        };
        parsed.unwrap_or_else(|| Scalar::Text(cell.to_string()))
    }
}
