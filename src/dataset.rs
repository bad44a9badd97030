use crate::models::Transaction;
use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::NaiveDate;
use std::{
    env, fmt,
    path::{Path, PathBuf},
};
use tracing::info;

pub const DATE_COLUMN: &str = "Data";
pub const REGION_COLUMN: &str = "Região";
pub const PRODUCT_COLUMN: &str = "Produto";
pub const VALUE_COLUMN: &str = "Valor Venda";

/// Fatal startup problems with the input file. Any of these halts the
/// process before the server binds; there is no partial UI.
#[derive(Debug)]
pub enum DatasetError {
    Missing(PathBuf),
    Open { path: PathBuf, message: String },
    MissingColumn(String),
    Row { line: usize, message: String },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(
                f,
                "dataset file '{}' not found; place it there or point DASHBOARD_DATA_PATH at it",
                path.display()
            ),
            Self::Open { path, message } => {
                write!(f, "failed to open dataset '{}': {message}", path.display())
            }
            Self::MissingColumn(column) => {
                write!(f, "dataset is missing required column '{column}'")
            }
            Self::Row { line, message } => write!(f, "dataset row {line}: {message}"),
        }
    }
}

impl std::error::Error for DatasetError {}

pub fn resolve_dataset_path() -> PathBuf {
    match env::var("DASHBOARD_DATA_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from("data/vendas.xlsx"),
    }
}

/// Reads the whole transaction table into memory, once per session.
/// Spreadsheet formats go through calamine; `.csv` goes through the csv
/// crate so fixtures stay plain text.
pub fn load_dataset(path: &Path) -> Result<Vec<Transaction>, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::Missing(path.to_path_buf()));
    }

    let table = match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => load_csv(path)?,
        _ => load_workbook(path)?,
    };

    info!(
        "loaded {} transactions from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Header positions of the four required columns. Column order in the
/// file is free; headers are matched by exact name.
struct ColumnMap {
    date: usize,
    region: usize,
    product: usize,
    value: usize,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find(DATE_COLUMN)?,
            region: find(REGION_COLUMN)?,
            product: find(PRODUCT_COLUMN)?,
            value: find(VALUE_COLUMN)?,
        })
    }
}

fn open_error(path: &Path, message: impl Into<String>) -> DatasetError {
    DatasetError::Open {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn load_workbook(path: &Path) -> Result<Vec<Transaction>, DatasetError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|err| open_error(path, err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| open_error(path, "workbook has no worksheets"))?
        .map_err(|err| open_error(path, err.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| DatasetError::MissingColumn(DATE_COLUMN.to_string()))?
        .iter()
        .map(|cell| cell.as_string().unwrap_or_default())
        .collect();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut table = Vec::new();
    for (index, row) in rows.enumerate() {
        // Header is row 1, so data starts at line 2.
        let line = index + 2;
        if row.iter().all(DataType::is_empty) {
            continue;
        }
        table.push(parse_workbook_row(&columns, row, line)?);
    }
    Ok(table)
}

fn parse_workbook_row(
    columns: &ColumnMap,
    row: &[Data],
    line: usize,
) -> Result<Transaction, DatasetError> {
    let cell = |index: usize| row.get(index).unwrap_or(&Data::Empty);

    let date_cell = cell(columns.date);
    let date = date_cell
        .as_date()
        .or_else(|| parse_date_text(&date_cell.as_string().unwrap_or_default()))
        .ok_or_else(|| {
            row_error(line, DATE_COLUMN, "expected a spreadsheet date or YYYY-MM-DD text")
        })?;

    let region = cell(columns.region)
        .as_string()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| row_error(line, REGION_COLUMN, "expected a non-empty label"))?;

    let product = cell(columns.product)
        .as_string()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| row_error(line, PRODUCT_COLUMN, "expected a non-empty label"))?;

    let sale_value = cell(columns.value)
        .as_f64()
        .ok_or_else(|| row_error(line, VALUE_COLUMN, "expected a number"))?;
    check_sale_value(sale_value, line)?;

    Ok(Transaction {
        date,
        region,
        product,
        sale_value,
    })
}

fn load_csv(path: &Path) -> Result<Vec<Transaction>, DatasetError> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|err| open_error(path, err.to_string()))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| open_error(path, err.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut table = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = record.map_err(|err| DatasetError::Row {
            line,
            message: err.to_string(),
        })?;
        table.push(parse_csv_record(&columns, &record, line)?);
    }
    Ok(table)
}

fn parse_csv_record(
    columns: &ColumnMap,
    record: &csv::StringRecord,
    line: usize,
) -> Result<Transaction, DatasetError> {
    let field = |index: usize| record.get(index).unwrap_or_default().trim();

    let date = parse_date_text(field(columns.date))
        .ok_or_else(|| row_error(line, DATE_COLUMN, "expected a YYYY-MM-DD date"))?;

    let region = field(columns.region);
    if region.is_empty() {
        return Err(row_error(line, REGION_COLUMN, "expected a non-empty label"));
    }

    let product = field(columns.product);
    if product.is_empty() {
        return Err(row_error(line, PRODUCT_COLUMN, "expected a non-empty label"));
    }

    let sale_value = field(columns.value)
        .parse::<f64>()
        .map_err(|_| row_error(line, VALUE_COLUMN, "expected a number"))?;
    check_sale_value(sale_value, line)?;

    Ok(Transaction {
        date,
        region: region.to_string(),
        product: product.to_string(),
        sale_value,
    })
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn check_sale_value(value: f64, line: usize) -> Result<(), DatasetError> {
    if !value.is_finite() || value < 0.0 {
        return Err(row_error(
            line,
            VALUE_COLUMN,
            "expected a non-negative amount",
        ));
    }
    Ok(())
}

fn row_error(line: usize, column: &str, message: &str) -> DatasetError {
    DatasetError::Row {
        line,
        message: format!("column '{column}': {message}"),
    }
}
