use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use model::entities::budget_distribution;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Columns a distribution CSV must carry, by name.
const REQUIRED_COLUMNS: [&str; 5] = [
    "serial_code",
    "upazila_id",
    "user_uid",
    "economic_code",
    "distributed_budget",
];

/// Error that occurred on a single CSV row
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportRowError {
    /// 1-based line number in the uploaded file (header is line 1)
    pub line: usize,
    /// What was wrong with the row
    pub error: String,
}

/// Result of a bulk import
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    /// Rows inserted
    pub imported: usize,
    /// Rows skipped because their serial code was already present
    pub duplicates: usize,
    /// Rows rejected individually
    pub errors: Vec<ImportRowError>,
}

#[derive(Debug, Error)]
enum RowError {
    #[error("missing value for column {0}")]
    MissingField(&'static str),
    #[error("invalid upazila id: {0}")]
    InvalidUpazilaId(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("amount must be positive")]
    NonPositiveAmount,
}

struct ImportRow {
    serial_code: String,
    upazila_id: i32,
    user_uid: String,
    economic_code: String,
    distributed_budget: Decimal,
}

/// Bulk-import distribution rows from an uploaded CSV file.
///
/// The header row must carry all five required columns
/// (`serial_code,upazila_id,user_uid,economic_code,distributed_budget`);
/// otherwise the whole file is rejected and nothing is inserted. Rows whose
/// serial code is already known are skipped and reported as duplicates, and
/// malformed rows are reported per line without aborting the rest of the
/// file. Imported rows are reconciliation data: they start with a zero
/// expense total and do not touch economic-code aggregates.
#[utoipa::path(
    post,
    path = "/api/v1/imports/distributions",
    tag = "imports",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import performed", body = ApiResponse<ImportSummary>),
        (status = 400, description = "Header row does not match the expected columns", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(body))]
pub async fn import_distributions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<ImportSummary>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Importing distribution CSV of {} bytes", body.len());

    let mut csv_reader = csv::Reader::from_reader(body.as_ref());

    // Validate the header before reading any data rows
    let headers = match csv_reader.headers() {
        Ok(headers) => headers.clone(),
        Err(parse_error) => {
            warn!("Uploaded file has no readable CSV header: {}", parse_error);
            return Err(invalid_header_error("Uploaded file is not a readable CSV"));
        }
    };

    let mut column_index = Vec::with_capacity(REQUIRED_COLUMNS.len());
    let mut missing = Vec::new();
    for column in REQUIRED_COLUMNS {
        match headers.iter().position(|header| header.trim() == column) {
            Some(index) => column_index.push(index),
            None => missing.push(column),
        }
    }
    if !missing.is_empty() {
        warn!("CSV header is missing required columns: {:?}", missing);
        return Err(invalid_header_error(&format!(
            "CSV header is missing required columns: {}",
            missing.join(", ")
        )));
    }

    // Parse every row up front; per-row failures never abort the file
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut duplicates = 0usize;
    let mut seen_serials: HashSet<String> = HashSet::new();

    for (row_index, result) in csv_reader.records().enumerate() {
        let line = row_index + 2; // +2 for header and 0-indexing

        let record = match result {
            Ok(record) => record,
            Err(parse_error) => {
                errors.push(ImportRowError {
                    line,
                    error: format!("CSV parse error: {}", parse_error),
                });
                continue;
            }
        };

        match parse_row(&record, &column_index) {
            Ok(row) => {
                // A serial repeated inside the file counts as a duplicate too
                if seen_serials.insert(row.serial_code.clone()) {
                    rows.push((line, row));
                } else {
                    duplicates += 1;
                }
            }
            Err(row_error) => {
                errors.push(ImportRowError {
                    line,
                    error: row_error.to_string(),
                });
            }
        }
    }

    // One query for all serials already present in the ledger
    let existing_serials: HashSet<String> = if rows.is_empty() {
        HashSet::new()
    } else {
        let serials: Vec<String> = rows.iter().map(|(_, row)| row.serial_code.clone()).collect();
        match budget_distribution::Entity::find()
            .filter(budget_distribution::Column::SerialCode.is_in(serials))
            .all(&state.db)
            .await
        {
            Ok(existing) => existing
                .into_iter()
                .filter_map(|distribution| distribution.serial_code)
                .collect(),
            Err(db_error) => {
                error!("Failed to check for existing serial codes: {}", db_error);
                return Err(internal_error());
            }
        }
    };

    let mut imported = 0usize;
    for (line, row) in rows {
        if existing_serials.contains(&row.serial_code) {
            duplicates += 1;
            continue;
        }

        let new_distribution = budget_distribution::ActiveModel {
            upazila_id: Set(row.upazila_id),
            user_uid: Set(row.user_uid),
            economic_code: Set(row.economic_code),
            distributed_budget: Set(row.distributed_budget),
            expense_budget: Set(Decimal::ZERO),
            serial_code: Set(Some(row.serial_code)),
            ..Default::default()
        };

        match new_distribution.insert(&state.db).await {
            Ok(_) => imported += 1,
            Err(db_error) => {
                error!("Failed to insert imported row at line {}: {}", line, db_error);
                errors.push(ImportRowError {
                    line,
                    error: "Failed to insert row".to_string(),
                });
            }
        }
    }

    info!(
        "Distribution import finished: {} imported, {} duplicates, {} errors",
        imported,
        duplicates,
        errors.len()
    );
    Ok(Json(ApiResponse {
        data: ImportSummary {
            imported,
            duplicates,
            errors,
        },
        message: "Import performed".to_string(),
        success: true,
    }))
}

fn parse_row(record: &csv::StringRecord, column_index: &[usize]) -> Result<ImportRow, RowError> {
    let field = |position: usize| -> Result<&str, RowError> {
        let value = record
            .get(column_index[position])
            .map(str::trim)
            .unwrap_or("");
        if value.is_empty() {
            Err(RowError::MissingField(REQUIRED_COLUMNS[position]))
        } else {
            Ok(value)
        }
    };

    let serial_code = field(0)?.to_string();
    let upazila_raw = field(1)?;
    let user_uid = field(2)?.to_string();
    let economic_code = field(3)?.to_string();
    let amount_raw = field(4)?;

    let upazila_id = upazila_raw
        .parse::<i32>()
        .map_err(|_| RowError::InvalidUpazilaId(upazila_raw.to_string()))?;

    let distributed_budget = Decimal::from_str(amount_raw)
        .map_err(|_| RowError::InvalidAmount(amount_raw.to_string()))?;
    if distributed_budget <= Decimal::ZERO {
        return Err(RowError::NonPositiveAmount);
    }

    Ok(ImportRow {
        serial_code,
        upazila_id,
        user_uid,
        economic_code,
        distributed_budget,
    })
}

fn invalid_header_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "INVALID_CSV_HEADER".to_string(),
            success: false,
        }),
    )
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}
