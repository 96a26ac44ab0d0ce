use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use valentine_db::UpdateOutcome;
use valentine_db::models::{NewRequestRow, RequestRow};
use valentine_types::api::{NewRequest, RequestPatch};
use valentine_types::catalog;
use valentine_types::models::{Request, StatusSnapshot};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /requests: validates and stores a new request, returns it with its id.
pub async fn create_request(
    State(state): State<AppState>,
    Json(req): Json<NewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_new_request(&req)?;

    let id = Uuid::new_v4().to_string();

    // Run blocking DB insert off the async runtime
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.insert_request(&NewRequestRow {
            id: &id,
            sender_name: req.sender_name.trim(),
            recipient_name: req.recipient_name.trim(),
            message: &req.message,
            custom_message: req.normalized_custom_message(),
            gift: &req.gift,
            theme: &req.theme,
            music: &req.music,
            accepted: false,
        })
    })
    .await??;

    info!("Created request {} ({} -> {})", row.id, row.sender_name, row.recipient_name);

    Ok((StatusCode::CREATED, Json(row_to_request(row))))
}

/// GET /requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let row = load_row(&state, request_id).await?;
    Ok(Json(row_to_request(row)))
}

/// GET /requests/{id}/status: the projection the status screen reads.
pub async fn get_status(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let row = load_row(&state, request_id).await?;
    Ok(Json(row_to_request(row).into()))
}

/// PATCH /requests/{id}: partial update. Only `accepted` is writable and it
/// never goes back to false once set.
pub async fn update_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(patch): Json<RequestPatch>,
) -> Result<Json<Request>, ApiError> {
    let Some(accepted) = patch.accepted else {
        return Err(ApiError::Validation("patch carries no fields".into()));
    };

    let db = state.clone();
    let id = request_id.to_string();
    let outcome = tokio::task::spawn_blocking(move || db.db.set_accepted(&id, accepted)).await??;

    match outcome {
        UpdateOutcome::Updated(row) => {
            let request = row_to_request(row);
            info!("Request {} accepted={}", request.id, request.accepted);
            state.dispatcher.request_changed(request.clone());
            Ok(Json(request))
        }
        UpdateOutcome::Unchanged(row) => Ok(Json(row_to_request(row))),
        UpdateOutcome::AcceptedIsFinal => Err(ApiError::AcceptedIsFinal),
        UpdateOutcome::NotFound => Err(ApiError::NotFound(request_id.to_string())),
    }
}

async fn load_row(state: &AppState, request_id: Uuid) -> Result<RequestRow, ApiError> {
    let db = state.clone();
    let id = request_id.to_string();
    tokio::task::spawn_blocking(move || db.db.get_request(&id))
        .await??
        .ok_or_else(|| ApiError::NotFound(request_id.to_string()))
}

fn validate_new_request(req: &NewRequest) -> Result<(), ApiError> {
    let blank = req.blank_fields();
    if !blank.is_empty() {
        return Err(ApiError::Validation(format!("required: {}", blank.join(", "))));
    }
    if req.accepted {
        return Err(ApiError::Validation(
            "a new request cannot start out accepted".into(),
        ));
    }
    if !catalog::is_gift(&req.gift) {
        return Err(ApiError::Validation(format!("unknown gift '{}'", req.gift)));
    }
    if catalog::theme(&req.theme).is_none() {
        return Err(ApiError::Validation(format!("unknown theme '{}'", req.theme)));
    }
    if catalog::track(&req.music).is_none() {
        return Err(ApiError::Validation(format!("unknown music '{}'", req.music)));
    }
    Ok(())
}

fn row_to_request(row: RequestRow) -> Request {
    Request {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt request id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: parse_timestamp(&row.created_at, &row.id),
        updated_at: parse_timestamp(&row.updated_at, &row.id),
        sender_name: row.sender_name,
        recipient_name: row.recipient_name,
        message: row.message,
        custom_message: row.custom_message,
        gift: row.gift,
        theme: row.theme,
        music: row.music,
        accepted: row.accepted,
    }
}

fn parse_timestamp(raw: &str, request_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through the sqlite shell use datetime('now')
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on request '{}': {}", raw, request_id, e);
            DateTime::default()
        })
}
