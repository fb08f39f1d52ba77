use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use bunkerdesk_application::RecordListQuery;
use bunkerdesk_core::Actor;

use crate::dto::{CreateRecordRequest, RecordPageResponse, RecordResponse, UpdateRecordRequest};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct RecordListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub include_deleted: Option<bool>,
}

#[derive(Debug, serde::Deserialize)]
pub struct RecordGetParams {
    pub include_deleted: Option<bool>,
}

pub async fn list_records_handler(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    Query(params): Query<RecordListParams>,
) -> ApiResult<Json<RecordPageResponse>> {
    let page = state
        .record_service
        .list(
            resource_type.as_str(),
            RecordListQuery {
                limit: params.limit.unwrap_or(50),
                offset: params.offset.unwrap_or(0),
                include_deleted: params.include_deleted.unwrap_or(false),
            },
        )
        .await?;

    Ok(Json(RecordPageResponse::from(page)))
}

pub async fn get_record_handler(
    State(state): State<AppState>,
    Path((resource_type, record_id)): Path<(String, String)>,
    Query(params): Query<RecordGetParams>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .record_service
        .get(
            resource_type.as_str(),
            record_id.as_str(),
            params.include_deleted.unwrap_or(false),
        )
        .await?;

    Ok(Json(RecordResponse::from(record)))
}

pub async fn create_record_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(resource_type): Path<String>,
    Json(payload): Json<CreateRecordRequest>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let record = state
        .record_service
        .create(&actor, resource_type.as_str(), payload.data)
        .await?;

    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

pub async fn update_record_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((resource_type, record_id)): Path<(String, String)>,
    Json(payload): Json<UpdateRecordRequest>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .record_service
        .update(
            &actor,
            resource_type.as_str(),
            record_id.as_str(),
            payload.data,
        )
        .await?;

    Ok(Json(RecordResponse::from(record)))
}

pub async fn delete_record_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((resource_type, record_id)): Path<(String, String)>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .record_service
        .soft_delete(&actor, resource_type.as_str(), record_id.as_str())
        .await?;

    Ok(Json(RecordResponse::from(record)))
}
