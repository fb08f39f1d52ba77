use axum::Json;
use axum::extract::State;

use crate::dto::ResourceDescriptorResponse;
use crate::state::AppState;

pub async fn list_resources_handler(
    State(state): State<AppState>,
) -> Json<Vec<ResourceDescriptorResponse>> {
    Json(
        state
            .record_service
            .registry()
            .descriptors()
            .map(ResourceDescriptorResponse::from)
            .collect(),
    )
}
