use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use bunkerdesk_core::{Actor, AppError};

use crate::error::ApiResult;

/// Header carrying the authenticated subject, populated by the upstream
/// auth gateway.
pub const ACTOR_SUBJECT_HEADER: &str = "x-actor-subject";

pub async fn require_actor_for_mutations(
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let subject = request
            .headers()
            .get(ACTOR_SUBJECT_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let actor = Actor::new(subject).map_err(|_| {
            AppError::Validation(format!(
                "{ACTOR_SUBJECT_HEADER} header is required for write requests"
            ))
        })?;

        request.extensions_mut().insert(actor);
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
