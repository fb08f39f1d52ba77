use bunkerdesk_application::RecordService;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub record_service: RecordService,
    pub postgres_pool: PgPool,
}
