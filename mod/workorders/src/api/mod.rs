mod inspections;
mod workorders;

use std::sync::Arc;

use axum::Router;

use crate::service::WorkOrdersService;

/// Shared handler state.
pub type AppState = Arc<WorkOrdersService>;

/// Build the complete work-orders router.
///
/// Routes (trailing slashes are part of the public contract):
/// - `GET    /workorders/`        — list (optional `?status=`, `?page=`)
/// - `POST   /workorders/`        — create
/// - `GET    /workorders/{id}/`   — retrieve
/// - `PUT    /workorders/{id}/`   — update
/// - `PATCH  /workorders/{id}/`   — partial update
/// - `DELETE /workorders/{id}/`   — delete (cascades to inspections)
/// - same shape under `/inspections/` with `?work_order=` as the list filter
pub fn router(svc: Arc<WorkOrdersService>) -> Router {
    Router::new()
        .merge(workorders::routes())
        .merge(inspections::routes())
        .with_state(svc)
}
