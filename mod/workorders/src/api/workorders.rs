use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use factoryflow_core::{Page, ServiceError};

use crate::api::AppState;
use crate::model::{CreateWorkOrder, UpdateWorkOrder, WorkOrder, WorkOrderListQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workorders/", get(list_work_orders).post(create_work_order))
        .route(
            "/workorders/{id}/",
            get(get_work_order)
                .put(update_work_order)
                .patch(patch_work_order)
                .delete(delete_work_order),
        )
}

async fn list_work_orders(
    State(svc): State<AppState>,
    Query(query): Query<WorkOrderListQuery>,
) -> Result<Json<Page<WorkOrder>>, ServiceError> {
    Ok(Json(svc.list_work_orders(&query)?))
}

async fn create_work_order(
    State(svc): State<AppState>,
    Json(input): Json<CreateWorkOrder>,
) -> Result<(StatusCode, Json<WorkOrder>), ServiceError> {
    let order = svc.create_work_order(input)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_work_order(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkOrder>, ServiceError> {
    Ok(Json(svc.get_work_order(&id)?))
}

async fn update_work_order(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateWorkOrder>,
) -> Result<Json<WorkOrder>, ServiceError> {
    Ok(Json(svc.update_work_order(&id, input)?))
}

async fn patch_work_order(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<WorkOrder>, ServiceError> {
    Ok(Json(svc.patch_work_order(&id, patch)?))
}

async fn delete_work_order(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_work_order(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
