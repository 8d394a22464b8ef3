use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use factoryflow_core::{Page, ServiceError};

use crate::api::AppState;
use crate::model::{CreateInspection, Inspection, InspectionListQuery, UpdateInspection};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inspections/", get(list_inspections).post(create_inspection))
        .route(
            "/inspections/{id}/",
            get(get_inspection)
                .put(update_inspection)
                .patch(patch_inspection)
                .delete(delete_inspection),
        )
}

async fn list_inspections(
    State(svc): State<AppState>,
    Query(query): Query<InspectionListQuery>,
) -> Result<Json<Page<Inspection>>, ServiceError> {
    Ok(Json(svc.list_inspections(&query)?))
}

async fn create_inspection(
    State(svc): State<AppState>,
    Json(input): Json<CreateInspection>,
) -> Result<(StatusCode, Json<Inspection>), ServiceError> {
    let inspection = svc.create_inspection(input)?;
    Ok((StatusCode::CREATED, Json(inspection)))
}

async fn get_inspection(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Inspection>, ServiceError> {
    Ok(Json(svc.get_inspection(&id)?))
}

async fn update_inspection(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateInspection>,
) -> Result<Json<Inspection>, ServiceError> {
    Ok(Json(svc.update_inspection(&id, input)?))
}

async fn patch_inspection(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Inspection>, ServiceError> {
    Ok(Json(svc.patch_inspection(&id, patch)?))
}

async fn delete_inspection(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_inspection(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
