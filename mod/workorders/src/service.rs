use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use factoryflow_core::{merge_patch, new_id, now_rfc3339, Page, PageParams, ServiceError};
use factoryflow_sql::SQLStore;

use crate::model::{
    CreateInspection, CreateWorkOrder, Inspection, InspectionListQuery, UpdateInspection,
    UpdateWorkOrder, WorkOrder, WorkOrderListQuery, WorkOrderStatus,
};
use crate::store::{init_schema, InspectionStore, WorkOrderStore};

const TITLE_MAX: usize = 200;
const STATION_MAX: usize = 100;

/// The work-order service: validation and CRUD orchestration over both
/// entities. One instance is shared by all handlers.
pub struct WorkOrdersService {
    orders: WorkOrderStore,
    inspections: InspectionStore,
}

impl WorkOrdersService {
    /// Create the service, initialising the DB schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Arc<Self>, ServiceError> {
        init_schema(db.as_ref())?;
        Ok(Arc::new(Self {
            orders: WorkOrderStore::new(Arc::clone(&db)),
            inspections: InspectionStore::new(db),
        }))
    }

    // ── Work orders ─────────────────────────────────────────────────

    pub fn create_work_order(&self, input: CreateWorkOrder) -> Result<WorkOrder, ServiceError> {
        validate_text("title", &input.title, TITLE_MAX)?;
        validate_text("station", &input.station, STATION_MAX)?;

        let order = WorkOrder {
            id: new_id(),
            title: input.title,
            station: input.station,
            status: input.status,
            created_at: now_rfc3339(),
            inspections: Vec::new(),
        };
        self.orders.create(&order)?;
        Ok(order)
    }

    pub fn get_work_order(&self, id: &str) -> Result<WorkOrder, ServiceError> {
        let order = self.orders.get(id)?;
        self.embed_inspections(order)
    }

    pub fn list_work_orders(
        &self,
        query: &WorkOrderListQuery,
    ) -> Result<Page<WorkOrder>, ServiceError> {
        let status = match query.status.as_deref() {
            Some(raw) => Some(WorkOrderStatus::from_str(raw).ok_or_else(|| {
                ServiceError::Validation(format!(
                    "status: '{raw}' is not one of OPEN, IN_PROGRESS, DONE"
                ))
            })?),
            None => None,
        };

        let page = PageParams::new(query.page);
        let (items, total) = self.orders.list(status, page)?;
        let items = items
            .into_iter()
            .map(|o| self.embed_inspections(o))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(total, page, items))
    }

    pub fn update_work_order(
        &self,
        id: &str,
        input: UpdateWorkOrder,
    ) -> Result<WorkOrder, ServiceError> {
        validate_text("title", &input.title, TITLE_MAX)?;
        validate_text("station", &input.station, STATION_MAX)?;

        let mut order = self.orders.get(id)?;
        order.title = input.title;
        order.station = input.station;
        order.status = input.status;
        self.orders.update(&order)?;
        self.embed_inspections(order)
    }

    pub fn patch_work_order(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<WorkOrder, ServiceError> {
        let current = self.orders.get(id)?;
        let updated: WorkOrder = apply_patch(&current, patch, &["id", "created_at", "inspections"])?;

        validate_text("title", &updated.title, TITLE_MAX)?;
        validate_text("station", &updated.station, STATION_MAX)?;

        self.orders.update(&updated)?;
        self.embed_inspections(updated)
    }

    pub fn delete_work_order(&self, id: &str) -> Result<(), ServiceError> {
        self.orders.delete(id)
    }

    fn embed_inspections(&self, mut order: WorkOrder) -> Result<WorkOrder, ServiceError> {
        order.inspections = self.inspections.for_work_order(&order.id)?;
        Ok(order)
    }

    // ── Inspections ─────────────────────────────────────────────────

    pub fn create_inspection(&self, input: CreateInspection) -> Result<Inspection, ServiceError> {
        self.require_work_order(&input.work_order)?;

        let inspection = Inspection {
            id: new_id(),
            work_order: input.work_order,
            result: input.result,
            notes: input.notes,
            created_at: now_rfc3339(),
        };
        self.inspections.create(&inspection)?;
        Ok(inspection)
    }

    pub fn get_inspection(&self, id: &str) -> Result<Inspection, ServiceError> {
        self.inspections.get(id)
    }

    pub fn list_inspections(
        &self,
        query: &InspectionListQuery,
    ) -> Result<Page<Inspection>, ServiceError> {
        let page = PageParams::new(query.page);
        let (items, total) = self.inspections.list(query.work_order.as_deref(), page)?;
        Ok(Page::new(total, page, items))
    }

    pub fn update_inspection(
        &self,
        id: &str,
        input: UpdateInspection,
    ) -> Result<Inspection, ServiceError> {
        self.require_work_order(&input.work_order)?;

        let mut inspection = self.inspections.get(id)?;
        inspection.work_order = input.work_order;
        inspection.result = input.result;
        inspection.notes = input.notes;
        self.inspections.update(&inspection)?;
        Ok(inspection)
    }

    pub fn patch_inspection(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Inspection, ServiceError> {
        let current = self.inspections.get(id)?;
        let updated: Inspection = apply_patch(&current, patch, &["id", "created_at"])?;

        if updated.work_order != current.work_order {
            self.require_work_order(&updated.work_order)?;
        }

        self.inspections.update(&updated)?;
        Ok(updated)
    }

    pub fn delete_inspection(&self, id: &str) -> Result<(), ServiceError> {
        self.inspections.delete(id)
    }

    /// An inspection pointing at a missing work order is bad input, not a
    /// missing resource — the inspection endpoints report it as validation.
    fn require_work_order(&self, id: &str) -> Result<(), ServiceError> {
        if !self.orders.exists(id)? {
            return Err(ServiceError::Validation(format!(
                "work_order: no work order '{id}'"
            )));
        }
        Ok(())
    }
}

/// Apply a JSON merge patch to a record, ignoring protected fields.
///
/// A patch that produces an invalid record (e.g. an out-of-enum status
/// string) is the client's fault: validation error.
fn apply_patch<T: Serialize + DeserializeOwned>(
    current: &T,
    patch: serde_json::Value,
    protected: &[&str],
) -> Result<T, ServiceError> {
    let mut json =
        serde_json::to_value(current).map_err(|e| ServiceError::Internal(e.to_string()))?;

    let mut patch = patch;
    if let Some(obj) = patch.as_object_mut() {
        for key in protected {
            obj.remove(*key);
        }
    } else {
        return Err(ServiceError::Validation("patch body must be a JSON object".into()));
    }

    merge_patch(&mut json, &patch);
    serde_json::from_value(json).map_err(|e| ServiceError::Validation(format!("invalid patch: {e}")))
}

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field}: must not be empty")));
    }
    if value.chars().count() > max {
        return Err(ServiceError::Validation(format!(
            "{field}: must be at most {max} characters"
        )));
    }
    Ok(())
}
