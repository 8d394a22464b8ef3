pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;
use factoryflow_core::Module;
use factoryflow_sql::SQLStore;

use service::WorkOrdersService;

/// The work-orders module — work orders and their inspections.
pub struct WorkOrdersModule {
    service: Arc<WorkOrdersService>,
}

impl WorkOrdersModule {
    /// Create the module and initialise its storage schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, factoryflow_core::ServiceError> {
        let service = WorkOrdersService::new(db)?;
        Ok(Self { service })
    }

    pub fn service(&self) -> &Arc<WorkOrdersService> {
        &self.service
    }
}

impl Module for WorkOrdersModule {
    fn name(&self) -> &str {
        "workorders"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
