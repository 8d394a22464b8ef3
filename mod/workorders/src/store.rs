use std::sync::Arc;

use factoryflow_core::{PageParams, ServiceError};
use factoryflow_sql::{Row, SQLStore, Value};

use crate::model::{Inspection, InspectionResult, WorkOrder, WorkOrderStatus};

/// SQL schema for both tables.
///
/// Inspections reference their work order with ON DELETE CASCADE — the
/// store, not the service, owns child-row cleanup. Requires the backend's
/// foreign_keys pragma (SqliteStore switches it on).
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS work_orders (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    station     TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'OPEN',
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_work_orders_status ON work_orders(status);
CREATE INDEX IF NOT EXISTS idx_work_orders_created_at ON work_orders(created_at);

CREATE TABLE IF NOT EXISTS inspections (
    id          TEXT PRIMARY KEY,
    work_order  TEXT NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    result      TEXT NOT NULL,
    notes       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_inspections_work_order ON inspections(work_order);
CREATE INDEX IF NOT EXISTS idx_inspections_created_at ON inspections(created_at);
";

/// Create both tables and their indexes.
pub fn init_schema(db: &dyn SQLStore) -> Result<(), ServiceError> {
    db.exec_batch(SCHEMA)
        .map_err(|e| ServiceError::Storage(format!("workorders schema init: {e}")))
}

// ---------------------------------------------------------------------------
// WorkOrderStore
// ---------------------------------------------------------------------------

/// Persistent storage for work orders, backed by SQLStore (SQLite).
pub struct WorkOrderStore {
    db: Arc<dyn SQLStore>,
}

impl WorkOrderStore {
    pub fn new(db: Arc<dyn SQLStore>) -> Self {
        Self { db }
    }

    /// Insert a new work order. The `inspections` field is derived data and
    /// is not written.
    pub fn create(&self, order: &WorkOrder) -> Result<(), ServiceError> {
        self.db
            .exec(
                "INSERT INTO work_orders (id, title, station, status, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(order.id.clone()),
                    Value::Text(order.title.clone()),
                    Value::Text(order.station.clone()),
                    Value::Text(order.status.as_str().to_string()),
                    Value::Text(order.created_at.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get a work order by ID (inspections not populated here).
    pub fn get(&self, id: &str) -> Result<WorkOrder, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, title, station, status, created_at \
                 FROM work_orders WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("work order {id}")))?;
        row_to_work_order(row)
    }

    /// Whether a work order exists (used to validate inspection references).
    pub fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT 1 AS one FROM work_orders WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    /// Update the mutable columns of a work order.
    pub fn update(&self, order: &WorkOrder) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "UPDATE work_orders SET title = ?1, station = ?2, status = ?3 WHERE id = ?4",
                &[
                    Value::Text(order.title.clone()),
                    Value::Text(order.station.clone()),
                    Value::Text(order.status.as_str().to_string()),
                    Value::Text(order.id.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("work order {}", order.id)));
        }
        Ok(())
    }

    /// Delete a work order. Its inspections go with it (cascade).
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "DELETE FROM work_orders WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("work order {id}")));
        }
        Ok(())
    }

    /// List work orders, optionally filtered by status, newest-created first.
    /// Returns the page of items plus the total match count.
    pub fn list(
        &self,
        status: Option<WorkOrderStatus>,
        page: PageParams,
    ) -> Result<(Vec<WorkOrder>, usize), ServiceError> {
        let mut where_sql = String::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(s) = status {
            where_sql = "WHERE status = ?1".to_string();
            params.push(Value::Text(s.as_str().to_string()));
        }

        let count_sql = format!("SELECT COUNT(*) AS cnt FROM work_orders {where_sql}");
        let count_rows = self
            .db
            .query(&count_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        let select_sql = format!(
            "SELECT id, title, station, status, created_at FROM work_orders {where_sql} \
             ORDER BY created_at DESC LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
        );
        params.push(Value::Integer(page.limit() as i64));
        params.push(Value::Integer(page.offset() as i64));

        let rows = self
            .db
            .query(&select_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let items = rows
            .iter()
            .map(row_to_work_order)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }
}

fn row_to_work_order(row: &Row) -> Result<WorkOrder, ServiceError> {
    let field = |name: &str| {
        row.get_str(name)
            .map(String::from)
            .ok_or_else(|| ServiceError::Storage(format!("missing column {name}")))
    };
    let status_raw = field("status")?;
    let status = WorkOrderStatus::from_str(&status_raw)
        .ok_or_else(|| ServiceError::Storage(format!("bad status value '{status_raw}'")))?;

    Ok(WorkOrder {
        id: field("id")?,
        title: field("title")?,
        station: field("station")?,
        status,
        created_at: field("created_at")?,
        inspections: Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// InspectionStore
// ---------------------------------------------------------------------------

/// Persistent storage for inspections.
pub struct InspectionStore {
    db: Arc<dyn SQLStore>,
}

impl InspectionStore {
    pub fn new(db: Arc<dyn SQLStore>) -> Self {
        Self { db }
    }

    /// Insert a new inspection. A foreign-key violation means the referenced
    /// work order vanished between validation and insert — still a
    /// validation error to the caller.
    pub fn create(&self, inspection: &Inspection) -> Result<(), ServiceError> {
        self.db
            .exec(
                "INSERT INTO inspections (id, work_order, result, notes, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(inspection.id.clone()),
                    Value::Text(inspection.work_order.clone()),
                    Value::Text(inspection.result.as_str().to_string()),
                    Value::Text(inspection.notes.clone()),
                    Value::Text(inspection.created_at.clone()),
                ],
            )
            .map_err(|e| {
                if e.is_constraint() {
                    ServiceError::Validation(format!(
                        "work_order: no work order '{}'",
                        inspection.work_order
                    ))
                } else {
                    ServiceError::Storage(e.to_string())
                }
            })?;
        Ok(())
    }

    /// Get an inspection by ID.
    pub fn get(&self, id: &str) -> Result<Inspection, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, work_order, result, notes, created_at \
                 FROM inspections WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("inspection {id}")))?;
        row_to_inspection(row)
    }

    /// Update the mutable columns of an inspection.
    pub fn update(&self, inspection: &Inspection) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "UPDATE inspections SET work_order = ?1, result = ?2, notes = ?3 WHERE id = ?4",
                &[
                    Value::Text(inspection.work_order.clone()),
                    Value::Text(inspection.result.as_str().to_string()),
                    Value::Text(inspection.notes.clone()),
                    Value::Text(inspection.id.clone()),
                ],
            )
            .map_err(|e| {
                if e.is_constraint() {
                    ServiceError::Validation(format!(
                        "work_order: no work order '{}'",
                        inspection.work_order
                    ))
                } else {
                    ServiceError::Storage(e.to_string())
                }
            })?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("inspection {}", inspection.id)));
        }
        Ok(())
    }

    /// Delete an inspection by ID.
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "DELETE FROM inspections WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("inspection {id}")));
        }
        Ok(())
    }

    /// List inspections, optionally filtered by work order, newest first.
    pub fn list(
        &self,
        work_order: Option<&str>,
        page: PageParams,
    ) -> Result<(Vec<Inspection>, usize), ServiceError> {
        let mut where_sql = String::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(wo) = work_order {
            where_sql = "WHERE work_order = ?1".to_string();
            params.push(Value::Text(wo.to_string()));
        }

        let count_sql = format!("SELECT COUNT(*) AS cnt FROM inspections {where_sql}");
        let count_rows = self
            .db
            .query(&count_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        let select_sql = format!(
            "SELECT id, work_order, result, notes, created_at FROM inspections {where_sql} \
             ORDER BY created_at DESC LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
        );
        params.push(Value::Integer(page.limit() as i64));
        params.push(Value::Integer(page.offset() as i64));

        let rows = self
            .db
            .query(&select_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let items = rows
            .iter()
            .map(row_to_inspection)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    /// All inspections of one work order, newest first (for embedding).
    pub fn for_work_order(&self, work_order: &str) -> Result<Vec<Inspection>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, work_order, result, notes, created_at FROM inspections \
                 WHERE work_order = ?1 ORDER BY created_at DESC",
                &[Value::Text(work_order.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_inspection).collect()
    }
}

fn row_to_inspection(row: &Row) -> Result<Inspection, ServiceError> {
    let field = |name: &str| {
        row.get_str(name)
            .map(String::from)
            .ok_or_else(|| ServiceError::Storage(format!("missing column {name}")))
    };
    let result_raw = field("result")?;
    let result = InspectionResult::from_str(&result_raw)
        .ok_or_else(|| ServiceError::Storage(format!("bad result value '{result_raw}'")))?;

    Ok(Inspection {
        id: field("id")?,
        work_order: field("work_order")?,
        result,
        // An empty notes string comes back as NULL through the dynamic
        // row mapping; both mean "no notes".
        notes: row.get_str("notes").unwrap_or_default().to_string(),
        created_at: field("created_at")?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
