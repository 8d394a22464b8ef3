use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WorkOrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a work order.
///
/// ```text
/// OPEN → IN_PROGRESS → DONE
/// ```
///
/// Closed enumeration: out-of-range values fail at parse time, and the
/// storage layer only ever writes `as_str()` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "IN_PROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InspectionResult
// ---------------------------------------------------------------------------

/// Outcome of a quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InspectionResult {
    Ok,
    Fail,
}

impl InspectionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(Self::Ok),
            "FAIL" => Some(Self::Fail),
            _ => None,
        }
    }
}

impl std::fmt::Display for InspectionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkOrder — maps 1:1 to SQL columns
// ---------------------------------------------------------------------------

/// A unit of requested work tied to a station/line.
///
/// `inspections` is read-only and reconstructed from the store on read;
/// it never round-trips through a write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,

    /// Short description, max 200 chars.
    pub title: String,

    /// Work line/station identifier, max 100 chars.
    pub station: String,

    #[serde(default)]
    pub status: WorkOrderStatus,

    /// RFC 3339, server-assigned at creation, immutable.
    pub created_at: String,

    /// This order's inspections, newest first.
    #[serde(default)]
    pub inspections: Vec<Inspection>,
}

/// A quality-check record attached to exactly one work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub id: String,

    /// Id of the owning work order.
    pub work_order: String,

    pub result: InspectionResult,

    /// Free text, defaults to empty.
    #[serde(default)]
    pub notes: String,

    /// RFC 3339, server-assigned at creation, immutable.
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// API request / query types
// ---------------------------------------------------------------------------

/// Body for `POST /workorders/`.
#[derive(Debug, Deserialize)]
pub struct CreateWorkOrder {
    pub title: String,
    pub station: String,
    #[serde(default)]
    pub status: WorkOrderStatus,
}

/// Body for `PUT /workorders/{id}/` — full update of the mutable fields.
/// A missing `status` falls back to the default, like on create.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkOrder {
    pub title: String,
    pub station: String,
    #[serde(default)]
    pub status: WorkOrderStatus,
}

/// Body for `POST /inspections/`.
#[derive(Debug, Deserialize)]
pub struct CreateInspection {
    pub work_order: String,
    pub result: InspectionResult,
    #[serde(default)]
    pub notes: String,
}

/// Body for `PUT /inspections/{id}/`.
#[derive(Debug, Deserialize)]
pub struct UpdateInspection {
    pub work_order: String,
    pub result: InspectionResult,
    #[serde(default)]
    pub notes: String,
}

/// Query parameters for `GET /workorders/`.
///
/// `status` stays a raw string here; the service parses it so an
/// out-of-enum filter value becomes a validation error, not a silent
/// empty result.
#[derive(Debug, Default, Deserialize)]
pub struct WorkOrderListQuery {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub page: Option<u64>,
}

/// Query parameters for `GET /inspections/`.
#[derive(Debug, Default, Deserialize)]
pub struct InspectionListQuery {
    #[serde(default)]
    pub work_order: Option<String>,

    #[serde(default)]
    pub page: Option<u64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
