use serde::Serialize;

/// Fixed page size for all list endpoints.
pub const PAGE_SIZE: usize = 10;

/// Normalized page-number parameters for list/query operations.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    /// 1-based page number.
    pub page: u64,
}

impl PageParams {
    /// Normalize a raw `?page=` query value (missing or zero becomes page 1).
    pub fn new(page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * PAGE_SIZE
    }

    /// Maximum number of items on a page.
    pub fn limit(&self) -> usize {
        PAGE_SIZE
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1 }
    }
}

/// One page of results with page-number navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    /// Total number of matching items across all pages.
    pub count: usize,
    /// Next page number, if any.
    pub next: Option<u64>,
    /// Previous page number, if any.
    pub previous: Option<u64>,
    /// The items on this page.
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Build the page envelope from a total count, the requested page, and
    /// the items fetched for that page.
    pub fn new(count: usize, params: PageParams, results: Vec<T>) -> Self {
        let page = params.page;
        let has_more = params.offset() + results.len() < count;
        Self {
            count,
            next: has_more.then(|| page + 1),
            previous: (page > 1).then(|| page - 1),
            results,
        }
    }
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Merge a JSON patch into a base value.
///
/// For each key in `patch`:
/// - If the value is `null`, the key is removed from `base`.
/// - Otherwise, the key is set to the patch value.
///
/// This follows RFC 7386 (JSON Merge Patch) semantics.
pub fn merge_patch(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}
