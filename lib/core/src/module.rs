use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (auth, workorders, ...) implements this trait
/// to register its API endpoints. The binary entry point collects all
/// modules and merges their routes into a single Router. Routes are
/// declared with their full public paths — the binary merges rather
/// than nests them.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes.
    fn routes(&self) -> Router;
}
