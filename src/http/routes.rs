use axum::Router;

use crate::app::AppState;

/// A group of routes sharing a path prefix.
///
/// ```ignore
/// struct SupportModule;
///
/// impl RouteModule for SupportModule {
///     fn routes(&self) -> Router<AppState> {
///         Router::new().route("/board", get(board))
///     }
///
///     fn prefix(&self) -> Option<&str> {
///         Some("/api/support")
///     }
/// }
/// ```
pub trait RouteModule {
    /// Routes without state applied. Handlers extract `State<AppState>`.
    fn routes(&self) -> Router<AppState>;

    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Nest or merge this module into `router`.
    fn register(self, router: Router<AppState>) -> Router<AppState>
    where
        Self: Sized,
    {
        let routes = self.routes();
        match self.prefix() {
            Some(prefix) => router.nest(prefix, routes),
            None => router.merge(routes),
        }
    }
}
