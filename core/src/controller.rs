/// A group of routes owned by one resource.
///
/// Implementors build their own sub-router; the application nests it under
/// the resource's path prefix and supplies the shared state afterwards.
pub trait Controller {
    type State: Clone + Send + Sync + 'static;

    fn router() -> axum::Router<Self::State>;
}
