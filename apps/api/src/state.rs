use selecta_application::{SelectionProcess, SyncMirror};

/// Shared API state.
#[derive(Clone)]
pub struct AppState {
    pub selection: SelectionProcess,
    pub mirror: SyncMirror,
    pub frontend_url: String,
}
