pub mod autofit;
pub mod config;
pub mod drag;
pub mod input;
pub mod requests;
pub mod shortcuts;
pub mod store;
pub mod workspace;

pub use autofit::{AutoFitController, AutoFitOutcome, Trigger};
pub use config::{ConfigError, WorkspaceConfig};
pub use drag::{CancelReason, DragController, GestureEffect, GestureKind, NoopReason};
pub use input::{PointerId, PointerTarget, Region};
pub use requests::{
    RequestError, RequestTicket, RequestTracker, Resolution, ServiceFailure, ServiceRequest,
    ServiceResponse,
};
pub use store::{PanelStore, StoreError, StoreEvent};
pub use workspace::{KeyOutcome, Workspace};
