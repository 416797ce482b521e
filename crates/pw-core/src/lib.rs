pub mod geometry;
pub mod id;
pub mod model;
pub mod payload;
pub mod policy;
pub mod scale;
pub mod view;

pub use geometry::{Bounds, Delta, Handle, Point, Size, resize};
pub use id::PanelId;
pub use model::*;
pub use payload::ServicePayload;
pub use policy::{ContentSignals, SizePolicy, desired_size};
pub use scale::{Frame, ScaledContent, scale};
pub use view::CanvasView;
