mod engine;
mod item;
mod presets;
mod registry;
mod stage;

pub use engine::Workflow;
pub use item::{ItemId, WorkflowItem};
pub use presets::{EntityKind, actions, findings};
pub use registry::{StatusDescriptor, StatusRegistry};
pub use stage::{StageId, StageOrder};
