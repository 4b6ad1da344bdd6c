pub mod agent;
pub mod extract;
pub mod fill;
pub mod model;
pub mod upload;

pub use agent::PageAgent;
pub use model::{FieldDescriptor, FieldKind, FillInstruction, FrameScanResult, PageContext};
