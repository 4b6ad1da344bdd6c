pub mod memory;
pub mod page;

pub use memory::MemoryDom;
pub use page::{ComputedStyle, Dom, DomEvent, FilePayload, NodeId, Rect};
pub use page::{closest, descendants, find_by_id};
