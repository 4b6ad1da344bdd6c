pub mod bridge;
pub mod protocol;
pub mod transport;

pub use bridge::BridgeTransport;
pub use protocol::{FrameInfo, PageRequest, PageResponse};
pub use transport::{FrameTransport, LocalTransport};
