pub mod event;
pub mod logger;

pub use event::RunEvent;
pub use logger::TraceLogger;
