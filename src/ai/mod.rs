pub mod gemini;
pub mod mapper;

pub use gemini::GeminiMapper;
pub use mapper::{FieldMapper, HeuristicMapper};
