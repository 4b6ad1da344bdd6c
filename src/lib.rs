//! Automated filling of job application forms.
//!
//! The pipeline: scan page frames for fillable fields, map them to the
//! applicant's stored profile (heuristically or through an LLM backend),
//! replay the resulting instructions into the frame that produced them,
//! then attach the resume. Pages are reached through the `Dom` trait, so
//! the whole engine runs identically against a live browser bridge and
//! the in-memory page used by tests.

pub mod ai;
pub mod cli;
pub mod dom;
pub mod engine;
pub mod error;
pub mod messenger;
pub mod orchestrator;
pub mod profile;
pub mod trace;

pub use error::{AiError, RunError, TransportError};
