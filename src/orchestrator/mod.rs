pub mod platform;
pub mod run;

pub use platform::{Backoff, Platform, RetryPolicy, ai_transient_policy};
pub use run::{CancelToken, Orchestrator, RunConfig, RunGuard, RunReport};
