use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One observable step of an autofill run.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        url: String,
        platform: String,
    },
    ScanAttempt {
        attempt: u32,
        max_attempts: u32,
        frames_seen: usize,
        best_field_count: usize,
    },
    FrameSelected {
        frame_id: u64,
        field_count: usize,
    },
    AiMapped {
        instructions: usize,
        attempt: u32,
    },
    AiRetry {
        attempt: u32,
        delay_ms: u64,
        reason: String,
    },
    FieldFilled {
        field_id: String,
    },
    FillFailed {
        field_id: String,
        reason: String,
    },
    Attachment {
        kind: String,
        success: bool,
    },
    RunComplete {
        filled: usize,
        failed: usize,
        elapsed_ms: u64,
    },
    RunFailed {
        error: String,
    },
}

/// Envelope written as one JSONL line per event.
#[derive(Debug, Serialize)]
pub struct TraceRecord {
    pub timestamp_ms: u128,
    #[serde(flatten)]
    pub event: RunEvent,
}

impl TraceRecord {
    pub fn now(event: RunEvent) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        TraceRecord { timestamp_ms, event }
    }
}
