use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::ai::FieldMapper;
use crate::engine::model::{FillInstruction, FrameScanResult};
use crate::engine::upload::UploadKind;
use crate::error::RunError;
use crate::messenger::protocol::{PageRequest, PageResponse};
use crate::messenger::transport::FrameTransport;
use crate::orchestrator::platform::{Platform, RetryPolicy, ai_transient_policy};
use crate::profile::{ApplicationEntry, ApplicationStatus, ProfileStore, UserProfile};
use crate::trace::{RunEvent, TraceLogger};

/// Cooperative cancellation flag shared between the run and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// At most one autofill run at a time per guard. Cloned guards share the
/// same slot, so every surface (CLI command, future UI) that shares a
/// guard shares the limit.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a run; dropping it frees the slot.
pub struct RunPermit {
    busy: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> Result<RunPermit, RunError> {
        if self.busy.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return Err(RunError::RunInProgress);
        }
        Ok(RunPermit { busy: Arc::clone(&self.busy) })
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Tunables for one run. Defaults mirror live behavior; tests shrink the
/// timers through `scan_policy_override`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Per-frame budget for a context read.
    pub scan_timeout_ms: u64,
    /// Per-field budget for a fill or attach request.
    pub fill_timeout_ms: u64,
    /// Stop rescanning once some frame yields at least this many fields.
    pub good_enough_fields: usize,
    /// Attach the stored resume after filling, when the profile has one.
    pub attach_documents: bool,
    /// Replaces the platform's scan retry schedule when set.
    pub scan_policy_override: Option<RetryPolicy>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            scan_timeout_ms: 5000,
            fill_timeout_ms: 10_000,
            good_enough_fields: 3,
            attach_documents: true,
            scan_policy_override: None,
        }
    }
}

/// Outcome summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub platform: Platform,
    pub frame_id: u64,
    pub fields_discovered: usize,
    pub filled: usize,
    pub failed: usize,
    pub resume_attached: Option<bool>,
    pub elapsed_ms: u64,
}

/// Drives one full autofill: scan with retries, pick the richest frame,
/// map fields through the backend, replay instructions into that same
/// frame, then attach documents and record history.
pub struct Orchestrator<'a> {
    transport: &'a mut dyn FrameTransport,
    mapper: &'a dyn FieldMapper,
    store: &'a dyn ProfileStore,
    tracer: &'a TraceLogger,
    config: RunConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        transport: &'a mut dyn FrameTransport,
        mapper: &'a dyn FieldMapper,
        store: &'a dyn ProfileStore,
        tracer: &'a TraceLogger,
        config: RunConfig,
    ) -> Self {
        Orchestrator { transport, mapper, store, tracer, config }
    }

    pub fn run(
        &mut self,
        page_url: &str,
        guard: &RunGuard,
        cancel: &CancelToken,
    ) -> Result<RunReport, RunError> {
        let _permit = guard.acquire()?;
        let started = Instant::now();
        let platform = Platform::detect(page_url);
        self.tracer.log(RunEvent::RunStarted {
            url: page_url.to_string(),
            platform: platform.label().to_string(),
        });

        let result = self.run_inner(platform, cancel, started);
        match &result {
            Ok(report) => self.tracer.log(RunEvent::RunComplete {
                filled: report.filled,
                failed: report.failed,
                elapsed_ms: report.elapsed_ms,
            }),
            Err(e) => self.tracer.log(RunEvent::RunFailed { error: e.to_string() }),
        }
        result
    }

    fn run_inner(
        &mut self,
        platform: Platform,
        cancel: &CancelToken,
        started: Instant,
    ) -> Result<RunReport, RunError> {
        let profile = self.store.load().map_err(RunError::Storage)?;

        let best = self.scan_with_retries(platform, cancel)?;
        let Some(best) = best else {
            return Err(RunError::NoFieldsFound {
                platform: platform.label().to_string(),
                guidance: platform.guidance().to_string(),
            });
        };
        self.tracer.log(RunEvent::FrameSelected {
            frame_id: best.frame_id,
            field_count: best.field_count(),
        });

        let instructions = self.map_with_retries(&best, &profile, cancel)?;

        let (filled, failed) = self.apply_instructions(best.frame_id, &instructions, cancel)?;

        let resume_attached = if self.config.attach_documents && profile.has_resume_blob() {
            Some(self.attach_resume(best.frame_id, &profile))
        } else {
            None
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let status =
            if failed == 0 { ApplicationStatus::Applied } else { ApplicationStatus::InProgress };
        let entry = ApplicationEntry::new(
            &best.context.site_name,
            &best.context.title,
            elapsed_ms as f64 / 1000.0,
            status,
        );
        if let Err(e) = self.store.append_history(entry) {
            eprintln!("Warning: could not record application history: {}", e);
        }

        Ok(RunReport {
            platform,
            frame_id: best.frame_id,
            fields_discovered: best.field_count(),
            filled,
            failed,
            resume_attached,
            elapsed_ms,
        })
    }

    /// Scan every frame per attempt, keeping the richest result seen
    /// across all attempts. A strictly greater field count replaces the
    /// incumbent; ties keep the earlier winner.
    fn scan_with_retries(
        &mut self,
        platform: Platform,
        cancel: &CancelToken,
    ) -> Result<Option<FrameScanResult>, RunError> {
        let policy = self.config.scan_policy_override.unwrap_or_else(|| platform.scan_policy());
        let timeout = Duration::from_millis(self.config.scan_timeout_ms);
        let mut best: Option<FrameScanResult> = None;

        for attempt in 1..=policy.max_attempts {
            if cancel.is_cancelled() {
                return Err(RunError::Cancelled);
            }

            // All frames are asked at once and settled under one shared
            // deadline; a frame that times out or refuses contributes
            // nothing to this attempt.
            let outcomes = self.transport.broadcast(&PageRequest::GetPageContext, timeout);
            let frames_seen = outcomes.len();
            for (frame_id, outcome) in outcomes {
                let Ok(response) = outcome else { continue };
                if let Some(result) = scan_result_from(frame_id, response) {
                    let incumbent = best.as_ref().map(|b| b.field_count()).unwrap_or(0);
                    if result.field_count() > incumbent {
                        best = Some(result);
                    }
                }
            }

            let best_count = best.as_ref().map(|b| b.field_count()).unwrap_or(0);
            self.tracer.log(RunEvent::ScanAttempt {
                attempt,
                max_attempts: policy.max_attempts,
                frames_seen,
                best_field_count: best_count,
            });

            if best_count >= self.config.good_enough_fields {
                break;
            }
            if attempt < policy.max_attempts {
                sleep_cancellable(policy.delay_ms(attempt), cancel)?;
            }
        }

        Ok(best.filter(|b| b.field_count() > 0))
    }

    /// One mapping call, retried on transient backend failures only.
    fn map_with_retries(
        &self,
        scan: &FrameScanResult,
        profile: &UserProfile,
        cancel: &CancelToken,
    ) -> Result<Vec<FillInstruction>, RunError> {
        let policy = ai_transient_policy();
        for attempt in 1..=policy.max_attempts {
            if cancel.is_cancelled() {
                return Err(RunError::Cancelled);
            }
            match self.mapper.map_fields(&scan.fields, profile, &scan.context) {
                Ok(instructions) => {
                    self.tracer.log(RunEvent::AiMapped {
                        instructions: instructions.len(),
                        attempt,
                    });
                    return Ok(instructions);
                }
                Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                    let delay_ms = policy.delay_ms(attempt);
                    self.tracer.log(RunEvent::AiRetry {
                        attempt,
                        delay_ms,
                        reason: e.to_string(),
                    });
                    sleep_cancellable(delay_ms, cancel)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        // Loop always returns from its last iteration.
        Err(RunError::Cancelled)
    }

    /// Replay instructions sequentially into the frame that produced the
    /// descriptors. Each field stands alone: a failure is counted and
    /// the batch continues.
    fn apply_instructions(
        &mut self,
        frame_id: u64,
        instructions: &[FillInstruction],
        cancel: &CancelToken,
    ) -> Result<(usize, usize), RunError> {
        let timeout = Duration::from_millis(self.config.fill_timeout_ms);
        let mut filled = 0;
        let mut failed = 0;

        for instruction in instructions {
            if cancel.is_cancelled() {
                return Err(RunError::Cancelled);
            }
            let request = PageRequest::FillField {
                field_id: instruction.field_id.clone(),
                value: instruction.value.clone(),
            };
            match self.transport.request(frame_id, &request, timeout) {
                Ok(response) if response.success => {
                    filled += 1;
                    self.tracer.log(RunEvent::FieldFilled {
                        field_id: instruction.field_id.clone(),
                    });
                }
                Ok(_) => {
                    failed += 1;
                    self.tracer.log(RunEvent::FillFailed {
                        field_id: instruction.field_id.clone(),
                        reason: "page agent refused".to_string(),
                    });
                }
                Err(e) => {
                    failed += 1;
                    self.tracer.log(RunEvent::FillFailed {
                        field_id: instruction.field_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok((filled, failed))
    }

    fn attach_resume(&mut self, frame_id: u64, profile: &UserProfile) -> bool {
        let Some(blob) = profile.resume_blob.clone() else {
            return false;
        };
        let request = PageRequest::attach(
            UploadKind::Resume,
            blob,
            profile.resume_file_name.clone().unwrap_or_else(|| "resume.pdf".into()),
            profile.resume_mime_type.clone().unwrap_or_else(|| "application/pdf".into()),
        );
        let timeout = Duration::from_millis(self.config.fill_timeout_ms);
        let success = match self.transport.request(frame_id, &request, timeout) {
            Ok(response) => response.success,
            Err(_) => false,
        };
        self.tracer.log(RunEvent::Attachment { kind: "resume".to_string(), success });
        success
    }
}

fn scan_result_from(frame_id: u64, response: PageResponse) -> Option<FrameScanResult> {
    if !response.success {
        return None;
    }
    Some(FrameScanResult {
        frame_id,
        context: response.context?,
        fields: response.fields?,
    })
}

/// Sleep in short slices so cancellation takes effect promptly.
fn sleep_cancellable(total_ms: u64, cancel: &CancelToken) -> Result<(), RunError> {
    let mut remaining = total_ms;
    while remaining > 0 {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }
        let slice = remaining.min(50);
        thread::sleep(Duration::from_millis(slice));
        remaining -= slice;
    }
    if cancel.is_cancelled() {
        return Err(RunError::Cancelled);
    }
    Ok(())
}
