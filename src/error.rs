use std::fmt;

/// Errors on the boundary between the orchestrator and a page frame.
///
/// These are always soft: a frame that cannot be reached contributes
/// nothing to a scan and never aborts the batch.
#[derive(Debug)]
pub enum TransportError {
    /// Helper process failed to spawn
    SpawnFailed { script: String, source: std::io::Error },

    /// Writing to or reading from the helper pipe failed
    Io(String),

    /// No response arrived within the per-message timeout
    Timeout { frame_id: u64, waited_ms: u64 },

    /// The addressed frame has no responder (navigated away, never injected)
    NoResponder { frame_id: u64 },

    /// Response line was not valid JSON
    Protocol { context: String, source: serde_json::Error },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::SpawnFailed { script, source } => {
                write!(f, "Failed to spawn {} (is Node.js installed?): {}", script, source)
            }
            TransportError::Io(msg) => write!(f, "Transport I/O error: {}", msg),
            TransportError::Timeout { frame_id, waited_ms } => {
                write!(f, "Frame {} did not respond within {}ms", frame_id, waited_ms)
            }
            TransportError::NoResponder { frame_id } => {
                write!(f, "No responder in frame {}", frame_id)
            }
            TransportError::Protocol { context, source } => {
                write!(f, "Malformed response ({}): {}", context, source)
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::SpawnFailed { source, .. } => Some(source),
            TransportError::Protocol { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Provider-level failures from the field-mapping backend, bucketed into
/// the categories surfaced to the user.
#[derive(Debug)]
pub enum AiError {
    /// 429 / RESOURCE_EXHAUSTED
    QuotaExceeded(String),

    /// 401 / UNAUTHENTICATED
    InvalidCredential(String),

    /// 403 / PERMISSION_DENIED
    AccessDenied(String),

    /// 503 / 529, transient and worth retrying
    Overloaded(String),

    /// Request never reached the provider
    Network(String),

    /// Provider answered, but not with the JSON we asked for.
    /// Kept distinct from Network so the user sees the right remedy.
    Parse { snippet: String, source: serde_json::Error },

    /// Anything else
    Failed(String),
}

impl AiError {
    /// Map an HTTP status to a category. Unknown statuses fall through to Failed.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => AiError::QuotaExceeded(body),
            401 => AiError::InvalidCredential(body),
            403 => AiError::AccessDenied(body),
            503 | 529 => AiError::Overloaded(body),
            _ => AiError::Failed(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Transient errors are retried by the orchestrator's backoff policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, AiError::Overloaded(_) | AiError::QuotaExceeded(_))
    }
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::QuotaExceeded(msg) => {
                write!(f, "API quota exceeded, wait or upgrade your key: {}", msg)
            }
            AiError::InvalidCredential(msg) => {
                write!(f, "Invalid API key, check your credentials: {}", msg)
            }
            AiError::AccessDenied(msg) => {
                write!(f, "API access denied for this model: {}", msg)
            }
            AiError::Overloaded(msg) => {
                write!(f, "Provider overloaded, try again shortly: {}", msg)
            }
            AiError::Network(msg) => write!(f, "Network error reaching provider: {}", msg),
            AiError::Parse { snippet, source } => {
                write!(f, "Provider returned unparseable JSON ({}): {}", source, snippet)
            }
            AiError::Failed(msg) => write!(f, "AI analysis failed: {}", msg),
        }
    }
}

impl std::error::Error for AiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AiError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Terminal failures of one autofill run. Everything here degrades to a
/// status message for the user; nothing is fatal to the host process.
#[derive(Debug)]
pub enum RunError {
    /// No frame produced any fields after the retry budget was spent.
    /// Carries platform-tailored remediation guidance.
    NoFieldsFound { platform: String, guidance: String },

    /// Another autofill run is already in flight for this tab
    RunInProgress,

    /// The run was cancelled through its token
    Cancelled,

    /// The mapping backend failed terminally
    Ai(AiError),

    /// The bridge/helper could not be brought up at all
    Transport(TransportError),

    /// Profile could not be loaded/saved
    Storage(String),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::NoFieldsFound { platform, guidance } => {
                write!(f, "No form fields found on {} page. {}", platform, guidance)
            }
            RunError::RunInProgress => write!(f, "An autofill run is already in progress"),
            RunError::Cancelled => write!(f, "Run cancelled"),
            RunError::Ai(e) => write!(f, "{}", e),
            RunError::Transport(e) => write!(f, "{}", e),
            RunError::Storage(msg) => write!(f, "Profile storage error: {}", msg),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Ai(e) => Some(e),
            RunError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AiError> for RunError {
    fn from(e: AiError) -> Self {
        RunError::Ai(e)
    }
}

impl From<TransportError> for RunError {
    fn from(e: TransportError) -> Self {
        RunError::Transport(e)
    }
}
