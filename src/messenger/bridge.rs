use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::messenger::protocol::{FrameInfo, PageRequest, PageResponse};
use crate::messenger::transport::FrameTransport;

/// One request line written to the bridge helper's stdin.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BridgeCommand<'a> {
    Request {
        seq: u64,
        cmd: &'static str,
        #[serde(rename = "frameId")]
        frame_id: u64,
        request: &'a PageRequest,
    },
    ListFrames {
        seq: u64,
        cmd: &'static str,
    },
    Quit {
        cmd: &'static str,
    },
}

/// One response line read from the helper's stdout.
#[derive(Debug, Deserialize)]
struct BridgeLine {
    #[serde(default)]
    seq: Option<u64>,
    ok: bool,
    #[serde(default)]
    ready: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    frames: Option<Vec<FrameInfo>>,
    #[serde(default)]
    response: Option<PageResponse>,
}

/// Transport over a long-lived Node.js helper that holds the real browser.
///
/// Commands go out as NDJSON over stdin; a dedicated reader thread pumps
/// stdout lines into a channel so each request can wait with its own
/// deadline instead of blocking on the pipe. Lines are correlated by a
/// monotonically increasing `seq`; stale lines from requests that already
/// timed out are discarded.
///
/// The frame list is cached: call `refresh_frames` after navigation, then
/// `list_frames` is cheap and infallible.
pub struct BridgeTransport {
    child: Child,
    stdin: std::process::ChildStdin,
    lines: Receiver<Result<BridgeLine, TransportError>>,
    frames: Vec<FrameInfo>,
    next_seq: u64,
}

impl BridgeTransport {
    /// Spawn the helper script, pointed at `url`, and wait for its ready
    /// line. The helper owns the browser and opens the page before
    /// signalling ready.
    pub fn launch(script: &str, url: &str) -> Result<Self, TransportError> {
        let mut child = Command::new("node")
            .arg(script)
            .arg(url)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TransportError::SpawnFailed { script: script.into(), source: e })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Io("Failed to capture bridge stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Io("Failed to capture bridge stdout".into()))?;

        let (tx, rx) = channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let parsed = match line {
                    Ok(text) if text.trim().is_empty() => continue,
                    Ok(text) => serde_json::from_str::<BridgeLine>(text.trim()).map_err(|e| {
                        TransportError::Protocol { context: "bridge response".into(), source: e }
                    }),
                    Err(e) => Err(TransportError::Io(format!("bridge stdout read: {}", e))),
                };
                if tx.send(parsed).is_err() {
                    break;
                }
            }
            // EOF: helper exited. Receiver sees a disconnect.
        });

        let mut transport = BridgeTransport {
            child,
            stdin,
            lines: rx,
            frames: Vec::new(),
            next_seq: 1,
        };

        let ready = transport.await_line(None, Duration::from_secs(30))?;
        if !ready.ok || ready.ready != Some(true) {
            return Err(TransportError::Io(
                "Bridge helper did not send a ready signal".into(),
            ));
        }
        Ok(transport)
    }

    /// Ask the helper for the current frame tree and cache it.
    pub fn refresh_frames(&mut self) -> Result<(), TransportError> {
        let seq = self.next_seq();
        self.write_command(&BridgeCommand::ListFrames { seq, cmd: "list_frames" })?;
        let line = self.await_line(Some(seq), Duration::from_secs(10))?;
        if !line.ok {
            return Err(TransportError::Io(
                line.error.unwrap_or_else(|| "list_frames failed".into()),
            ));
        }
        self.frames = line.frames.unwrap_or_default();
        Ok(())
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn write_command(&mut self, command: &BridgeCommand<'_>) -> Result<(), TransportError> {
        let json = serde_json::to_string(command)
            .map_err(|e| TransportError::Io(format!("serialize bridge command: {}", e)))?;
        writeln!(self.stdin, "{}", json)
            .map_err(|e| TransportError::Io(format!("write bridge stdin: {}", e)))?;
        self.stdin
            .flush()
            .map_err(|e| TransportError::Io(format!("flush bridge stdin: {}", e)))
    }

    /// Wait for the next line matching `seq` (or any line when `seq` is
    /// None, used for the ready handshake). Stale lines with an older seq
    /// belong to requests that already timed out and are dropped.
    fn await_line(
        &mut self,
        seq: Option<u64>,
        timeout: Duration,
    ) -> Result<BridgeLine, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(Ok(line)) => match seq {
                    None => return Ok(line),
                    Some(want) if line.seq == Some(want) => return Ok(line),
                    Some(_) => continue,
                },
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(TransportError::Timeout {
                        frame_id: 0,
                        waited_ms: timeout.as_millis() as u64,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(TransportError::Io(
                        "Bridge helper exited (stdout closed)".into(),
                    ));
                }
            }
        }
    }

    fn quit(&mut self) {
        // Best-effort shutdown; the helper may already be gone.
        let _ = self.write_command(&BridgeCommand::Quit { cmd: "quit" });
        let _ = self.child.wait();
    }
}

impl FrameTransport for BridgeTransport {
    fn list_frames(&self) -> Vec<FrameInfo> {
        self.frames.clone()
    }

    fn request(
        &mut self,
        frame_id: u64,
        request: &PageRequest,
        timeout: Duration,
    ) -> Result<PageResponse, TransportError> {
        let seq = self.next_seq();
        self.write_command(&BridgeCommand::Request { seq, cmd: "request", frame_id, request })?;

        let line = match self.await_line(Some(seq), timeout) {
            Ok(line) => line,
            Err(TransportError::Timeout { waited_ms, .. }) => {
                return Err(TransportError::Timeout { frame_id, waited_ms });
            }
            Err(e) => return Err(e),
        };

        if !line.ok {
            // The helper could not route to this frame at all.
            return Err(TransportError::NoResponder { frame_id });
        }
        line.response.ok_or_else(|| TransportError::Io(format!(
            "Bridge line for frame {} carried no response body",
            frame_id
        )))
    }

    // Pipelined: every request line goes out on stdin before any response
    // is read, so all frames work concurrently and one shared deadline
    // bounds the whole batch. Seq correlation matches answers back to
    // frames in whatever order the helper emits them.
    fn broadcast(
        &mut self,
        request: &PageRequest,
        timeout: Duration,
    ) -> Vec<(u64, Result<PageResponse, TransportError>)> {
        let frame_ids: Vec<u64> = self.frames.iter().map(|f| f.frame_id).collect();

        let mut pending: Vec<(u64, u64)> = Vec::new();
        let mut settled: HashMap<u64, Result<PageResponse, TransportError>> = HashMap::new();
        for &frame_id in &frame_ids {
            let seq = self.next_seq();
            let command = BridgeCommand::Request { seq, cmd: "request", frame_id, request };
            match self.write_command(&command) {
                Ok(()) => pending.push((seq, frame_id)),
                Err(e) => {
                    settled.insert(frame_id, Err(e));
                }
            }
        }

        let deadline = Instant::now() + timeout;
        while !pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.lines.recv_timeout(remaining) {
                Ok(Ok(line)) => {
                    let Some(pos) = pending.iter().position(|&(seq, _)| line.seq == Some(seq))
                    else {
                        // Stale line from an earlier timed-out request.
                        continue;
                    };
                    let (_, frame_id) = pending.swap_remove(pos);
                    let outcome = if !line.ok {
                        Err(TransportError::NoResponder { frame_id })
                    } else {
                        line.response.ok_or_else(|| {
                            TransportError::Io(format!(
                                "Bridge line for frame {} carried no response body",
                                frame_id
                            ))
                        })
                    };
                    settled.insert(frame_id, outcome);
                }
                // A line that failed to parse cannot be matched to a
                // frame; that frame settles as a timeout below.
                Ok(Err(_)) => continue,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        for (_, frame_id) in pending {
            settled.insert(
                frame_id,
                Err(TransportError::Timeout { frame_id, waited_ms: timeout.as_millis() as u64 }),
            );
        }

        frame_ids
            .into_iter()
            .filter_map(|id| settled.remove(&id).map(|outcome| (id, outcome)))
            .collect()
    }
}

impl Drop for BridgeTransport {
    fn drop(&mut self) {
        self.quit();
    }
}
