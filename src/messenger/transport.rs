use std::collections::HashSet;
use std::time::Duration;

use crate::dom::{Dom, MemoryDom};
use crate::engine::PageAgent;
use crate::error::TransportError;
use crate::messenger::protocol::{FrameInfo, PageRequest, PageResponse};

/// Delivery of requests to per-frame page agents.
///
/// Implementations own the routing and the failure modes of delivery;
/// whatever a frame's agent decides comes back as an in-band
/// `PageResponse`. A `TransportError` always means the request may not
/// have been handled at all.
pub trait FrameTransport {
    /// Frames currently addressable, top frame first.
    fn list_frames(&self) -> Vec<FrameInfo>;

    /// Deliver one request to one frame and wait up to `timeout` for its
    /// response. Used when frame affinity matters (fills, attachments).
    fn request(
        &mut self,
        frame_id: u64,
        request: &PageRequest,
        timeout: Duration,
    ) -> Result<PageResponse, TransportError>;

    /// Issue `request` to every known frame without waiting between
    /// frames, then settle every outcome under one shared deadline.
    /// A slow or dead frame costs the batch at most `timeout` total and
    /// never removes another frame's entry from the result. Entries come
    /// back in `list_frames` order, top frame first.
    fn broadcast(
        &mut self,
        request: &PageRequest,
        timeout: Duration,
    ) -> Vec<(u64, Result<PageResponse, TransportError>)>;
}

/// One frame hosted in process: an in-memory page plus its agent.
struct LocalFrame {
    info: FrameInfo,
    dom: MemoryDom,
    agent: PageAgent,
}

/// In-process transport over `MemoryDom` pages.
///
/// Serves tests and browserless development. Frames marked unresponsive
/// time out exactly like a frame whose page context was torn down, so
/// callers exercise the same degraded paths they would see live.
pub struct LocalTransport {
    frames: Vec<LocalFrame>,
    unresponsive: HashSet<u64>,
}

impl LocalTransport {
    pub fn new() -> Self {
        LocalTransport { frames: Vec::new(), unresponsive: HashSet::new() }
    }

    /// Register a frame and return its id. Ids are assigned in insertion
    /// order starting at 0, so the first frame added is the top frame.
    pub fn add_frame(&mut self, dom: MemoryDom) -> u64 {
        let frame_id = self.frames.len() as u64;
        let info = FrameInfo { frame_id, url: dom.url() };
        self.frames.push(LocalFrame { info, dom, agent: PageAgent::new(frame_id) });
        frame_id
    }

    /// Make `frame_id` stop answering. Requests to it report a timeout.
    pub fn set_unresponsive(&mut self, frame_id: u64) {
        self.unresponsive.insert(frame_id);
    }

    pub fn set_responsive(&mut self, frame_id: u64) {
        self.unresponsive.remove(&frame_id);
    }

    /// Direct page access for test setup and assertions.
    pub fn dom_mut(&mut self, frame_id: u64) -> Option<&mut MemoryDom> {
        self.frames.get_mut(frame_id as usize).map(|f| &mut f.dom)
    }

    pub fn dom(&self, frame_id: u64) -> Option<&MemoryDom> {
        self.frames.get(frame_id as usize).map(|f| &f.dom)
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTransport for LocalTransport {
    fn list_frames(&self) -> Vec<FrameInfo> {
        self.frames.iter().map(|f| f.info.clone()).collect()
    }

    fn request(
        &mut self,
        frame_id: u64,
        request: &PageRequest,
        timeout: Duration,
    ) -> Result<PageResponse, TransportError> {
        if self.unresponsive.contains(&frame_id) {
            return Err(TransportError::Timeout {
                frame_id,
                waited_ms: timeout.as_millis() as u64,
            });
        }
        let frame = self
            .frames
            .get_mut(frame_id as usize)
            .ok_or(TransportError::NoResponder { frame_id })?;
        Ok(frame.agent.handle(&mut frame.dom, request))
    }

    // In-process frames answer instantly, so the all-settled contract
    // reduces to asking each one; unresponsive frames still settle as
    // timeouts without touching their siblings.
    fn broadcast(
        &mut self,
        request: &PageRequest,
        timeout: Duration,
    ) -> Vec<(u64, Result<PageResponse, TransportError>)> {
        let frame_ids: Vec<u64> = self.frames.iter().map(|f| f.info.frame_id).collect();
        frame_ids
            .into_iter()
            .map(|frame_id| (frame_id, self.request(frame_id, request, timeout)))
            .collect()
    }
}
