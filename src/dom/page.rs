use serde::{Deserialize, Serialize};

/// Handle to one element inside a page. Only meaningful to the `Dom`
/// implementation that issued it, and only for the lifetime of that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// The two computed-style properties the visibility filter cares about.
#[derive(Debug, Clone, Default)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
}

impl ComputedStyle {
    pub fn is_display_none(&self) -> bool {
        self.display == "none"
    }

    pub fn is_visibility_hidden(&self) -> bool {
        self.visibility == "hidden"
    }
}

/// Bounding box of an element. Zero-by-zero usually means "not laid out".
#[derive(Debug, Clone, Copy, Default)]
pub struct Rect {
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Synthetic events the filler dispatches to satisfy framework listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Input,
    Change,
    Blur,
    Focus,
    Click,
    KeyDown(String),
}

/// A decoded file ready to be assigned to an `<input type="file">`.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Capability surface the scanning/filling engine needs from a live page.
///
/// The engine never touches a browser API directly; everything goes through
/// this trait so the same extractor/filler code runs against a real page
/// (via the bridge transport's remote primitives) and against `MemoryDom`
/// in tests and local development.
///
/// Write methods that say "native" go through the prototype-level property
/// setter, bypassing any framework-installed interceptor, and must be
/// followed by explicit event dispatch so framework change detection
/// fires the same way it does for real typing.
pub trait Dom {
    fn url(&self) -> String;
    fn title(&self) -> String;
    /// Content of `<meta property="og:site_name">`, if present.
    fn site_name(&self) -> Option<String>;
    /// Visible body text, untruncated. Callers truncate for token budgets.
    fn body_text(&self) -> String;

    fn root(&self) -> NodeId;
    /// Rendered children, in document order. Nodes whose rendering is
    /// deferred (e.g. a dropdown that has not opened yet) are absent until
    /// the page clock passes their reveal time.
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;
    /// Open shadow root attached to this element, if any.
    fn shadow_root(&self, node: NodeId) -> Option<NodeId>;

    fn tag(&self, node: NodeId) -> String;
    fn attr(&self, node: NodeId, name: &str) -> Option<String>;
    /// Write an attribute. The extractor uses this to stamp generated
    /// `data-field-id` tokens so they resolve again at fill time.
    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);
    /// Text content of the node and all its descendants, trimmed.
    fn text_content(&self, node: NodeId) -> String;
    fn computed_style(&self, node: NodeId) -> ComputedStyle;
    fn bounding_rect(&self, node: NodeId) -> Rect;

    fn value(&self, node: NodeId) -> String;
    fn checked(&self, node: NodeId) -> bool;

    /// Write `value` through the prototype's native setter.
    fn set_value_native(&mut self, node: NodeId, value: &str);
    /// Assign text content directly (contenteditable widgets have no value).
    fn set_text_content(&mut self, node: NodeId, text: &str);
    /// Assign a file through the native `files` setter (DataTransfer path).
    /// Returns false if the node cannot accept files.
    fn set_files_native(&mut self, node: NodeId, file: FilePayload) -> bool;
    fn attached_file(&self, node: NodeId) -> Option<&FilePayload>;

    fn click(&mut self, node: NodeId);
    fn focus(&mut self, node: NodeId);
    fn blur(&mut self, node: NodeId);
    fn dispatch(&mut self, node: NodeId, event: DomEvent);

    /// Cooperative wait; lets asynchronously rendered UI (combobox
    /// dropdowns, autocomplete suggestions) appear.
    fn wait_ms(&mut self, ms: u64);
}

/// Depth-first walk of one tree in document order, not crossing shadow
/// boundaries. Shadow recursion is the extractor's job because descriptor
/// ordering depends on it.
pub fn descendants(dom: &dyn Dom, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.push(node);
        let kids = dom.children(node);
        for kid in kids.into_iter().rev() {
            stack.push(kid);
        }
    }
    out
}

/// First element under `root` whose `id` attribute equals `id`.
pub fn find_by_id(dom: &dyn Dom, root: NodeId, id: &str) -> Option<NodeId> {
    descendants(dom, root)
        .into_iter()
        .find(|&n| dom.attr(n, "id").as_deref() == Some(id))
}

/// Nearest ancestor (including `node` itself) satisfying the predicate.
pub fn closest(dom: &dyn Dom, node: NodeId, pred: impl Fn(&dyn Dom, NodeId) -> bool) -> Option<NodeId> {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if pred(dom, n) {
            return Some(n);
        }
        cur = dom.parent(n);
    }
    None
}
