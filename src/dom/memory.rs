use std::collections::HashMap;

use crate::dom::page::{ComputedStyle, Dom, DomEvent, FilePayload, NodeId, Rect};

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    attrs: HashMap<String, String>,
    own_text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    shadow_root: Option<NodeId>,
    display: String,
    visibility: String,
    rect: Rect,
    value: String,
    checked: bool,
    file: Option<FilePayload>,
    events: Vec<DomEvent>,
    /// Node is absent from rendered children until the page clock
    /// reaches this time (models dropdowns that open asynchronously).
    reveal_at_ms: Option<u64>,
}

/// In-memory page implementing `Dom`, used by the local transport, by
/// tests, and by development without a browser. Records every synthetic
/// event per node so tests can assert exact dispatch sequences.
pub struct MemoryDom {
    url: String,
    title: String,
    site_name: Option<String>,
    nodes: Vec<NodeData>,
    root: NodeId,
    clock_ms: u64,
}

impl MemoryDom {
    pub fn new(url: &str, title: &str) -> Self {
        let body = NodeData {
            tag: "body".into(),
            display: "block".into(),
            visibility: "visible".into(),
            rect: Rect { width: 1024.0, height: 768.0 },
            ..Default::default()
        };
        MemoryDom {
            url: url.to_string(),
            title: title.to_string(),
            site_name: None,
            nodes: vec![body],
            root: NodeId(0),
            clock_ms: 0,
        }
    }

    pub fn set_site_name(&mut self, name: &str) {
        self.site_name = Some(name.to_string());
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// Append a new element under `parent`. Elements start rendered:
    /// display block, visibility visible, a non-zero rect.
    pub fn add_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: tag.to_string(),
            parent: Some(parent),
            display: "block".into(),
            visibility: "visible".into(),
            rect: Rect { width: 120.0, height: 24.0 },
            ..Default::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Attach an open shadow root to `host`. The returned node is the
    /// shadow tree's root; it has no parent, so ancestor walks stop at
    /// the boundary exactly as `closest()` does in a real DOM.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: "#shadow-root".into(),
            display: "block".into(),
            visibility: "visible".into(),
            rect: Rect { width: 120.0, height: 24.0 },
            ..Default::default()
        });
        self.nodes[host.0].shadow_root = Some(id);
        id
    }

    pub fn set_own_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].own_text = text.to_string();
    }

    pub fn set_style(&mut self, node: NodeId, display: &str, visibility: &str) {
        self.nodes[node.0].display = display.to_string();
        self.nodes[node.0].visibility = visibility.to_string();
    }

    pub fn set_rect(&mut self, node: NodeId, width: f32, height: f32) {
        self.nodes[node.0].rect = Rect { width, height };
    }

    /// Hide `node` from rendered children until the page clock reaches `ms`.
    pub fn set_reveal_at(&mut self, node: NodeId, ms: u64) {
        self.nodes[node.0].reveal_at_ms = Some(ms);
    }

    pub fn now_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Events dispatched to `node`, in order. Test inspection hook.
    pub fn events(&self, node: NodeId) -> &[DomEvent] {
        &self.nodes[node.0].events
    }

    pub fn click_count(&self, node: NodeId) -> usize {
        self.nodes[node.0]
            .events
            .iter()
            .filter(|e| matches!(e, DomEvent::Click))
            .count()
    }

    fn is_revealed(&self, node: NodeId) -> bool {
        match self.nodes[node.0].reveal_at_ms {
            Some(at) => self.clock_ms >= at,
            None => true,
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let data = &self.nodes[node.0];
        if !data.own_text.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&data.own_text);
        }
        for &child in &data.children {
            self.collect_text(child, out);
        }
    }

    fn input_type(&self, node: NodeId) -> Option<String> {
        if self.nodes[node.0].tag == "input" {
            Some(
                self.nodes[node.0]
                    .attrs
                    .get("type")
                    .cloned()
                    .unwrap_or_else(|| "text".into()),
            )
        } else {
            None
        }
    }
}

impl Dom for MemoryDom {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn site_name(&self) -> Option<String> {
        self.site_name.clone()
    }

    fn body_text(&self) -> String {
        self.text_content(self.root)
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .filter(|&c| self.is_revealed(c))
            .collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == node)?;
        if pos == 0 { None } else { Some(siblings[pos - 1]) }
    }

    fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].shadow_root
    }

    fn tag(&self, node: NodeId) -> String {
        self.nodes[node.0].tag.clone()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes[node.0].attrs.get(name).cloned()
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0].attrs.insert(name.to_string(), value.to_string());
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out.trim().to_string()
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        ComputedStyle {
            display: self.nodes[node.0].display.clone(),
            visibility: self.nodes[node.0].visibility.clone(),
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.nodes[node.0].rect
    }

    fn value(&self, node: NodeId) -> String {
        self.nodes[node.0].value.clone()
    }

    fn checked(&self, node: NodeId) -> bool {
        self.nodes[node.0].checked
    }

    fn set_value_native(&mut self, node: NodeId, value: &str) {
        // Selects only accept values matching one of their options; a
        // non-matching assignment resets to empty, as browsers do.
        if self.nodes[node.0].tag == "select" {
            let matched = self.nodes[node.0].children.iter().any(|&opt| {
                self.nodes[opt.0].tag == "option"
                    && (self.nodes[opt.0].own_text == value
                        || self.nodes[opt.0].attrs.get("value").map(String::as_str) == Some(value))
            });
            self.nodes[node.0].value = if matched { value.to_string() } else { String::new() };
            return;
        }
        self.nodes[node.0].value = value.to_string();
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].own_text = text.to_string();
    }

    fn set_files_native(&mut self, node: NodeId, file: FilePayload) -> bool {
        if self.input_type(node).as_deref() != Some("file") {
            return false;
        }
        self.nodes[node.0].file = Some(file);
        true
    }

    fn attached_file(&self, node: NodeId) -> Option<&FilePayload> {
        self.nodes[node.0].file.as_ref()
    }

    fn click(&mut self, node: NodeId) {
        self.nodes[node.0].events.push(DomEvent::Click);
        // Native click semantics toggle checkables.
        if let Some(t) = self.input_type(node) {
            match t.as_str() {
                "checkbox" => {
                    self.nodes[node.0].checked = !self.nodes[node.0].checked;
                }
                "radio" => {
                    self.nodes[node.0].checked = true;
                }
                _ => {}
            }
        }
    }

    fn focus(&mut self, node: NodeId) {
        self.nodes[node.0].events.push(DomEvent::Focus);
    }

    fn blur(&mut self, node: NodeId) {
        self.nodes[node.0].events.push(DomEvent::Blur);
    }

    fn dispatch(&mut self, node: NodeId, event: DomEvent) {
        self.nodes[node.0].events.push(event);
    }

    fn wait_ms(&mut self, ms: u64) {
        // Virtual clock; no real sleeping in the in-memory page.
        self.clock_ms += ms;
    }
}
