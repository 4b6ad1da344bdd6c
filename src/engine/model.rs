use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum label length shipped to the mapping backend. A token budget,
/// not a DOM constraint.
pub const MAX_LABEL_CHARS: usize = 100;

/// Maximum visible page text captured for context.
pub const MAX_PAGE_TEXT_CHARS: usize = 5000;

/// Semantic kind of a discovered form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Date,
    FileExcluded,
    ContenteditableText,
    Combobox,
}

/// One discovered candidate input on a page.
///
/// `id` must resolve back to exactly one live element when handed to the
/// filler later in the same page lifetime; elements without any usable
/// identifier get a generated token stamped onto them as `data-field-id`
/// so that the round trip still works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Page-level context shipped alongside the fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub page_text: String,
}

/// One frame's extraction outcome. Produced fresh per scan attempt,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameScanResult {
    pub frame_id: u64,
    pub context: PageContext,
    pub fields: Vec<FieldDescriptor>,
}

impl FrameScanResult {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// A `{fieldId, value}` assignment returned by the mapping backend,
/// applied independently and sequentially to the winning frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillInstruction {
    pub field_id: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Char-boundary-safe prefix truncation.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
