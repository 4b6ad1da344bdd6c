use std::collections::HashSet;

use uuid::Uuid;

use crate::dom::page::{closest, descendants, find_by_id};
use crate::dom::{Dom, NodeId};
use crate::engine::model::{
    FieldDescriptor, FieldKind, FrameScanResult, MAX_LABEL_CHARS, MAX_PAGE_TEXT_CHARS, PageContext,
    truncate_chars,
};

/// Scan a page for fillable fields.
///
/// Discovers native controls, `contenteditable` widgets, and ARIA
/// textbox/combobox/searchbox roles, recursing into every open shadow
/// root. Takes `&mut` because elements lacking any identifier get a
/// generated token stamped as `data-field-id` so a later fill call can
/// find them again.
pub fn scan(dom: &mut dyn Dom, frame_id: u64) -> FrameScanResult {
    let context = page_context(dom);
    let root = dom.root();
    let mut seen_ids = HashSet::new();
    let mut fields = Vec::new();
    collect_fields(dom, root, &mut seen_ids, &mut fields);
    FrameScanResult { frame_id, context, fields }
}

fn page_context(dom: &dyn Dom) -> PageContext {
    PageContext {
        url: dom.url(),
        title: dom.title(),
        site_name: dom.site_name().unwrap_or_default(),
        page_text: truncate_chars(&dom.body_text(), MAX_PAGE_TEXT_CHARS),
    }
}

fn collect_fields(
    dom: &mut dyn Dom,
    root: NodeId,
    seen_ids: &mut HashSet<String>,
    out: &mut Vec<FieldDescriptor>,
) {
    let nodes = descendants(dom, root);

    for &node in &nodes {
        if !is_candidate(dom, node) {
            continue;
        }
        if let Some(desc) = describe_field(dom, root, node, seen_ids) {
            out.push(desc);
        }
    }

    // Nested shadow trees are separate scopes with their own labels.
    for node in nodes {
        if let Some(shadow) = dom.shadow_root(node) {
            collect_fields(dom, shadow, seen_ids, out);
        }
    }
}

fn is_candidate(dom: &dyn Dom, node: NodeId) -> bool {
    let tag = dom.tag(node);
    if tag == "input" || tag == "select" || tag == "textarea" {
        return true;
    }
    if dom.attr(node, "contenteditable").as_deref() == Some("true") {
        return true;
    }
    matches!(
        dom.attr(node, "role").as_deref(),
        Some("textbox") | Some("combobox") | Some("searchbox")
    )
}

fn describe_field(
    dom: &mut dyn Dom,
    root: NodeId,
    node: NodeId,
    seen_ids: &mut HashSet<String>,
) -> Option<FieldDescriptor> {
    let tag = dom.tag(node);
    let input_type = if tag == "input" {
        dom.attr(node, "type").unwrap_or_else(|| "text".into())
    } else {
        String::new()
    };

    if input_type == "hidden" {
        return None;
    }
    // File inputs belong to the injector, never to text filling.
    if input_type == "file" {
        return None;
    }
    if is_unrendered(dom, node) {
        return None;
    }

    let label = truncate_chars(resolve_label(dom, root, node).trim(), MAX_LABEL_CHARS);
    let kind = classify_kind(dom, node, &tag, &input_type);

    let options = match kind {
        FieldKind::Select if tag == "select" => Some(select_options(dom, node)),
        // Weak heuristic: a radio carries only its own resolved label.
        FieldKind::Radio => Some(vec![label.clone()]),
        _ => None,
    };

    let name = dom.attr(node, "name").unwrap_or_default();
    let id = assign_id(dom, node, &name, seen_ids);

    Some(FieldDescriptor { id, name, label, kind, options })
}

/// Deliberately lenient dual-condition filter: reactive frameworks toggle
/// visibility classes without removing nodes, and a field wrongly included
/// just fails to fill, while a field wrongly excluded is lost for good.
fn is_unrendered(dom: &dyn Dom, node: NodeId) -> bool {
    let style = dom.computed_style(node);
    if style.is_display_none() && style.is_visibility_hidden() {
        return true;
    }
    let rect = dom.bounding_rect(node);
    rect.is_zero() && (style.is_display_none() || style.is_visibility_hidden())
}

/// Ordered label fallback chain; first non-empty match wins.
fn resolve_label(dom: &dyn Dom, root: NodeId, node: NodeId) -> String {
    // 1. <label for=id>
    if let Some(id) = dom.attr(node, "id") {
        if let Some(label_el) = find_label_for(dom, root, &id) {
            let text = dom.text_content(label_el);
            if !text.is_empty() {
                return text;
            }
        }
    }

    // 2. aria-labelledby target
    if let Some(labelled_by) = dom.attr(node, "aria-labelledby") {
        if let Some(target) = find_by_id(dom, root, &labelled_by) {
            let text = dom.text_content(target);
            if !text.is_empty() {
                return text;
            }
        }
    }

    // 3. nearest ancestor <label>
    if let Some(ancestor) = closest(dom, node, |d, n| d.tag(n) == "label") {
        let text = dom.text_content(ancestor);
        if !text.is_empty() {
            return text;
        }
    }

    // 4. aria-label
    if let Some(aria) = dom.attr(node, "aria-label") {
        if !aria.trim().is_empty() {
            return aria;
        }
    }

    // 5. placeholder
    if let Some(placeholder) = dom.attr(node, "placeholder") {
        if !placeholder.trim().is_empty() {
            return placeholder;
        }
    }

    // 6. data-label (custom components)
    if let Some(data_label) = dom.attr(node, "data-label") {
        if !data_label.trim().is_empty() {
            return data_label;
        }
    }

    // 7. label-ish element inside the nearest form-group container
    if let Some(group) = closest(dom, node, |d, n| is_form_group(d, n)) {
        if let Some(label_el) = descendants(dom, group)
            .into_iter()
            .find(|&n| n != node && is_labelish(dom, n))
        {
            let text = dom.text_content(label_el);
            if !text.is_empty() {
                return text;
            }
        }
    }

    // 8. short preceding-sibling text
    if let Some(prev) = dom.previous_sibling(node) {
        let text = dom.text_content(prev);
        if !text.is_empty() && text.chars().count() < 100 {
            return text;
        }
    }

    String::new()
}

fn find_label_for(dom: &dyn Dom, root: NodeId, id: &str) -> Option<NodeId> {
    descendants(dom, root)
        .into_iter()
        .find(|&n| dom.tag(n) == "label" && dom.attr(n, "for").as_deref() == Some(id))
}

fn is_form_group(dom: &dyn Dom, node: NodeId) -> bool {
    if dom.tag(node) == "div" {
        return true;
    }
    match dom.attr(node, "class") {
        Some(class) => {
            class.contains("field")
                || class.contains("form-group")
                || class.contains("input")
                || class.contains("Field")
        }
        None => false,
    }
}

fn is_labelish(dom: &dyn Dom, node: NodeId) -> bool {
    if dom.tag(node) == "label" {
        return true;
    }
    match dom.attr(node, "class") {
        Some(class) => class.contains("label") || class.contains("Label"),
        None => false,
    }
}

fn classify_kind(dom: &dyn Dom, node: NodeId, tag: &str, input_type: &str) -> FieldKind {
    match tag {
        "select" => return FieldKind::Select,
        "textarea" => return FieldKind::Textarea,
        "input" => {
            return match input_type {
                "checkbox" => FieldKind::Checkbox,
                "radio" => FieldKind::Radio,
                "date" | "datetime-local" => FieldKind::Date,
                "file" => FieldKind::FileExcluded,
                _ => {
                    if dom.attr(node, "role").as_deref() == Some("combobox") {
                        FieldKind::Combobox
                    } else {
                        FieldKind::Text
                    }
                }
            };
        }
        _ => {}
    }
    if dom.attr(node, "contenteditable").as_deref() == Some("true") {
        return FieldKind::ContenteditableText;
    }
    match dom.attr(node, "role").as_deref() {
        Some("combobox") => FieldKind::Combobox,
        Some("textbox") | Some("searchbox") => FieldKind::ContenteditableText,
        _ => FieldKind::Text,
    }
}

fn select_options(dom: &dyn Dom, select: NodeId) -> Vec<String> {
    dom.children(select)
        .into_iter()
        .filter(|&c| dom.tag(c) == "option")
        .map(|c| dom.text_content(c))
        .collect()
}

/// Prefer the element id, then name, then an existing data attribute;
/// otherwise generate an opaque token and stamp it back onto the element
/// so the same token resolves at fill time. Duplicates within one scan
/// also fall through to a generated token.
fn assign_id(dom: &mut dyn Dom, node: NodeId, name: &str, seen_ids: &mut HashSet<String>) -> String {
    let preferred = dom
        .attr(node, "id")
        .filter(|s| !s.is_empty())
        .or_else(|| if name.is_empty() { None } else { Some(name.to_string()) })
        .or_else(|| dom.attr(node, "data-field-id").filter(|s| !s.is_empty()));

    if let Some(id) = preferred {
        if seen_ids.insert(id.clone()) {
            return id;
        }
    }

    let generated = format!("generated_id_{}", Uuid::new_v4().simple());
    dom.set_attr(node, "data-field-id", &generated);
    seen_ids.insert(generated.clone());
    generated
}
