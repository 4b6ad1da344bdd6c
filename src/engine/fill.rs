use serde_json::Value;

use crate::dom::page::descendants;
use crate::dom::{Dom, DomEvent, NodeId};

/// How long a combobox gets to render its filtered dropdown.
pub const COMBOBOX_DROPDOWN_WAIT_MS: u64 = 300;

/// How long a location autocomplete gets to fetch suggestions.
pub const LOCATION_SUGGEST_WAIT_MS: u64 = 800;

/// Write `value` into the field identified by `field_id`.
///
/// Never panics and never throws: a missing element, a file input, or a
/// write that does not stick all come back as `false` so the caller can
/// keep processing the rest of the batch.
pub fn fill_field(dom: &mut dyn Dom, field_id: &str, value: &Value) -> bool {
    let Some(node) = resolve_field(dom, field_id) else {
        return false;
    };

    let tag = dom.tag(node);
    let input_type = if tag == "input" {
        dom.attr(node, "type").unwrap_or_else(|| "text".into())
    } else {
        String::new()
    };

    // Safety invariant: a file input must never receive a string value.
    if input_type == "file" {
        return false;
    }

    let role = dom.attr(node, "role");
    let text = value_as_text(value);

    let contenteditable = dom.attr(node, "contenteditable").as_deref() == Some("true")
        || (tag != "input" && matches!(role.as_deref(), Some("textbox") | Some("searchbox")));
    if contenteditable {
        return fill_contenteditable(dom, node, &text);
    }

    if role.as_deref() == Some("combobox") {
        return fill_combobox(dom, node, &text);
    }

    if input_type == "checkbox" || input_type == "radio" {
        return fill_checkable(dom, node, value);
    }

    if (tag == "input" || tag == "textarea") && is_location_field(dom, node, field_id) {
        return fill_location_autocomplete(dom, node, &text);
    }

    // Everything else: prototype-setter write plus the event sequence
    // real typing would produce.
    dom.set_value_native(node, &text);
    dispatch_commit_events(dom, node);
    dom.value(node) == text
}

/// Resolution order: element id, then `name` attribute, then the
/// `data-field-id` stamp, searching shadow trees too.
fn resolve_field(dom: &dyn Dom, field_id: &str) -> Option<NodeId> {
    let nodes = all_nodes_deep(dom);
    nodes
        .iter()
        .copied()
        .find(|&n| dom.attr(n, "id").as_deref() == Some(field_id))
        .or_else(|| {
            nodes
                .iter()
                .copied()
                .find(|&n| dom.attr(n, "name").as_deref() == Some(field_id))
        })
        .or_else(|| {
            nodes
                .iter()
                .copied()
                .find(|&n| dom.attr(n, "data-field-id").as_deref() == Some(field_id))
        })
}

/// Document-order walk crossing every open shadow boundary.
fn all_nodes_deep(dom: &dyn Dom) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut roots = vec![dom.root()];
    while let Some(root) = roots.pop() {
        for node in descendants(dom, root) {
            out.push(node);
            if let Some(shadow) = dom.shadow_root(node) {
                roots.push(shadow);
            }
        }
    }
    out
}

/// Contenteditable widgets have no native value; assign text content and
/// provoke validation with an explicit focus/blur round trip.
fn fill_contenteditable(dom: &mut dyn Dom, node: NodeId, text: &str) -> bool {
    dom.set_text_content(node, text);
    dispatch_commit_events(dom, node);
    dom.focus(node);
    dom.blur(node);
    true
}

/// Typeahead combobox: type through the native setter to trigger the
/// framework's filtering, give the dropdown time to render, then commit by
/// clicking the matching option. Enter is the fallback commit gesture.
fn fill_combobox(dom: &mut dyn Dom, node: NodeId, target: &str) -> bool {
    dom.focus(node);
    dom.click(node);
    dom.set_value_native(node, target);
    dom.dispatch(node, DomEvent::Input);

    dom.wait_ms(COMBOBOX_DROPDOWN_WAIT_MS);

    if let Some(option) = find_matching_option(dom, target) {
        dom.click(option);
        return true;
    }

    dom.dispatch(node, DomEvent::KeyDown("Enter".into()));
    true
}

fn find_matching_option(dom: &dyn Dom, target: &str) -> Option<NodeId> {
    let target_lower = target.to_lowercase();
    let listbox = all_nodes_deep(dom)
        .into_iter()
        .find(|&n| dom.attr(n, "role").as_deref() == Some("listbox"))?;
    descendants(dom, listbox).into_iter().find(|&n| {
        if dom.attr(n, "role").as_deref() != Some("option") {
            return false;
        }
        let text = dom.text_content(n).to_lowercase();
        text == target_lower || text.contains(&target_lower)
    })
}

/// Checkables toggle through a synthetic click, and only when the current
/// state differs, since native click semantics fire the framework listeners
/// that direct property writes skip.
fn fill_checkable(dom: &mut dyn Dom, node: NodeId, value: &Value) -> bool {
    let desired = value_as_bool(value);
    if dom.checked(node) != desired {
        dom.click(node);
    }
    dispatch_commit_events(dom, node);
    dom.checked(node) == desired
}

/// Location autocompletes on some ATS forms refuse freeform text; the
/// first suggestion must be explicitly accepted with ArrowDown + Enter.
fn fill_location_autocomplete(dom: &mut dyn Dom, node: NodeId, text: &str) -> bool {
    dom.focus(node);
    dom.set_value_native(node, text);
    dom.dispatch(node, DomEvent::Input);
    dom.wait_ms(LOCATION_SUGGEST_WAIT_MS);
    dom.dispatch(node, DomEvent::KeyDown("ArrowDown".into()));
    dom.dispatch(node, DomEvent::KeyDown("Enter".into()));
    true
}

fn is_location_field(dom: &dyn Dom, node: NodeId, field_id: &str) -> bool {
    if field_id.to_lowercase().contains("location") {
        return true;
    }
    dom.attr(node, "placeholder")
        .map(|p| p.to_lowercase().contains("location"))
        .unwrap_or(false)
}

fn dispatch_commit_events(dom: &mut dyn Dom, node: NodeId) {
    dom.dispatch(node, DomEvent::Input);
    dom.dispatch(node, DomEvent::Change);
    dom.dispatch(node, DomEvent::Blur);
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            matches!(s.to_lowercase().as_str(), "true" | "yes" | "1" | "on" | "checked")
        }
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}
