use job_autofill::dom::{Dom, MemoryDom};
use job_autofill::engine::extract::scan;
use job_autofill::engine::model::FieldKind;

mod common;

use common::{application_page, labeled_input, select_with_options};

#[test]
fn scan_discovers_every_field_with_unique_ids() {
    let (mut dom, _) = application_page();
    let result = scan(&mut dom, 0);

    assert_eq!(result.field_count(), 4, "all four controls should be discovered");

    let mut ids: Vec<&str> = result.fields.iter().map(|f| f.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4, "descriptor ids must be unique within one scan");
}

#[test]
fn label_for_beats_placeholder() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let input = labeled_input(&mut dom, "email", "Work Email", "email");
    dom.set_attr(input, "placeholder", "you@company.com");

    let result = scan(&mut dom, 0);
    assert_eq!(result.fields[0].label, "Work Email", "explicit label outranks placeholder");
}

#[test]
fn placeholder_used_when_nothing_better_exists() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "id", "q");
    dom.set_attr(input, "placeholder", "Search jobs");

    let result = scan(&mut dom, 0);
    assert_eq!(result.fields[0].label, "Search jobs");
}

#[test]
fn hidden_and_file_inputs_are_skipped() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let hidden = dom.add_element(root, "input");
    dom.set_attr(hidden, "type", "hidden");
    dom.set_attr(hidden, "id", "csrf");
    let file = dom.add_element(root, "input");
    dom.set_attr(file, "type", "file");
    dom.set_attr(file, "id", "resume");
    labeled_input(&mut dom, "name", "Name", "text");

    let result = scan(&mut dom, 0);
    assert_eq!(result.field_count(), 1, "only the text input should survive");
    assert_eq!(result.fields[0].id, "name");
}

#[test]
fn fully_hidden_element_is_excluded_but_soft_hidden_is_kept() {
    let mut dom = MemoryDom::new("https://example.com", "t");

    // Both style properties hidden: excluded outright.
    let fully = labeled_input(&mut dom, "fully", "Fully hidden", "text");
    dom.set_style(fully, "none", "hidden");

    // Zero rect alone (e.g. opacity tricks, off-screen layout): kept.
    let zero_rect_only = labeled_input(&mut dom, "zero", "Zero rect", "text");
    dom.set_rect(zero_rect_only, 0.0, 0.0);

    // display:none alone but laid out elsewhere: kept. Frameworks
    // toggle classes without detaching nodes.
    let display_only = labeled_input(&mut dom, "display", "Display none", "text");
    dom.set_style(display_only, "none", "visible");

    // Zero rect combined with display:none: excluded.
    let both = labeled_input(&mut dom, "both", "Both", "text");
    dom.set_rect(both, 0.0, 0.0);
    dom.set_style(both, "none", "visible");

    let result = scan(&mut dom, 0);
    let ids: Vec<&str> = result.fields.iter().map(|f| f.id.as_str()).collect();
    assert!(!ids.contains(&"fully"), "display:none + visibility:hidden must be excluded");
    assert!(ids.contains(&"zero"), "zero rect alone is not enough to exclude");
    assert!(ids.contains(&"display"), "display:none alone is not enough to exclude");
    assert!(!ids.contains(&"both"), "zero rect + display:none must be excluded");
}

#[test]
fn select_descriptor_carries_its_options() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    select_with_options(&mut dom, "visa", "Visa status", &["Citizen", "Green Card", "Visa"]);

    let result = scan(&mut dom, 0);
    let field = &result.fields[0];
    assert_eq!(field.kind, FieldKind::Select);
    assert_eq!(
        field.options.as_deref(),
        Some(&["Citizen".to_string(), "Green Card".to_string(), "Visa".to_string()][..])
    );
}

#[test]
fn anonymous_element_gets_a_stamped_generated_id() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "type", "text");

    let result = scan(&mut dom, 0);
    let id = &result.fields[0].id;
    assert!(id.starts_with("generated_id_"), "unidentified elements get a generated token");
    assert_eq!(
        dom.attr(input, "data-field-id").as_deref(),
        Some(id.as_str()),
        "the token must be stamped onto the element so a later fill resolves it"
    );
}

#[test]
fn duplicate_ids_fall_through_to_generated_tokens() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    for _ in 0..2 {
        let input = dom.add_element(root, "input");
        dom.set_attr(input, "id", "dup");
        dom.set_attr(input, "type", "text");
    }

    let result = scan(&mut dom, 0);
    assert_eq!(result.field_count(), 2);
    assert_eq!(result.fields[0].id, "dup");
    assert!(
        result.fields[1].id.starts_with("generated_id_"),
        "the second holder of a duplicate id must get a fresh token"
    );
}

#[test]
fn shadow_root_fields_are_discovered() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let host = dom.add_element(root, "custom-widget");
    let shadow = dom.attach_shadow(host);
    let input = dom.add_element(shadow, "input");
    dom.set_attr(input, "id", "inner");
    dom.set_attr(input, "aria-label", "Inner field");

    let result = scan(&mut dom, 0);
    assert_eq!(result.field_count(), 1, "open shadow roots must be traversed");
    assert_eq!(result.fields[0].label, "Inner field");
}

#[test]
fn contenteditable_and_aria_roles_are_candidates() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let editor = dom.add_element(root, "div");
    dom.set_attr(editor, "contenteditable", "true");
    dom.set_attr(editor, "aria-label", "Cover letter");
    let combo = dom.add_element(root, "input");
    dom.set_attr(combo, "id", "loc");
    dom.set_attr(combo, "role", "combobox");
    dom.set_attr(combo, "aria-label", "Location");

    let result = scan(&mut dom, 0);
    assert_eq!(result.field_count(), 2);
    let kinds: Vec<FieldKind> = result.fields.iter().map(|f| f.kind).collect();
    assert!(kinds.contains(&FieldKind::ContenteditableText));
    assert!(kinds.contains(&FieldKind::Combobox));
}

#[test]
fn page_context_is_captured_and_truncated() {
    let mut dom = MemoryDom::new("https://example.com/apply", "Apply now");
    dom.set_site_name("Example Co");
    let root = dom.root();
    let blurb = dom.add_element(root, "p");
    dom.set_own_text(blurb, &"x".repeat(9000));

    let result = scan(&mut dom, 7);
    assert_eq!(result.frame_id, 7);
    assert_eq!(result.context.url, "https://example.com/apply");
    assert_eq!(result.context.site_name, "Example Co");
    assert!(
        result.context.page_text.chars().count() <= 5000,
        "page text must be truncated for the model's token budget"
    );
}
