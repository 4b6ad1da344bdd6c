use serde_json::json;

use job_autofill::dom::{Dom, DomEvent, MemoryDom};
use job_autofill::engine::fill::fill_field;

mod common;

use common::labeled_input;

#[test]
fn text_fill_sets_value_and_fires_input_change_blur() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let input = labeled_input(&mut dom, "email", "Email", "email");

    let ok = fill_field(&mut dom, "email", &json!("ada@example.com"));

    assert!(ok);
    assert_eq!(dom.value(input), "ada@example.com");
    assert_eq!(
        dom.events(input),
        &[DomEvent::Input, DomEvent::Change, DomEvent::Blur],
        "the commit sequence must mimic real typing"
    );
}

#[test]
fn fill_resolves_by_name_when_id_is_absent() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "type", "text");
    dom.set_attr(input, "name", "phone");

    assert!(fill_field(&mut dom, "phone", &json!("555-0100")));
    assert_eq!(dom.value(input), "555-0100");
}

#[test]
fn fill_resolves_stamped_generated_tokens() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "type", "text");
    dom.set_attr(input, "data-field-id", "generated_id_abc123");

    assert!(fill_field(&mut dom, "generated_id_abc123", &json!("hi")));
    assert_eq!(dom.value(input), "hi");
}

#[test]
fn missing_field_returns_false_without_panicking() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    assert!(!fill_field(&mut dom, "ghost", &json!("x")));
}

#[test]
fn file_input_is_always_refused() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "id", "resume");
    dom.set_attr(input, "type", "file");

    assert!(
        !fill_field(&mut dom, "resume", &json!("/etc/passwd")),
        "string writes into file inputs must be refused unconditionally"
    );
    assert_eq!(dom.value(input), "", "the file input value must stay untouched");
}

#[test]
fn checkbox_clicks_only_when_state_differs() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let checkbox = labeled_input(&mut dom, "consent", "I agree", "checkbox");

    assert!(fill_field(&mut dom, "consent", &json!(true)));
    assert!(dom.checked(checkbox));
    assert_eq!(dom.click_count(checkbox), 1);

    // Same desired state again: no second click, still reported filled.
    assert!(fill_field(&mut dom, "consent", &json!(true)));
    assert!(dom.checked(checkbox), "a repeated fill must not toggle the box back off");
    assert_eq!(dom.click_count(checkbox), 1);
}

#[test]
fn checkbox_accepts_stringy_truth_values() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let checkbox = labeled_input(&mut dom, "consent", "I agree", "checkbox");

    assert!(fill_field(&mut dom, "consent", &json!("Yes")));
    assert!(dom.checked(checkbox));
}

#[test]
fn failed_text_write_is_reported() {
    // A select refuses values that match no option, so the read-back
    // verification must report failure.
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let select = dom.add_element(root, "select");
    dom.set_attr(select, "id", "visa");
    let option = dom.add_element(select, "option");
    dom.set_own_text(option, "Yes");

    assert!(!fill_field(&mut dom, "visa", &json!("Maybe")));
    assert!(fill_field(&mut dom, "visa", &json!("Yes")));
    assert_eq!(dom.value(select), "Yes");
}

#[test]
fn combobox_picks_the_matching_option_from_the_listbox() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let combo = dom.add_element(root, "input");
    dom.set_attr(combo, "id", "role");
    dom.set_attr(combo, "role", "combobox");

    // Dropdown renders 200ms after typing starts.
    let listbox = dom.add_element(root, "ul");
    dom.set_attr(listbox, "role", "listbox");
    dom.set_reveal_at(listbox, 200);
    let opt_a = dom.add_element(listbox, "li");
    dom.set_attr(opt_a, "role", "option");
    dom.set_own_text(opt_a, "Software Engineer");
    let opt_b = dom.add_element(listbox, "li");
    dom.set_attr(opt_b, "role", "option");
    dom.set_own_text(opt_b, "Product Manager");

    assert!(fill_field(&mut dom, "role", &json!("software engineer")));
    assert_eq!(dom.click_count(opt_a), 1, "the matching option must be clicked");
    assert_eq!(dom.click_count(opt_b), 0);
}

#[test]
fn combobox_falls_back_to_enter_when_no_option_matches() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let combo = dom.add_element(root, "input");
    dom.set_attr(combo, "id", "role");
    dom.set_attr(combo, "role", "combobox");

    assert!(fill_field(&mut dom, "role", &json!("Astronaut")));
    assert!(
        dom.events(combo).contains(&DomEvent::KeyDown("Enter".into())),
        "with no dropdown match the commit gesture is Enter"
    );
}

#[test]
fn location_field_accepts_first_suggestion_with_arrow_enter() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "id", "_systemfield_location");
    dom.set_attr(input, "type", "text");

    assert!(fill_field(&mut dom, "_systemfield_location", &json!("London, UK")));

    let events = dom.events(input);
    let arrow = events.iter().position(|e| *e == DomEvent::KeyDown("ArrowDown".into()));
    let enter = events.iter().position(|e| *e == DomEvent::KeyDown("Enter".into()));
    assert!(arrow.is_some() && enter.is_some(), "suggestion must be selected explicitly");
    assert!(arrow < enter, "ArrowDown comes before Enter");
    assert!(
        dom.now_ms() >= 800,
        "the suggestion list gets its settle time before key presses"
    );
}

#[test]
fn contenteditable_gets_text_content_not_value() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let editor = dom.add_element(root, "div");
    dom.set_attr(editor, "id", "letter");
    dom.set_attr(editor, "contenteditable", "true");

    assert!(fill_field(&mut dom, "letter", &json!("Dear team,")));
    assert_eq!(dom.text_content(editor), "Dear team,");
    assert!(dom.events(editor).contains(&DomEvent::Input));
    assert!(dom.events(editor).contains(&DomEvent::Blur));
}
