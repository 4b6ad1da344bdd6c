#![allow(dead_code)]

use job_autofill::dom::{Dom, MemoryDom, NodeId};
use job_autofill::profile::UserProfile;

// =========================================================================
// Page builders
// =========================================================================

/// An input wrapped in a div with a `<label for=...>`, the layout most
/// ATS forms use.
pub fn labeled_input(dom: &mut MemoryDom, id: &str, label: &str, input_type: &str) -> NodeId {
    let root = dom.root();
    let group = dom.add_element(root, "div");
    let label_el = dom.add_element(group, "label");
    dom.set_attr(label_el, "for", id);
    dom.set_own_text(label_el, label);
    let input = dom.add_element(group, "input");
    dom.set_attr(input, "id", id);
    dom.set_attr(input, "type", input_type);
    input
}

pub fn select_with_options(
    dom: &mut MemoryDom,
    id: &str,
    label: &str,
    options: &[&str],
) -> NodeId {
    let root = dom.root();
    let group = dom.add_element(root, "div");
    let label_el = dom.add_element(group, "label");
    dom.set_attr(label_el, "for", id);
    dom.set_own_text(label_el, label);
    let select = dom.add_element(group, "select");
    dom.set_attr(select, "id", id);
    for option_text in options {
        let option = dom.add_element(select, "option");
        dom.set_own_text(option, option_text);
    }
    select
}

/// A file input inside its own section, so the surrounding-text signals
/// see only this upload widget's copy.
pub fn file_input(dom: &mut MemoryDom, id: &str, nearby_text: &str) -> NodeId {
    let root = dom.root();
    let section = dom.add_element(root, "section");
    let group = dom.add_element(section, "div");
    dom.set_own_text(group, nearby_text);
    let input = dom.add_element(group, "input");
    dom.set_attr(input, "id", id);
    dom.set_attr(input, "type", "file");
    input
}

/// The canonical four-field application page: name, email, a
/// work-authorization select, and a consent checkbox.
pub fn application_page() -> (MemoryDom, [NodeId; 4]) {
    let mut dom = MemoryDom::new("https://careers.example.com/apply", "Apply - Example Co");
    let name = labeled_input(&mut dom, "name", "Full Name", "text");
    let email = labeled_input(&mut dom, "email", "Email Address", "email");
    let authorized = select_with_options(
        &mut dom,
        "work_auth",
        "Are you authorized to work in the US?",
        &["Yes", "No"],
    );
    let consent = labeled_input(&mut dom, "consent", "I agree to the privacy policy", "checkbox");
    (dom, [name, email, authorized, consent])
}

// =========================================================================
// Profile builders
// =========================================================================

pub fn ada_profile() -> UserProfile {
    UserProfile {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "555-0100".into(),
        city: "London".into(),
        state: "LDN".into(),
        citizenship: "Yes".into(),
        resume_text: "Mathematician and programmer.".into(),
        ..Default::default()
    }
}

/// "hello" encoded as base64, a stand-in for a PDF blob.
pub const HELLO_B64: &str = "aGVsbG8=";
