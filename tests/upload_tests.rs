use job_autofill::dom::{Dom, DomEvent, MemoryDom};
use job_autofill::engine::upload::{UploadKind, find_upload_field, inject_file};

mod common;

use common::{HELLO_B64, file_input};

#[test]
fn resume_injection_attaches_and_fires_events() {
    let mut dom = MemoryDom::new("https://careers.example.com", "t");
    let input = file_input(&mut dom, "upload", "Upload your resume");

    let ok = inject_file(&mut dom, UploadKind::Resume, HELLO_B64, "resume.pdf", "application/pdf");

    assert!(ok);
    let file = dom.attached_file(input).expect("file should be attached");
    assert_eq!(file.name, "resume.pdf");
    assert_eq!(file.bytes, b"hello");
    assert_eq!(
        dom.events(input),
        &[DomEvent::Change, DomEvent::Input, DomEvent::Blur],
        "upload listeners key off change first"
    );
}

#[test]
fn invalid_base64_is_refused_before_touching_the_page() {
    let mut dom = MemoryDom::new("https://careers.example.com", "t");
    let input = file_input(&mut dom, "upload", "Upload your resume");

    assert!(!inject_file(&mut dom, UploadKind::Resume, "not base64!!", "r.pdf", "application/pdf"));
    assert!(dom.attached_file(input).is_none());
}

#[test]
fn cover_letter_vocabulary_vetoes_a_resume_candidate() {
    let mut dom = MemoryDom::new("https://careers.example.com", "t");
    file_input(&mut dom, "cl", "Cover letter upload");
    let resume = file_input(&mut dom, "res", "Upload your resume");

    assert_eq!(
        find_upload_field(&dom, UploadKind::Resume),
        Some(resume),
        "the cover-letter input must lose to the resume input"
    );
}

#[test]
fn resume_vocabulary_vetoes_a_cover_letter_candidate() {
    let mut dom = MemoryDom::new("https://careers.example.com", "t");
    file_input(&mut dom, "res", "Resume or CV");
    let cl = file_input(&mut dom, "cl", "Cover letter upload");

    assert_eq!(find_upload_field(&dom, UploadKind::CoverLetter), Some(cl));
}

#[test]
fn nothing_relevant_means_no_attachment() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    file_input(&mut dom, "avatar", "Upload a profile photo");

    assert_eq!(
        find_upload_field(&dom, UploadKind::Resume),
        None,
        "a photo input must never receive the resume"
    );
}

#[test]
fn fixed_system_field_id_wins_unconditionally() {
    let mut dom = MemoryDom::new("https://jobs.ashbyhq.com/acme", "t");
    file_input(&mut dom, "other", "Upload your resume");
    let root = dom.root();
    let fixed = dom.add_element(root, "input");
    dom.set_attr(fixed, "id", "_systemfield_resume");
    dom.set_attr(fixed, "type", "file");

    assert_eq!(find_upload_field(&dom, UploadKind::Resume), Some(fixed));
}

#[test]
fn accept_attribute_tips_an_otherwise_anonymous_input() {
    let mut dom = MemoryDom::new("https://example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "type", "file");
    dom.set_attr(input, "accept", ".pdf,.doc,.docx");

    assert_eq!(
        find_upload_field(&dom, UploadKind::Resume),
        Some(input),
        "a document accept filter alone clears the threshold"
    );
}

#[test]
fn sole_file_input_on_ats_host_wins_without_keywords() {
    let mut dom = MemoryDom::new("https://boards.greenhouse.io/acme/jobs/1", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "type", "file");

    assert_eq!(
        find_upload_field(&dom, UploadKind::Resume),
        Some(input),
        "on a known ATS the lone file input is assumed to be the resume"
    );
}

#[test]
fn sole_input_bonus_does_not_apply_off_ats() {
    let mut dom = MemoryDom::new("https://random.example.com", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "type", "file");

    assert_eq!(find_upload_field(&dom, UploadKind::Resume), None);
}
