use std::time::Duration;

use serde_json::json;

use job_autofill::dom::{Dom, MemoryDom};
use job_autofill::engine::upload::UploadKind;
use job_autofill::error::TransportError;
use job_autofill::messenger::protocol::PageRequest;
use job_autofill::messenger::transport::{FrameTransport, LocalTransport};

mod common;

use common::{application_page, labeled_input};

fn timeout() -> Duration {
    Duration::from_millis(100)
}

#[test]
fn frames_are_listed_top_frame_first() {
    let mut transport = LocalTransport::new();
    transport.add_frame(MemoryDom::new("https://example.com", "top"));
    transport.add_frame(MemoryDom::new("https://example.com/embed", "embed"));

    let frames = transport.list_frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].frame_id, 0);
    assert_eq!(frames[0].url, "https://example.com");
}

#[test]
fn scan_request_round_trips_context_and_fields() {
    let mut transport = LocalTransport::new();
    let (form, _) = application_page();
    let frame = transport.add_frame(form);

    let response = transport
        .request(frame, &PageRequest::GetPageContext, timeout())
        .expect("live frame must answer");

    assert!(response.success);
    let context = response.context.expect("context present");
    assert_eq!(context.title, "Apply - Example Co");
    assert_eq!(response.fields.expect("fields present").len(), 4);
}

#[test]
fn refusal_and_unreachability_are_distinct_outcomes() {
    let mut transport = LocalTransport::new();
    let mut dom = MemoryDom::new("https://example.com", "t");
    labeled_input(&mut dom, "email", "Email", "email");
    let frame = transport.add_frame(dom);

    // In-band refusal: the frame answers, but the field does not exist.
    let refusal = transport
        .request(
            frame,
            &PageRequest::FillField { field_id: "ghost".into(), value: json!("x") },
            timeout(),
        )
        .expect("a refusal is still a delivered response");
    assert!(!refusal.success);

    // Transport failure: the frame never answers at all.
    transport.set_unresponsive(frame);
    let err = transport
        .request(
            frame,
            &PageRequest::FillField { field_id: "email".into(), value: json!("x") },
            timeout(),
        )
        .expect_err("an unresponsive frame is a transport error, not a refusal");
    assert!(matches!(err, TransportError::Timeout { .. }));
}

#[test]
fn broadcast_settles_every_frame_despite_a_dead_one() {
    let mut transport = LocalTransport::new();
    transport.add_frame(MemoryDom::new("https://example.com", "top"));
    let (form, _) = application_page();
    let slow = transport.add_frame(form);
    transport.add_frame(MemoryDom::new("https://example.com/footer", "footer"));
    transport.set_unresponsive(slow);

    let outcomes = transport.broadcast(&PageRequest::GetPageContext, timeout());

    assert_eq!(outcomes.len(), 3, "every frame must settle, dead or alive");
    assert_eq!(
        outcomes.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
        vec![0, 1, 2],
        "outcomes keep frame order, top frame first"
    );
    assert!(outcomes[0].1.as_ref().is_ok_and(|r| r.success));
    assert!(
        matches!(outcomes[1].1, Err(TransportError::Timeout { frame_id: 1, .. })),
        "the dead frame settles as a timeout"
    );
    assert!(
        outcomes[2].1.as_ref().is_ok_and(|r| r.success),
        "a dead sibling must not cost the frames after it their answers"
    );
}

#[test]
fn unknown_frame_is_no_responder() {
    let mut transport = LocalTransport::new();
    let err = transport
        .request(99, &PageRequest::GetPageContext, timeout())
        .expect_err("frame 99 does not exist");
    assert!(matches!(err, TransportError::NoResponder { frame_id: 99 }));
}

#[test]
fn attach_request_dispatches_to_the_injector() {
    let mut transport = LocalTransport::new();
    let mut dom = MemoryDom::new("https://boards.greenhouse.io/acme", "t");
    let root = dom.root();
    let input = dom.add_element(root, "input");
    dom.set_attr(input, "type", "file");
    let frame = transport.add_frame(dom);

    let request = PageRequest::attach(
        UploadKind::Resume,
        common::HELLO_B64.into(),
        "resume.pdf".into(),
        "application/pdf".into(),
    );
    let response = transport.request(frame, &request, timeout()).expect("delivery succeeds");
    assert!(response.success);

    let dom = transport.dom(frame).expect("frame exists");
    assert!(dom.attached_file(input).is_some());
}
