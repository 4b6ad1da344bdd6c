use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::dom::page::{closest, descendants};
use crate::dom::{Dom, DomEvent, FilePayload, NodeId};

/// Which document an injection targets. The two kinds use disjoint
/// keyword sets and veto each other's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UploadKind {
    Resume,
    CoverLetter,
}

impl UploadKind {
    /// Fixed system-field id observed on one ATS platform; preferred
    /// unconditionally when present.
    fn fixed_id(&self) -> &'static str {
        match self {
            UploadKind::Resume => "_systemfield_resume",
            UploadKind::CoverLetter => "_systemfield_cover_letter",
        }
    }

    fn positive_keywords(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Resume => &[
                "resume",
                "cv",
                "curriculum vitae",
                "upload resume",
                "attach resume",
                "your resume",
                "upload your",
                "attach your",
            ],
            UploadKind::CoverLetter => {
                &["cover letter", "coverletter", "cl_upload", "additional documents"]
            }
        }
    }

    fn negative_keywords(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Resume => &[
                "cover letter",
                "portfolio",
                "transcript",
                "photo",
                "image",
                "picture",
                "avatar",
                "logo",
            ],
            UploadKind::CoverLetter => {
                &["resume", "cv", "curriculum vitae", "photo", "transcript", "headshot"]
            }
        }
    }
}

const POSITIVE_HIT: f32 = 10.0;
/// A single negative hit vetoes the candidate outright: attaching the
/// wrong document is far worse than attaching none.
const NEGATIVE_VETO: f32 = -100.0;
const ACCEPT_ATTR_BONUS: f32 = 5.0;
const SOLE_ATS_INPUT_BONUS: f32 = 10.0;
const FIRST_ATS_INPUT_BONUS: f32 = 5.0;

/// Decode the payload and attach it to the most relevant file input.
/// `false` means the file could not be auto-attached; it is not an error.
pub fn inject_file(
    dom: &mut dyn Dom,
    kind: UploadKind,
    blob_base64: &str,
    file_name: &str,
    mime_type: &str,
) -> bool {
    let Some(input) = find_upload_field(dom, kind) else {
        return false;
    };
    let Ok(bytes) = BASE64.decode(blob_base64) else {
        return false;
    };

    let file = FilePayload {
        name: file_name.to_string(),
        mime_type: mime_type.to_string(),
        bytes,
    };
    if !dom.set_files_native(input, file) {
        return false;
    }

    // Change first: that is what file pickers fire, and what upload
    // progress UIs listen for.
    dom.dispatch(input, DomEvent::Change);
    dom.dispatch(input, DomEvent::Input);
    dom.dispatch(input, DomEvent::Blur);
    true
}

/// Best-scoring file input for `kind`, or None when nothing clears the
/// positive threshold. Ties go to the first candidate in document order.
pub fn find_upload_field(dom: &dyn Dom, kind: UploadKind) -> Option<NodeId> {
    let all = descendants(dom, dom.root());

    if let Some(fixed) = all.iter().copied().find(|&n| {
        dom.tag(n) == "input" && dom.attr(n, "id").as_deref() == Some(kind.fixed_id())
    }) {
        return Some(fixed);
    }

    let inputs: Vec<NodeId> = all
        .into_iter()
        .filter(|&n| dom.tag(n) == "input" && dom.attr(n, "type").as_deref() == Some("file"))
        .collect();

    let on_ats = is_known_ats_url(&dom.url().to_lowercase());

    let mut best: Option<NodeId> = None;
    let mut best_score = 0.0_f32;
    for (index, &input) in inputs.iter().enumerate() {
        let score = score_candidate(dom, input, kind, index, inputs.len(), on_ats);
        if score > best_score {
            best_score = score;
            best = Some(input);
        }
    }
    best
}

fn score_candidate(
    dom: &dyn Dom,
    input: NodeId,
    kind: UploadKind,
    index: usize,
    total_inputs: usize,
    on_ats: bool,
) -> f32 {
    let positive = kind.positive_keywords();
    let negative = kind.negative_keywords();
    let mut score = 0.0;

    if let Some(accept) = dom.attr(input, "accept") {
        if accept.contains("pdf") || accept.contains(".doc") {
            score += ACCEPT_ATTR_BONUS;
        }
    }

    for attr in ["id", "name", "aria-label", "aria-describedby", "data-testid"] {
        score += relevance(&dom.attr(input, attr).unwrap_or_default(), positive, negative);
    }

    if let Some(id) = dom.attr(input, "id") {
        if let Some(label) = find_label_for(dom, &id) {
            score += relevance(&dom.text_content(label), positive, negative);
        }
    }
    if let Some(label) = closest(dom, input, |d, n| d.tag(n) == "label") {
        score += relevance(&dom.text_content(label), positive, negative);
    }

    if let Some(parent) = dom.parent(input) {
        score += relevance(&dom.text_content(parent), positive, negative);
        if let Some(grandparent) = dom.parent(parent) {
            score += relevance(&dom.text_content(grandparent), positive, negative) * 0.5;
        }
        // "Upload File" button next to the input carries half weight.
        for node in descendants(dom, parent) {
            let is_button =
                dom.tag(node) == "button" || dom.attr(node, "role").as_deref() == Some("button");
            if is_button {
                score += relevance(&dom.text_content(node), positive, negative) * 0.5;
            }
        }
    }

    // ATS forms typically expose exactly one upload field: the resume.
    if on_ats && index == 0 {
        score += if total_inputs == 1 { SOLE_ATS_INPUT_BONUS } else { FIRST_ATS_INPUT_BONUS };
    }

    score
}

fn relevance(text: &str, positive: &[&str], negative: &[&str]) -> f32 {
    let t = text.to_lowercase();
    if negative.iter().any(|k| t.contains(k)) {
        return NEGATIVE_VETO;
    }
    if positive.iter().any(|k| t.contains(k)) {
        return POSITIVE_HIT;
    }
    0.0
}

fn find_label_for(dom: &dyn Dom, id: &str) -> Option<NodeId> {
    descendants(dom, dom.root())
        .into_iter()
        .find(|&n| dom.tag(n) == "label" && dom.attr(n, "for").as_deref() == Some(id))
}

fn is_known_ats_url(url: &str) -> bool {
    url.contains("greenhouse")
        || url.contains("lever")
        || url.contains("workday")
        || url.contains("ashby")
}
