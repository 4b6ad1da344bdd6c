//! Wire types exchanged between the orchestrator and page contexts.
//!
//! Requests are tagged envelopes so the page side can dispatch on a single
//! `type` discriminant; payload fields are camelCase to match the page
//! runtime's conventions.

use serde::{Deserialize, Serialize};

use crate::engine::model::{FieldDescriptor, PageContext};
use crate::engine::upload::UploadKind;

/// A request addressed to one frame's page agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PageRequest {
    /// Scan the frame and return its context plus discovered fields.
    #[serde(rename = "GET_PAGE_CONTEXT")]
    GetPageContext,

    /// Write one value into one field.
    #[serde(rename = "FILL_FIELD")]
    #[serde(rename_all = "camelCase")]
    FillField { field_id: String, value: serde_json::Value },

    /// Attach a resume to the best-matching file input.
    #[serde(rename = "ATTACH_RESUME")]
    #[serde(rename_all = "camelCase")]
    AttachResume { blob_base64: String, file_name: String, mime_type: String },

    /// Attach a cover letter to the best-matching file input.
    #[serde(rename = "ATTACH_COVER_LETTER")]
    #[serde(rename_all = "camelCase")]
    AttachCoverLetter { blob_base64: String, file_name: String, mime_type: String },
}

impl PageRequest {
    pub fn attach(
        kind: UploadKind,
        blob_base64: String,
        file_name: String,
        mime_type: String,
    ) -> Self {
        match kind {
            UploadKind::Resume => {
                PageRequest::AttachResume { blob_base64, file_name, mime_type }
            }
            UploadKind::CoverLetter => {
                PageRequest::AttachCoverLetter { blob_base64, file_name, mime_type }
            }
        }
    }

}

/// Uniform response envelope. `success: false` is an in-band refusal
/// (element missing, fill did not stick); transport failures surface as
/// `TransportError` instead and never produce a `PageResponse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PageContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDescriptor>>,
}

impl PageResponse {
    pub fn ok() -> Self {
        PageResponse { success: true, context: None, fields: None }
    }

    pub fn failed() -> Self {
        PageResponse { success: false, context: None, fields: None }
    }

    pub fn scanned(context: PageContext, fields: Vec<FieldDescriptor>) -> Self {
        PageResponse { success: true, context: Some(context), fields: Some(fields) }
    }
}

/// Identity of one frame reachable through a transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInfo {
    pub frame_id: u64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_with_screaming_type_tags() {
        let req = PageRequest::FillField {
            field_id: "email".into(),
            value: serde_json::json!("ada@example.com"),
        };
        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(wire["type"], "FILL_FIELD", "type tag should be the screaming name");
        assert_eq!(wire["payload"]["fieldId"], "email", "payload keys should be camelCase");
    }

    #[test]
    fn get_page_context_has_no_payload_fields() {
        let wire = serde_json::to_value(&PageRequest::GetPageContext).unwrap();
        assert_eq!(wire["type"], "GET_PAGE_CONTEXT");
    }

    #[test]
    fn attach_builder_picks_the_matching_variant() {
        let req = PageRequest::attach(
            UploadKind::CoverLetter,
            "aGVsbG8=".into(),
            "letter.pdf".into(),
            "application/pdf".into(),
        );
        assert!(
            matches!(req, PageRequest::AttachCoverLetter { .. }),
            "cover-letter kind should build the cover-letter variant"
        );
    }
}
