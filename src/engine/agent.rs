use crate::dom::Dom;
use crate::engine::{extract, fill, upload};
use crate::messenger::protocol::{PageRequest, PageResponse};

/// Page-side request dispatcher.
///
/// One agent serves one frame: it owns nothing, borrows the frame's `Dom`
/// per request, and maps each request to the matching engine operation.
/// Every outcome is an in-band `PageResponse`; the agent itself cannot
/// fail, which keeps the transport's error space purely about delivery.
pub struct PageAgent {
    frame_id: u64,
}

impl PageAgent {
    pub fn new(frame_id: u64) -> Self {
        PageAgent { frame_id }
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn handle(&self, dom: &mut dyn Dom, request: &PageRequest) -> PageResponse {
        match request {
            PageRequest::GetPageContext => {
                let result = extract::scan(dom, self.frame_id);
                PageResponse::scanned(result.context, result.fields)
            }
            PageRequest::FillField { field_id, value } => {
                if fill::fill_field(dom, field_id, value) {
                    PageResponse::ok()
                } else {
                    PageResponse::failed()
                }
            }
            PageRequest::AttachResume { blob_base64, file_name, mime_type } => {
                self.attach(dom, upload::UploadKind::Resume, blob_base64, file_name, mime_type)
            }
            PageRequest::AttachCoverLetter { blob_base64, file_name, mime_type } => {
                self.attach(dom, upload::UploadKind::CoverLetter, blob_base64, file_name, mime_type)
            }
        }
    }

    fn attach(
        &self,
        dom: &mut dyn Dom,
        kind: upload::UploadKind,
        blob_base64: &str,
        file_name: &str,
        mime_type: &str,
    ) -> PageResponse {
        if upload::inject_file(dom, kind, blob_base64, file_name, mime_type) {
            PageResponse::ok()
        } else {
            PageResponse::failed()
        }
    }
}
