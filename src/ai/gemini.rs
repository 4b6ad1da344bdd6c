use serde::{Deserialize, Serialize};

use crate::ai::mapper::FieldMapper;
use crate::engine::model::{FieldDescriptor, FillInstruction, PageContext};
use crate::error::AiError;
use crate::profile::UserProfile;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Field mapper backed by the Gemini generateContent API.
///
/// One synchronous HTTP round trip per mapping call; transient-error
/// retries are the caller's job. The model is constrained to JSON output
/// and must answer with an array of `{fieldId, value}` objects.
pub struct GeminiMapper {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiMapper {
    pub fn new(api_key: &str, model: Option<&str>, endpoint: Option<&str>) -> Self {
        GeminiMapper {
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).trim_end_matches('/').to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            api_key: api_key.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn build_prompt(
        &self,
        fields: &[FieldDescriptor],
        profile: &UserProfile,
        context: &PageContext,
    ) -> Result<String, AiError> {
        let fields_json = serde_json::to_string_pretty(fields)
            .map_err(|e| AiError::Failed(format!("serialize fields: {}", e)))?;

        Ok(format!(
            r#"You are filling a job application form on behalf of the applicant below.

APPLICANT PROFILE:
{profile_summary}
RESUME:
{resume}

PAGE: {title} ({url})
PAGE TEXT (truncated):
{page_text}

FORM FIELDS (JSON):
{fields_json}

For every field you can answer from the profile or resume, emit one object.
Use the field's "id" verbatim as "fieldId". For selects pick one of the
listed options exactly. For checkboxes use true or false. Skip fields you
cannot answer; never invent facts about the applicant.

Respond with ONLY a JSON array of objects shaped like:
[{{"fieldId": "...", "value": ..., "reasoning": "..."}}]"#,
            profile_summary = profile.summary(),
            resume = profile.resume_text,
            title = context.title,
            url = context.url,
            page_text = context.page_text,
        ))
    }

    fn parse_instructions(text: &str) -> Result<Vec<FillInstruction>, AiError> {
        let cleaned = strip_code_fences(text);
        serde_json::from_str(cleaned).map_err(|e| AiError::Parse {
            snippet: snippet_of(cleaned),
            source: e,
        })
    }
}

/// Models sometimes wrap JSON in markdown fences even when asked not to.
fn strip_code_fences(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix("```json").or_else(|| t.strip_prefix("```")).unwrap_or(t);
    t.strip_suffix("```").unwrap_or(t).trim()
}

fn snippet_of(text: &str) -> String {
    text.chars().take(200).collect()
}

impl FieldMapper for GeminiMapper {
    fn map_fields(
        &self,
        fields: &[FieldDescriptor],
        profile: &UserProfile,
        context: &PageContext,
    ) -> Result<Vec<FillInstruction>, AiError> {
        let prompt = self.build_prompt(fields, profile, context)?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { response_mime_type: "application/json" },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| AiError::Network(e.to_string()))?;

        if status != 200 {
            return Err(AiError::from_status(status, snippet_of(&body)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| AiError::Parse {
            snippet: snippet_of(&body),
            source: e,
        })?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| AiError::Failed("Empty response from model".into()))?;

        Self::parse_instructions(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_unwrapped() {
        let text = "```json\n[{\"fieldId\": \"email\", \"value\": \"a@b.c\"}]\n```";
        let parsed = GeminiMapper::parse_instructions(text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].field_id, "email");
    }

    #[test]
    fn prose_answer_is_a_parse_error_not_network() {
        let err = GeminiMapper::parse_instructions("Sure! Here are the fields...").unwrap_err();
        assert!(
            matches!(err, AiError::Parse { .. }),
            "malformed model output must be Parse, got {:?}",
            err
        );
    }
}
