use serde_json::Value;

use crate::engine::model::{FieldDescriptor, FieldKind, FillInstruction, PageContext};
use crate::error::AiError;
use crate::profile::UserProfile;

/// Turns discovered fields plus the stored profile into fill
/// instructions. The orchestrator only sees this trait; the Gemini
/// backend and the offline heuristic both live behind it.
pub trait FieldMapper {
    fn map_fields(
        &self,
        fields: &[FieldDescriptor],
        profile: &UserProfile,
        context: &PageContext,
    ) -> Result<Vec<FillInstruction>, AiError>;
}

/// Offline mapper: keyword chain over the label and name, checked in
/// order. Good enough for the common contact-info fields and for running
/// without an API key; anything it cannot place is skipped rather than
/// guessed.
pub struct HeuristicMapper;

/// Derive a value for one field from the profile, or None to skip it.
pub fn guess_value(field: &FieldDescriptor, profile: &UserProfile) -> Option<Value> {
    let hint = format!("{} {}", field.label, field.name).to_lowercase();

    if field.kind == FieldKind::Checkbox {
        // Only consent-ish checkboxes are safe to tick blindly.
        if hint.contains("agree") || hint.contains("consent") || hint.contains("acknowledge") {
            return Some(Value::Bool(true));
        }
        return None;
    }

    let text: Option<&str> = if hint.contains("email") {
        Some(&profile.email)
    } else if hint.contains("first name") || hint.contains("firstname") || hint.contains("given") {
        Some(&profile.first_name)
    } else if hint.contains("last name") || hint.contains("lastname") || hint.contains("surname")
        || hint.contains("family")
    {
        Some(&profile.last_name)
    } else if hint.contains("full name") || hint.contains("your name") {
        return full_name_value(profile);
    } else if hint.contains("phone") || hint.contains("mobile") || hint.contains("tel") {
        Some(&profile.phone)
    } else if hint.contains("linkedin") {
        Some(&profile.linkedin)
    } else if hint.contains("portfolio") || hint.contains("website") || hint.contains("url") {
        Some(&profile.portfolio)
    } else if hint.contains("city") {
        Some(&profile.city)
    } else if hint.contains("state") || hint.contains("province") {
        Some(&profile.state)
    } else if hint.contains("zip") || hint.contains("postal") {
        Some(&profile.zip)
    } else if hint.contains("address") || hint.contains("location") {
        Some(&profile.address)
    } else if hint.contains("date of birth") || hint.contains("birth") || hint.contains("dob") {
        Some(&profile.dob)
    } else if hint.contains("veteran") {
        Some(&profile.veteran_status)
    } else if hint.contains("disability") {
        Some(&profile.disability_status)
    } else if hint.contains("gender") {
        Some(&profile.gender)
    } else if hint.contains("race") || hint.contains("ethnic") {
        Some(&profile.race)
    } else if hint.contains("citizen") || hint.contains("work authorization")
        || hint.contains("authorized")
    {
        Some(&profile.citizenship)
    } else if hint.contains("country") {
        Some(&profile.work_country)
    } else if hint.contains("name") {
        return full_name_value(profile);
    } else {
        None
    };

    match text {
        Some(t) if !t.trim().is_empty() => pick_option(field, t),
        _ => None,
    }
}

fn full_name_value(profile: &UserProfile) -> Option<Value> {
    let name = profile.full_name();
    if name.is_empty() { None } else { Some(Value::String(name)) }
}

/// For selects, only emit a value that actually matches an option, by
/// equality first and containment second (case-insensitive).
fn pick_option(field: &FieldDescriptor, wanted: &str) -> Option<Value> {
    let Some(options) = &field.options else {
        return Some(Value::String(wanted.to_string()));
    };
    if field.kind != FieldKind::Select {
        return Some(Value::String(wanted.to_string()));
    }
    let wanted_lower = wanted.to_lowercase();
    let exact = options.iter().find(|o| o.to_lowercase() == wanted_lower);
    let close = exact.or_else(|| {
        options.iter().find(|o| {
            let ol = o.to_lowercase();
            ol.contains(&wanted_lower) || wanted_lower.contains(&ol)
        })
    });
    close.map(|o| Value::String(o.clone()))
}

impl FieldMapper for HeuristicMapper {
    fn map_fields(
        &self,
        fields: &[FieldDescriptor],
        profile: &UserProfile,
        _context: &PageContext,
    ) -> Result<Vec<FillInstruction>, AiError> {
        Ok(fields
            .iter()
            .filter_map(|field| {
                guess_value(field, profile).map(|value| FillInstruction {
                    field_id: field.id.clone(),
                    value,
                    reasoning: None,
                })
            })
            .collect())
    }
}
