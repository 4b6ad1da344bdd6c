//! The applicant's stored profile and application history.
//!
//! Field names on the wire stay camelCase so profiles exported from the
//! page runtime load unchanged.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub portfolio: String,
    /// YYYY-MM-DD
    pub dob: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub citizenship: String,
    /// Country the applicant intends to work from.
    pub work_country: String,
    pub veteran_status: String,
    pub disability_status: String,
    pub gender: String,
    pub race: String,
    pub sexual_orientation: String,
    /// Plain-text resume body, sent verbatim to the mapping backend.
    pub resume_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
    /// Base64-encoded resume for auto-attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_blob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub application_history: Vec<ApplicationEntry>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn has_resume_blob(&self) -> bool {
        self.resume_blob.as_deref().is_some_and(|b| !b.is_empty())
    }

    /// Compact key/value rendering for model prompts. Empty fields are
    /// omitted so the prompt carries no blank noise.
    pub fn summary(&self) -> String {
        let name = self.full_name();
        let pairs: [(&str, &str); 16] = [
            ("Name", &name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("LinkedIn", &self.linkedin),
            ("Portfolio", &self.portfolio),
            ("Date of birth", &self.dob),
            ("Address", &self.address),
            ("City", &self.city),
            ("State", &self.state),
            ("Zip", &self.zip),
            ("Citizenship", &self.citizenship),
            ("Work country", &self.work_country),
            ("Veteran status", &self.veteran_status),
            ("Disability status", &self.disability_status),
            ("Gender", &self.gender),
            ("Race", &self.race),
        ];
        let mut out = String::new();
        for (key, value) in pairs {
            if !value.trim().is_empty() {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value.trim());
                out.push('\n');
            }
        }
        out
    }
}

/// One completed (or attempted) application, appended after each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEntry {
    pub id: String,
    /// Unix timestamp in seconds, stored as a string.
    pub date: String,
    pub company: String,
    pub role: String,
    pub autofill_time_seconds: f64,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Applied,
    Failed,
    InProgress,
}

impl ApplicationEntry {
    pub fn new(company: &str, role: &str, seconds: f64, status: ApplicationStatus) -> Self {
        ApplicationEntry {
            id: Uuid::new_v4().to_string(),
            date: unix_now(),
            company: company.to_string(),
            role: role.to_string(),
            autofill_time_seconds: seconds,
            status,
        }
    }
}

fn unix_now() -> String {
    // Seconds since epoch; good enough for history ordering without
    // pulling in a date crate.
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}", secs)
}

/// Persistence seam for the profile. The run loop only appends history;
/// loading and saving belong to the CLI layer.
pub trait ProfileStore {
    fn load(&self) -> Result<UserProfile, String>;
    fn save(&self, profile: &UserProfile) -> Result<(), String>;

    fn append_history(&self, entry: ApplicationEntry) -> Result<(), String> {
        let mut profile = self.load()?;
        profile.application_history.push(entry);
        self.save(&profile)
    }
}

/// Profile persisted as one JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self) -> Result<UserProfile, String> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| format!("read {}: {}", self.path.display(), e))?;
        serde_json::from_str(&raw).map_err(|e| format!("parse {}: {}", self.path.display(), e))
    }

    fn save(&self, profile: &UserProfile) -> Result<(), String> {
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| format!("serialize profile: {}", e))?;
        fs::write(&self.path, json).map_err(|e| format!("write {}: {}", self.path.display(), e))
    }
}

/// In-memory store for tests and one-shot runs without persistence.
pub struct MemoryStore {
    profile: Mutex<UserProfile>,
}

impl MemoryStore {
    pub fn new(profile: UserProfile) -> Self {
        MemoryStore { profile: Mutex::new(profile) }
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self) -> Result<UserProfile, String> {
        self.profile
            .lock()
            .map(|p| p.clone())
            .map_err(|_| "profile store lock poisoned".to_string())
    }

    fn save(&self, profile: &UserProfile) -> Result<(), String> {
        match self.profile.lock() {
            Ok(mut guard) => {
                *guard = profile.clone();
                Ok(())
            }
            Err(_) => Err("profile store lock poisoned".to_string()),
        }
    }
}
