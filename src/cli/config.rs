use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "job-autofill",
    version,
    about = "AI-assisted job application form autofill"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the Node.js bridge helper script
    #[arg(long, global = true)]
    pub bridge_script: Option<String>,

    /// Path to config file (default: job-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a page and print the discovered fields as JSON
    Scan {
        /// URL of the application page
        #[arg(long)]
        url: String,
    },

    /// Scan, map against the stored profile, and fill the form
    Autofill {
        /// URL of the application page
        #[arg(long)]
        url: String,

        /// Path to the profile JSON file
        #[arg(long, default_value = "profile.json")]
        profile: String,

        /// Field mapper: heuristic or gemini
        #[arg(long)]
        mapper: Option<String>,

        /// Attach the stored resume after filling
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        attach: bool,
    },

    /// Attach one document to the best-matching file input
    Attach {
        /// URL of the application page
        #[arg(long)]
        url: String,

        /// Path to the file to attach
        #[arg(long)]
        file: String,

        /// Document kind: resume or cover-letter
        #[arg(long, default_value = "resume")]
        kind: String,

        /// MIME type of the file
        #[arg(long, default_value = "application/pdf")]
        mime: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `job-autofill.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub mapper: MapperConfig,
    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Path to the Node.js helper that owns the browser.
    pub script: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// "heuristic" or "gemini". The provider is always explicit; nothing
    /// is inferred from key shapes.
    #[serde(default = "default_heuristic")]
    pub provider: String,

    pub model: Option<String>,
    pub endpoint: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_key_env")]
    pub api_key_env: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            provider: "heuristic".to_string(),
            model: None,
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_ms: u64,

    #[serde(default = "default_fill_timeout")]
    pub fill_timeout_ms: u64,

    #[serde(default = "default_good_enough")]
    pub good_enough_fields: usize,

    /// JSONL trace output path; empty disables tracing.
    #[serde(default = "default_trace_path")]
    pub trace_path: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            scan_timeout_ms: 5000,
            fill_timeout_ms: 10_000,
            good_enough_fields: 3,
            trace_path: "autofill_trace.jsonl".to_string(),
        }
    }
}

// Serde default helpers
fn default_heuristic() -> String { "heuristic".to_string() }
fn default_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_scan_timeout() -> u64 { 5000 }
fn default_fill_timeout() -> u64 { 10_000 }
fn default_good_enough() -> usize { 3 }
fn default_trace_path() -> String { "autofill_trace.jsonl".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("job-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
