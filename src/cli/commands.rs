use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::ai::{FieldMapper, GeminiMapper, HeuristicMapper};
use crate::cli::config::AppConfig;
use crate::engine::model::FrameScanResult;
use crate::engine::upload::UploadKind;
use crate::messenger::bridge::BridgeTransport;
use crate::messenger::protocol::PageRequest;
use crate::messenger::transport::FrameTransport;
use crate::orchestrator::run::{CancelToken, Orchestrator, RunConfig, RunGuard};
use crate::profile::JsonFileStore;
use crate::trace::TraceLogger;

// ============================================================================
// shared builders
// ============================================================================

fn launch_bridge(
    config: &AppConfig,
    bridge_override: Option<&str>,
    url: &str,
) -> Result<BridgeTransport, Box<dyn std::error::Error>> {
    let script = bridge_override
        .or(config.bridge.script.as_deref())
        .ok_or("No bridge script configured (set --bridge-script or bridge.script)")?;
    let mut transport = BridgeTransport::launch(script, url)?;
    transport.refresh_frames()?;
    Ok(transport)
}

fn build_mapper(
    config: &AppConfig,
    mapper_override: Option<&str>,
) -> Result<Box<dyn FieldMapper>, Box<dyn std::error::Error>> {
    let provider = mapper_override.unwrap_or(&config.mapper.provider);
    match provider {
        "heuristic" => Ok(Box::new(HeuristicMapper)),
        "gemini" => {
            let api_key = std::env::var(&config.mapper.api_key_env).map_err(|_| {
                format!("Gemini mapper needs an API key in ${}", config.mapper.api_key_env)
            })?;
            Ok(Box::new(GeminiMapper::new(
                &api_key,
                config.mapper.model.as_deref(),
                config.mapper.endpoint.as_deref(),
            )))
        }
        other => Err(format!("Unknown mapper '{}' (use heuristic or gemini)", other).into()),
    }
}

fn tracer_from(config: &AppConfig) -> TraceLogger {
    if config.run.trace_path.is_empty() {
        TraceLogger::disabled()
    } else {
        TraceLogger::new(&config.run.trace_path)
    }
}

// ============================================================================
// scan subcommand
// ============================================================================

pub fn cmd_scan(
    url: &str,
    bridge_override: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut transport = launch_bridge(config, bridge_override, url)?;
    let timeout = Duration::from_millis(config.run.scan_timeout_ms);

    if verbose > 0 {
        for frame in transport.list_frames() {
            eprintln!("Scanning frame {} ({})...", frame.frame_id, frame.url);
        }
    }

    let mut results: Vec<FrameScanResult> = Vec::new();
    for (frame_id, outcome) in transport.broadcast(&PageRequest::GetPageContext, timeout) {
        match outcome {
            Ok(response) if response.success => {
                if let (Some(context), Some(fields)) = (response.context, response.fields) {
                    results.push(FrameScanResult { frame_id, context, fields });
                }
            }
            Ok(_) => eprintln!("Frame {} refused the scan", frame_id),
            Err(e) => eprintln!("Frame {} unreachable: {}", frame_id, e),
        }
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

// ============================================================================
// autofill subcommand
// ============================================================================

pub fn cmd_autofill(
    url: &str,
    profile_path: &str,
    mapper_override: Option<&str>,
    attach: bool,
    bridge_override: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::new(profile_path);
    let mapper = build_mapper(config, mapper_override)?;
    let tracer = tracer_from(config);
    let mut transport = launch_bridge(config, bridge_override, url)?;

    let run_config = RunConfig {
        scan_timeout_ms: config.run.scan_timeout_ms,
        fill_timeout_ms: config.run.fill_timeout_ms,
        good_enough_fields: config.run.good_enough_fields,
        attach_documents: attach,
        scan_policy_override: None,
    };

    if verbose > 0 {
        eprintln!("Autofilling {}...", url);
    }

    let mut orchestrator =
        Orchestrator::new(&mut transport, mapper.as_ref(), &store, &tracer, run_config);
    let report = orchestrator.run(url, &RunGuard::new(), &CancelToken::new())?;

    println!(
        "{}: {} fields found in frame {}, {} filled, {} failed ({} ms)",
        report.platform,
        report.fields_discovered,
        report.frame_id,
        report.filled,
        report.failed,
        report.elapsed_ms
    );
    match report.resume_attached {
        Some(true) => println!("Resume attached."),
        Some(false) => println!("Resume could not be attached automatically."),
        None => {}
    }
    Ok(())
}

// ============================================================================
// attach subcommand
// ============================================================================

pub fn cmd_attach(
    url: &str,
    file_path: &str,
    kind: &str,
    mime: &str,
    bridge_override: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let upload_kind = match kind {
        "resume" => UploadKind::Resume,
        "cover-letter" => UploadKind::CoverLetter,
        other => return Err(format!("Unknown kind '{}' (use resume or cover-letter)", other).into()),
    };

    let bytes = std::fs::read(file_path)?;
    let file_name = std::path::Path::new(file_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document.pdf".to_string());
    let request = PageRequest::attach(
        upload_kind,
        BASE64.encode(&bytes),
        file_name,
        mime.to_string(),
    );

    let mut transport = launch_bridge(config, bridge_override, url)?;
    let timeout = Duration::from_millis(config.run.fill_timeout_ms);

    for frame in transport.list_frames() {
        if let Ok(response) = transport.request(frame.frame_id, &request, timeout) {
            if response.success {
                println!("Attached {} in frame {}", file_path, frame.frame_id);
                return Ok(());
            }
        }
    }
    Err("No frame accepted the attachment".into())
}
