//! Vertigo-DX - CLI entry point
//!
//! Reads one clinical answer set as JSON, runs the full pipeline, prints
//! the diagnosis report as JSON on stdout. Model artifacts come from
//! `MODEL_SOURCE_DIR` (offline) or `MODEL_SOURCE_URL` (blob store).

use std::io::Read;
use std::process::ExitCode;

use vertigo_dx_core::constants;
use vertigo_dx_core::logic::intake::ClinicalAnswers;
use vertigo_dx_core::logic::model::repository;
use vertigo_dx_core::{run_diagnosis, ArtifactStore, DirStore, HttpStore};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("{}", message);
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| "usage: vertigo-dx <answers.json | ->".to_string())?;

    let input = read_input(&path)?;
    let answers: ClinicalAnswers =
        serde_json::from_str(&input).map_err(|e| format!("Invalid answer set: {}", e))?;
    answers
        .validate()
        .map_err(|e| format!("Rejected answer set: {}", e))?;

    let store = build_store();
    let models = repository::global()
        .load(store.as_ref())
        .map_err(|e| format!("Could not load models: {}", e))?;

    let report = run_diagnosis(&models, &answers);
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("Could not serialize report: {}", e))?;
    println!("{}", json);

    Ok(())
}

fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Could not read stdin: {}", e))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Could not read '{}': {}", path, e))
    }
}

fn build_store() -> Box<dyn ArtifactStore> {
    match constants::get_model_source_dir() {
        Some(dir) => {
            log::info!("Using local artifact store: {}", dir);
            Box::new(DirStore::new(dir))
        }
        None => {
            let url = constants::get_model_source_url();
            log::info!("Using artifact store: {}", url);
            Box::new(HttpStore::new(
                url,
                constants::get_fetch_timeout(),
                constants::get_fetch_retries(),
            ))
        }
    }
}
