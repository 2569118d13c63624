use crate::support::{load_config_or_exit, print_json_or_exit, read_json_file_or_exit};
use gluer_kernel::VectorCase;
use serde_json::{Value, json};

const VECTOR_RUN_KIND: &str = "gluer.vector_run.v1";

pub fn run(case_path: String, config_path: Option<String>, json_output: bool) {
    let case_json: Value = read_json_file_or_exit(&case_path, "vector case");
    let case = VectorCase::from_fixture(&case_json).unwrap_or_else(|e| {
        eprintln!("error: {case_path}: {e}");
        std::process::exit(2);
    });

    let config = match &config_path {
        Some(path) => load_config_or_exit(path),
        None => *case.config(),
    };
    tracing::info!(case = %case_path, mode = %config.mode, "running vector");

    let outcome = case.run_with_config(config).unwrap_or_else(|e| {
        eprintln!("error: {case_path}: {e}");
        std::process::exit(2);
    });
    let result = if outcome.is_accepted() {
        "accepted"
    } else {
        "rejected"
    };

    if json_output {
        let payload = json!({
            "schema": 1,
            "runKind": VECTOR_RUN_KIND,
            "casePath": case_path,
            "mode": config.mode,
            "result": result,
            "outcome": outcome,
        });
        print_json_or_exit(&payload, "vector");
    } else {
        println!("gluer vector");
        println!("  Case: {case_path}");
        println!("  Mode: {}", config.mode);
        println!("  Glue: {}", outcome.glue.result);
        if let Some(message) = &outcome.glue.message {
            println!("    {message}");
        }
        for call in &outcome.calls {
            println!("  Call {}: {}", call.member, call.step.result);
            if let Some(message) = &call.step.message {
                println!("    {message}");
            }
        }
        println!("  Reports: {}", outcome.reports.len());
        for report in &outcome.reports {
            println!("    {}", report.message);
        }
        println!("  Result: {result}");
    }

    if !outcome.is_accepted() {
        std::process::exit(1);
    }
}
