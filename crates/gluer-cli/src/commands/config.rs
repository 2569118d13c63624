use crate::support::{load_config_or_exit, print_json_or_exit};
use gluer_kernel::GluerConfig;

pub fn run(config_path: Option<String>, json_output: bool) {
    let config = match &config_path {
        Some(path) => load_config_or_exit(path),
        None => GluerConfig::default(),
    };

    if json_output {
        print_json_or_exit(&config, "config");
    } else {
        println!("gluer config");
        println!("  Source: {}", config_path.as_deref().unwrap_or("<defaults>"));
        println!("  Mode: {}", config.mode);
        println!(
            "  Argument failures: {}",
            match config.argument_failures {
                gluer_kernel::FailureStrategy::FirstFailure => "first_failure",
                gluer_kernel::FailureStrategy::CollectAll => "collect_all",
            }
        );
    }
}
