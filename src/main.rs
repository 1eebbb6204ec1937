use clap::Parser;
use filemeta::{
    build_info, Cli, FileMeta, FileMetaError, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(&cli);
    tracing::debug!(build = %build_info(), "starting");

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // clap requires ROOT unless --generate-config is given.
    let root = cli.root.clone().unwrap_or_default();

    let filemeta = match FileMeta::from_cli(&cli) {
        Ok(filemeta) => filemeta,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return match filemeta.dry_run(&root) {
            Ok(_) => 0,
            Err(e) => {
                filemeta.handle_error(&e);
                exit_code_for(&e)
            }
        };
    }

    // Partial extraction failures still count as success.
    match filemeta.run(&root) {
        Ok(_) => 0,
        Err(e) => {
            filemeta.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &FileMetaError) -> i32 {
    match error {
        FileMetaError::Cancelled => 130, // Interrupted (SIGINT)
        FileMetaError::InvalidPath { .. } | FileMetaError::Permission { .. } => 2,
        FileMetaError::ReportWrite { .. } => 3,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "filemeta.toml".to_string());

    match FileMeta::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  filemeta <root-directory> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &FileMetaError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));

    // A second initialisation only happens in tests; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::Term::stderr().features().colors_supported())
        .with_target(false)
        .try_init();
}
