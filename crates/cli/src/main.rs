//! jfrm-install CLI entry point

// CLI binary needs to output to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use jfrm_install::cli::{self, CliError, Commands, EXIT_OK, exit_code_for, render_error};
use jfrm_install::commands::{self, GlobalOptions, InstallArgs};
use jfrm_install::tracing::{self, TracingConfig, TracingFormat};
use std::time::Duration;

fn main() {
    // NOTE: tracing may be unusable during a panic, so write directly to stderr.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json = cli.json;

    let tracing_config = TracingConfig {
        format: TracingFormat::resolve(cli.log_format, json),
        level: cli.level.into(),
    };
    // Ignore error if tracing already initialized
    let _ = tracing::init_tracing(tracing_config);

    let exit_code = match run(cli) {
        Ok(output) => {
            print!("{output}");
            EXIT_OK
        }
        Err(err) => {
            render_error(&err, json);
            exit_code_for(&err)
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: cli::Cli) -> Result<String, CliError> {
    let global = GlobalOptions {
        formula: cli.formula,
        platform: cli.platform,
        json: cli.json,
    };

    match cli.command {
        Commands::Install {
            bin_dir,
            sha256,
            skip_smoke_test,
            strict,
            timeout,
            smoke_timeout,
        } => {
            let args = InstallArgs {
                bin_dir,
                sha256,
                skip_smoke_test,
                strict,
                timeout: Duration::from_secs(timeout),
                smoke_timeout: Duration::from_secs(smoke_timeout),
            };
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| CliError::other(format!("Runtime error: {e}")))?;
            rt.block_on(commands::execute_install(&global, args))
        }
        Commands::Show => commands::execute_show(&global),
        Commands::List => commands::execute_list(&global),
        Commands::Formula => commands::execute_formula(&global),
    }
}
