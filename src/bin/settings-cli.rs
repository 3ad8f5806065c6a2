use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use tuning_settings::config::load_or_default;
use tuning_settings::controller::{submission_failure, DraftController};
use tuning_settings::draft::{FieldName, FieldValue};
use tuning_settings::lifecycle::startup::build_validator;
use tuning_settings::observability::logging;
use tuning_settings::HttpConfigService;

#[derive(Parser)]
#[command(name = "settings-cli")]
#[command(about = "Inspect and edit tuning settings held by the config store", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `service.base_url`.
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored configuration
    Show,
    /// Change fields and submit the result
    Edit {
        /// Field assignment, e.g. `budget=50` or `methods=dt,logreg`
        #[arg(short = 's', long = "set", value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,

        /// Validate and print the edited draft without submitting it
        #[arg(long)]
        dry_run: bool,
    },
    /// List selectable methods
    Methods,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.service.base_url = url;
    }
    logging::init(&config.observability.log_level);

    let service = HttpConfigService::new(&config.service)?;

    match cli.command {
        Commands::Methods => {
            let registry = service.methods().await?;
            for (id, info) in registry.iter() {
                println!("{:<16} {}", id.as_str(), info.fullname);
            }
        }
        Commands::Show => {
            let controller = DraftController::new(Arc::new(service), build_validator(&config)?);
            let draft = controller.open().await?;
            println!("{}", serde_json::to_string_pretty(&*draft)?);
            controller.cancel()?;
        }
        Commands::Edit {
            assignments,
            dry_run,
        } => {
            let controller = DraftController::new(Arc::new(service), build_validator(&config)?);
            controller.open().await?;

            for assignment in &assignments {
                let applied = parse_assignment(assignment)
                    .and_then(|(field, raw)| {
                        controller
                            .set(field, FieldValue::parse_for(field, raw))
                            .map_err(|e| e.to_string())
                    });
                if let Err(message) = applied {
                    controller.cancel()?;
                    return Err(format!("{assignment}: {message}").into());
                }
            }

            let draft = controller.draft();
            println!("{}", serde_json::to_string_pretty(&*draft)?);

            if dry_run {
                controller.cancel()?;
                match controller.validator().check_draft(&draft) {
                    Ok(()) => println!("Draft is valid (not submitted)"),
                    Err(errors) => {
                        for err in errors {
                            eprintln!("invalid: {err}");
                        }
                    }
                }
                return Ok(());
            }

            if let Err(e) = controller.submit().await {
                if let Some(cause) = submission_failure(&e) {
                    eprintln!("store call failed, draft not applied: {cause}");
                }
                let _ = controller.cancel();
                return Err(e.into());
            }
            println!("Submitted");
        }
    }

    Ok(())
}

fn parse_assignment(raw: &str) -> Result<(FieldName, &str), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected FIELD=VALUE".to_string())?;
    let field = name
        .trim()
        .parse::<FieldName>()
        .map_err(|unknown| format!("unknown field `{unknown}`"))?;
    Ok((field, value))
}
