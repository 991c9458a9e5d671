//! # docschema CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use anyhow::bail;
use clap::Parser;
use docschema_cli::validate::Outcome;

/// docschema: schema-driven document validation.
///
/// Compiles schema descriptors and runs documents through the
/// prepare/validate pipeline.
#[derive(Parser, Debug)]
#[command(name = "docschema", version, about)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Compile a schema descriptor and list its fields.
    Check(docschema_cli::check::CheckArgs),
    /// Describe a single field.
    Field(docschema_cli::field::FieldArgs),
    /// Serialize a document for output.
    Serialize(docschema_cli::serialize::SerializeArgs),
    /// Prepare and validate a payload.
    Validate(docschema_cli::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Check(args) => {
            for path in docschema_cli::check::run(&args)? {
                println!("{path}");
            }
        }
        Commands::Field(args) => {
            let summary = docschema_cli::field::run(&args)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Serialize(args) => {
            let doc = docschema_cli::serialize::run(&args)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Commands::Validate(args) => match docschema_cli::validate::run(&args)? {
            Outcome::Valid(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
            Outcome::Invalid(errors) => {
                println!("{}", serde_json::to_string_pretty(&errors)?);
                bail!("document is invalid: {errors}");
            }
        },
    }

    Ok(())
}
