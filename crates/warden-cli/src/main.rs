//! Prompt Warden CLI - screen prompts from the command line.

use std::io::Read;

use anyhow::Context;
use clap::Parser;

use warden_core::{GuardConfig, SecurityLevel, SecurityWrapper};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Prompt Warden - request-time text sanitization guard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate and sanitize a prompt, printing the outcome as JSON
    Process {
        /// Prompt text; reads stdin when omitted
        prompt: Option<String>,
        /// Security level: permissive, normal, strict, paranoid
        #[arg(short, long, default_value = "normal")]
        level: String,
        /// Padding target length in characters
        #[arg(long)]
        padding_target: Option<usize>,
    },
    /// Validate only, printing the validation report as JSON
    Scan {
        /// Prompt text; reads stdin when omitted
        prompt: Option<String>,
        /// Security level: permissive, normal, strict, paranoid
        #[arg(short, long, default_value = "normal")]
        level: String,
    },
    /// Print the effective configuration for a level as JSON
    Check {
        /// Security level: permissive, normal, strict, paranoid
        #[arg(short, long, default_value = "normal")]
        level: String,
    },
}

fn parse_level(level: &str) -> anyhow::Result<SecurityLevel> {
    match level {
        "permissive" => Ok(SecurityLevel::Permissive),
        "normal" => Ok(SecurityLevel::Normal),
        "strict" => Ok(SecurityLevel::Strict),
        "paranoid" => Ok(SecurityLevel::Paranoid),
        other => anyhow::bail!("unknown security level: {}", other),
    }
}

fn read_prompt(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(prompt) => Ok(prompt),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading prompt from stdin")?;
            Ok(buffer)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Process { prompt, level, padding_target }) => {
            let mut config = GuardConfig::with_level(parse_level(&level)?);
            if let Some(target) = padding_target {
                config = config.with_padding_target(target);
            }

            let warden = SecurityWrapper::new(config)?;
            let prompt = read_prompt(prompt)?;
            let outcome = warden.process(&prompt, None).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Some(Commands::Scan { prompt, level }) => {
            let config = GuardConfig::with_level(parse_level(&level)?);
            let warden = SecurityWrapper::new(config)?;
            let prompt = read_prompt(prompt)?;
            let report = warden.validate(&prompt).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some(Commands::Check { level }) => {
            let config = GuardConfig::with_level(parse_level(&level)?);
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        None => {
            println!("Prompt Warden v0.1.0 - Use --help for commands");
        }
    }

    Ok(())
}
