//! Chrome to Firefox Extension Converter CLI

use chrome2moz::cli::{self, DestinationPolicy};
use chrome2moz::disclaimer::DisclaimerGate;
use chrome2moz::{gecko_id, ConverterConfig, ConverterEngine, JobRunner, ShimConfig};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chrome2moz")]
#[command(about = "Repackage Chrome MV3 extensions as Firefox .xpi files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Chrome extension to a Firefox .xpi
    Convert {
        /// Path to the Chrome extension (ZIP, CRX, or directory)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the .xpi (prompted for when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip prompts: save under the default name in the current directory
        #[arg(short = 'y', long)]
        yes: bool,

        /// Accept the legal disclaimer without the interactive prompt
        #[arg(long)]
        accept_disclaimer: bool,

        /// Download the polyfill without verifying the TLS certificate
        #[arg(long)]
        insecure_tls: bool,

        /// Do not download or inject the polyfill
        #[arg(long, conflicts_with_all = ["insecure_tls", "shim_url"])]
        no_shim: bool,

        /// Alternative polyfill URL
        #[arg(long)]
        shim_url: Option<String>,

        /// Directory for temporary working areas
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },

    /// Print the Gecko ID generated for an extension name
    GeckoId {
        /// Extension name as declared in manifest.json
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Convert {
            input,
            output,
            yes,
            accept_disclaimer,
            insecure_tls,
            no_shim,
            shim_url,
            work_dir,
        } => {
            cli::print_banner();

            let gate = DisclaimerGate::default();
            if !cli::confirm_disclaimer(&gate, accept_disclaimer)? {
                return Ok(());
            }

            let mut config = ConverterConfig::default().with_disclaimer_accepted(true);
            config.work_root = work_dir;
            config.shim = if no_shim {
                None
            } else {
                let mut shim = ShimConfig::default();
                if let Some(url) = shim_url {
                    shim.url = url;
                }
                shim.accept_invalid_certs = insecure_tls;
                Some(shim)
            };

            if insecure_tls {
                println!(
                    "{}",
                    "⚠️  TLS certificate verification is disabled for the polyfill download".yellow()
                );
            }

            let destination = match (output, yes) {
                (Some(path), _) => DestinationPolicy::Fixed(path),
                (None, true) => DestinationPolicy::DefaultName,
                (None, false) => DestinationPolicy::Prompt,
            };

            let runner = JobRunner::new(move |sink| ConverterEngine::new(config.clone(), sink));

            println!();
            println!("{}", "🚀 Starting conversion...".yellow().bold());
            let status = cli::run_conversion(&runner, input, destination).await?;

            let code = cli::report_status(&status);
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::GeckoId { name } => {
            println!("{}", gecko_id(&name));
        }
    }

    Ok(())
}
