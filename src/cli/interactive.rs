//! Terminal front end: disclaimer, destination prompt and job progress

use crate::disclaimer::{DisclaimerGate, DISCLAIMER_TEXT};
use crate::runner::{JobEvent, JobRunner, JobStatus};
use anyhow::{anyhow, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// How the save destination gets answered
#[derive(Debug, Clone)]
pub enum DestinationPolicy {
    /// Always this path (`--output`)
    Fixed(PathBuf),
    /// The suggested name in the current directory (`--yes`)
    DefaultName,
    /// Ask, seeded with the suggested name
    Prompt,
}

pub fn print_banner() {
    println!("{}", "╔═══════════════════════════════════════════════════════════════╗".blue());
    println!("{}", "║                                                               ║".blue());
    println!("{}", "║     🦊 Chrome → Firefox Extension Porter                      ║".blue().bold());
    println!("{}", "║                                                               ║".blue());
    println!("{}", "║     Repackage Chrome MV3 extensions as Firefox .xpi files     ║".blue());
    println!("{}", "║                                                               ║".blue());
    println!("{}", "╚═══════════════════════════════════════════════════════════════╝".blue());
}

/// Show the legal notice on first run. Returns whether the user may continue.
pub fn confirm_disclaimer(gate: &DisclaimerGate, assume_yes: bool) -> Result<bool> {
    if gate.is_accepted() {
        return Ok(true);
    }

    println!();
    println!("{}", "⚠️  Legal Disclaimer - First Run".yellow().bold());
    println!();
    println!("{}", DISCLAIMER_TEXT);
    println!();

    let accepted = assume_yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Do you understand and agree to these terms?")
            .default(false)
            .interact()?;

    if accepted {
        gate.accept()?;
    } else {
        println!("{}", "You must accept the terms to use this application.".red());
    }
    Ok(accepted)
}

/// Start a job and drive its events until it finishes
pub async fn run_conversion(
    runner: &JobRunner,
    input: PathBuf,
    destination: DestinationPolicy,
) -> Result<JobStatus> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.println(format!("> Selected: {}", input.display()));

    let mut handle = runner.start(input)?;
    while let Some(event) = handle.next_event().await {
        match event {
            JobEvent::Stage(stage) => spinner.set_message(stage.to_string()),
            JobEvent::Log(line) => spinner.println(format!("> {}", line)),
            JobEvent::DestinationRequested { default_name, reply } => {
                let answer = spinner.suspend(|| {
                    tokio::task::block_in_place(|| resolve_destination(&destination, &default_name))
                });
                let _ = reply.send(answer);
            }
            JobEvent::Finished(status) => {
                spinner.finish_and_clear();
                return Ok(status);
            }
        }
    }

    spinner.finish_and_clear();
    Err(anyhow!("conversion worker stopped without reporting a result"))
}

fn resolve_destination(policy: &DestinationPolicy, default_name: &str) -> Option<PathBuf> {
    match policy {
        DestinationPolicy::Fixed(path) => Some(path.clone()),
        DestinationPolicy::DefaultName => Some(PathBuf::from(default_name)),
        DestinationPolicy::Prompt => {
            let answer: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("💾 Save Firefox extension as (empty to cancel)")
                .with_initial_text(default_name)
                .allow_empty(true)
                .interact_text()
                .ok()?;
            normalize_destination(&answer)
        }
    }
}

/// Empty answer cancels; a missing extension gets `.xpi`
fn normalize_destination(answer: &str) -> Option<PathBuf> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    let mut path = PathBuf::from(answer);
    if path.extension().is_none() {
        path.set_extension("xpi");
    }
    Some(path)
}

/// Print the final status; returns the process exit code
pub fn report_status(status: &JobStatus) -> i32 {
    match status {
        JobStatus::Completed(path) => {
            println!("{}", "✅ Conversion completed successfully!".green().bold());
            println!("  - Output: {}", path.display());
            0
        }
        JobStatus::Cancelled => {
            println!("{}", "Save operation cancelled. No file was written.".yellow());
            0
        }
        JobStatus::Failed(err) => {
            eprintln!("{}", format!("❌ {}", err.title()).red().bold());
            eprintln!("{}", format!("Error: {}", err).red());
            1
        }
    }
}
