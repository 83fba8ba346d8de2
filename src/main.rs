use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use version_bump::cli::{self, UpdateWorkflowArgs};
use version_bump::config;
use version_bump::editor::EditOptions;
use version_bump::logger;
use version_bump::store::FsStore;
use version_bump::ui;

#[derive(clap::Parser)]
#[command(
    name = "version-bump",
    about = "Bump tracked version references in configuration files to the latest upstream release"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "JSON release list, newest first", required_unless_present = "version")]
    releases: Option<PathBuf>,

    #[arg(long, help = "Risk summary text to include in the body")]
    risk_summary: Option<PathBuf>,

    #[arg(long, help = "Write the change-request body to this file instead of stdout")]
    body_out: Option<PathBuf>,

    #[arg(short, long, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(long, help = "Show debug logging")]
    verbose: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

impl Args {
    fn into_workflow_args(self) -> Option<UpdateWorkflowArgs> {
        Some(UpdateWorkflowArgs {
            config_path: self.config,
            releases_path: self.releases?,
            risk_summary_path: self.risk_summary,
            body_out: self.body_out,
            force: self.force,
            dry_run: self.dry_run,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("version-bump {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    logger::init_cli_logger(args.verbose);

    let Some(args) = args.into_workflow_args() else {
        ui::display_error("--releases is required");
        std::process::exit(2);
    };

    // Load configuration
    let config = match config::load_config(args.config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }

    let dry_run = args.dry_run || config.behavior.dry_run;
    let releases = cli::load_releases(&args.releases_path)?;
    let risk_summary = cli::load_risk_summary(args.risk_summary_path.as_deref())?;
    let store = FsStore::current_dir();

    let plan = match cli::plan_update(&config, releases, &store) {
        Ok(plan) => plan,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    for warning in &plan.warnings {
        ui::display_warning(warning);
    }

    if let (Some(old), Some(new)) = (plan.current_version.as_deref(), plan.new_version.as_deref()) {
        ui::display_release_window(&plan.window, &config.app.name);
        ui::display_proposed_update(old, new);
    }

    if !plan.has_changes() {
        ui::display_success("Nothing to update");
        return Ok(());
    }

    ui::display_planned_targets(&plan.describe());

    if !args.force && !dry_run && !ui::confirm_action("Apply these changes?")? {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    let options = EditOptions { dry_run };
    let result = match cli::run_update(&config, &plan, &store, &options, risk_summary.as_deref()) {
        Ok(result) => result,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    for record in &result.records {
        ui::display_mutation(record);
    }
    for warning in result.warnings.iter().skip(plan.warnings.len()) {
        ui::display_warning(warning);
    }
    if result.removed_blocks > 0 {
        ui::display_success(&format!("Removed {} block(s)", result.removed_blocks));
    }

    if let Some(body) = &result.body {
        match &args.body_out {
            Some(path) => {
                fs::write(path, body)
                    .with_context(|| format!("Failed to write body to '{}'", path.display()))?;
                ui::display_success(&format!("Wrote change-request body to {}", path.display()));
            }
            None => println!("\n{}", body),
        }
    }

    if dry_run {
        ui::display_status("Dry run: no files were changed");
    } else {
        ui::display_success("Update applied");
    }

    Ok(())
}
