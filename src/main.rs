//! sbom-reconcile: CycloneDX SBOM reconciliation against a component catalog
//!
//! Imports BOMs into a catalog snapshot and exports projects back to BOMs.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sbom_reconcile::{
    cli::{self, ExportOptions, ImportOptions},
    codec::BomFormat,
    config::{self, ConfigPreset, ReconcileConfig, Validatable},
    model::{User, UserRole},
    pipeline::exit_codes,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sbom-reconcile")]
#[command(version)]
#[command(about = "Reconcile CycloneDX SBOMs with a component catalog", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Request succeeded
    1  Request rejected (access denied, duplicate project, sanity check, failure)
    3  Error occurred

EXAMPLES:
    # Import a BOM into a new project
    sbom-reconcile import bom.cdx.json --catalog catalog.json

    # Re-import into an existing project, keeping its links
    sbom-reconcile import bom.cdx.json --catalog catalog.json --project-id <ID> --merge-links

    # Export a project as CycloneDX XML
    sbom-reconcile export <ID> --catalog catalog.json --format xml -O bom.xml")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration preset applied before command flags (default, release-only, merge)
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Caller identity shared by `import` and `export`
#[derive(Parser)]
struct UserArgs {
    /// Email of the calling user
    #[arg(long, env = "SBOM_RECONCILE_USER", default_value = "admin@localhost")]
    user: String,

    /// Role of the calling user (user, clearing-expert, clearing-admin, admin)
    #[arg(long, default_value = "admin")]
    role: String,

    /// Department of the calling user
    #[arg(long)]
    department: Option<String>,
}

impl UserArgs {
    fn into_user(self) -> Result<User> {
        let role = UserRole::from_name(&self.role)
            .with_context(|| format!("Unknown role: {}", self.role))?;
        let user = User::new(self.user, role);
        Ok(match self.department {
            Some(department) => user.with_department(department),
            None => user,
        })
    }
}

/// Arguments for the `import` subcommand
#[derive(Parser)]
struct ImportArgs {
    /// CycloneDX file (.json or .xml)
    bom: PathBuf,

    /// Catalog snapshot (created when missing)
    #[arg(long)]
    catalog: PathBuf,

    /// Import into this existing project instead of creating one
    #[arg(long)]
    project_id: Option<String>,

    /// Keep existing project links and only add new ones
    #[arg(long)]
    merge_links: bool,

    /// Import every component as a release, without packages
    #[arg(long)]
    release_only: bool,

    /// Do not attach the SBOM and import report to the project
    #[arg(long)]
    no_attachments: bool,

    /// Attachment directory (default: attachments/ next to the catalog)
    #[arg(long)]
    attachments_dir: Option<PathBuf>,

    #[command(flatten)]
    user: UserArgs,

    /// Report file (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

/// Arguments for the `export` subcommand
#[derive(Parser)]
struct ExportArgs {
    /// Project to export
    project_id: String,

    /// Catalog snapshot
    #[arg(long)]
    catalog: PathBuf,

    /// Output format
    #[arg(long, default_value = "json")]
    format: BomFormat,

    /// Include releases and packages of linked sub-projects
    #[arg(long)]
    include_sub_projects: bool,

    /// Keep non-SPDX license ids as license names
    #[arg(long)]
    lenient_licenses: bool,

    /// Attach the exported document to the project
    #[arg(long)]
    attach: bool,

    /// Attachment directory (default: attachments/ next to the catalog)
    #[arg(long)]
    attachments_dir: Option<PathBuf>,

    #[command(flatten)]
    user: UserArgs,

    /// Output file (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CycloneDX SBOM into the catalog
    Import(ImportArgs),

    /// Export a project as a CycloneDX SBOM
    Export(ExportArgs),

    /// Print canonical VCS identities of repository URLs
    Normalize {
        /// Repository URLs
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Print the VCS grouping of a SBOM's components
    Group {
        /// CycloneDX file (.json or .xml)
        bom: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Print the JSON schema of the configuration file
    ConfigSchema {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .sbom-reconcile.yaml in the current directory
    Init,
}

/// Load the configuration file (or a preset) and reject invalid values.
fn load_config(path: Option<&std::path::Path>, preset: Option<&str>) -> Result<ReconcileConfig> {
    let config = match preset {
        Some(name) => {
            let preset = ConfigPreset::from_name(name)
                .with_context(|| format!("Unknown preset: {name}"))?;
            ReconcileConfig::from_preset(preset)
        }
        None => {
            let (config, loaded_from) = config::load_or_default(path);
            if let Some(path) = loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }
            config
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }
    Ok(config)
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Import(args) => {
            let mut config = load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            if args.merge_links {
                config.import.do_not_replace_package_and_release = true;
            }
            if args.release_only {
                config.import.package_mode = false;
            }
            if args.no_attachments {
                config.import.attach_sbom = false;
                config.import.attach_import_report = false;
            }
            let options = ImportOptions {
                bom: args.bom,
                catalog: args.catalog,
                project_id: args.project_id,
                attachments_dir: args.attachments_dir,
                user: args.user.into_user()?,
                output_file: args.output_file,
                quiet: cli.quiet,
            };
            cli::run_import(options, &config)
        }

        Commands::Export(args) => {
            let mut config = load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            if args.include_sub_projects {
                config.export.include_sub_projects = true;
            }
            if args.lenient_licenses {
                config.export.strict_spdx_licenses = false;
            }
            if args.attach {
                config.export.attach_to_project = true;
            }
            let options = ExportOptions {
                project_id: args.project_id,
                catalog: args.catalog,
                format: args.format,
                attachments_dir: args.attachments_dir,
                user: args.user.into_user()?,
                output_file: args.output_file,
                quiet: cli.quiet,
            };
            cli::run_export(options, &config)
        }

        Commands::Normalize { urls, output_file } => {
            cli::run_normalize(&urls, output_file)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Group { bom, output_file } => {
            let config = load_config(cli.config.as_deref(), cli.preset.as_deref())?;
            cli::run_group(bom, &config.import, output_file)?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            run_config_action(action, cli.config.as_deref())?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_config_action(action: ConfigAction, explicit: Option<&std::path::Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let (config, loaded_from) = config::load_or_default(explicit);
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 3] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                ::dirs::config_dir().map(|p| p.join("sbom-reconcile").display().to_string()),
                ::dirs::home_dir().map(|p| p.display().to_string()),
            ];
            eprintln!("Config file search paths (in order):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            match config::discover_config_file(explicit) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".sbom-reconcile.yaml");
            if target.exists() {
                anyhow::bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            std::fs::write(&target, config::generate_example_config())
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
        }
    }
    Ok(())
}
