use clap::{Parser, Subcommand};
use ontology_site::config::{self, ConfigError};
use ontology_site::convert::{self, ConvertError, ConvertJob};
use ontology_site::output;
use ontology_site::provision::{self, ProvisionError, Venv};
use ontology_site::publish::{self, PublishError, PublishJob};
use ontology_site::runner::{self, RunError, SystemRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "ontology-site")]
#[command(about = "Provision the ontology toolchain and publish the deployment directory")]
#[command(long_about = "\
Provision the ontology toolchain and publish the deployment directory

Layout, relative to --root:

  <root>/
  ├── venv/                        # created by `provision`
  ├── convert_ontologies.py        # run by `convert`
  ├── ../src/                      # ontology sources read by `convert`
  └── ../deployment/               # written by `convert`, published by `publish`
      ├── index.html               # regenerated on every publish
      ├── hashgraph.ttl            # artefacts (top-level files)
      └── docs/                    # additional directories

Environment:
  PYTHON_BIN      interpreter for provision            (python3.12)
  DEPLOYMENT_DIR  directory to publish                 (<root>/../deployment)
  TARGET_ROOT     web root                             (/var/www)
  USE_SUDO        \"false\" (any case) disables sudo     (true)
  RSYNC_BIN       mirror-copy program                  (rsync)
  WEB_USER        owner of the published tree          (www-data)
  WEB_GROUP       group of the published tree          (www-data)

Run 'ontology-site gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Tool root: holds venv/ and is the base for relative paths
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Optional TOML config file (environment variables still override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or reuse <root>/venv and install the ontology libraries
    Provision,
    /// Convert the ontology sources into deployment artefacts using <root>/venv
    Convert(ConvertArgs),
    /// Regenerate index.html and mirror the deployment directory to the web root
    Publish(PublishArgs),
    /// Regenerate index.html only, without syncing
    Render,
    /// Print a stock config file with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Directory searched recursively for sources [default: ../src]
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Extension of the source files [default: ttl]
    #[arg(long)]
    basis: Option<String>,

    /// HTML template for the catalogue pages [default: the script's own]
    #[arg(long)]
    template: Option<PathBuf>,
}

#[derive(clap::Args)]
struct PublishArgs {
    /// Site directory under the target root [default: hashgraphontology.xyz]
    site: Option<String>,

    /// Write index.html and show the sync commands without running them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 1,
            CliError::Provision(e) => e.exit_code(),
            CliError::Convert(e) => e.exit_code(),
            CliError::Publish(e) => e.exit_code(),
        }
    }

    /// A collaborator that ran and failed has already said why.
    fn already_reported(&self) -> bool {
        matches!(
            self,
            CliError::Provision(ProvisionError::Command(RunError::Failed { .. }))
                | CliError::Convert(ConvertError::Command(RunError::Failed { .. }))
                | CliError::Publish(PublishError::Command(RunError::Failed { .. }))
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !err.already_reported() {
                output::print_warning(&err.to_string());
            }
            let code = u8::try_from(err.exit_code())
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let load = || config::resolve(cli.config.as_deref(), |key| std::env::var(key).ok());
    let venv = || Venv::at(&cli.root, std::env::var_os("PATH"));

    match cli.command {
        Command::Provision => {
            let settings = load()?;
            provision::provision(
                &settings.provision,
                &venv(),
                &SystemRunner,
                &runner::find_on_path,
            )?;
        }
        Command::Convert(args) => {
            let mut settings = load()?;
            if let Some(dir) = args.source_dir {
                settings.convert.source_dir = dir;
            }
            if let Some(basis) = args.basis {
                settings.convert.basis = basis;
            }
            if let Some(template) = args.template {
                settings.convert.template = Some(template);
            }
            settings.validate()?;
            let env = venv();
            let job = ConvertJob::new(
                &settings.convert,
                &cli.root,
                settings.publish.source_dir(&cli.root),
                &env,
            );
            convert::convert(&job, &SystemRunner)?;
        }
        Command::Publish(args) => {
            let mut settings = load()?;
            if let Some(site) = args.site {
                settings.publish.site = site;
                settings.validate()?;
            }
            let job = PublishJob {
                config: &settings.publish,
                source: settings.publish.source_dir(&cli.root),
                dry_run: args.dry_run,
            };
            publish::publish(&job, &SystemRunner)?;
        }
        Command::Render => {
            let settings = load()?;
            publish::render(&settings.publish.source_dir(&cli.root))?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
