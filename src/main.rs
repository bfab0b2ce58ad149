use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use virgil::generators::{Backend, StandardBackend};
use virgil::run::{PlanStatus, RunOptions};
use virgil::{config, hash, output, run};

fn version_string() -> &'static str {
    let on_tag = env!("VIRGIL_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("VIRGIL_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "virgil")]
#[command(about = "Incremental builds for og-images, sitemaps and robots.txt")]
#[command(long_about = "\
Incremental builds for og-images, sitemaps and robots.txt

Declare the outputs a site needs in virgil.spec.json. Each build
fingerprints every declaration and regenerates only the ones that changed
since the last successful build.

Project layout:

  site/
  ├── virgil.toml            # Optional settings (see 'virgil gen-config')
  ├── virgil.spec.json       # Declared outputs (you write this)
  ├── virgil.lock.json       # Fingerprint per output (commit it)
  ├── virgil.manifest.json   # Public path per output (read it from templates)
  ├── templates/card.html    # Optional og-image template
  └── public/
      ├── og/home.3f2a9c1b7e4d.png
      ├── sitemap.xml
      └── robots.txt

Set RUST_LOG=debug for diagnostics.")]
#[command(version = version_string())]
struct Cli {
    /// Project root containing virgil.spec.json
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate every output whose declaration changed
    Build {
        /// Artifact directory, relative to --root (defaults to paths.output from virgil.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print each output as it is generated or skipped
        #[arg(short, long)]
        verbose: bool,
    },
    /// Report which outputs are fresh, stale, or invalid without building
    Check,
    /// Print the fingerprint of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },
    /// Print a stock virgil.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            output: output_dir,
            verbose,
        } => {
            let config = config::load_config(&cli.root)?;
            let mut options = RunOptions::new(&cli.root, config);
            options.verbose = verbose;
            if let Some(dir) = output_dir {
                options.output_dir = cli.root.join(dir);
            }

            let result = run::run(&options)?;
            output::print_run_summary(&result);
            if !result.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.root)?;
            let options = RunOptions::new(&cli.root, config);
            let backend = StandardBackend::new(options.config.og_image.clone());
            let items = run::plan(&options, backend.version())?;
            output::print_plan(&items);
            if items
                .iter()
                .any(|item| matches!(item.status, PlanStatus::Invalid(_)))
            {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Hash { file } => {
            println!("{}", hash::hash_file(&file)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
