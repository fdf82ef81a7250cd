use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pocus::config;
use pocus::installer::Pocus;
use pocus::php::CacheState;

#[derive(Parser)]
#[command(name = "pocus")]
#[command(version, about = "Install and run PHP packages with a matching static PHP build")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install a Packagist package or GitHub repository
    Install {
        /// `vendor/name` or `https://github.com/<owner>/<repo>`
        package: String,
    },
    /// Run a bin script of a package, installing it first if needed
    Run {
        package: String,
        /// Script in vendor/bin; defaults to the package name
        script: Option<String>,
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Run a PHP file with the newest PHP satisfying a constraint
    Php {
        /// Constraint such as `^8.1` or `>=7.4 <8.3`
        constraint: String,
        file: PathBuf,
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Show which PHP version a constraint resolves to
    Resolve { constraint: String },
    /// List cached PHP versions
    List,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let data_dir = config::data_dir();
    let _guard = pocus::logging::init(&data_dir)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, data_dir))
}

async fn run(command: Command, data_dir: PathBuf) -> anyhow::Result<ExitCode> {
    let pocus = Pocus::from_data_dir(data_dir)?;

    match command {
        Command::Install { package } => {
            let installation = pocus.install(&package).await?;
            println!(
                "Installed {} with PHP {} in {}",
                package,
                installation.version,
                installation.workspace.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            package,
            script,
            args,
        } => {
            let code = pocus.run(&package, script.as_deref(), &args).await?;
            Ok(exit_code(code))
        }
        Command::Php {
            constraint,
            file,
            args,
        } => {
            let code = pocus.run_file(&constraint, &file, &args).await?;
            Ok(exit_code(code))
        }
        Command::Resolve { constraint } => {
            let version = pocus.resolve(&constraint)?;
            let state = match pocus.state(&version) {
                CacheState::Ready => "cached",
                CacheState::Downloading => "downloading",
                CacheState::Missing => "not cached",
            };
            println!("{version} ({}, {state})", pocus.platform());
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            for version in pocus.installed_versions() {
                println!("{version}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
