use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use pipctl::config::Settings;
use pipctl::logging::init_logging;
use pipctl::pip::{supports_mirrors, ArgList, ExistsAction};
use pipctl::{InstallOutcome, InstallRequest, Pip, UninstallRequest};

#[derive(Parser)]
#[command(name = "pipctl")]
#[command(version)]
#[command(about = "Install and inspect Python packages through pip", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, help = "Enable verbose output", global = true)]
    verbose: bool,

    #[arg(long, help = "Path to a JSON config file", global = true)]
    config: Option<PathBuf>,

    #[arg(long, help = "Print results as JSON", global = true)]
    json: bool,
}

#[derive(Args)]
struct Target {
    #[arg(long, help = "Virtualenv root, or path of the pip binary to use")]
    bin_env: Option<PathBuf>,

    #[arg(long, help = "Run pip as this user")]
    runas: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Install packages")]
    Install {
        #[arg(help = "Packages to install")]
        packages: Vec<String>,

        #[arg(short, long, help = "Requirements file path or salt:// / http(s):// URI")]
        requirements: Option<String>,

        #[arg(long, help = "Comma-separated mirror URLs")]
        mirrors: Option<String>,

        #[arg(long, help = "Source the virtualenv's activate script first")]
        activate: bool,

        #[arg(long, help = "Working directory for pip")]
        cwd: Option<PathBuf>,

        #[arg(short, long, help = "Editable source (VCS URL with #egg= or local path)")]
        editable: Vec<String>,

        #[arg(long)]
        index_url: Option<String>,

        #[arg(long)]
        extra_index_url: Option<String>,

        #[arg(long)]
        find_links: Option<String>,

        #[arg(long)]
        no_index: bool,

        #[arg(long)]
        proxy: Option<String>,

        #[arg(long, help = "Socket timeout in seconds")]
        timeout: Option<u64>,

        #[arg(long, help = "Append pip's verbose log to this file")]
        log: Option<String>,

        #[arg(long, help = "Directory to unpack and build packages in")]
        build: Option<String>,

        #[arg(long = "target", help = "Install packages into this directory")]
        target_dir: Option<String>,

        #[arg(long)]
        download_cache: Option<String>,

        #[arg(
            long = "install-option",
            allow_hyphen_values = true,
            help = "Option passed to setup.py install (repeatable)"
        )]
        install_options: Vec<String>,

        #[arg(short = 'U', long)]
        upgrade: bool,

        #[arg(long)]
        force_reinstall: bool,

        #[arg(long)]
        ignore_installed: bool,

        #[arg(long, help = "Action when a path already exists: s, i, w or b")]
        exists_action: Option<ExistsAction>,

        #[arg(long)]
        no_deps: bool,

        #[command(flatten)]
        target: Target,
    },

    #[command(about = "Uninstall packages")]
    Uninstall {
        #[arg(help = "Packages to uninstall")]
        packages: Vec<String>,

        #[arg(short, long)]
        requirements: Option<String>,

        #[arg(long)]
        cwd: Option<PathBuf>,

        #[arg(long)]
        proxy: Option<String>,

        #[arg(long, help = "Socket timeout in seconds")]
        timeout: Option<u64>,

        #[command(flatten)]
        target: Target,
    },

    #[command(about = "Print installed packages in requirements format")]
    Freeze {
        #[command(flatten)]
        target: Target,
    },

    #[command(about = "List installed packages and versions")]
    List {
        #[arg(help = "Only show packages starting with this prefix")]
        prefix: Option<String>,

        #[command(flatten)]
        target: Target,
    },

    #[command(about = "Show the pip version")]
    Version {
        #[arg(long)]
        bin_env: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let settings = Settings::load(cli.config.as_deref())?;
    let pip = Pip::from_settings(&settings).context("Failed to set up pip module")?;

    match cli.command {
        Commands::Install {
            packages,
            requirements,
            mirrors,
            activate,
            cwd,
            editable,
            index_url,
            extra_index_url,
            find_links,
            no_index,
            proxy,
            timeout,
            log,
            build,
            target_dir,
            download_cache,
            install_options,
            upgrade,
            force_reinstall,
            ignore_installed,
            exists_action,
            no_deps,
            target,
        } => {
            let request = InstallRequest {
                packages: ArgList::from(packages),
                requirements,
                bin_env: target.bin_env,
                activate,
                proxy,
                timeout,
                editable: ArgList::from(editable),
                find_links,
                index_url,
                extra_index_url,
                no_index,
                mirrors: mirrors.map(ArgList::from).unwrap_or_default(),
                log,
                build,
                target: target_dir,
                download_cache,
                install_options: ArgList::from(install_options),
                upgrade,
                force_reinstall,
                ignore_installed,
                exists_action,
                no_deps,
                runas: target.runas,
                cwd,
            };

            let outcome = with_spinner("Installing", || pip.install(&request))?;
            report(&outcome, cli.json)?;
        }
        Commands::Uninstall {
            packages,
            requirements,
            cwd,
            proxy,
            timeout,
            target,
        } => {
            let request = UninstallRequest {
                packages: ArgList::from(packages),
                requirements,
                bin_env: target.bin_env,
                proxy,
                timeout,
                runas: target.runas,
                cwd,
            };

            let outcome = with_spinner("Uninstalling", || pip.uninstall(&request))?;
            report(&outcome, cli.json)?;
        }
        Commands::Freeze { target } => {
            let lines = pip.freeze(target.bin_env.as_deref(), target.runas.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                for line in lines {
                    println!("{line}");
                }
            }
        }
        Commands::List { prefix, target } => {
            let packages = pip.list(
                prefix.as_deref(),
                target.bin_env.as_deref(),
                target.runas.as_deref(),
            )?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&packages)?);
            } else {
                for (name, version) in &packages {
                    println!("{} {}", name.cyan(), version.dimmed());
                }
            }
        }
        Commands::Version { bin_env } => {
            let version = pip.version(bin_env.as_deref())?;
            let mirrors = supports_mirrors(&version);
            if cli.json {
                let value = serde_json::json!({ "version": version, "mirrors": mirrors });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("pip {}", version.green());
                if !mirrors {
                    println!(
                        "{} this pip no longer accepts --use-mirrors/--mirrors",
                        "⚠".yellow()
                    );
                }
            }
        }
    }

    Ok(())
}

fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("{message}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let value = f();
    spinner.finish_and_clear();
    Ok(value)
}

fn report(outcome: &InstallOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else if outcome.result {
        println!("{} {}", "✓".green(), "Success".green().bold());
        if !outcome.comment.is_empty() {
            println!("{}", outcome.comment);
        }
    } else {
        eprintln!("{} {}", "✗".red(), "Failed".red().bold());
        eprintln!("{}", outcome.comment);
    }

    if !outcome.result {
        std::process::exit(1);
    }
    Ok(())
}
