use crate::config::Settings;
use crate::domain::{Cleaner, HistoryPaths, RepairConfig, Shell, backup_stamp, now_local};
use crate::output::{self, ColorMode};
use crate::pipeline::StepOutcome;
use crate::prompt::stdio_prompter;
use crate::{pipeline, sanitize, shell};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "histfix",
    version,
    about = "Repair a corrupted bash/zsh history file"
)]
pub struct Cli {
    /// Narrate every step without prompting or touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Home directory holding the history files (defaults to $HOME)
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Skip $SHELL detection
    #[arg(long, value_enum)]
    pub shell: Option<Shell>,

    /// External filter program (default: strings)
    #[arg(long, conflicts_with = "builtin_filter")]
    pub strings_bin: Option<String>,

    /// Filter in-process instead of running an external program
    #[arg(long)]
    pub builtin_filter: bool,

    /// Minimum printable run length kept by the builtin filter
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub min_len: Option<usize>,

    /// Abort when the cleaned history comes out empty
    #[arg(long)]
    pub refuse_empty: bool,

    /// Settings file (defaults to ~/.histfix.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub no_banner: bool,

    #[arg(long)]
    pub no_progress: bool,

    #[arg(long, value_enum)]
    pub color: Option<ColorMode>,
}

pub fn run(cli: Cli) -> Result<()> {
    let cfg = build_config(&cli)?;

    if cfg.show_banner {
        output::banner();
    }
    output::header(&format!(
        "Starting secure {} history repair process...",
        cfg.shell
    ));
    tracing::debug!(?cfg, "resolved configuration");

    let report = pipeline::run(&cfg, stdio_prompter())?;
    if report.outcome("cleanup") == Some(StepOutcome::Failed) {
        tracing::warn!(path = %cfg.paths.backup.display(), "backup left on disk");
    }
    tracing::debug!(?report, "repair finished");
    Ok(())
}

fn build_config(cli: &Cli) -> Result<RepairConfig> {
    let home = match &cli.home {
        Some(home) => home.clone(),
        None => dirs::home_dir().context("could not determine home directory")?,
    };

    let settings = match &cli.config {
        Some(path) => Settings::load(path, true)?,
        None => Settings::load(&Settings::default_path(&home), false)?,
    };

    output::apply_color_mode(cli.color.or(settings.color).unwrap_or_default());

    let shell = match cli.shell.or(settings.shell) {
        Some(shell) => shell,
        None => shell::detect_from_env()?,
    };

    let paths = HistoryPaths::resolve(&home, shell, &backup_stamp(now_local()));

    Ok(RepairConfig {
        shell,
        paths,
        dry_run: cli.dry_run,
        cleaner: select_cleaner(cli, &settings),
        refuse_empty: cli.refuse_empty || settings.refuse_empty.unwrap_or(false),
        show_banner: !cli.no_banner && settings.banner.unwrap_or(true),
        show_progress: !cli.no_progress && settings.progress.unwrap_or(true),
    })
}

fn select_cleaner(cli: &Cli, settings: &Settings) -> Cleaner {
    let builtin = cli.builtin_filter
        || (cli.strings_bin.is_none() && settings.builtin_filter.unwrap_or(false));

    if builtin {
        let min_len = cli
            .min_len
            .or(settings.min_len)
            .unwrap_or(sanitize::DEFAULT_MIN_LEN);
        Cleaner::Builtin { min_len }
    } else {
        let program = cli
            .strings_bin
            .clone()
            .or_else(|| settings.strings_bin.clone())
            .unwrap_or_else(|| "strings".to_string());
        Cleaner::External { program }
    }
}
