use std::path::Path;

use anyhow::Result;

use crate::domain::RepairConfig;
use crate::error::RepairError;
use crate::output;
use crate::prompt::Prompter;
use crate::stages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the whole run.
    Fatal,
    /// Warn and continue with the next step.
    Advisory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Simulated,
    Declined,
    Missing,
    Failed,
}

/// One confirm-then-act unit of the repair.
struct Step<'a> {
    name: &'static str,
    progress: String,
    prompt: String,
    /// What the step would do, shown in dry-run mode.
    plan: String,
    skipped: String,
    requires: Option<(&'a Path, String)>,
    severity: Severity,
}

#[derive(Debug, Default)]
pub struct Report {
    pub steps: Vec<(&'static str, StepOutcome)>,
}

impl Report {
    pub fn outcome(&self, name: &str) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, outcome)| *outcome)
    }
}

pub struct Pipeline<'c, P> {
    cfg: &'c RepairConfig,
    prompter: P,
    report: Report,
}

impl<'c, P: Prompter> Pipeline<'c, P> {
    pub fn new(cfg: &'c RepairConfig, prompter: P) -> Self {
        Self {
            cfg,
            prompter,
            report: Report::default(),
        }
    }

    fn run_step(
        &mut self,
        step: Step<'_>,
        action: impl FnOnce() -> Result<String>,
    ) -> Result<StepOutcome> {
        output::progress(&step.progress, self.cfg.show_progress);

        let outcome = self.gate_and_act(&step, action)?;
        tracing::info!(step = step.name, ?outcome, "step finished");
        self.report.steps.push((step.name, outcome));
        Ok(outcome)
    }

    fn gate_and_act(
        &mut self,
        step: &Step<'_>,
        action: impl FnOnce() -> Result<String>,
    ) -> Result<StepOutcome> {
        if let Some((path, missing)) = &step.requires
            && !path.exists()
        {
            output::warning(missing);
            return Ok(StepOutcome::Missing);
        }

        if self.cfg.dry_run {
            output::warning(&format!("[dry-run] Would {}.", step.plan));
            return Ok(StepOutcome::Simulated);
        }

        if !self.prompter.confirm(&step.prompt)? {
            output::warning(&step.skipped);
            return Ok(StepOutcome::Declined);
        }

        match action() {
            Ok(done) => {
                output::success(&done);
                Ok(StepOutcome::Done)
            }
            Err(source) => match step.severity {
                Severity::Fatal => Err(RepairError::Stage {
                    stage: step.name,
                    source,
                }
                .into()),
                Severity::Advisory => {
                    output::fail(&format!("Error during {}: {source:#}", step.name));
                    Ok(StepOutcome::Failed)
                }
            },
        }
    }

    pub fn backup(&mut self) -> Result<StepOutcome> {
        let cfg = self.cfg;
        let (shell, paths) = (cfg.shell, &cfg.paths);
        self.run_step(
            Step {
                name: "backup",
                progress: format!("Backing up the {shell} history file"),
                prompt: format!("Are you sure you want to backup the {shell} history file?"),
                plan: format!(
                    "copy {} to {}",
                    paths.history.display(),
                    paths.backup.display()
                ),
                skipped: "Backup skipped.".to_string(),
                requires: Some((
                    &paths.history,
                    format!("No {shell} history file found to backup."),
                )),
                severity: Severity::Fatal,
            },
            || {
                let bytes = stages::backup(&paths.history, &paths.backup)?;
                tracing::debug!(bytes, "backup written");
                Ok(format!("Backup created: {}", paths.backup.display()))
            },
        )
    }

    pub fn clean(&mut self) -> Result<StepOutcome> {
        let cfg = self.cfg;
        let (shell, paths) = (cfg.shell, &cfg.paths);
        self.run_step(
            Step {
                name: "clean",
                progress: format!("Cleaning the {shell} history file"),
                prompt: format!("Are you sure you want to clean the {shell} history file?"),
                plan: format!(
                    "filter {} through {} into {}",
                    paths.history.display(),
                    cfg.cleaner,
                    paths.cleaned.display()
                ),
                skipped: "Cleaning skipped.".to_string(),
                requires: None,
                severity: Severity::Fatal,
            },
            || {
                stages::clean(&cfg.cleaner, &paths.history, &paths.cleaned, cfg.refuse_empty)?;
                Ok(format!("Cleaned history created: {}", paths.cleaned.display()))
            },
        )
    }

    pub fn replace(&mut self) -> Result<StepOutcome> {
        let cfg = self.cfg;
        let (shell, paths) = (cfg.shell, &cfg.paths);
        self.run_step(
            Step {
                name: "replace",
                progress: format!(
                    "Replacing the {shell} history file with the cleaned version"
                ),
                prompt: format!("Are you sure you want to replace the {shell} history file?"),
                plan: format!(
                    "move {} onto {}",
                    paths.cleaned.display(),
                    paths.history.display()
                ),
                skipped: "Replacement skipped.".to_string(),
                requires: Some((&paths.cleaned, "Cleaned history file not found.".to_string())),
                severity: Severity::Fatal,
            },
            || {
                stages::replace(&paths.cleaned, &paths.history)?;
                Ok(format!("Replaced {shell} history with cleaned version."))
            },
        )
    }

    pub fn permissions(&mut self) -> Result<StepOutcome> {
        let cfg = self.cfg;
        let (shell, paths) = (cfg.shell, &cfg.paths);
        self.run_step(
            Step {
                name: "permissions",
                progress: format!("Setting correct permissions for {shell} history file"),
                prompt: format!("Are you sure you want to set permissions for {shell} history?"),
                plan: format!("set mode 600 on {}", paths.history.display()),
                skipped: "Permission change skipped.".to_string(),
                requires: None,
                severity: Severity::Fatal,
            },
            || {
                stages::restrict_permissions(&paths.history)?;
                Ok(format!("Permission set to 600 for {shell} history."))
            },
        )
    }

    pub fn reload(&mut self) -> Result<StepOutcome> {
        let cfg = self.cfg;
        let (shell, rc) = (cfg.shell, &cfg.paths.rc);
        self.run_step(
            Step {
                name: "reload",
                progress: "Sourcing the shell configuration file".to_string(),
                prompt: format!("Are you sure you want to source {}?", rc.display()),
                plan: format!("source {} with {}", rc.display(), shell.name()),
                skipped: format!("Sourcing of {} skipped.", rc.display()),
                requires: Some((
                    rc,
                    format!("{} file not found, skipping sourcing.", rc.display()),
                )),
                severity: Severity::Advisory,
            },
            || {
                stages::source_rc(shell, rc)?;
                Ok(format!("Sourced {} successfully.", rc.display()))
            },
        )
    }

    /// Remove the backup after a live run. Never changes the exit status.
    pub fn cleanup(&mut self) -> StepOutcome {
        let backup = &self.cfg.paths.backup;
        let outcome = if !backup.exists() {
            StepOutcome::Missing
        } else {
            match stages::remove_backup(backup) {
                Ok(()) => {
                    output::success(&format!("Backup file deleted: {}", backup.display()));
                    StepOutcome::Done
                }
                Err(err) => {
                    output::fail(&format!("Error deleting backup file: {err:#}"));
                    StepOutcome::Failed
                }
            }
        };
        self.report.steps.push(("cleanup", outcome));
        outcome
    }

    pub fn into_report(self) -> Report {
        self.report
    }
}

/// Run every step in order, stopping at the first fatal error.
pub fn run<P: Prompter>(cfg: &RepairConfig, prompter: P) -> Result<Report> {
    let mut pipeline = Pipeline::new(cfg, prompter);

    pipeline.backup()?;
    pipeline.clean()?;
    pipeline.replace()?;
    pipeline.permissions()?;
    pipeline.reload()?;

    if cfg.dry_run {
        output::success("Dry run completed. No changes made.");
    } else {
        pipeline.cleanup();
        output::success("Process completed successfully!");
    }
    Ok(pipeline.into_report())
}
