use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use time::OffsetDateTime;
use time::macros::format_description;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    Zsh,
}

impl Shell {
    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every file the repair touches, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPaths {
    pub history: PathBuf,
    pub backup: PathBuf,
    pub cleaned: PathBuf,
    pub rc: PathBuf,
}

impl HistoryPaths {
    pub fn resolve(home: &Path, shell: Shell, stamp: &str) -> Self {
        let name = shell.name();
        Self {
            history: home.join(format!(".{name}_history")),
            backup: home.join(format!(".{name}_history_backup_{stamp}")),
            cleaned: home.join(format!(".{name}_history_clean")),
            rc: home.join(format!(".{name}rc")),
        }
    }
}

/// `YYYYMMDDHHMMSS` in local time, UTC when the local offset is unknown.
pub fn backup_stamp(now: OffsetDateTime) -> String {
    let fmt = format_description!("[year][month][day][hour][minute][second]");
    now.format(fmt).unwrap_or_default()
}

pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleaner {
    /// External `strings`-compatible program; its stdout becomes the cleaned file.
    External { program: String },
    /// In-process printable run extraction.
    Builtin { min_len: usize },
}

impl fmt::Display for Cleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cleaner::External { program } => write!(f, "{program}"),
            Cleaner::Builtin { min_len } => write!(f, "builtin filter (min length {min_len})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepairConfig {
    pub shell: Shell,
    pub paths: HistoryPaths,
    pub dry_run: bool,
    pub cleaner: Cleaner,
    pub refuse_empty: bool,
    pub show_banner: bool,
    pub show_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn paths_follow_shell_naming() {
        let paths = HistoryPaths::resolve(Path::new("/home/u"), Shell::Zsh, "20240102030405");
        assert_eq!(paths.history, PathBuf::from("/home/u/.zsh_history"));
        assert_eq!(
            paths.backup,
            PathBuf::from("/home/u/.zsh_history_backup_20240102030405")
        );
        assert_eq!(paths.cleaned, PathBuf::from("/home/u/.zsh_history_clean"));
        assert_eq!(paths.rc, PathBuf::from("/home/u/.zshrc"));
    }

    #[test]
    fn stamp_is_zero_padded() {
        let stamp = backup_stamp(datetime!(2024-01-02 03:04:05 UTC));
        assert_eq!(stamp, "20240102030405");
    }
}
