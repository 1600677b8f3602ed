//! Filesystem and process actions behind each pipeline step.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::domain::{Cleaner, Shell};
use crate::sanitize;

pub fn backup(history: &Path, backup: &Path) -> Result<u64> {
    fs::copy(history, backup).with_context(|| {
        format!(
            "copying {} to {}",
            history.display(),
            backup.display()
        )
    })
}

/// Write the printable content of `history` to `cleaned`. A failed run never
/// leaves a partial cleaned file behind.
pub fn clean(cleaner: &Cleaner, history: &Path, cleaned: &Path, refuse_empty: bool) -> Result<()> {
    let result = run_cleaner(cleaner, history, cleaned).and_then(|()| {
        if refuse_empty && fs::metadata(cleaned)?.len() == 0 {
            anyhow::bail!("cleaned output {} is empty", cleaned.display());
        }
        Ok(())
    });

    if result.is_err() && cleaned.exists() {
        if let Err(err) = fs::remove_file(cleaned) {
            tracing::warn!(path = %cleaned.display(), %err, "could not remove partial cleaned file");
        }
    }
    result
}

fn run_cleaner(cleaner: &Cleaner, history: &Path, cleaned: &Path) -> Result<()> {
    let out = File::create(cleaned)
        .with_context(|| format!("creating {}", cleaned.display()))?;

    match cleaner {
        Cleaner::External { program } => {
            tracing::debug!(%program, history = %history.display(), "running external filter");
            let status = Command::new(program)
                .arg(history)
                .stdin(Stdio::null())
                .stdout(Stdio::from(out))
                .status()
                .with_context(|| format!("launching {program}"))?;
            if !status.success() {
                match status.code() {
                    Some(code) => anyhow::bail!("{program} exited with return code {code}"),
                    None => anyhow::bail!("{program} was terminated by a signal"),
                }
            }
        }
        Cleaner::Builtin { min_len } => {
            let input = File::open(history)
                .with_context(|| format!("opening {}", history.display()))?;
            let runs = sanitize::extract_printable(input, io::BufWriter::new(out), *min_len)
                .with_context(|| format!("filtering {}", history.display()))?;
            tracing::debug!(runs, "builtin filter finished");
        }
    }
    Ok(())
}

/// Move `from` onto `to`, copying across filesystems when rename cannot.
pub fn replace(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(%err, "rename crosses devices; copying instead");
            move_by_copy(from, to)
        }
        Err(err) => Err(err)
            .with_context(|| format!("moving {} to {}", from.display(), to.display())),
    }
}

fn move_by_copy(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
    fs::remove_file(from).with_context(|| format!("removing {}", from.display()))
}

#[cfg(unix)]
pub fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("setting mode 600 on {}", path.display()))
}

#[cfg(not(unix))]
pub fn restrict_permissions(path: &Path) -> Result<()> {
    anyhow::bail!(
        "owner-only permissions are not supported on this platform ({})",
        path.display()
    )
}

pub fn source_rc(shell: Shell, rc: &Path) -> Result<()> {
    let status = Command::new(shell.name())
        .args(["-c", "source \"$1\"", "histfix"])
        .arg(rc)
        .stdin(Stdio::null())
        .status()
        .with_context(|| format!("launching {}", shell.name()))?;
    if !status.success() {
        anyhow::bail!(
            "{} exited with {} while sourcing {}",
            shell.name(),
            status,
            rc.display()
        );
    }
    Ok(())
}

pub fn remove_backup(backup: &Path) -> Result<()> {
    fs::remove_file(backup).with_context(|| format!("deleting {}", backup.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_clean_writes_printable_runs() {
        let tmp = TempDir::new().unwrap();
        let history = tmp.path().join(".bash_history");
        let cleaned = tmp.path().join(".bash_history_clean");
        fs::write(&history, b"ls -la\x00\x01corrupt\ncd /tmp\n").unwrap();

        clean(&Cleaner::Builtin { min_len: 4 }, &history, &cleaned, false).unwrap();
        assert_eq!(fs::read(&cleaned).unwrap(), b"ls -la\ncorrupt\ncd /tmp\n");
    }

    #[test]
    fn failed_clean_removes_partial_output() {
        let tmp = TempDir::new().unwrap();
        let history = tmp.path().join(".bash_history");
        let cleaned = tmp.path().join(".bash_history_clean");

        let err = clean(&Cleaner::Builtin { min_len: 4 }, &history, &cleaned, false).unwrap_err();
        assert!(format!("{err:#}").contains("opening"));
        assert!(!cleaned.exists());
    }

    #[test]
    fn refuse_empty_rejects_empty_output() {
        let tmp = TempDir::new().unwrap();
        let history = tmp.path().join(".zsh_history");
        let cleaned = tmp.path().join(".zsh_history_clean");
        fs::write(&history, b"\x00\x01ab\x02").unwrap();

        let cleaner = Cleaner::Builtin { min_len: 4 };
        assert!(clean(&cleaner, &history, &cleaned, true).is_err());
        assert!(!cleaned.exists());

        clean(&cleaner, &history, &cleaned, false).unwrap();
        assert_eq!(fs::read(&cleaned).unwrap(), b"");
    }

    #[test]
    fn missing_external_program_fails() {
        let tmp = TempDir::new().unwrap();
        let history = tmp.path().join(".bash_history");
        let cleaned = tmp.path().join(".bash_history_clean");
        fs::write(&history, b"ls\n").unwrap();

        let cleaner = Cleaner::External {
            program: "histfix-no-such-filter".to_string(),
        };
        let err = clean(&cleaner, &history, &cleaned, false).unwrap_err();
        assert!(format!("{err:#}").contains("launching histfix-no-such-filter"));
        assert!(!cleaned.exists());
    }

    #[test]
    fn replace_overwrites_target() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("clean");
        let to = tmp.path().join("history");
        fs::write(&from, "new\n").unwrap();
        fs::write(&to, "old\n").unwrap();

        replace(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "new\n");
        assert!(!from.exists());
    }

    #[test]
    fn move_by_copy_overwrites_target_and_drops_source() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join(".zsh_history_clean");
        let to = tmp.path().join(".zsh_history");
        fs::write(&from, "git status\n").unwrap();
        fs::write(&to, "git st\x00\x7f\n").unwrap();

        move_by_copy(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "git status\n");
        assert!(!from.exists());
    }

    #[test]
    fn move_by_copy_keeps_source_when_copy_fails() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("clean");
        fs::write(&from, "ls\n").unwrap();

        let err = move_by_copy(&from, &tmp.path().join("missing").join("history")).unwrap_err();
        assert!(format!("{err:#}").contains("copying"));
        assert!(from.exists());
    }

    #[cfg(unix)]
    #[test]
    fn restrict_permissions_sets_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history");
        fs::write(&path, "x\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        restrict_permissions(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
