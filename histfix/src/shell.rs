use crate::domain::Shell;
use crate::error::ShellError;

/// Map a `$SHELL` value to a supported shell. zsh wins when both names appear.
pub fn detect(value: Option<&str>) -> Result<Shell, ShellError> {
    let value = value.ok_or(ShellError::Unset)?;
    if value.contains("zsh") {
        Ok(Shell::Zsh)
    } else if value.contains("bash") {
        Ok(Shell::Bash)
    } else {
        Err(ShellError::Unsupported(value.to_string()))
    }
}

pub fn detect_from_env() -> Result<Shell, ShellError> {
    let value = std::env::var("SHELL").ok();
    detect(value.as_deref())
}
