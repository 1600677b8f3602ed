//! Console status lines, banner and progress narration.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use colored::Colorize;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

pub fn apply_color_mode(mode: ColorMode) {
    match mode {
        // colored already honours NO_COLOR / CLICOLOR and tty detection
        ColorMode::Auto => colored::control::unset_override(),
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
    }
}

const BANNER: &str = r"
    __    _      __  _____
   / /_  (_)____/ /_/ __(_)  __
  / __ \/ / ___/ __/ /_/ / |/_/
 / / / / (__  ) /_/ __/ />  <
/_/ /_/_/____/\__/_/ /_/_/|_|
";

pub fn banner() {
    println!("{}", BANNER.green().bold());
}

pub fn header(msg: &str) {
    println!("{}", msg.magenta());
}

pub fn info(msg: &str) {
    println!("{}", format!("[INFO] {msg}...").blue());
}

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn fail(msg: &str) {
    println!("{}", msg.red());
}

/// Final line for an aborted run.
pub fn fatal(msg: &str) {
    println!("{} {}", "[FAIL]".red().bold(), msg.red());
}

const BAR_WIDTH: usize = 40;
const BAR_STEPS: usize = 20;

/// Announce a stage; draws a short bar when `animate` is set and stdout is a terminal.
pub fn progress(msg: &str, animate: bool) {
    info(msg);
    if !animate || !atty::is(atty::Stream::Stdout) {
        return;
    }

    let mut stdout = io::stdout().lock();
    for step in 0..=BAR_STEPS {
        let filled = step * BAR_WIDTH / BAR_STEPS;
        let pct = step * 100 / BAR_STEPS;
        // A broken stdout only loses the animation.
        let _ = write!(
            stdout,
            "\r{pct:>3}%|{}{}| {step}/{BAR_STEPS}",
            "█".repeat(filled),
            " ".repeat(BAR_WIDTH - filled)
        );
        let _ = stdout.flush();
        thread::sleep(Duration::from_millis(25));
    }
    let _ = writeln!(stdout);
}
