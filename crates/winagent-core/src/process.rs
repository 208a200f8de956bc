//! Process management utilities

use std::io;
use std::process::{Command, ExitStatus, Output, Stdio};

/// Captured result of a finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

impl From<Output> for ProcessOutput {
    fn from(output: Output) -> Self {
        Self {
            code: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Build a command that runs `line` through the platform shell
pub fn shell_command(line: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", line]);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", line]);
        cmd
    }
}

/// Extract an exit code, mapping signals to 128+N on Unix
pub fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status
            .code()
            .unwrap_or_else(|| status.signal().map_or(1, |s| 128 + s))
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}

/// Run a shell line to completion.
///
/// With `capture` the child's stdout/stderr are collected; without it they
/// are inherited and the returned streams are empty.
pub fn run_shell(line: &str, capture: bool) -> io::Result<ProcessOutput> {
    let mut cmd = shell_command(line);
    if capture {
        Ok(cmd.stdin(Stdio::null()).output()?.into())
    } else {
        let status = cmd.status()?;
        Ok(ProcessOutput {
            code: exit_code(status),
            ..Default::default()
        })
    }
}

/// Run a program directly (no shell) and capture its output
pub fn run_program(program: &str, args: &[&str]) -> io::Result<ProcessOutput> {
    Ok(Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()?
        .into())
}
