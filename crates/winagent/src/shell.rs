//! Shell backends
//!
//! The executor never spawns processes itself; it goes through a [`Shell`].
//! [`SystemShell`] is the real platform shell.

use std::io;
use winagent_core::process::{self, ProcessOutput};

pub trait Shell {
    /// Run a command line through the platform shell and wait for it
    fn run(&self, command: &str, capture: bool) -> io::Result<ProcessOutput>;

    /// Run a program directly with an argument vector and capture its output
    fn run_program(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput>;
}

/// `cmd /C` on Windows, `sh -c` elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn run(&self, command: &str, capture: bool) -> io::Result<ProcessOutput> {
        process::run_shell(command, capture)
    }

    fn run_program(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput> {
        process::run_program(program, args)
    }
}

impl<S: Shell + ?Sized> Shell for &S {
    fn run(&self, command: &str, capture: bool) -> io::Result<ProcessOutput> {
        (**self).run(command, capture)
    }

    fn run_program(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput> {
        (**self).run_program(program, args)
    }
}
