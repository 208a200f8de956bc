//! Scripted shell for tests

use std::cell::RefCell;
use std::io;
use winagent_core::process::ProcessOutput;

use crate::shell::Shell;

#[derive(Clone)]
enum Reply {
    Output(ProcessOutput),
    Missing,
}

/// Answers shell calls from a list of prefix rules and records every call.
/// Unmatched calls succeed with empty output.
pub(crate) struct ScriptedShell {
    rules: Vec<(String, Reply)>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Reply to calls starting with `prefix` with exit `code` and `stdout`
    pub fn on(mut self, prefix: &str, code: i32, stdout: &str) -> Self {
        self.rules.push((
            prefix.to_string(),
            Reply::Output(ProcessOutput {
                code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        ));
        self
    }

    /// Reply to calls starting with `prefix` with exit `code` and `stderr`
    pub fn fail(mut self, prefix: &str, code: i32, stderr: &str) -> Self {
        self.rules.push((
            prefix.to_string(),
            Reply::Output(ProcessOutput {
                code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        ));
        self
    }

    /// Calls starting with `prefix` fail to launch
    pub fn missing(mut self, prefix: &str) -> Self {
        self.rules.push((prefix.to_string(), Reply::Missing));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn answer(&self, line: String) -> io::Result<ProcessOutput> {
        let reply = self
            .rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone());
        self.calls.borrow_mut().push(line);

        match reply {
            Some(Reply::Output(out)) => Ok(out),
            Some(Reply::Missing) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "program not found",
            )),
            None => Ok(ProcessOutput::default()),
        }
    }
}

impl Shell for ScriptedShell {
    fn run(&self, command: &str, _capture: bool) -> io::Result<ProcessOutput> {
        self.answer(command.to_string())
    }

    fn run_program(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.answer(line)
    }
}

/// Answers questions from a fixed list and records what was asked
pub(crate) struct ScriptedInput {
    answers: std::collections::VecDeque<String>,
    pub questions: Vec<String>,
}

impl ScriptedInput {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            questions: Vec::new(),
        }
    }
}

impl crate::prompt::InputProvider for ScriptedInput {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.questions.push(question.to_string());
        self.answers.pop_front()
    }
}
