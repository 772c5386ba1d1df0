use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// Exit code and combined output of a finished process
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub exit_code: i32,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Render a program and its arguments the way a user would type them
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trait for executing system commands, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion, capturing combined output and exit code
    fn execute(&self, program: &str, args: &[&str], working_dir: &Path) -> Result<CommandResult>;
}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, program: &str, args: &[&str], working_dir: &Path) -> Result<CommandResult> {
        let output = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()
            .with_context(|| format!("Failed to execute: {}", command_line(program, args)))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandResult {
            // Killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            output: combined,
        })
    }
}

/// Mock command executor for testing
#[cfg(test)]
pub struct MockCommandExecutor {
    /// Pre-configured results, matched against the full command line
    outputs: std::sync::Mutex<Vec<MockCommandResult>>,
    /// Every command line executed, in order
    invocations: std::sync::Mutex<Vec<String>>,
    /// Command lines whose process cannot be started
    unstartable: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command: String,
    pub exit_code: i32,
    pub output: String,
}

#[cfg(test)]
#[allow(dead_code)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self {
            outputs: std::sync::Mutex::new(Vec::new()),
            invocations: std::sync::Mutex::new(Vec::new()),
            unstartable: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: std::sync::Mutex::new(outputs),
            invocations: std::sync::Mutex::new(Vec::new()),
            unstartable: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Make `line` fail the way an unspawnable program does
    pub fn fail_to_start(&self, line: &str) {
        self.unstartable.lock().unwrap().push(line.to_string());
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }

    /// How many times a command line ending in `suffix` was run
    pub fn count_ending_with(&self, suffix: &str) -> usize {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.ends_with(suffix))
            .count()
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, program: &str, args: &[&str], _working_dir: &Path) -> Result<CommandResult> {
        let line = command_line(program, args);
        self.invocations.lock().unwrap().push(line.clone());

        if self.unstartable.lock().unwrap().contains(&line) {
            anyhow::bail!("Failed to execute: {}: Permission denied (os error 13)", line);
        }

        let mut outputs = self.outputs.lock().unwrap();
        if let Some(index) = outputs.iter().position(|r| r.command == line) {
            let mock_result = outputs.remove(index);
            return Ok(CommandResult {
                exit_code: mock_result.exit_code,
                output: mock_result.output,
            });
        }

        // Default: successful empty output
        Ok(CommandResult {
            exit_code: 0,
            output: String::new(),
        })
    }
}
