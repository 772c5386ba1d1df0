//! Bootstraps the external migrations tool and reports its status.
//!
//! This is the only place that runs an external executable. Every failure
//! here, including a tool that cannot be started at all, is reported and
//! swallowed: a broken tool setup should not fail the dependency manager's
//! install.

use std::path::{Path, PathBuf};

use crate::config::ToolConfig;
use crate::context::Context;
use crate::traits::{CommandResult, command_line};

const INIT: &str = "init";
const TEST: &str = "test";
const STATUS: &str = "status";

/// Shell convention for "found but could not be executed"
const NOT_EXECUTABLE: i32 = 126;

/// How far the tooling step got
#[derive(Debug, Clone, PartialEq)]
pub enum ToolingOutcome {
    /// Tool binary is not installed; nothing was invoked
    NotInstalled,
    /// `test` exited non-zero; `status` was not run
    ConfigInvalid,
    /// `status` ran. Either flag is false when that command failed; a
    /// skipped `init` counts as ok
    Reported { init_ok: bool, status_ok: bool },
}

impl ToolingOutcome {
    /// Some tool command failed
    pub fn has_failures(&self) -> bool {
        match self {
            ToolingOutcome::NotInstalled => false,
            ToolingOutcome::ConfigInvalid => true,
            ToolingOutcome::Reported { init_ok, status_ok } => !(*init_ok && *status_ok),
        }
    }
}

pub struct ToolingBootstrap<'a> {
    ctx: &'a Context,
    binary: PathBuf,
    config_file: PathBuf,
    project_root: &'a Path,
}

impl<'a> ToolingBootstrap<'a> {
    pub fn new(
        ctx: &'a Context,
        tool: &ToolConfig,
        vendor_dir: &Path,
        project_root: &'a Path,
    ) -> Self {
        Self {
            ctx,
            binary: vendor_dir.join(&tool.binary),
            config_file: project_root.join(&tool.config_file),
            project_root,
        }
    }

    /// init (only if the config file is missing), then test, then status
    pub fn run(&self) -> ToolingOutcome {
        self.ctx.output.section("Migrations tool");

        if !self.ctx.fs.exists(&self.binary) {
            self.ctx.output.warning(&format!(
                "Migrations tool not found at {}, skipping",
                self.binary.display()
            ));
            return ToolingOutcome::NotInstalled;
        }

        let mut init_ok = true;
        if !self.ctx.fs.exists(&self.config_file) {
            self.ctx.output.info(&format!(
                "{} not found, initializing",
                self.config_file.display()
            ));
            let result = self.invoke(INIT);
            if !result.success() {
                self.report_failure(INIT, &result);
                init_ok = false;
            }
        }

        let result = self.invoke(TEST);
        if !result.success() {
            self.report_failure(TEST, &result);
            return ToolingOutcome::ConfigInvalid;
        }

        let result = self.invoke(STATUS);
        let status_ok = result.success();
        if status_ok {
            self.ctx.output.info(&self.display_line(STATUS));
            self.ctx.output.command_output(&result.output, false);
        } else {
            self.report_failure(STATUS, &result);
        }

        ToolingOutcome::Reported { init_ok, status_ok }
    }

    fn program(&self) -> String {
        self.binary.to_string_lossy().into_owned()
    }

    fn display_line(&self, subcommand: &str) -> String {
        command_line(&self.program(), &[subcommand])
    }

    /// A process that cannot be spawned is turned into a failed result
    fn invoke(&self, subcommand: &str) -> CommandResult {
        self.ctx
            .output
            .dimmed(&format!("Running {}", self.display_line(subcommand)));
        self.ctx
            .command
            .execute(&self.program(), &[subcommand], self.project_root)
            .unwrap_or_else(|e| CommandResult {
                exit_code: NOT_EXECUTABLE,
                output: format!("{:#}", e),
            })
    }

    fn report_failure(&self, subcommand: &str, result: &CommandResult) {
        self.ctx.output.error(&format!(
            "Command failed (exit code {}): {}",
            result.exit_code,
            self.display_line(subcommand)
        ));
        self.ctx.output.command_output(&result.output, true);
    }
}
