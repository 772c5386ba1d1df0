use anyhow::Result;

use crate::config::ImporterConfig;
use crate::context::Context;
use crate::hooks::HookOptions;
use crate::host::{ComposerHost, PackageHost};
use crate::migrations::{ImportReport, MigrationScanner};
use crate::tooling::{ToolingBootstrap, ToolingOutcome};

/// Result of one full processing run
#[derive(Debug)]
pub struct ProcessSummary {
    pub import: ImportReport,
    /// None when tooling was disabled
    pub tooling: Option<ToolingOutcome>,
}

impl ProcessSummary {
    /// Copy failures or a failing tool command
    pub fn has_problems(&self) -> bool {
        !self.import.failures.is_empty()
            || self
                .tooling
                .as_ref()
                .is_some_and(ToolingOutcome::has_failures)
    }
}

/// Handles the migration import flow: package scan, module scan, tooling
pub struct ProcessCommand;

impl ProcessCommand {
    /// Execute against the Composer state found from `options.working_dir`
    pub fn execute(ctx: &Context, options: &HookOptions) -> Result<()> {
        let host = ComposerHost::discover(
            ctx.fs.clone(),
            &options.working_dir,
            options.vendor_dir.as_deref(),
        )?;

        let summary = Self::execute_with_host(ctx, &host, options)?;

        ctx.output.blank();
        if summary.has_problems() {
            ctx.output
                .warning("Migration import finished with problems (see above)");
        } else {
            ctx.output.success("Migration import finished");
        }

        Ok(())
    }

    /// Execute against an already-resolved host
    pub fn execute_with_host(
        ctx: &Context,
        host: &dyn PackageHost,
        options: &HookOptions,
    ) -> Result<ProcessSummary> {
        let project_root = host.project_root();
        let config = ImporterConfig::load(&*ctx.fs, &project_root)?;

        ctx.output
            .key_value("Project root", &project_root.display().to_string());

        let import = MigrationScanner::new(ctx, &config, &project_root).run(host)?;

        let tooling = if options.tooling && config.tool.enabled {
            let bootstrap =
                ToolingBootstrap::new(ctx, &config.tool, host.vendor_dir(), &project_root);
            Some(bootstrap.run())
        } else {
            None
        };

        Ok(ProcessSummary { import, tooling })
    }
}
