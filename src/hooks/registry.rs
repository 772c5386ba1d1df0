use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

use crate::commands::ProcessCommand;
use crate::context::Context;

/// Dependency manager lifecycle events this tool reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    PostInstall,
    PostUpdate,
}

impl LifecycleEvent {
    /// Script event name as the dependency manager spells it
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::PostInstall => "post-install-cmd",
            LifecycleEvent::PostUpdate => "post-update-cmd",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where to run and what to run, shared by every handler
#[derive(Debug, Clone)]
pub struct HookOptions {
    pub working_dir: PathBuf,
    pub vendor_dir: Option<PathBuf>,
    /// Run the migrations tool after importing
    pub tooling: bool,
}

pub type HookHandler = fn(&Context, &HookOptions) -> Result<()>;

/// Explicit event -> handler table, filled once at startup
pub struct HookRegistry {
    handlers: Vec<(LifecycleEvent, HookHandler)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registry with the migration import bound to both install and update
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(LifecycleEvent::PostInstall, ProcessCommand::execute);
        registry.register(LifecycleEvent::PostUpdate, ProcessCommand::execute);
        registry
    }

    pub fn register(&mut self, event: LifecycleEvent, handler: HookHandler) {
        self.handlers.push((event, handler));
    }

    /// Run every handler registered for `event`, in registration order.
    /// The first failing handler stops the dispatch.
    pub fn dispatch(&self, event: LifecycleEvent, ctx: &Context, options: &HookOptions) -> Result<()> {
        for (registered, handler) in &self.handlers {
            if *registered == event {
                handler(ctx, options)?;
            }
        }
        Ok(())
    }

    /// Number of handlers bound to `event`
    #[cfg(test)]
    pub fn handler_count(&self, event: LifecycleEvent) -> usize {
        self.handlers.iter().filter(|(e, _)| *e == event).count()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockCommandExecutor, MockFileSystem, MockOutput};
    use std::sync::Arc;

    fn options() -> HookOptions {
        HookOptions {
            working_dir: PathBuf::from("/app"),
            vendor_dir: None,
            tooling: false,
        }
    }

    fn record_first(ctx: &Context, _options: &HookOptions) -> Result<()> {
        ctx.output.info("first");
        Ok(())
    }

    fn record_second(ctx: &Context, _options: &HookOptions) -> Result<()> {
        ctx.output.info("second");
        Ok(())
    }

    fn fail(_ctx: &Context, _options: &HookOptions) -> Result<()> {
        anyhow::bail!("handler failed")
    }

    fn context_with(output: Arc<MockOutput>) -> Context {
        Context::test_with(
            Arc::new(MockFileSystem::new()),
            output,
            Arc::new(MockCommandExecutor::new()),
        )
    }

    #[test]
    fn test_defaults_bind_both_events() {
        let registry = HookRegistry::with_defaults();
        assert_eq!(registry.handler_count(LifecycleEvent::PostInstall), 1);
        assert_eq!(registry.handler_count(LifecycleEvent::PostUpdate), 1);
    }

    #[test]
    fn test_dispatch_runs_matching_handlers_in_order() {
        let output = Arc::new(MockOutput::new());
        let ctx = context_with(output.clone());
        let mut registry = HookRegistry::new();
        registry.register(LifecycleEvent::PostUpdate, record_first);
        registry.register(LifecycleEvent::PostInstall, record_second);
        registry.register(LifecycleEvent::PostUpdate, record_second);

        registry
            .dispatch(LifecycleEvent::PostUpdate, &ctx, &options())
            .unwrap();

        assert_eq!(output.to_text(), "first\nsecond");
    }

    #[test]
    fn test_dispatch_without_handlers_is_noop() {
        let registry = HookRegistry::new();
        let ctx = Context::test();
        assert!(
            registry
                .dispatch(LifecycleEvent::PostInstall, &ctx, &options())
                .is_ok()
        );
    }

    #[test]
    fn test_dispatch_propagates_handler_error() {
        let output = Arc::new(MockOutput::new());
        let ctx = context_with(output.clone());
        let mut registry = HookRegistry::new();
        registry.register(LifecycleEvent::PostInstall, fail);
        registry.register(LifecycleEvent::PostInstall, record_first);

        let err = registry
            .dispatch(LifecycleEvent::PostInstall, &ctx, &options())
            .unwrap_err();

        assert_eq!(err.to_string(), "handler failed");
        assert!(output.get_messages().is_empty());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(LifecycleEvent::PostInstall.to_string(), "post-install-cmd");
        assert_eq!(LifecycleEvent::PostUpdate.name(), "post-update-cmd");
    }
}
