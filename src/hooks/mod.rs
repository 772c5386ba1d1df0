pub mod registry;

pub use registry::{HookOptions, HookRegistry, LifecycleEvent};
