pub mod command;
pub mod filesystem;
pub mod output;

pub use command::{CommandExecutor, CommandResult, RealCommandExecutor, command_line};
pub use filesystem::{FileSystem, RealFileSystem};
pub use output::{Output, TerminalOutput};

#[cfg(test)]
pub use command::{MockCommandExecutor, MockCommandResult};
#[cfg(test)]
pub use filesystem::MockFileSystem;
#[cfg(test)]
pub use output::{MockOutput, OutputMessage};
