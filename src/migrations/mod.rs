pub mod importer;
pub mod resolver;
pub mod scanner;

pub use importer::ImportReport;
pub use scanner::MigrationScanner;
