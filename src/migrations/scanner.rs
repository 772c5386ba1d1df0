use anyhow::Result;
use std::path::Path;

use super::importer::{ImportReport, MigrationImporter};
use super::resolver::PackagePathResolver;
use crate::config::ImporterConfig;
use crate::context::Context;
use crate::host::PackageHost;

/// Walks installed packages and local modules, feeding every source root
/// through the [`MigrationImporter`].
pub struct MigrationScanner<'a> {
    ctx: &'a Context,
    config: &'a ImporterConfig,
    project_root: &'a Path,
}

impl<'a> MigrationScanner<'a> {
    pub fn new(ctx: &'a Context, config: &'a ImporterConfig, project_root: &'a Path) -> Self {
        Self {
            ctx,
            config,
            project_root,
        }
    }

    fn importer(&self) -> MigrationImporter<'a> {
        MigrationImporter::new(
            &*self.ctx.fs,
            self.config.migrations_path(self.project_root),
            self.config.source_dir.clone(),
            self.config.exclude.clone(),
        )
    }

    /// Package scan followed by module scan
    pub fn run(&self, host: &dyn PackageHost) -> Result<ImportReport> {
        self.ctx.output.section("Importing migrations");

        let mut report = self.scan_packages(host)?;
        report.merge(self.scan_modules()?);

        self.print_summary(&report);
        Ok(report)
    }

    /// Import from every autoload root of every installed package, in the
    /// host's order. Copy failures are reported once all packages are done.
    pub fn scan_packages(&self, host: &dyn PackageHost) -> Result<ImportReport> {
        let importer = self.importer();
        let mut report = ImportReport::default();

        for package in host.local_packages()? {
            let Some(install_path) = host.install_path(&package) else {
                continue;
            };

            for root in PackagePathResolver::candidate_roots(&install_path, &package.autoload) {
                let source_name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.ctx.output.dimmed(&format!(
                    "Process package \"{}\" : \"{}\"",
                    install_path.display(),
                    source_name
                ));

                let found = importer.import_from(&root)?;
                self.print_copied(&found);
                report.merge(found);
            }
        }

        self.print_failures(&report);
        Ok(report)
    }

    /// Import from every immediate subdirectory of the modules directory
    pub fn scan_modules(&self) -> Result<ImportReport> {
        let importer = self.importer();
        let mut report = ImportReport::default();

        let modules_dir = self.config.modules_path(self.project_root);
        if !self.ctx.fs.exists(&modules_dir) {
            return Ok(report);
        }

        for module in self.ctx.fs.read_dir(&modules_dir)? {
            if !self.ctx.fs.is_dir(&module) {
                continue;
            }

            let name = module
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.ctx.output.dimmed(&format!("Process module {}", name));

            let found = importer.import_from(&module)?;
            self.print_copied(&found);
            report.merge(found);
        }

        self.print_failures(&report);
        Ok(report)
    }

    fn print_copied(&self, report: &ImportReport) {
        for path in &report.copied {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.ctx
                .output
                .success(&format!("Installed migration {}", file_name));
        }
    }

    fn print_failures(&self, report: &ImportReport) {
        for failure in &report.failures {
            self.ctx.output.error(&format!(
                "Failed to copy {} to {}: {}",
                failure.source.display(),
                failure.destination.display(),
                failure.message
            ));
        }
    }

    fn print_summary(&self, report: &ImportReport) {
        self.ctx.output.blank();
        self.ctx
            .output
            .key_value("Imported", &report.copied.len().to_string());
        self.ctx
            .output
            .key_value("Already present", &report.already_present.to_string());
        self.ctx
            .output
            .key_value("Excluded", &report.excluded.to_string());
        if !report.failures.is_empty() {
            self.ctx
                .output
                .key_value("Failed", &report.failures.len().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{StaticHost, section};
    use crate::traits::{FileSystem, MockCommandExecutor, MockFileSystem, MockOutput};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct Fixture {
        fs: Arc<MockFileSystem>,
        output: Arc<MockOutput>,
        ctx: Context,
        config: ImporterConfig,
    }

    fn fixture() -> Fixture {
        let fs = Arc::new(MockFileSystem::new());
        let output = Arc::new(MockOutput::new());
        let ctx = Context::test_with(
            fs.clone(),
            output.clone(),
            Arc::new(MockCommandExecutor::new()),
        );
        fs.create_dir_all(Path::new("/project/db/migrations")).unwrap();

        Fixture {
            fs,
            output,
            ctx,
            config: ImporterConfig::default(),
        }
    }

    fn psr4_src() -> Vec<crate::host::AutoloadSection> {
        vec![section("psr-4", &[("Acme\\", &["src/"])])]
    }

    const ROOT: &str = "/project";

    #[test]
    fn test_package_migration_is_imported() {
        let f = fixture();
        f.fs.write(
            Path::new("/project/vendor/acme/users/src/db/migrations/001_create_users.php"),
            "users",
        )
        .unwrap();
        let host = StaticHost::new("/project/vendor").package(
            "acme/users",
            "/project/vendor/acme/users",
            psr4_src(),
        );

        let scanner = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT));
        let report = scanner.run(&host).unwrap();

        assert_eq!(
            report.copied,
            vec![PathBuf::from("/project/db/migrations/001_create_users.php")]
        );
        assert_eq!(
            f.output.get_successes(),
            vec!["Installed migration 001_create_users.php".to_string()]
        );
    }

    #[test]
    fn test_packages_without_migrations_leave_destination_unchanged() {
        let f = fixture();
        f.fs.write(Path::new("/project/db/migrations/000_init.php"), "init")
            .unwrap();
        f.fs.write(Path::new("/project/vendor/acme/a/src/A.php"), "<?php")
            .unwrap();
        let host = StaticHost::new("/project/vendor")
            .package("acme/a", "/project/vendor/acme/a", psr4_src())
            .package("acme/b", "/project/vendor/acme/b", psr4_src());

        let before = f.fs.files_in(Path::new("/project/db/migrations"));
        MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT))
            .run(&host)
            .unwrap();

        assert_eq!(f.fs.files_in(Path::new("/project/db/migrations")), before);
    }

    #[test]
    fn test_first_writer_wins_across_packages() {
        let f = fixture();
        f.fs.write(
            Path::new("/project/vendor/acme/a/src/db/migrations/005_shared.php"),
            "from a",
        )
        .unwrap();
        f.fs.write(
            Path::new("/project/vendor/acme/b/src/db/migrations/005_shared.php"),
            "from b",
        )
        .unwrap();
        let host = StaticHost::new("/project/vendor")
            .package("acme/a", "/project/vendor/acme/a", psr4_src())
            .package("acme/b", "/project/vendor/acme/b", psr4_src());

        let report = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT))
            .run(&host)
            .unwrap();

        assert_eq!(report.copied.len(), 1);
        assert_eq!(report.already_present, 1);
        assert!(report.failures.is_empty());
        assert_eq!(
            f.fs.get_file_contents(Path::new("/project/db/migrations/005_shared.php"))
                .as_deref(),
            Some("from a")
        );
    }

    #[test]
    fn test_full_run_twice_is_idempotent() {
        let f = fixture();
        f.fs.write(
            Path::new("/project/vendor/acme/a/src/db/migrations/001_a.php"),
            "a",
        )
        .unwrap();
        f.fs.write(
            Path::new("/project/modules/billing/db/migrations/010_add_invoices.php"),
            "invoices",
        )
        .unwrap();
        let host = StaticHost::new("/project/vendor").package(
            "acme/a",
            "/project/vendor/acme/a",
            psr4_src(),
        );

        let scanner = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT));
        scanner.run(&host).unwrap();
        let after_first = f.fs.files_in(Path::new("/project/db/migrations"));
        let second = scanner.run(&host).unwrap();

        assert!(second.copied.is_empty());
        assert!(second.failures.is_empty());
        assert_eq!(f.fs.files_in(Path::new("/project/db/migrations")), after_first);
        assert_eq!(after_first.len(), 2);
    }

    #[test]
    fn test_duplicate_roots_are_processed_harmlessly() {
        let f = fixture();
        f.fs.write(
            Path::new("/project/vendor/acme/a/src/db/migrations/001_a.php"),
            "a",
        )
        .unwrap();
        let host = StaticHost::new("/project/vendor").package(
            "acme/a",
            "/project/vendor/acme/a",
            vec![section("psr-4", &[("A\\", &["src/"]), ("B\\", &["src/"])])],
        );

        let report = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT))
            .scan_packages(&host)
            .unwrap();

        assert_eq!(report.copied.len(), 1);
        assert_eq!(report.already_present, 1);
        assert_eq!(f.fs.copy_calls().len(), 1);
    }

    #[test]
    fn test_module_migration_is_imported() {
        let f = fixture();
        f.fs.write(
            Path::new("/project/modules/billing/db/migrations/010_add_invoices.php"),
            "invoices",
        )
        .unwrap();

        let report = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT))
            .scan_modules()
            .unwrap();

        assert_eq!(
            report.copied,
            vec![PathBuf::from("/project/db/migrations/010_add_invoices.php")]
        );
        assert!(f.output.to_text().contains("Process module billing"));
    }

    #[test]
    fn test_missing_modules_dir_is_noop() {
        let f = fixture();
        let report = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT))
            .scan_modules()
            .unwrap();

        assert!(report.is_empty());
        assert!(f.output.get_messages().is_empty());
    }

    #[test]
    fn test_files_in_modules_dir_are_not_modules() {
        let f = fixture();
        f.fs.write(Path::new("/project/modules/README.md"), "docs").unwrap();

        let report = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT))
            .scan_modules()
            .unwrap();

        assert!(report.is_empty());
        assert!(f.fs.copy_calls().is_empty());
    }

    #[test]
    fn test_copy_failures_reported_after_package_loop() {
        let f = fixture();
        f.fs.write(
            Path::new("/project/vendor/acme/a/src/db/migrations/001_a.php"),
            "a",
        )
        .unwrap();
        f.fs.write(
            Path::new("/project/vendor/acme/b/src/db/migrations/002_b.php"),
            "b",
        )
        .unwrap();
        f.fs.fail_copy_to(Path::new("/project/db/migrations/001_a.php"));
        let host = StaticHost::new("/project/vendor")
            .package("acme/a", "/project/vendor/acme/a", psr4_src())
            .package("acme/b", "/project/vendor/acme/b", psr4_src());

        let report = MigrationScanner::new(&f.ctx, &f.config, Path::new(ROOT))
            .scan_packages(&host)
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.copied.len(), 1);

        let errors = f.output.get_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("/project/vendor/acme/a/src/db/migrations/001_a.php"));
        assert!(errors[0].contains("/project/db/migrations/001_a.php"));
        assert!(errors[0].contains("Permission denied"));

        // The error comes after every per-package line
        let messages = f.output.get_messages();
        let last = messages.last().unwrap();
        assert!(matches!(last, crate::traits::OutputMessage::Error(_)));
    }

    #[test]
    fn test_destination_created_when_missing() {
        let fs = Arc::new(MockFileSystem::new());
        let ctx = Context::test_with(
            fs.clone(),
            Arc::new(MockOutput::new()),
            Arc::new(MockCommandExecutor::new()),
        );
        fs.write(Path::new("/project/modules/core/db/migrations/001.php"), "x")
            .unwrap();
        let config = ImporterConfig::default();

        MigrationScanner::new(&ctx, &config, Path::new(ROOT))
            .scan_modules()
            .unwrap();

        assert!(fs.has_file(Path::new("/project/db/migrations/001.php")));
    }
}
