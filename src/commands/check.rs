use super::{CommandStatus, manifest_or_default, report_diagnostics};
use crate::BulkHasher;
use crate::output;
use crate::verify::{VerifyOptions, VerifyReport, check_manifest};
use anyhow::{Context, Result};
use std::path::Path;

/// Execute check command to verify a manifest against the filesystem
///
/// Mismatches fail the command. Unreadable entries only fail it when
/// `strict` is set.
///
/// # Errors
///
/// Returns an error if the manifest cannot be opened or read, or workers
/// cannot be started.
pub fn execute(
    hasher: &BulkHasher,
    manifest: Option<&Path>,
    base_dir: Option<&Path>,
    strict: bool,
) -> Result<CommandStatus> {
    let manifest = manifest_or_default(hasher, manifest);
    let options = VerifyOptions {
        hash: hasher.hash_options(),
        base_dir: base_dir.map(Path::to_path_buf),
    };

    let report = check_manifest(&manifest, &options)
        .with_context(|| format!("Failed to check manifest {}", manifest.display()))?;
    report_diagnostics(&report.diagnostics);
    print_summary(&report);

    let failed = report.mismatch_count() > 0 || (strict && report.unverifiable_count() > 0);
    Ok(if failed {
        CommandStatus::Failed
    } else {
        CommandStatus::Clean
    })
}

fn print_summary(report: &VerifyReport) {
    if report.malformed > 0 {
        output::info(&format!("Skipped {} malformed lines", report.malformed));
    }
    if report.unverifiable_count() > 0 {
        output::warning(&format!(
            "{} files could not be verified",
            report.unverifiable_count()
        ));
    }

    if report.mismatch_count() > 0 {
        output::error(&format!(
            "{} of {} files do not match",
            report.mismatch_count(),
            report.entries()
        ));
    } else {
        output::success(&format!("{} files verified", report.verified));
    }

    // The mismatch count is the machine-readable result
    println!("{}", report.mismatch_count());
}
