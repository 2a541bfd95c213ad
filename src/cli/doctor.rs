//! CLI `doctor` command: strictly re-validate every stored document and print a health report.

use anyhow::{bail, Context, Result};

use aide::config::AideConfig;
use aide::services::{CheckResult, Services};

/// Validate stored documents and print a health report. Fails when any check fails.
pub fn doctor(config: AideConfig) -> Result<()> {
    let data_dir = config.data_dir();
    if !data_dir.exists() {
        println!("Data directory: not found at {}", data_dir.display());
        println!("Run `aide serve` to initialize.");
        return Ok(());
    }

    let services = Services::open(config).context("failed to open stores")?;
    let report = services.check_health();

    println!("aide Health Report");
    println!("==================");
    println!();
    println!("Data directory:    {}", report.data_dir.display());
    println!();
    print_check("State", &report.state);
    print_check("Profile", &report.profile);
    print_check("Design system", &report.design_system);
    print_check("Drawings", &report.drawings);
    print_check("Notes", &report.notes);
    println!();
    println!(
        "Calendar:          {}",
        if report.calendar_configured {
            "configured"
        } else {
            "no access token (set AIDE_CALENDAR_TOKEN)"
        }
    );

    if !report.is_healthy() {
        println!();
        println!("Recovery steps:");
        println!("  1. Fix the file by hand; the error above names the field.");
        println!("  2. Or restore a copy from {}", services.backups_dir().display());
        bail!("health check failed");
    }

    Ok(())
}

fn print_check(label: &str, check: &CheckResult) {
    let status = if check.ok { "OK" } else { "FAILED" };
    println!("{:<19}{status} ({})", format!("{label}:"), check.detail);
}
