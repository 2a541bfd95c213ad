//! CLI `cleanup` and `clear-log` commands.

use anyhow::{Context, Result};

use aide::audit::AuditLog;
use aide::config::AideConfig;
use aide::state::cleanup::{cleanup_state, CleanupOptions};
use aide::state::open_state_store;

pub struct CleanupArgs {
    pub dry_run: bool,
    pub older_than_days: Option<u32>,
    pub keep_completed_goals: bool,
    pub keep_archived: bool,
}

impl From<CleanupArgs> for CleanupOptions {
    fn from(args: CleanupArgs) -> Self {
        Self {
            remove_completed_goals: !args.keep_completed_goals,
            remove_archived_goals: !args.keep_archived,
            remove_archived_ideas: !args.keep_archived,
            remove_completed_ideas: false,
            older_than_days: args.older_than_days,
            dry_run: args.dry_run,
        }
    }
}

pub fn cleanup(config: AideConfig, args: CleanupArgs) -> Result<()> {
    let store = open_state_store(config.state_path(), &config.storage.state_version);
    let report = cleanup_state(&store, &config.backups_dir(), &CleanupOptions::from(args))
        .context("cleanup failed")?;

    let verb = if report.dry_run { "Would remove" } else { "Removed" };
    println!("{verb} {} goals: {}", report.removed_goals.len(), report.removed_goals.join(", "));
    println!("{verb} {} ideas: {}", report.removed_ideas.len(), report.removed_ideas.join(", "));
    println!(
        "Remaining: {} goals, {} ideas",
        report.remaining_goals, report.remaining_ideas
    );
    if let Some(backup) = &report.backup_path {
        println!("Backup: {}", backup.display());
    }
    Ok(())
}

pub fn clear_log(config: AideConfig) -> Result<()> {
    let log = AuditLog::new(config.audit_log_path());
    match log.rotate(&config.backups_dir()).context("failed to rotate audit log")? {
        Some(backup) => println!("Audit log moved to {}", backup.display()),
        None => println!("No audit log at {}", log.path().display()),
    }
    Ok(())
}
