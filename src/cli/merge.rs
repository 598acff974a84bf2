//! Merge command - merge eligible bot pull requests of a repository

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use dialoguer::Confirm;
use dependabot_helper::error::{Error, Result};
use dependabot_helper::merge_eligible_pull_requests;
use dependabot_helper::platform::parse_repo_slug;
use dependabot_helper::scan_repository;
use dependabot_helper::types::{MergeMethod, MergeReport};

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Method to try before the configured preferences
    pub method: Option<MergeMethod>,
    /// Preview the candidates and prompt for confirmation before merging
    pub confirm: bool,
}

/// Run the merge command
pub async fn run_merge(ctx: &CommandContext, repo: &str, options: MergeOptions) -> Result<()> {
    let (owner, name) = parse_repo_slug(repo)?;

    if options.confirm && !confirm_merge(ctx, &owner, &name).await? {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    let progress = CliProgress::spinner(format!("Merging {owner}/{name}..."));
    let report = merge_eligible_pull_requests(
        &ctx.session,
        &ctx.options,
        &owner,
        &name,
        options.method,
        &progress,
        &ctx.cancel,
    )
    .await;
    progress.finish();

    print_merge_summary(&report?);
    Ok(())
}

/// List what a merge would attempt and ask before going ahead
async fn confirm_merge(ctx: &CommandContext, owner: &str, name: &str) -> Result<bool> {
    let candidates = scan_repository(
        &ctx.session,
        &ctx.options,
        owner,
        name,
        &ctx.options.creators,
        false,
        &ctx.cancel,
    )
    .await?;

    if candidates.is_empty() {
        println!("{}", "No pull requests are ready to merge.".muted());
        return Ok(false);
    }

    println!("{}:", "Would merge".emphasis());
    for pr in &candidates {
        println!("  {} {}", format!("#{}", pr.number).accent(), pr.title);
    }
    println!();

    Confirm::new()
        .with_prompt("Proceed with merge?")
        .default(true)
        .interact()
        .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))
}

/// Print merge summary
fn print_merge_summary(report: &MergeReport) {
    if report == &MergeReport::default() {
        println!("{}", "No pull requests are ready to merge.".muted());
        return;
    }

    for number in &report.merged {
        println!("{} Merged {}", check(), format!("#{number}").accent());
    }
    for number in &report.auto_merge_enabled {
        println!(
            "{} Auto-merge enabled for {}",
            "↻".warn(),
            format!("#{number}").accent()
        );
    }
    for (number, message) in &report.failed {
        println!("{} {} {}", cross(), format!("#{number}").accent(), message.muted());
    }
    if report.cancelled {
        println!("{}", "Cancelled; remaining pull requests were not merged.".warn());
    }
}
