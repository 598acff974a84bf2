//! Prs command - show bot pull requests with their verdicts

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::println;
use dependabot_helper::error::Result;
use dependabot_helper::platform::parse_repo_slug;
use dependabot_helper::summarize_repository;
use dependabot_helper::types::{Candidate, ChecksStatus};

/// Run the prs command
pub async fn run_prs(ctx: &CommandContext, repo: &str) -> Result<()> {
    let (owner, name) = parse_repo_slug(repo)?;

    let progress = CliProgress::spinner(format!("Scanning {owner}/{name}..."));
    let summary = summarize_repository(&ctx.session, &ctx.options, &owner, &name, &ctx.cancel).await;
    progress.finish();
    let summary = summary?;

    println!("{}", summary.repository.full_name().emphasis());
    if !summary.has_dependabot_config {
        println!("{}", "  no .github/dependabot.yml".muted());
    }
    println!();

    if summary.pull_requests.is_empty() {
        println!("{}", "No open bot pull requests.".muted());
        return Ok(());
    }

    for pr in &summary.pull_requests {
        print_candidate(pr);
    }

    Ok(())
}

fn print_candidate(pr: &Candidate) {
    let status = match pr.status {
        ChecksStatus::Success => "passing".success(),
        ChecksStatus::Pending => "pending".warn(),
        ChecksStatus::Error => "failing".error(),
    };
    let approval = if pr.is_approved {
        "approved".success()
    } else if pr.can_approve {
        "awaiting approval".muted()
    } else {
        "reviewed".muted()
    };

    println!("  {} {}", format!("#{}", pr.number).accent(), pr.title);
    println!("      {status} · {approval}");
    if pr.mergeable == Some(false) {
        println!("      {}", "has conflicts".warn());
    }
    println!("      {}", pr.html_url.muted());
}
