//! Approve command - submit an approving review

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use dependabot_helper::approve_pull_request;
use dependabot_helper::cancel::cancellable;
use dependabot_helper::error::Result;
use dependabot_helper::platform::parse_repo_slug;

/// Run the approve command
pub async fn run_approve(ctx: &CommandContext, repo: &str, number: u64) -> Result<()> {
    let (owner, name) = parse_repo_slug(repo)?;

    cancellable(
        &ctx.cancel,
        approve_pull_request(&ctx.session, &owner, &name, number),
    )
    .await?;

    println!(
        "{} Approved {}",
        check(),
        format!("{owner}/{name}#{number}").accent()
    );
    Ok(())
}
