//! Repos command - list repositories of an owner

use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::println;
use dependabot_helper::cancel::cancellable;
use dependabot_helper::error::Result;
use dependabot_helper::list_repositories;
use dependabot_helper::types::Visibility;

/// Run the repos command
pub async fn run_repos(ctx: &CommandContext, owner: &str) -> Result<()> {
    let repositories = cancellable(
        &ctx.cancel,
        list_repositories(&ctx.session, &ctx.options, owner),
    )
    .await?;

    if repositories.is_empty() {
        println!("{}", format!("No repositories found for {owner}.").muted());
        return Ok(());
    }

    for repo in &repositories {
        let mut tags = Vec::new();
        if repo.visibility != Visibility::Public {
            tags.push("private");
        }
        if repo.is_fork {
            tags.push("fork");
        }

        if tags.is_empty() {
            println!("{}", repo.full_name().accent());
        } else {
            println!(
                "{} {}",
                repo.full_name().accent(),
                format!("({})", tags.join(", ")).muted()
            );
        }
    }

    Ok(())
}
