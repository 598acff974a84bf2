//! Approval evaluation from a PR's reviews and the branch's required
//! reviewer count.

use crate::error::Result;
use crate::session::UserSession;
use crate::types::{Approval, Review, ReviewState};
use std::collections::HashMap;
use tracing::debug;

/// Keep the latest review of each reviewer whose vote counts.
///
/// Votes count from collaborators, members and owners, and from bots.
pub fn latest_counted_reviews(reviews: &[Review]) -> Vec<&Review> {
    let mut latest: HashMap<String, &Review> = HashMap::new();

    for review in reviews
        .iter()
        .filter(|r| r.reviewer_is_bot || r.author_association.can_review())
    {
        let key = review.reviewer.to_lowercase();
        match latest.get(&key) {
            Some(existing) if existing.submitted_at > review.submitted_at => {}
            _ => {
                latest.insert(key, review);
            }
        }
    }

    let mut result: Vec<&Review> = latest.into_values().collect();
    result.sort_by(|a, b| a.reviewer.cmp(&b.reviewer));
    result
}

/// Decide approval from the counted reviews (PURE)
///
/// `required_reviewers` already has its floor of one applied.
pub fn decide_approval(counted: &[&Review], current_user: &str, required_reviewers: u32) -> Approval {
    let can_approve = !counted
        .iter()
        .any(|r| r.reviewer.eq_ignore_ascii_case(current_user));

    if counted
        .iter()
        .any(|r| r.state == ReviewState::ChangesRequested)
    {
        return Approval {
            can_approve,
            is_approved: false,
        };
    }

    let approvals = counted
        .iter()
        .filter(|r| r.state == ReviewState::Approved)
        .count();

    Approval {
        can_approve,
        is_approved: approvals > 0 && approvals >= required_reviewers as usize,
    }
}

/// Compute whether the current user can approve and whether the PR is approved
pub async fn evaluate_approval(
    session: &UserSession,
    owner: &str,
    name: &str,
    number: u64,
    base_branch: &str,
    current_user: &str,
) -> Result<Approval> {
    let reviews = session.reviews(owner, name, number).await?;

    if reviews.is_empty() {
        return Ok(Approval {
            can_approve: true,
            is_approved: false,
        });
    }

    let required = session
        .branch_protection(owner, name, base_branch)
        .await?
        .unwrap_or_default()
        .required_reviewers();

    let counted = latest_counted_reviews(&reviews);
    let approval = decide_approval(&counted, current_user, required);
    debug!(
        number,
        counted = counted.len(),
        required,
        is_approved = approval.is_approved,
        "evaluated approval"
    );

    Ok(approval)
}
