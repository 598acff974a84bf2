//! Repository coordinate parsing

use crate::error::{Error, Result};
use url::Url;

/// Parse `owner/name`, an HTTPS URL or an SSH remote into `(owner, name)`.
pub fn parse_repo_slug(input: &str) -> Result<(String, String)> {
    let trimmed = input.trim().trim_end_matches('/');

    let path = if let Some(rest) = trimmed.strip_prefix("git@") {
        // git@github.com:owner/name.git
        rest.split_once(':')
            .map(|(_, path)| path.to_string())
            .ok_or_else(|| invalid(input))?
    } else if trimmed.contains("://") {
        let url = Url::parse(trimmed).map_err(|_| invalid(input))?;
        url.path().trim_matches('/').to_string()
    } else {
        trimmed.to_string()
    };

    let path = path.trim_end_matches(".git");
    let mut parts = path.split('/').filter(|p| !p.is_empty());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) => Ok((owner.to_string(), name.to_string())),
        _ => Err(invalid(input)),
    }
}

fn invalid(input: &str) -> Error {
    Error::Config(format!(
        "'{input}' is not a repository; expected owner/name or a GitHub URL"
    ))
}
