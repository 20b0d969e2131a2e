use crate::error::CoreError;
use url::Url;

const PROFILE_PREFIX: &str = "https://www.reddit.com/user/";

/// Extract the username from a `https://www.reddit.com/user/<name>/` profile URL.
pub fn extract_username(profile_url: &str) -> Result<String, CoreError> {
    let profile_url = profile_url.trim();
    if !profile_url.starts_with(PROFILE_PREFIX) {
        return Err(invalid_url());
    }

    let parsed = Url::parse(profile_url).map_err(|_| invalid_url())?;
    let username = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(invalid_url)?;

    if username == "user" || !is_valid_username(username) {
        return Err(invalid_url());
    }

    Ok(username.to_string())
}

fn is_valid_username(name: &str) -> bool {
    (1..=64).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn invalid_url() -> CoreError {
    CoreError::InvalidInput {
        message: "Invalid Reddit profile URL.".to_string(),
    }
}
