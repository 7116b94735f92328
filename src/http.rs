//! Shared blocking HTTP client.

use std::time::Duration;

use anyhow::Result;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Applies to the feed fetch, every translation call and every webhook POST.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the client used by every outbound request.
///
/// `reqwest::blocking::Client` is reference counted internally, so callers
/// clone it freely instead of building one per component.
pub fn client() -> Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}
