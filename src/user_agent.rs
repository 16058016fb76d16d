//! Shared User-Agent string for catalog and archive requests.
//!
//! The catalog serves its listings to browsers, so every request presents a
//! desktop browser User-Agent.

/// Browser User-Agent sent with every request.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_user_agent_is_single_line() {
        assert!(!BROWSER_USER_AGENT.contains('\n'));
        assert!(BROWSER_USER_AGENT.contains("Chrome/"));
    }
}
