//! Text and URL normalization
//!
//! Provides functions to:
//! - Normalize skill / requirement tokens (trim + lowercase)
//! - Parse comma-delimited skill input into a skill set
//! - Collapse whitespace in text pulled out of markup
//! - Resolve relative detail links against the listing page origin

use crate::types::SkillSet;
use url::Url;

/// Canonical comparison form for skills and requirement text.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Split comma-delimited skill input. Empty tokens are dropped.
pub fn parse_skills(raw: &str) -> SkillSet {
    raw.split(',')
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join text nodes the way a browser would render them on one line.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a user-supplied listing URL; only http(s) is fetchable.
pub fn parse_listing_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| format!("invalid listing URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported URL scheme '{}' in '{}'", other, raw)),
    }
}

/// Resolve a detail link as `origin + link`.
///
/// Relative links are always taken from the site root, matching how listing
/// cards reference their detail pages. Absolute links pass through.
pub fn resolve_detail_url(listing: &Url, link: &str) -> Result<Url, String> {
    let origin = listing.origin().ascii_serialization();
    let base = Url::parse(&format!("{}/", origin))
        .map_err(|e| format!("listing URL has no usable origin: {}", e))?;
    base.join(link.trim())
        .map_err(|e| format!("cannot resolve detail link '{}': {}", link, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  PyThon \n"), "python");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_parse_skills_drops_empty_tokens() {
        let skills = parse_skills("Python, SQL,, ,python,");
        assert_eq!(skills.len(), 2);
        assert!(skills.contains("python"));
        assert!(skills.contains("sql"));
    }

    #[test]
    fn test_parse_skills_keeps_inner_spaces() {
        let skills = parse_skills("machine learning, Data Analysis");
        assert!(skills.contains("machine learning"));
        assert!(skills.contains("data analysis"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("\n  Backend\n   Intern  "), "Backend Intern");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_resolve_relative_link_from_origin() {
        let listing = Url::parse("https://internshala.com/internships/python-internship").unwrap();
        let resolved = resolve_detail_url(&listing, "/internship/detail/backend-123").unwrap();
        assert_eq!(
            resolved.as_str(),
            "https://internshala.com/internship/detail/backend-123"
        );

        // No leading slash still hangs off the origin, not the listing path
        let resolved = resolve_detail_url(&listing, "internship/detail/x").unwrap();
        assert_eq!(resolved.as_str(), "https://internshala.com/internship/detail/x");
    }

    #[test]
    fn test_resolve_absolute_link_passes_through() {
        let listing = Url::parse("https://internshala.com/internships").unwrap();
        let resolved = resolve_detail_url(&listing, "https://other.example/job/1").unwrap();
        assert_eq!(resolved.as_str(), "https://other.example/job/1");
    }

    #[test]
    fn test_parse_listing_url_rejects_non_http() {
        assert!(parse_listing_url("https://example.com/list").is_ok());
        assert!(parse_listing_url("ftp://example.com/list").is_err());
        assert!(parse_listing_url("not a url").is_err());
    }
}
