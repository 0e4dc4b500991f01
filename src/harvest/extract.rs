//! Page signal extraction.
//!
//! Each signal has its own pattern and exclusion list so they can be tested
//! and tuned independently. [`extract`] is pure: the same text always yields
//! the same [`PageSignals`], and a pattern that does not match leaves its
//! field empty.

use regex::{Regex, RegexSet};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::model::PageSignals;
use crate::traits::truncate_chars;

pub const MAX_STACK_TAGS: usize = 20;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_LOCATION_LEN: usize = 100;

// ============================================================================
// Patterns
// ============================================================================

static RE_MAILTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mailto:([a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,})").unwrap()
});
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap());
static RE_GITHUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://github\.com/([a-z0-9\-_]+)").unwrap());
static RE_LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?linkedin\.com/in/([a-z0-9\-_]+)").unwrap()
});
static RE_TWITTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?(?:twitter|x)\.com/([a-z0-9_]+)").unwrap()
});
static RE_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})\+?\s*(?:years?|yrs?)\s*(?:of\s*)?(?:experience|exp)").unwrap()
});
static RE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap());
static RE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:based in|located in|from)\s+([A-Z][a-zA-Z\s,]+?)(?:\.|<|&|\n)").unwrap()
});
static RE_SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// One whole-word, case-insensitive pattern per entry of [`STACK_KEYWORDS`],
/// in the same order, so match indices map straight back to keywords.
static STACK_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(
        STACK_KEYWORDS
            .iter()
            .map(|kw| format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(kw))),
    )
    .unwrap()
});

// ============================================================================
// Exclusion lists
// ============================================================================

/// Fragments that mark an address as analytics, placeholder or CDN noise.
pub const EMAIL_NOISE_FRAGMENTS: &[&str] =
    &["example.", "sentry", "webpack", "wixpress", "cloudflare"];

/// Image asset names such as `logo@2x.png` look like addresses.
pub const EMAIL_ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".svg"];

/// First path segments on the code host that are not user profiles.
pub const GITHUB_RESERVED_PATHS: &[&str] = &[
    "features",
    "topics",
    "explore",
    "settings",
    "sponsors",
    "pricing",
    "about",
    "login",
    "signup",
    "join",
    "orgs",
    "marketplace",
    "apps",
];

pub const TWITTER_RESERVED_HANDLES: &[&str] = &["share", "intent", "home"];

pub const STACK_KEYWORDS: &[&str] = &[
    "React",
    "Vue",
    "Angular",
    "Svelte",
    "Next.js",
    "Nuxt",
    "Astro",
    "Gatsby",
    "TypeScript",
    "JavaScript",
    "Python",
    "Rust",
    "Go",
    "Java",
    "C#",
    "C++",
    "Ruby",
    "PHP",
    "Swift",
    "Kotlin",
    "Node.js",
    "Express",
    "Django",
    "Flask",
    "Rails",
    "Laravel",
    "Spring",
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "PostgreSQL",
    "MongoDB",
    "MySQL",
    "Redis",
    "Firebase",
    "TailwindCSS",
    "Tailwind",
    "SASS",
    "CSS",
    "GraphQL",
    "REST",
    "Flutter",
    "React Native",
    "iOS",
    "Android",
    "Machine Learning",
    "AI",
    "Data Science",
    "Blockchain",
    "Web3",
    ".NET",
    "Figma",
    "WordPress",
];

// ============================================================================
// Extraction
// ============================================================================

/// Extracts every signal from `text`.
pub fn extract(text: &str) -> PageSignals {
    PageSignals {
        emails: extract_emails(text),
        source_host_links: extract_github_links(text),
        professional_network_link: extract_linkedin(text),
        social_link: extract_twitter(text),
        stack_tags: extract_stack(text),
        experience_hint: extract_experience(text),
        page_title: extract_title(text),
        location_hint: extract_location(text),
    }
}

/// Lower-cased, deduplicated addresses; `mailto:` targets first.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mailtos = RE_MAILTO
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()));
    let loose = RE_EMAIL.find_iter(text).map(|m| m.as_str());

    let mut seen = HashSet::new();
    mailtos
        .chain(loose)
        .map(str::to_lowercase)
        .filter(|email| !is_noise_email(email))
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

pub fn is_noise_email(email: &str) -> bool {
    EMAIL_NOISE_FRAGMENTS.iter().any(|frag| email.contains(frag))
        || EMAIL_ASSET_SUFFIXES.iter().any(|ext| email.ends_with(ext))
}

pub fn extract_github_links(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for cap in RE_GITHUB.captures_iter(text) {
        let user = cap[1].to_lowercase();
        if GITHUB_RESERVED_PATHS.contains(&user.as_str()) {
            continue;
        }
        let link = force_https(&cap[0]);
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }
    links
}

pub fn extract_linkedin(text: &str) -> Option<String> {
    RE_LINKEDIN.find(text).map(|m| force_https(m.as_str()))
}

/// Only the first candidate is considered; a reserved handle yields `None`.
pub fn extract_twitter(text: &str) -> Option<String> {
    let cap = RE_TWITTER.captures(text)?;
    let handle = cap[1].to_lowercase();
    if TWITTER_RESERVED_HANDLES.contains(&handle.as_str()) {
        return None;
    }
    Some(cap[0].to_string())
}

/// Keywords in [`STACK_KEYWORDS`] order, capped at [`MAX_STACK_TAGS`].
pub fn extract_stack(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    STACK_SET
        .matches(text)
        .into_iter()
        .map(|idx| STACK_KEYWORDS[idx])
        .filter(|kw| seen.insert(kw.to_lowercase()))
        .take(MAX_STACK_TAGS)
        .map(str::to_string)
        .collect()
}

pub fn extract_experience(text: &str) -> Option<String> {
    RE_EXPERIENCE
        .captures(text)
        .map(|cap| format!("{}+ years", &cap[1]))
}

pub fn extract_title(text: &str) -> Option<String> {
    let cap = RE_TITLE.captures(text)?;
    let title = cap[1].trim();
    (!title.is_empty()).then(|| truncate_chars(title, MAX_TITLE_LEN))
}

pub fn extract_location(text: &str) -> Option<String> {
    let cap = RE_LOCATION.captures(text)?;
    let location = cap[1].trim();
    (!location.is_empty()).then(|| truncate_chars(location, MAX_LOCATION_LEN))
}

fn force_https(url: &str) -> String {
    RE_SCHEME.replace(url, "https://").into_owned()
}
