//! Post-processing helpers for LLM-extracted CV fields: dates, free text,
//! social links and GPA values.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

/// Full-date formats, tried in order before the month/year forms.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// End-date words meaning the entry is still running.
const ONGOING_MARKERS: [&str; 3] = ["present", "current", "ongoing"];

/// Parses a CV date: ISO, day-first, month-first, "Month Year", then a bare
/// year. Returns `None` when nothing matches.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        // "%B" accepts full and abbreviated month names
        .or_else(|| NaiveDate::parse_from_str(&format!("01 {raw}"), "%d %B %Y").ok())
        .or_else(|| parse_year(raw))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn parse_year(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1)
}

/// Applies date rules for one document and remembers which fields fell back
/// to the current time.
pub struct DateNormalizer {
    now: NaiveDateTime,
    fallbacks: Vec<String>,
}

impl DateNormalizer {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            fallbacks: Vec::new(),
        }
    }

    /// Absent stays absent; an unparseable value becomes `now` and is
    /// recorded under `path`.
    pub fn date(&mut self, path: &str, raw: Option<&str>) -> Option<NaiveDateTime> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
        match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                warn!("Could not parse date {path}: {raw:?}, using current date");
                self.fallbacks.push(path.to_string());
                Some(self.now)
            }
        }
    }

    /// End dates: absent or "present"-like values mean (no date, ongoing).
    pub fn end_date(&mut self, path: &str, raw: Option<&str>) -> (Option<NaiveDateTime>, bool) {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => (None, true),
            Some(s) if ONGOING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) => (None, true),
            Some(s) => (self.date(path, Some(s)), false),
        }
    }

    pub fn into_fallbacks(self) -> Vec<String> {
        self.fallbacks
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Free text → HTML
// ────────────────────────────────────────────────────────────────────────────

const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "• "];

fn bold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is a valid regex"))
}

fn italic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*(.+?)\*").expect("italic pattern is a valid regex"))
}

fn inline_markup(text: &str) -> String {
    let bold = bold_pattern().replace_all(text, "<strong>$1</strong>");
    italic_pattern()
        .replace_all(&bold, "<em>$1</em>")
        .into_owned()
}

/// Renders plain text as simple HTML. Bullet lines become `<li>` items, one
/// `<ul>` per run; other lines are separated by `<br>`.
pub fn convert_to_html(text: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;
    let mut after_text = false;

    for line in text.trim().lines() {
        let trimmed = line.trim_start();
        let bullet = BULLET_MARKERS
            .iter()
            .find_map(|marker| trimmed.strip_prefix(marker));

        match bullet {
            Some(item) => {
                if !in_list {
                    html.push_str("<ul>");
                    in_list = true;
                }
                html.push_str("<li>");
                html.push_str(&inline_markup(item.trim()));
                html.push_str("</li>");
                after_text = false;
            }
            None => {
                if in_list {
                    html.push_str("</ul>");
                    in_list = false;
                } else if after_text {
                    html.push_str("<br>");
                }
                html.push_str(&inline_markup(line.trim_end()));
                after_text = true;
            }
        }
    }

    if in_list {
        html.push_str("</ul>");
    }
    html
}

// ────────────────────────────────────────────────────────────────────────────
// Social links
// ────────────────────────────────────────────────────────────────────────────

/// Domain → icon, checked in order by substring.
const SOCIAL_ICONS: [(&str, &str); 13] = [
    ("github.com", "github"),
    ("linkedin.com", "linkedin"),
    ("facebook.com", "facebook"),
    ("twitter.com", "twitter"),
    ("instagram.com", "instagram"),
    ("youtube.com", "youtube"),
    ("medium.com", "medium"),
    ("dev.to", "dev"),
    ("stackoverflow.com", "stackoverflow"),
    ("behance.net", "behance"),
    ("dribbble.com", "dribbble"),
    ("gitlab.com", "gitlab"),
    ("bitbucket.org", "bitbucket"),
];

fn link_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://(www\.)?").expect("link prefix pattern is a valid regex")
    })
}

/// Icon name for a profile link, or `None` for unknown platforms.
pub fn social_icon(link: &str) -> Option<&'static str> {
    let lowered = link.trim().to_lowercase();
    let clean = link_prefix_pattern().replace(&lowered, "");

    let icon = SOCIAL_ICONS
        .iter()
        .find(|(domain, _)| clean.contains(domain))
        .map(|(_, icon)| *icon);
    if icon.is_none() {
        warn!("No matching icon found for link: {link}");
    }
    icon
}

// ────────────────────────────────────────────────────────────────────────────
// GPA
// ────────────────────────────────────────────────────────────────────────────

fn leading_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:[.,]\d+)?)").expect("leading number pattern is a valid regex")
    })
}

/// "3.8", "3,8" and "3.8/4.0" all give 3.8; text without a leading number gives `None`.
pub fn parse_gpa(raw: &str) -> Option<f64> {
    let captures = leading_number_pattern().captures(raw)?;
    captures[1].replace(',', ".").parse().ok()
}
