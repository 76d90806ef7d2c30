//! Minimal robots.txt interpreter
//!
//! Only generic groups are considered: `User-agent: *` or any agent name
//! containing "bot". Inside such a group a root-level `Disallow: /` (or
//! `/*`) blocks the whole site. Every other rule is ignored here; per-URL
//! questions go through the `robotstxt` matcher instead.

use robotstxt::DefaultMatcher;
use serde::Serialize;

/// Advisory verdict derived from robots.txt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsVerdict {
    Allowed,
    Blocked,
}

/// The robots.txt advisory attached to a crawl session
///
/// Never stops the crawl; it is carried along for disclosure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotsAdvisory {
    pub verdict: RobotsVerdict,

    /// Human-readable notes (missing file, fetch errors, blocking rules)
    pub warnings: Vec<String>,

    /// Raw robots.txt content, if one was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RobotsAdvisory {
    /// Fail-open advisory used when robots.txt is missing or unreachable
    pub fn allowed_with_warning(warning: impl Into<String>) -> Self {
        Self {
            verdict: RobotsVerdict::Allowed,
            warnings: vec![warning.into()],
            content: None,
        }
    }

    /// Builds an advisory from fetched robots.txt content
    pub fn from_content(content: &str) -> Self {
        let verdict = interpret(content);
        let warnings = match verdict {
            RobotsVerdict::Blocked => vec![
                "robots.txt disallows all crawling for generic agents; crawl proceeded (advisory only)"
                    .to_string(),
            ],
            RobotsVerdict::Allowed => Vec::new(),
        };

        Self {
            verdict,
            warnings,
            content: Some(content.to_string()),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.verdict == RobotsVerdict::Blocked
    }

    /// Checks a full URL against the fetched rules with the `robotstxt` matcher
    ///
    /// Returns false when no robots.txt content is available.
    pub fn disallows(&self, url: &str, user_agent: &str) -> bool {
        match &self.content {
            Some(content) if !content.trim().is_empty() => {
                let mut matcher = DefaultMatcher::default();
                !matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
            _ => false,
        }
    }
}

/// Interprets robots.txt content into an advisory verdict
pub fn interpret(content: &str) -> RobotsVerdict {
    let mut group_agents: Vec<String> = Vec::new();
    // A User-agent line that follows a rule line starts a new group
    let mut in_rules = false;

    for line in content.lines() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        }
        .trim();

        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if in_rules {
                    group_agents.clear();
                    in_rules = false;
                }
                group_agents.push(value.to_ascii_lowercase());
            }
            "disallow" => {
                in_rules = true;
                if applies_to_generic_agents(&group_agents) && (value == "/" || value == "/*") {
                    return RobotsVerdict::Blocked;
                }
            }
            _ => in_rules = true,
        }
    }

    RobotsVerdict::Allowed
}

fn applies_to_generic_agents(agents: &[String]) -> bool {
    agents.iter().any(|agent| agent == "*" || agent.contains("bot"))
}
