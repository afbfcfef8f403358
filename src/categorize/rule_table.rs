//! The ordered keyword rule table.

use super::CategoryLabel;

/// A single categorization rule: a label and the keywords that select it.
///
/// Keywords are lower-case and match as plain substrings of the lower-cased
/// post body, so `"ai"` also matches inside `"said"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRule {
    /// Label assigned when any keyword matches.
    pub label: CategoryLabel,
    /// Lower-case substrings that trigger this rule.
    pub keywords: &'static [&'static str],
}

impl CategoryRule {
    /// Returns `true` if any keyword occurs in `lowered`.
    ///
    /// `lowered` must already be lower-case.
    #[must_use]
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

/// Rules in evaluation order. The first match wins; no match means
/// [`CategoryLabel::Other`].
pub(super) static RULES: &[CategoryRule] = &[
    CategoryRule {
        label: CategoryLabel::SoftwareDevelopment,
        keywords: &["java", "spring", "api", "python", "code", "backend"],
    },
    CategoryRule {
        label: CategoryLabel::Tech,
        keywords: &[
            "ai", "robotics", "llm", "chatgpt", "gemini", "grok", "ai model",
        ],
    },
    CategoryRule {
        label: CategoryLabel::Finance,
        keywords: &[
            "invest", "stock", "market", "sip", "nifty", "amd", "nvda", "tesla", "crypto",
            "bitcoin", "ethereum",
        ],
    },
    CategoryRule {
        label: CategoryLabel::LifeAdvice,
        keywords: &["discipline", "habit", "consistency", "mindset"],
    },
    CategoryRule {
        label: CategoryLabel::Productivity,
        keywords: &[
            "sleep",
            "focus",
            "routine",
            "productivity",
            "time",
            "energy",
            "job",
            "work",
        ],
    },
];
