//! Keyword categorization of posts.
//!
//! Each post body is matched against an ordered rule table (see [`rules`]).
//! The first rule with a keyword occurring in the lower-cased body decides the
//! label; bodies matching nothing are [`CategoryLabel::Other`]. Categorization
//! is a total function and never fails.

mod rule_table;

pub use rule_table::CategoryRule;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, instrument};

use crate::post::Post;

/// The fixed set of topic buckets a post can land in.
///
/// Ordering follows the display name, so sorted collections of labels come
/// out alphabetically ("Finance", "Life Advice", "Other", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryLabel {
    SoftwareDevelopment,
    Tech,
    Finance,
    LifeAdvice,
    Productivity,
    Other,
}

impl CategoryLabel {
    /// Every label, in rule-table order with [`CategoryLabel::Other`] last.
    pub const ALL: [CategoryLabel; 6] = [
        Self::SoftwareDevelopment,
        Self::Tech,
        Self::Finance,
        Self::LifeAdvice,
        Self::Productivity,
        Self::Other,
    ];

    /// Human-readable name used as the section heading.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SoftwareDevelopment => "Software Development",
            Self::Tech => "Tech",
            Self::Finance => "Finance",
            Self::LifeAdvice => "Life Advice",
            Self::Productivity => "Productivity",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ord for CategoryLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for CategoryLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the rule table in evaluation order.
#[must_use]
pub fn rules() -> &'static [CategoryRule] {
    rule_table::RULES
}

/// Assigns a label to a post body.
#[must_use]
pub fn categorize(body: &str) -> CategoryLabel {
    let lowered = body.to_lowercase();
    rule_table::RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map_or(CategoryLabel::Other, |rule| rule.label)
}

/// Posts bucketed by label.
///
/// Buckets keep fetch order; iteration visits labels alphabetically by
/// display name. Only labels with at least one post have a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    buckets: BTreeMap<CategoryLabel, Vec<Post>>,
}

impl Grouping {
    /// Creates an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Categorizes `post` and appends it to its bucket, returning the label.
    pub fn insert(&mut self, post: Post) -> CategoryLabel {
        let label = categorize(&post.body);
        self.buckets.entry(label).or_default().push(post);
        label
    }

    /// Iterates `(label, posts)` pairs in alphabetical label order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryLabel, &[Post])> {
        self.buckets
            .iter()
            .map(|(label, posts)| (*label, posts.as_slice()))
    }

    /// Posts in the bucket for `label`, if any.
    #[must_use]
    pub fn get(&self, label: CategoryLabel) -> Option<&[Post]> {
        self.buckets.get(&label).map(Vec::as_slice)
    }

    /// Labels that received at least one post, alphabetically.
    pub fn labels(&self) -> impl Iterator<Item = CategoryLabel> + '_ {
        self.buckets.keys().copied()
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of posts across all buckets.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Returns `true` when no posts were grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl FromIterator<Post> for Grouping {
    fn from_iter<I: IntoIterator<Item = Post>>(iter: I) -> Self {
        let mut grouping = Self::new();
        for post in iter {
            grouping.insert(post);
        }
        grouping
    }
}

/// Groups posts by label, preserving order inside each bucket.
#[must_use]
#[instrument(skip(posts), fields(posts = posts.len()))]
pub fn group(posts: Vec<Post>) -> Grouping {
    let grouping: Grouping = posts.into_iter().collect();
    debug!(
        categories = grouping.category_count(),
        posts = grouping.post_count(),
        "Grouped posts"
    );
    grouping
}
