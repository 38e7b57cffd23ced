//! List filtering, search and ordering for posts.
//!
//! Every supported query parameter maps to one named predicate below. Storage
//! backends either call [`PostFilter::matches`] directly (in-memory) or
//! translate the same fields into their own query language (PostgreSQL).

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::domain::Post;
use crate::validation::{FieldErrors, MSG_INVALID_DATE, parse_date};

/// Column a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedDate,
    PostTitle,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "created_date" => Some(SortField::CreatedDate),
            "post_title" => Some(SortField::PostTitle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

/// Newest first.
pub const DEFAULT_ORDERING: SortKey = SortKey {
    field: SortField::CreatedDate,
    direction: Direction::Desc,
};

/// Raw list parameters as they arrive on the query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParams<'a> {
    pub post_title: Option<&'a str>,
    pub author_username: Option<&'a str>,
    pub created_date: Option<&'a str>,
    pub search: Option<&'a str>,
    pub ordering: Option<&'a str>,
}

/// A parsed list query. Text needles are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub post_title: Option<String>,
    pub author_username: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub search_terms: Vec<String>,
    pub ordering: Vec<SortKey>,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            post_title: None,
            author_username: None,
            created_date: None,
            search_terms: Vec::new(),
            ordering: vec![DEFAULT_ORDERING],
        }
    }
}

impl PostFilter {
    /// Build a filter from query parameters. Empty parameters are ignored.
    pub fn from_params(params: &FilterParams<'_>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let created_date = match non_empty(params.created_date) {
            None => None,
            Some(raw) => {
                let parsed = parse_date(raw.trim());
                if parsed.is_none() {
                    errors.add("created_date", MSG_INVALID_DATE);
                }
                parsed
            }
        };

        errors.into_result(Self {
            post_title: non_empty(params.post_title).map(str::to_lowercase),
            author_username: non_empty(params.author_username).map(str::to_lowercase),
            created_date,
            search_terms: parse_search_terms(params.search),
            ordering: parse_ordering(params.ordering),
        })
    }

    /// Whether `post` passes every active constraint.
    pub fn matches(&self, post: &Post) -> bool {
        self.post_title
            .as_deref()
            .is_none_or(|needle| title_contains(post, needle))
            && self
                .author_username
                .as_deref()
                .is_none_or(|needle| author_username_contains(post, needle))
            && self.created_date.is_none_or(|date| created_on(post, date))
            && search_matches(post, &self.search_terms)
    }

    /// Compare two posts by the requested ordering, newest id first on ties.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        self.ordering
            .iter()
            .fold(Ordering::Equal, |acc, key| acc.then_with(|| compare_by(a, b, *key)))
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// `post_title` contains `needle`, ignoring case. `needle` must be lowercase.
pub fn title_contains(post: &Post, needle: &str) -> bool {
    contains_ignore_case(&post.post_title, needle)
}

/// The author's username contains `needle`, ignoring case.
pub fn author_username_contains(post: &Post, needle: &str) -> bool {
    contains_ignore_case(&post.author.username, needle)
}

pub fn created_on(post: &Post, date: NaiveDate) -> bool {
    post.created_date == date
}

/// Every term appears in the title, the content or the author's username.
pub fn search_matches(post: &Post, terms: &[String]) -> bool {
    terms.iter().all(|term| {
        contains_ignore_case(&post.post_title, term)
            || contains_ignore_case(&post.post_content, term)
            || contains_ignore_case(&post.author.username, term)
    })
}

/// Split a search string on whitespace and commas into lowercase terms.
pub fn parse_search_terms(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Parse `ordering=post_title,-created_date`. Unknown fields are dropped; an
/// empty result falls back to [`DEFAULT_ORDERING`].
pub fn parse_ordering(raw: Option<&str>) -> Vec<SortKey> {
    let keys: Vec<SortKey> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|part| {
            let (direction, name) = match part.strip_prefix('-') {
                Some(name) => (Direction::Desc, name),
                None => (Direction::Asc, part),
            };
            SortField::parse(name).map(|field| SortKey { field, direction })
        })
        .collect();

    if keys.is_empty() {
        vec![DEFAULT_ORDERING]
    } else {
        keys
    }
}

fn compare_by(a: &Post, b: &Post, key: SortKey) -> Ordering {
    let ordering = match key.field {
        SortField::CreatedDate => a.created_date.cmp(&b.created_date),
        // Case-insensitive, matching `ORDER BY LOWER(post_title)` in SQL.
        SortField::PostTitle => a
            .post_title
            .to_lowercase()
            .cmp(&b.post_title.to_lowercase()),
    };
    match key.direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
