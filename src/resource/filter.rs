//! Filter-to-query translation
//!
//! A [`Filter`] maps logical filter names (camelCase, as in the gateway
//! schema) to [`Matcher`]s. On the wire every name becomes a
//! lowercase-hyphenated query key and every matcher a single value:
//!
//! | matcher | example | query value |
//! |---------|---------|-------------|
//! | equality | `published = true` | `true` |
//! | any-of | `datasets any [a, b]` | `any:a,b` |
//! | all-of | `tags all [x, y]` | `all:x,y` |
//!
//! The encoding is the gateway's contract and is reversible: parsing the
//! produced query gives back the same filter.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

const ANY_PREFIX: &str = "any:";
const ALL_PREFIX: &str = "all:";
const ITEM_SEPARATOR: char = ',';

pub const PAGE_SIZE: &str = "pageSize";
pub const NEXT_PAGE_TOKEN: &str = "nextPageToken";

/// Value side of one filter entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Eq(String),
    AnyOf(Vec<String>),
    AllOf(Vec<String>),
}

impl Matcher {
    pub fn equals(value: impl ToString) -> Self {
        Self::Eq(value.to_string())
    }

    /// Matches when at least one of `items` is present
    pub fn any_of<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::AnyOf(list_items(items)?))
    }

    /// Matches when every one of `items` is present
    pub fn all_of<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::AllOf(list_items(items)?))
    }

    /// Wire form of the matcher
    pub fn encode(&self) -> String {
        match self {
            Self::Eq(value) => value.clone(),
            Self::AnyOf(items) => format!("{}{}", ANY_PREFIX, items.join(",")),
            Self::AllOf(items) => format!("{}{}", ALL_PREFIX, items.join(",")),
        }
    }

    /// Parse a wire value back into a matcher
    pub fn decode(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(ANY_PREFIX) {
            Self::AnyOf(split_items(rest))
        } else if let Some(rest) = raw.strip_prefix(ALL_PREFIX) {
            Self::AllOf(split_items(rest))
        } else {
            Self::Eq(raw.to_string())
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn list_items<I, S>(items: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let items: Vec<String> = items.into_iter().map(Into::into).collect();
    if let Some(bad) = items.iter().find(|i| i.is_empty() || i.contains(ITEM_SEPARATOR)) {
        return Err(Error::InvalidFilter(format!(
            "list matcher items must be non-empty and free of '{}': {:?}",
            ITEM_SEPARATOR, bad
        )));
    }
    Ok(items)
}

fn split_items(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(ITEM_SEPARATOR).map(str::to_string).collect()
}

/// Render a camelCase filter name as its query key: `nextPageToken` -> `next-page-token`
pub fn to_query_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !key.is_empty() {
                key.push('-');
            }
            key.push(c.to_ascii_lowercase());
        } else {
            key.push(c);
        }
    }
    key
}

/// Inverse of [`to_query_key`]
pub fn from_query_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            name.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Logical filter for a list call, pagination controls included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    matchers: BTreeMap<String, Matcher>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, matcher: Matcher) -> Self {
        self.set(name, matcher);
        self
    }

    pub fn equals(self, name: &str, value: impl ToString) -> Self {
        self.with(name, Matcher::equals(value))
    }

    pub fn set(&mut self, name: &str, matcher: Matcher) {
        self.matchers.insert(name.to_string(), matcher);
    }

    /// Set only when a value is given
    pub fn set_opt(&mut self, name: &str, matcher: Option<Matcher>) {
        if let Some(matcher) = matcher {
            self.set(name, matcher);
        }
    }

    pub fn page_size(self, size: u32) -> Self {
        self.equals(PAGE_SIZE, size)
    }

    pub fn next_page_token(self, token: &str) -> Self {
        self.equals(NEXT_PAGE_TOKEN, token)
    }

    pub fn get(&self, name: &str) -> Option<&Matcher> {
        self.matchers.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Query pairs in key order
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.matchers
            .iter()
            .map(|(name, matcher)| (to_query_key(name), matcher.encode()))
            .collect()
    }

    /// Rebuild a filter from decoded query pairs
    pub fn from_query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let matchers = pairs
            .into_iter()
            .map(|(k, v)| (from_query_key(k.as_ref()), Matcher::decode(v.as_ref())))
            .collect();
        Self { matchers }
    }

    /// Percent-encoded query string, without the leading `?`
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query())
            .finish()
    }

    pub fn parse_query_string(query: &str) -> Self {
        Self::from_query(url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()))
    }
}
