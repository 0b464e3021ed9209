//! Translates [`SearchFilters`] into a backend predicate.
//!
//! The predicate renders to the Cosmos DB SQL dialect (documents aliased as
//! `c`) and can also be evaluated in process against a [`MovieRecord`].

use std::fmt::{self, Display, Write as _};

use crate::models::{MovieRecord, RatingRange, SearchFilters, YearRange};

const DOC_ALIAS: &str = "c";

/// Some documents store the rating as a numeric string; compare numerically either way
const RATING_EXPR: &str = "(IS_STRING(c.rating) ? StringToNumber(c.rating) : c.rating)";

/// One conjunct of a [`Predicate`]
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Year(YearRange),
    Rating(RatingRange),
    /// Matches when the record lists at least one of these genres
    AnyGenre(Vec<String>),
}

impl Clause {
    fn matches(&self, record: &MovieRecord) -> bool {
        match self {
            Clause::Year(range) => range.contains(record.year),
            Clause::Rating(range) => range.contains(record.rating),
            Clause::AnyGenre(genres) => genres.iter().any(|g| record.genres.contains(g)),
        }
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Year(range) => write!(
                f,
                "{a}.year >= {} AND {a}.year <= {}",
                range.lo,
                range.hi,
                a = DOC_ALIAS
            ),
            Clause::Rating(range) => write!(
                f,
                "{r} >= {} AND {r} <= {}",
                number_literal(range.lo),
                number_literal(range.hi),
                r = RATING_EXPR
            ),
            Clause::AnyGenre(genres) => {
                f.write_char('(')?;
                for (i, genre) in genres.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" OR ")?;
                    }
                    write!(
                        f,
                        "ARRAY_CONTAINS({}.genres, {})",
                        DOC_ALIAS,
                        string_literal(genre)
                    )?;
                }
                f.write_char(')')
            }
        }
    }
}

/// AND-combination of clauses; `Display` yields the WHERE-clause body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluates the predicate against a record without a backend round-trip
    pub fn matches(&self, record: &MovieRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Builds predicates from request filters
pub struct FilterBuilder;

impl FilterBuilder {
    /// Year and rating clauses are always emitted, even for full-domain
    /// bounds. Genres, when present, become one parenthesised OR group.
    pub fn build(
        year_range: YearRange,
        rating_range: RatingRange,
        genres: &[String],
    ) -> Predicate {
        let mut clauses = vec![Clause::Year(year_range), Clause::Rating(rating_range)];

        let mut wanted: Vec<String> = Vec::with_capacity(genres.len());
        for genre in genres {
            if !genre.is_empty() && !wanted.contains(genre) {
                wanted.push(genre.clone());
            }
        }
        if !wanted.is_empty() {
            clauses.push(Clause::AnyGenre(wanted));
        }

        Predicate { clauses }
    }

    pub fn from_filters(filters: &SearchFilters) -> Predicate {
        Self::build(filters.year_range, filters.rating_range, &filters.genres)
    }
}

/// Renders floats with a decimal point and never in exponent form
fn number_literal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Single-quoted string literal with backslash escapes
fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
