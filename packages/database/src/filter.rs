//! Predicate builder for filtered listings.
//!
//! A listing request carries a sparse set of optional filters. Each filter
//! is paired with a factory that turns its value into a [`Predicate`];
//! [`Conjunction::from_pairs`] folds over those pairs, skipping the absent
//! ones, and [`Conjunction::to_sql`] compiles what is left into a
//! parameterized `WHERE` clause. Values never touch the SQL text.

use std::fmt::Write as _;

use conflict_atlas_records_models::{Column, Scalar};
use switchy_database::DatabaseValue;

/// A single column-level comparison contributed by one filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C> {
    /// `column = value`.
    Eq(C, Scalar),
    /// `column_1 = value OR column_2 = value OR ...`.
    AnyEq(Vec<C>, Scalar),
    /// Numeric `column >= value`, for numeric-looking text only.
    AtLeast(C, Scalar),
    /// Numeric `column <= value`, for numeric-looking text only.
    AtMost(C, Scalar),
}

/// Factory turning a present filter value into a predicate.
pub type PredicateFactory<C> = fn(Scalar) -> Predicate<C>;

/// A filter value paired with the predicate it produces when present.
pub type FilterPair<C> = (Option<Scalar>, PredicateFactory<C>);

/// Normalizes an optional text filter: empty text counts as absent.
#[must_use]
pub fn text(value: Option<&str>) -> Option<Scalar> {
    value.filter(|v| !v.is_empty()).map(Scalar::from)
}

/// Lifts an optional integer filter.
#[must_use]
pub fn int(value: Option<i64>) -> Option<Scalar> {
    value.map(Scalar::Int)
}

/// Lifts an optional float filter. Non-finite bounds are treated as absent.
#[must_use]
pub fn float(value: Option<f64>) -> Option<Scalar> {
    value.filter(|v| v.is_finite()).map(Scalar::Float)
}

/// Predicates that must all hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction<C> {
    predicates: Vec<Predicate<C>>,
}

impl<C> Default for Conjunction<C> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

/// A compiled `WHERE` clause and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    /// Either empty or `" WHERE ..."`.
    pub where_clause: String,
    /// Parameter values in placeholder order.
    pub params: Vec<Scalar>,
    /// Next free placeholder index.
    pub next_idx: u32,
}

impl<C: Column> Conjunction<C> {
    /// Creates an empty conjunction (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a conjunction from `(value, factory)` pairs, skipping pairs
    /// whose value is absent.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = FilterPair<C>>) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |conj, (value, factory)| {
                conj.push_if(value, factory)
            })
    }

    /// Appends `factory(value)` when `value` is present.
    #[must_use]
    pub fn push_if(mut self, value: Option<Scalar>, factory: PredicateFactory<C>) -> Self {
        if let Some(value) = value {
            self.predicates.push(factory(value));
        }
        self
    }

    /// The accumulated predicates, in insertion order.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate<C>] {
        &self.predicates
    }

    /// Returns `true` if no predicate was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Compiles the conjunction into a `WHERE` clause using `$n`
    /// placeholders starting at `start_idx`.
    #[must_use]
    pub fn to_sql(&self, start_idx: u32) -> CompiledFilter {
        let mut frags = Vec::with_capacity(self.predicates.len());
        let mut params = Vec::new();
        let mut idx = start_idx;

        for predicate in &self.predicates {
            match predicate {
                Predicate::Eq(column, value) => {
                    frags.push(format!("{} = ${idx}", quote_ident(column.name())));
                    params.push(value.clone());
                    idx += 1;
                }
                Predicate::AnyEq(columns, value) => {
                    let mut alternatives = String::new();
                    for (i, column) in columns.iter().enumerate() {
                        if i > 0 {
                            alternatives.push_str(" OR ");
                        }
                        write!(alternatives, "{} = ${idx}", quote_ident(column.name())).unwrap();
                        params.push(value.clone());
                        idx += 1;
                    }
                    frags.push(format!("({alternatives})"));
                }
                Predicate::AtLeast(column, value) => {
                    frags.push(numeric_comparison(*column, ">=", idx));
                    params.push(value.clone());
                    idx += 1;
                }
                Predicate::AtMost(column, value) => {
                    frags.push(numeric_comparison(*column, "<=", idx));
                    params.push(value.clone());
                    idx += 1;
                }
            }
        }

        let where_clause = if frags.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", frags.join(" AND "))
        };

        CompiledFilter {
            where_clause,
            params,
            next_idx: idx,
        }
    }
}

/// Range comparison against a text column.
///
/// Only values that are plain decimals in the sense of
/// [`conflict_atlas_records_models::is_plain_decimal`] take part (after
/// stripping the same whitespace `coerce_float` strips), so the filter and
/// the in-Rust coercion agree on which rows are numeric.
fn numeric_comparison<C: Column>(column: C, op: &str, idx: u32) -> String {
    let trimmed = format!(
        "TRIM({}, char(32, 9, 10, 12, 13))",
        quote_ident(column.name())
    );
    let unsigned =
        format!("(CASE WHEN SUBSTR({trimmed}, 1, 1) IN ('+', '-') THEN SUBSTR({trimmed}, 2) ELSE {trimmed} END)");
    format!(
        "({unsigned} GLOB '*[0-9]*' AND {unsigned} NOT GLOB '*[^0-9.]*' \
         AND {unsigned} NOT GLOB '*.*.*' AND CAST({trimmed} AS REAL) {op} ${idx})"
    )
}

/// Double-quotes an identifier for `SQLite`.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Converts a filter value into a bound parameter.
#[must_use]
pub fn to_database_value(value: &Scalar) -> DatabaseValue {
    match value {
        Scalar::Int(v) => DatabaseValue::Int64(*v),
        Scalar::Float(v) => DatabaseValue::Real64(*v),
        Scalar::Text(v) => DatabaseValue::String(v.clone()),
    }
}
