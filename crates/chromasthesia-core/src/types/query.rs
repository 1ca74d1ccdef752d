//! Search query value object.
//!
//! One [`SearchQuery`] instance is built per submission and mutated in place
//! across keyword-relaxation retries by the single logical thread of control
//! executing the querying state. It is never shared across tasks.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::ColorValue;

/// Tolerance for the color-weight budget check.
const WEIGHT_EPSILON: f32 = 1e-4;

/// One weighted term of the composite `q` sub-expression.
///
/// A tagged union instead of a heterogeneously-keyed option map: the color
/// weight budget stays checkable without type inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueryTerm {
    /// A concrete color with a relevance weight.
    Color {
        color: ColorValue,
        weight: f32,
    },
    /// A named color group (e.g. "warm") with a relevance weight.
    ColorGroup {
        name: String,
        weight: f32,
    },
    /// A free-form key/value option forwarded verbatim to the service.
    Named {
        key: String,
        value: String,
    },
}

impl QueryTerm {
    /// Weight contribution toward the color budget (`Named` terms are free).
    #[must_use]
    pub fn color_weight(&self) -> f32 {
        match self {
            QueryTerm::Color { weight, .. } | QueryTerm::ColorGroup { weight, .. } => *weight,
            QueryTerm::Named { .. } => 0.0,
        }
    }

    fn token(&self) -> String {
        match self {
            QueryTerm::Color { color, weight } => format!("color:{};{:.3}", color.hex(), weight),
            QueryTerm::ColorGroup { name, weight } => format!("colorgroup:{};{:.3}", name, weight),
            QueryTerm::Named { key, value } => format!("{}:{}", key, value),
        }
    }
}

/// A weighted search query against the image search service.
///
/// Serialized onto the wire as the query parameters `start`, `count` and a
/// composite `q` string: free-text keywords followed by a parenthesized
/// sub-expression of weighted terms.
///
/// # Example
///
/// ```
/// use chromasthesia_core::types::{ColorValue, QueryTerm, SearchQuery};
///
/// let query = SearchQuery::new(
///     0,
///     24,
///     "storm ocean".to_string(),
///     vec![QueryTerm::Color { color: ColorValue::new(0x4a6fa5), weight: 0.25 }],
/// )
/// .unwrap();
/// assert_eq!(query.to_query_string(), "storm ocean (color:4a6fa5;0.250)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Result offset of the requested page.
    pub start: u64,
    /// Maximum number of results requested.
    pub page_size: usize,
    /// Space-joined free-text keywords; may be empty.
    pub keywords: String,
    /// Weighted sub-expression terms.
    terms: Vec<QueryTerm>,
}

impl SearchQuery {
    /// Build a query, validating the color-weight budget.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` when the summed `Color`/`ColorGroup` weights
    /// exceed 1.0. That is a caller/configuration error, not a runtime
    /// condition to recover from.
    pub fn new(
        start: u64,
        page_size: usize,
        keywords: String,
        terms: Vec<QueryTerm>,
    ) -> CoreResult<Self> {
        let total: f32 = terms.iter().map(QueryTerm::color_weight).sum();
        if total > 1.0 + WEIGHT_EPSILON {
            return Err(CoreError::Validation {
                field: "terms".to_string(),
                message: format!("color term weights sum to {total:.3}, budget is 1.0"),
            });
        }
        Ok(Self {
            start,
            page_size,
            keywords,
            terms,
        })
    }

    /// The weighted terms of the query.
    #[must_use]
    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    /// Strip the last whitespace-delimited keyword token.
    ///
    /// This is the keyword-relaxation step applied when a query returns zero
    /// results. Returns `false` when there was nothing left to strip, which
    /// bounds the retry loop by the initial keyword count.
    pub fn relax_keywords(&mut self) -> bool {
        let trimmed = self.keywords.trim_end();
        if trimmed.is_empty() {
            self.keywords.clear();
            return false;
        }
        match trimmed.rfind(char::is_whitespace) {
            Some(pos) => self.keywords.truncate(pos),
            None => self.keywords.clear(),
        }
        self.keywords = self.keywords.trim_end().to_string();
        true
    }

    /// Serialize the composite `q` string: keywords, then the parenthesized
    /// weighted sub-expression. Either part may be absent.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let keywords = self.keywords.trim();
        if self.terms.is_empty() {
            return keywords.to_string();
        }
        let sub = self
            .terms
            .iter()
            .map(QueryTerm::token)
            .collect::<Vec<_>>()
            .join(" ");
        if keywords.is_empty() {
            format!("({sub})")
        } else {
            format!("{keywords} ({sub})")
        }
    }
}
