//! Keyword search condition composition.
//!
//! [`SearchQuery`] holds a named keyword (typically lifted from a query
//! parameter) and composes a case-insensitive LIKE condition over a set of
//! columns. LIKE wildcards in the keyword are escaped so user input cannot
//! widen the match.

use sea_orm::Condition;
use sea_orm::sea_query::{Alias, Expr, ExprTrait, Func};

/// Escape LIKE wildcards to prevent wildcard injection.
/// Escapes: `\` (escape char), `%` (match any) and `_` (match single char).
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A named search keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    name: String,
    keyword: Option<String>,
}

impl SearchQuery {
    /// An empty keyword counts as no keyword.
    #[must_use]
    pub fn new(name: impl Into<String>, keyword: Option<String>) -> Self {
        Self {
            name: name.into(),
            keyword: keyword.filter(|keyword| !keyword.is_empty()),
        }
    }

    /// Name of the parameter the keyword came from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// OR-combined `UPPER(column) LIKE UPPER('%keyword%')` over the given
    /// column names. `None` when there is no keyword, so callers can leave
    /// their query untouched.
    #[must_use]
    pub fn like_condition(&self, columns: &[&str]) -> Option<Condition> {
        let keyword = self.keyword()?;
        let pattern = format!("%{}%", escape_like_wildcards(keyword).to_uppercase());
        let mut condition = Condition::any();
        for column in columns {
            condition = condition.add(Func::upper(Expr::col(Alias::new(*column))).like(pattern.as_str()));
        }
        Some(condition)
    }
}
