//! Query descriptors: SQL text plus ordered bound parameters.
//!
//! Builders never interpolate caller-supplied values into SQL. Values go
//! through [`QueryBuilder::push_bind`], which appends the dialect's
//! placeholder and records the parameter.

use hubcheck_core::DbEngine;
use serde::Serialize;
use std::fmt;

/// Escape character used by [`escape_like`] and [`QueryBuilder::push_like_contains`].
pub const LIKE_ESCAPE: char = '!';

/// SQL dialect a descriptor is rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Dialect {
    /// `$1, $2, …` placeholders
    #[default]
    Postgres,
    /// `?` placeholders
    MySql,
    /// `?` placeholders
    Sqlite,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${index}"),
            Self::MySql | Self::Sqlite => "?".to_string(),
        }
    }
}

impl From<DbEngine> for Dialect {
    fn from(engine: DbEngine) -> Self {
        match engine {
            DbEngine::Postgres => Self::Postgres,
            DbEngine::Mysql => Self::MySql,
            DbEngine::Sqlite => Self::Sqlite,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::MySql => write!(f, "mysql"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Text(String),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for SqlParam {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for SqlParam {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Immutable SQL text + parameters for one dialect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescriptor {
    dialect: Dialect,
    sql: String,
    params: Vec<SqlParam>,
}

impl QueryDescriptor {
    /// Descriptor for a statement without parameters.
    #[must_use]
    pub fn raw(dialect: Dialect, sql: impl Into<String>) -> Self {
        Self {
            dialect,
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Dialect the SQL was rendered for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Rendered SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sql = self.sql.split_whitespace().collect::<Vec<_>>().join(" ");
        write!(f, "{sql} [{} params]", self.params.len())
    }
}

/// Incremental builder for [`QueryDescriptor`].
#[derive(Debug)]
pub struct QueryBuilder {
    dialect: Dialect,
    sql: String,
    params: Vec<SqlParam>,
}

impl QueryBuilder {
    /// Start an empty query for `dialect`.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Append fixed SQL text. Never pass caller input here.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a placeholder and bind `value` to it.
    pub fn push_bind(&mut self, value: impl Into<SqlParam>) -> &mut Self {
        self.params.push(value.into());
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
        self
    }

    /// Append `LIKE <placeholder> ESCAPE '!'` matching `fragment` anywhere.
    pub fn push_like_contains(&mut self, fragment: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(fragment));
        self.push(" LIKE ")
            .push_bind(pattern)
            .push(&format!(" ESCAPE '{LIKE_ESCAPE}'"))
    }

    /// Finish the descriptor.
    #[must_use]
    pub fn build(self) -> QueryDescriptor {
        QueryDescriptor {
            dialect: self.dialect,
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Escape LIKE wildcards (`%`, `_`) and the escape character itself.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
