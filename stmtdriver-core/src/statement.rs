//! Database-agnostic statement model.
//!
//! A [`Statement`] describes one operation against one collection: a find, an
//! insert, an update or a destroy, optionally narrowed by [`Criteria`]. The
//! `where` clause is a [`Predicate`] tree.
//!
//! Statements are usually parsed from JSON (see [`crate::parse`]), but can also be
//! built from Rust code:
//!
//! ```ignore
//! use stmtdriver_core::statement::{Statement, Filter, SortDirection};
//!
//! let statement = Statement::find("people")
//!     .filter(Filter::and([
//!         Filter::gt("age", 18),
//!         Filter::starts_with("name", "A"),
//!     ]))
//!     .sort("age", SortDirection::Desc)
//!     .limit(10)
//!     .build();
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dictionary::Dictionary;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// One entry of a sort clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The attribute to sort by.
    pub attribute: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// Comparison operators of the statement vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `!=`
    NotEqual,
    /// `in`: the attribute equals one of the listed values.
    In,
    /// `nin`: the attribute equals none of the listed values.
    NotIn,
    /// `like`: pattern match where `%` matches any run of characters.
    Like,
    /// `contains`: the string attribute contains the value.
    Contains,
    /// `startsWith`
    StartsWith,
    /// `endsWith`
    EndsWith,
    /// A token outside the vocabulary, kept verbatim so adapters can report it.
    Unrecognized(String),
}

impl Operator {
    /// Parses an operator token. Unknown tokens become [`Operator::Unrecognized`].
    pub fn from_token(token: &str) -> Self {
        match token {
            "<" => Operator::LessThan,
            "<=" => Operator::LessThanOrEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterThanOrEqual,
            "!=" => Operator::NotEqual,
            "in" => Operator::In,
            "nin" => Operator::NotIn,
            "like" => Operator::Like,
            "contains" => Operator::Contains,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            other => Operator::Unrecognized(other.to_string()),
        }
    }

    /// Returns the token as written in statements.
    pub fn token(&self) -> &str {
        match self {
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::NotEqual => "!=",
            Operator::In => "in",
            Operator::NotIn => "nin",
            Operator::Like => "like",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Unrecognized(token) => token,
        }
    }
}

/// An operator applied to a value, e.g. `{">": 18}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub operator: Operator,
    pub value: Value,
}

impl Modifier {
    pub fn new(operator: Operator, value: impl Into<Value>) -> Self {
        Self { operator, value: value.into() }
    }
}

/// A node of the `where` tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Explicit conjunction (`{"and": [...]}`); all children must match.
    And(Vec<Predicate>),
    /// Explicit disjunction (`{"or": [...]}`); any child may match.
    Or(Vec<Predicate>),
    /// Sibling keys of one node, all of which must match.
    All(Vec<Predicate>),
    /// `{attribute: value}`.
    Equal {
        attribute: String,
        value: Value,
    },
    /// `{attribute: {operator: value, ...}}`, with the modifier map's own `opts`.
    Compare {
        attribute: String,
        modifiers: Vec<Modifier>,
        opts: Option<Dictionary>,
    },
    /// A node carrying adapter-specific `opts` next to its predicate.
    Annotated {
        predicate: Box<Predicate>,
        opts: Dictionary,
    },
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Equal { attribute: attribute.into(), value: value.into() }
    }

    /// Creates a predicate applying a single modifier to an attribute.
    pub fn compare(attribute: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            attribute: attribute.into(),
            modifiers: vec![Modifier::new(operator, value)],
            opts: None,
        }
    }

    /// Combines this predicate with another using an explicit `and`.
    ///
    /// If this predicate is already an `and`, the other predicate is appended
    /// to it.
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut list) => {
                list.push(other);
                Predicate::And(list)
            }
            _ => Predicate::And(vec![self, other]),
        }
    }

    /// Combines this predicate with another using an explicit `or`.
    ///
    /// If this predicate is already an `or`, the other predicate is appended
    /// to it.
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut list) => {
                list.push(other);
                Predicate::Or(list)
            }
            _ => Predicate::Or(vec![self, other]),
        }
    }

    /// Attaches adapter-specific `opts` to this node.
    pub fn with_opts(self, opts: Dictionary) -> Self {
        Predicate::Annotated { predicate: Box::new(self), opts }
    }
}

/// Helper for constructing predicates.
///
/// ```ignore
/// use stmtdriver_core::statement::Filter;
///
/// let predicate = Filter::eq("status", "active").and(Filter::gte("age", 18));
/// ```
pub struct Filter;

impl Filter {
    /// Matches records where the attribute equals the value.
    pub fn eq(attribute: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::equal(attribute, value)
    }

    /// `!=`
    pub fn ne(attribute: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(attribute, Operator::NotEqual, value)
    }

    /// `>`
    pub fn gt(attribute: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(attribute, Operator::GreaterThan, value)
    }

    /// `>=`
    pub fn gte(attribute: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(attribute, Operator::GreaterThanOrEqual, value)
    }

    /// `<`
    pub fn lt(attribute: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(attribute, Operator::LessThan, value)
    }

    /// `<=`
    pub fn lte(attribute: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(attribute, Operator::LessThanOrEqual, value)
    }

    /// Matches records where the attribute equals any of the values.
    pub fn is_in<V: Into<Value>>(
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Predicate {
        Predicate::compare(attribute, Operator::In, array(values))
    }

    /// Matches records where the attribute equals none of the values.
    pub fn not_in<V: Into<Value>>(
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Predicate {
        Predicate::compare(attribute, Operator::NotIn, array(values))
    }

    /// Pattern match; `%` matches any run of characters.
    pub fn like(attribute: impl Into<String>, pattern: impl Into<String>) -> Predicate {
        Predicate::compare(attribute, Operator::Like, pattern.into())
    }

    pub fn contains(attribute: impl Into<String>, text: impl Into<String>) -> Predicate {
        Predicate::compare(attribute, Operator::Contains, text.into())
    }

    pub fn starts_with(attribute: impl Into<String>, text: impl Into<String>) -> Predicate {
        Predicate::compare(attribute, Operator::StartsWith, text.into())
    }

    pub fn ends_with(attribute: impl Into<String>, text: impl Into<String>) -> Predicate {
        Predicate::compare(attribute, Operator::EndsWith, text.into())
    }

    /// All predicates must match.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::And(predicates.into_iter().collect())
    }

    /// Any predicate may match.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::Or(predicates.into_iter().collect())
    }
}

fn array<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Value {
    Value::Array(values.into_iter().map(Into::into).collect())
}

/// Narrowing clauses of a statement.
///
/// Absent clauses mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    /// The `where` clause.
    pub filter: Option<Predicate>,
    /// Sort clause, in priority order.
    pub sort: Option<Vec<Sort>>,
    /// Maximum number of records to return.
    pub limit: Option<u64>,
    /// Number of records to skip.
    pub skip: Option<u64>,
    /// Attributes to return. `None` returns every attribute.
    pub select: Option<Vec<String>>,
    /// Adapter-specific options for the whole criteria.
    pub opts: Option<Dictionary>,
}

impl Criteria {
    /// Returns `true` if no clause is set.
    pub fn is_empty(&self) -> bool {
        self == &Criteria::default()
    }
}

/// Records of an insert statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    One(Dictionary),
    Many(Vec<Dictionary>),
}

/// The operation a statement performs.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Find,
    Insert(Records),
    /// Values to set on every matching record.
    Update(Dictionary),
    Destroy,
}

impl StatementKind {
    /// A short name for messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::Find => "find",
            StatementKind::Insert(_) => "insert",
            StatementKind::Update(_) => "update",
            StatementKind::Destroy => "destroy",
        }
    }
}

/// One operation against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The collection the statement targets.
    pub using: String,
    pub kind: StatementKind,
    pub criteria: Option<Criteria>,
    /// Adapter-specific options for the whole statement.
    pub opts: Option<Dictionary>,
}

impl Statement {
    /// Starts a find statement.
    pub fn find(using: impl Into<String>) -> StatementBuilder {
        StatementBuilder::new(using, StatementKind::Find)
    }

    /// Starts a statement inserting one record.
    pub fn insert(using: impl Into<String>, record: Dictionary) -> StatementBuilder {
        StatementBuilder::new(using, StatementKind::Insert(Records::One(record)))
    }

    /// Starts a statement inserting several records.
    pub fn insert_many(using: impl Into<String>, records: impl IntoIterator<Item = Dictionary>) -> StatementBuilder {
        StatementBuilder::new(
            using,
            StatementKind::Insert(Records::Many(records.into_iter().collect())),
        )
    }

    /// Starts an update statement.
    pub fn update(using: impl Into<String>, values: Dictionary) -> StatementBuilder {
        StatementBuilder::new(using, StatementKind::Update(values))
    }

    /// Starts a destroy statement.
    pub fn destroy(using: impl Into<String>) -> StatementBuilder {
        StatementBuilder::new(using, StatementKind::Destroy)
    }
}

#[derive(Debug, Clone)]
pub struct StatementBuilder {
    statement: Statement,
}

impl StatementBuilder {
    fn new(using: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            statement: Statement {
                using: using.into(),
                kind,
                criteria: None,
                opts: None,
            },
        }
    }

    fn criteria(&mut self) -> &mut Criteria {
        self.statement.criteria.get_or_insert_with(Criteria::default)
    }

    /// Sets the `where` clause.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.criteria().filter = Some(predicate);
        self
    }

    /// Appends an entry to the sort clause.
    pub fn sort(mut self, attribute: impl Into<String>, direction: SortDirection) -> Self {
        self.criteria()
            .sort
            .get_or_insert_with(Vec::new)
            .push(Sort { attribute: attribute.into(), direction });
        self
    }

    /// Sets the maximum number of records to return.
    pub fn limit(mut self, limit: u64) -> Self {
        self.criteria().limit = Some(limit);
        self
    }

    /// Sets the number of records to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.criteria().skip = Some(skip);
        self
    }

    /// Sets the attributes to return.
    pub fn select<S: Into<String>>(mut self, attributes: impl IntoIterator<Item = S>) -> Self {
        self.criteria().select = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets adapter-specific options on the criteria.
    pub fn criteria_opts(mut self, opts: Dictionary) -> Self {
        self.criteria().opts = Some(opts);
        self
    }

    /// Sets adapter-specific options on the statement.
    pub fn opts(mut self, opts: Dictionary) -> Self {
        self.statement.opts = Some(opts);
        self
    }

    pub fn build(self) -> Statement {
        self.statement
    }
}
