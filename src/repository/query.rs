//! Typed filter expressions and their Cosmos SQL translation
//!
//! Filters are built from comparison and combinator nodes and compiled to a
//! parameterised query of the form `SELECT * FROM root WHERE <expr>`. Values
//! never appear inline in the query text; each one becomes an `@pN` parameter.
//!
//! ```rust
//! use docsync::repository::query::{Field, QuerySpec};
//!
//! let filter = Field::new("name").eq("MFA").and(Field::new("level").ne("Basic"));
//! let spec = QuerySpec::from_filter(&filter).unwrap();
//! assert_eq!(
//!     spec.sql.query,
//!     r#"SELECT * FROM root WHERE (root["name"] = @p0 AND root["level"] != @p1)"#
//! );
//! ```
//!
//! Compilation rejects shapes the store cannot evaluate (empty paths, ordering
//! comparisons on non-scalar operands, empty combinators) with a
//! [`QueryError`] before any request is sent.

use crate::domain::QueryError;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

/// Filter expression over document properties
///
/// Field paths use dot notation (`address.city`).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field <op> value`
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// `field IN (values...)`
    In { field: String, values: Vec<Value> },
    /// `STARTSWITH(field, prefix)`
    StartsWith { field: String, prefix: Value },
    /// `CONTAINS(field, needle)`
    Contains { field: String, needle: Value },
    /// `IS_DEFINED(field)`
    IsDefined { field: String },
    /// Conjunction
    And(Vec<Filter>),
    /// Disjunction
    Or(Vec<Filter>),
    /// Negation
    Not(Box<Filter>),
}

/// Entry point for building filters on one field
#[derive(Debug, Clone)]
pub struct Field(String);

impl Field {
    pub fn new(path: impl Into<String>) -> Self {
        Field(path.into())
    }

    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Filter {
        Filter::Compare {
            field: self.0,
            op,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Filter {
        self.compare(CompareOp::Ge, value)
    }

    pub fn is_in<I, V>(self, values: I) -> Filter
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In {
            field: self.0,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn starts_with(self, prefix: impl Into<Value>) -> Filter {
        Filter::StartsWith {
            field: self.0,
            prefix: prefix.into(),
        }
    }

    pub fn contains(self, needle: impl Into<Value>) -> Filter {
        Filter::Contains {
            field: self.0,
            needle: needle.into(),
        }
    }

    pub fn is_defined(self) -> Filter {
        Filter::IsDefined { field: self.0 }
    }
}

impl Filter {
    /// Conjunction with another filter, flattening nested `And`s
    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::And(mut members) => {
                members.push(other);
                Filter::And(members)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Disjunction with another filter, flattening nested `Or`s
    pub fn or(self, other: Filter) -> Filter {
        match self {
            Filter::Or(mut members) => {
                members.push(other);
                Filter::Or(members)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    /// Evaluate the filter against a document in process
    ///
    /// Follows the store's three-valued semantics: comparisons against a
    /// missing property or an operand of another type are undefined, and
    /// only documents for which the whole expression is `true` match.
    pub fn matches(&self, document: &Value) -> bool {
        self.evaluate(document) == Some(true)
    }

    fn evaluate(&self, document: &Value) -> Option<bool> {
        match self {
            Filter::Compare { field, op, value } => {
                let actual = lookup(document, field)?;
                let ordering = compare_values(actual, value)?;
                match op {
                    CompareOp::Eq => Some(ordering == Ordering::Equal),
                    CompareOp::Ne => Some(ordering != Ordering::Equal),
                    CompareOp::Lt => Some(ordering == Ordering::Less),
                    CompareOp::Le => Some(ordering != Ordering::Greater),
                    CompareOp::Gt => Some(ordering == Ordering::Greater),
                    CompareOp::Ge => Some(ordering != Ordering::Less),
                }
            }
            Filter::In { field, values } => {
                let actual = lookup(document, field)?;
                Some(
                    values
                        .iter()
                        .any(|v| compare_values(actual, v) == Some(Ordering::Equal)),
                )
            }
            Filter::StartsWith { field, prefix } => {
                let actual = lookup(document, field)?.as_str()?;
                Some(actual.starts_with(prefix.as_str()?))
            }
            Filter::Contains { field, needle } => {
                let actual = lookup(document, field)?.as_str()?;
                Some(actual.contains(needle.as_str()?))
            }
            Filter::IsDefined { field } => Some(lookup(document, field).is_some()),
            Filter::And(members) => {
                let mut result = Some(true);
                for member in members {
                    match member.evaluate(document) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => result = None,
                    }
                }
                result
            }
            Filter::Or(members) => {
                let mut result = Some(false);
                for member in members {
                    match member.evaluate(document) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => result = None,
                    }
                }
                result
            }
            Filter::Not(inner) => inner.evaluate(document).map(|b| !b),
        }
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            (left == right).then_some(Ordering::Equal).or(Some(Ordering::Less))
        }
        _ => None,
    }
}

/// Named query parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlParameter {
    pub name: String,
    pub value: Value,
}

/// Parameterised query in the store's SQL dialect
///
/// Serializes to the request body the query endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuery {
    pub query: String,
    pub parameters: Vec<SqlParameter>,
}

/// Compiled query handed to a [`DocumentStore`](crate::adapters::database::DocumentStore)
///
/// Carries the SQL sent to a remote store alongside the source filter so
/// in-process stores can evaluate it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub sql: SqlQuery,
    pub filter: Option<Filter>,
}

impl QuerySpec {
    /// Query selecting every document
    pub fn all() -> Self {
        Self {
            sql: SqlQuery {
                query: "SELECT * FROM root".to_string(),
                parameters: Vec::new(),
            },
            filter: None,
        }
    }

    /// Compile a filter
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] when the filter cannot be expressed.
    pub fn from_filter(filter: &Filter) -> Result<Self, QueryError> {
        let mut compiler = Compiler::default();
        let predicate = compiler.compile(filter)?;
        Ok(Self {
            sql: SqlQuery {
                query: format!("SELECT * FROM root WHERE {predicate}"),
                parameters: compiler.parameters,
            },
            filter: Some(filter.clone()),
        })
    }

    /// Whether a document satisfies this query
    pub fn matches(&self, document: &Value) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(document))
    }
}

#[derive(Default)]
struct Compiler {
    parameters: Vec<SqlParameter>,
}

impl Compiler {
    fn compile(&mut self, filter: &Filter) -> Result<String, QueryError> {
        match filter {
            Filter::Compare { field, op, value } => {
                let path = property_path(field)?;
                if op.is_ordering() && !matches!(value, Value::Number(_) | Value::String(_)) {
                    return Err(QueryError::UnsupportedOperand {
                        op: op.symbol(),
                        field: field.clone(),
                        reason: format!("ordering requires a number or string, got {}", kind(value)),
                    });
                }
                let param = self.bind(value.clone());
                Ok(format!("{path} {} {param}", op.symbol()))
            }
            Filter::In { field, values } => {
                let path = property_path(field)?;
                if values.is_empty() {
                    return Err(QueryError::Empty("in"));
                }
                if let Some(bad) = values.iter().find(|v| v.is_array() || v.is_object()) {
                    return Err(QueryError::UnsupportedOperand {
                        op: "IN",
                        field: field.clone(),
                        reason: format!("list members must be scalars, got {}", kind(bad)),
                    });
                }
                let params: Vec<String> = values.iter().map(|v| self.bind(v.clone())).collect();
                Ok(format!("{path} IN ({})", params.join(", ")))
            }
            Filter::StartsWith { field, prefix } => {
                self.string_function("STARTSWITH", field, prefix)
            }
            Filter::Contains { field, needle } => self.string_function("CONTAINS", field, needle),
            Filter::IsDefined { field } => Ok(format!("IS_DEFINED({})", property_path(field)?)),
            Filter::And(members) => self.combine(members, " AND ", "and"),
            Filter::Or(members) => self.combine(members, " OR ", "or"),
            // NOT binds tighter than comparison operators
            Filter::Not(inner) => Ok(format!("(NOT ({}))", self.compile(inner)?)),
        }
    }

    fn string_function(
        &mut self,
        function: &'static str,
        field: &str,
        argument: &Value,
    ) -> Result<String, QueryError> {
        let path = property_path(field)?;
        if !argument.is_string() {
            return Err(QueryError::UnsupportedOperand {
                op: function,
                field: field.to_string(),
                reason: format!("argument must be a string, got {}", kind(argument)),
            });
        }
        let param = self.bind(argument.clone());
        Ok(format!("{function}({path}, {param})"))
    }

    fn combine(
        &mut self,
        members: &[Filter],
        separator: &str,
        name: &'static str,
    ) -> Result<String, QueryError> {
        match members {
            [] => Err(QueryError::Empty(name)),
            [single] => self.compile(single),
            _ => {
                let parts = members
                    .iter()
                    .map(|m| self.compile(m))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(separator)))
            }
        }
    }

    fn bind(&mut self, value: Value) -> String {
        let name = format!("@p{}", self.parameters.len());
        self.parameters.push(SqlParameter {
            name: name.clone(),
            value,
        });
        name
    }
}

fn property_path(field: &str) -> Result<String, QueryError> {
    if field.trim().is_empty() {
        return Err(QueryError::InvalidField(field.to_string()));
    }
    let mut path = String::from("root");
    for segment in field.split('.') {
        if segment.is_empty() {
            return Err(QueryError::InvalidField(field.to_string()));
        }
        let escaped = segment.replace('\\', "\\\\").replace('"', "\\\"");
        path.push_str(&format!("[\"{escaped}\"]"));
    }
    Ok(path)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(Field::new("name").eq("MFA"), r#"root["name"] = @p0"#; "equality")]
    #[test_case(Field::new("score").ge(3), r#"root["score"] >= @p0"#; "ordering")]
    #[test_case(Field::new("address.city").ne("Oslo"), r#"root["address"]["city"] != @p0"#; "nested path")]
    #[test_case(Field::new("tier").is_in(["gold", "silver"]), r#"root["tier"] IN (@p0, @p1)"#; "in list")]
    #[test_case(Field::new("name").starts_with("Con"), r#"STARTSWITH(root["name"], @p0)"#; "starts with")]
    #[test_case(Field::new("email").is_defined(), r#"IS_DEFINED(root["email"])"#; "is defined")]
    #[test_case(!Field::new("status").eq("Closed"), r#"(NOT (root["status"] = @p0))"#; "negation")]
    #[test_case(!Field::new("tier").is_in(["gold"]), r#"(NOT (root["tier"] IN (@p0)))"#; "negated in list")]
    #[test_case(!!Field::new("level").lt(2), r#"(NOT ((NOT (root["level"] < @p0))))"#; "double negation")]
    fn test_compile(filter: Filter, expected: &str) {
        let spec = QuerySpec::from_filter(&filter).unwrap();
        assert_eq!(spec.sql.query, format!("SELECT * FROM root WHERE {expected}"));
    }

    #[test]
    fn test_compile_binds_parameters_in_order() {
        let filter = Field::new("name")
            .eq("MFA")
            .or(Field::new("domain").eq("Identity"))
            .and(Field::new("level").lt(2));
        let spec = QuerySpec::from_filter(&filter).unwrap();

        assert_eq!(
            spec.sql.query,
            r#"SELECT * FROM root WHERE ((root["name"] = @p0 OR root["domain"] = @p1) AND root["level"] < @p2)"#
        );
        let values: Vec<_> = spec.sql.parameters.iter().map(|p| p.value.clone()).collect();
        assert_eq!(values, vec![json!("MFA"), json!("Identity"), json!(2)]);
    }

    #[test]
    fn test_values_never_inlined() {
        let spec = QuerySpec::from_filter(&Field::new("name").eq("x' OR 1=1 --")).unwrap();
        assert!(!spec.sql.query.contains("OR 1=1"));
    }

    #[test]
    fn test_field_segment_escaped() {
        let spec = QuerySpec::from_filter(&Field::new("we\"ird").eq(1)).unwrap();
        assert_eq!(spec.sql.query, r#"SELECT * FROM root WHERE root["we\"ird"] = @p0"#);
    }

    #[test_case(Field::new("").eq(1), QueryError::InvalidField(String::new()); "empty path")]
    #[test_case(Field::new("a..b").eq(1), QueryError::InvalidField("a..b".to_string()); "empty segment")]
    #[test_case(Field::new("tags").is_in(Vec::<Value>::new()), QueryError::Empty("in"); "empty in")]
    #[test_case(Filter::And(vec![]), QueryError::Empty("and"); "empty and")]
    #[test_case(Filter::Or(vec![]), QueryError::Empty("or"); "empty or")]
    fn test_compile_rejects(filter: Filter, expected: QueryError) {
        assert_eq!(QuerySpec::from_filter(&filter).unwrap_err(), expected);
    }

    #[test]
    fn test_ordering_against_null_rejected() {
        let err = QuerySpec::from_filter(&Field::new("tier").gt(Value::Null)).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperand { op: ">", .. }));
    }

    #[test]
    fn test_string_function_requires_string() {
        let err = QuerySpec::from_filter(&Field::new("name").contains(5)).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperand { op: "CONTAINS", .. }));
    }

    #[test]
    fn test_all_query() {
        let spec = QuerySpec::all();
        assert_eq!(spec.sql.query, "SELECT * FROM root");
        assert!(spec.matches(&json!({"id": "1"})));
    }

    #[test]
    fn test_matches_comparisons() {
        let doc = json!({"id": "1.1", "name": "MFA", "score": 4, "address": {"city": "Oslo"}});

        assert!(Field::new("name").eq("MFA").matches(&doc));
        assert!(!Field::new("name").eq("SSO").matches(&doc));
        assert!(Field::new("score").gt(3).matches(&doc));
        assert!(Field::new("score").le(4.0).matches(&doc));
        assert!(Field::new("address.city").starts_with("Os").matches(&doc));
        assert!(Field::new("name").is_in(["SSO", "MFA"]).matches(&doc));
    }

    #[test]
    fn test_matches_undefined_is_not_negated() {
        let doc = json!({"id": "1"});

        // Missing property: both the comparison and its negation are undefined
        assert!(!Field::new("tier").eq("gold").matches(&doc));
        assert!(!(!Field::new("tier").eq("gold")).matches(&doc));
        assert!(!Field::new("tier").is_defined().matches(&doc));
        assert!((!Field::new("tier").is_defined()).matches(&doc));
    }

    #[test]
    fn test_matches_mixed_types_undefined() {
        let doc = json!({"score": "4"});
        assert!(!Field::new("score").eq(4).matches(&doc));
        assert!(!Field::new("score").ne(4).matches(&doc));
    }

    #[test]
    fn test_matches_three_valued_combinators() {
        let doc = json!({"name": "MFA"});
        let undefined = Field::new("missing").eq(1);

        assert!(Field::new("name").eq("MFA").or(undefined.clone()).matches(&doc));
        assert!(!Field::new("name").eq("MFA").and(undefined.clone()).matches(&doc));
        assert!(!(!Field::new("name").eq("MFA").and(undefined)).matches(&doc));
    }
}
