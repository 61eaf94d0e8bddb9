//! Parsing of JSON statements into the [`Statement`] model.
//!
//! The parser checks shapes and types and classifies the statement's operation.
//! It reports every structural defect as [`DriverError::Malformed`]. Operator
//! tokens outside the vocabulary are kept as [`Operator::Unrecognized`];
//! rejecting them is up to the adapter.
//!
//! ```ignore
//! use serde_json::json;
//! use stmtdriver_core::statement::Statement;
//!
//! let statement = Statement::from_json(&json!({
//!     "using": "people",
//!     "criteria": { "where": { "age": { ">": 18 } }, "limit": 10 },
//! }))?;
//! ```

use serde_json::{Map, Value};

use crate::{
    dictionary::Dictionary,
    error::{DriverError, DriverResult},
    statement::{Criteria, Modifier, Operator, Predicate, Records, Sort, SortDirection, Statement, StatementKind},
};

const STATEMENT_KEYS: [&str; 7] = ["using", "criteria", "opts", "select", "insert", "update", "delete"];
const KIND_KEYS: [&str; 4] = ["select", "insert", "update", "delete"];
const CRITERIA_KEYS: [&str; 6] = ["where", "sort", "limit", "skip", "select", "opts"];
const OPTS_KEY: &str = "opts";

impl Statement {
    /// Parses a JSON statement.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Malformed`] if the statement's shape is invalid.
    pub fn from_json(value: &Value) -> DriverResult<Statement> {
        parse_statement(value)
    }

    /// Parses a statement from JSON text.
    pub fn from_json_str(text: &str) -> DriverResult<Statement> {
        parse_statement(&serde_json::from_str::<Value>(text)?)
    }
}

fn malformed<T>(message: impl Into<String>) -> DriverResult<T> {
    Err(DriverError::malformed(message))
}

fn parse_statement(value: &Value) -> DriverResult<Statement> {
    let Value::Object(map) = value else {
        return malformed(format!("A statement must be a dictionary, but got `{}`.", value));
    };

    if let Some(key) = map.keys().find(|k| !STATEMENT_KEYS.contains(&k.as_str())) {
        return malformed(format!("Unrecognized statement key `{}`.", key));
    }

    let kinds = KIND_KEYS
        .iter()
        .filter(|k| map.contains_key(**k))
        .collect::<Vec<_>>();
    if kinds.len() > 1 {
        return malformed(format!(
            "A statement may contain only one of `select`, `insert`, `update` or `delete`, \
             but `{}` were all provided.",
            kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>().join("`, `")
        ));
    }

    let using = match map.get("using") {
        Some(Value::String(using)) => using.clone(),
        Some(other) => return malformed(format!("`using` must be a string, but got `{}`.", other)),
        None => return malformed("Missing required key `using`."),
    };

    let mut criteria = match map.get("criteria") {
        Some(value) => Some(parse_criteria(value)?),
        None => None,
    };

    let kind = if let Some(select) = map.get("select") {
        let projection = parse_projection(select, "select")?;
        let criteria = criteria.get_or_insert_with(Criteria::default);
        if criteria.select.is_some() {
            return malformed("`select` may be given at the top level or in `criteria`, but not both.");
        }
        criteria.select = projection;
        StatementKind::Find
    } else if let Some(insert) = map.get("insert") {
        StatementKind::Insert(parse_records(insert)?)
    } else if let Some(update) = map.get("update") {
        StatementKind::Update(parse_dictionary(update, "update")?)
    } else if let Some(delete) = map.get("delete") {
        match delete {
            Value::Bool(true) => StatementKind::Destroy,
            other => return malformed(format!("`delete` must be `true`, but got `{}`.", other)),
        }
    } else {
        StatementKind::Find
    };

    Ok(Statement {
        using,
        kind,
        criteria: criteria.filter(|c| !c.is_empty()),
        opts: parse_opts(map)?,
    })
}

fn parse_opts(map: &Map<String, Value>) -> DriverResult<Option<Dictionary>> {
    match map.get(OPTS_KEY) {
        Some(Value::Object(opts)) => Ok(Some(Dictionary::from(opts.clone()))),
        Some(other) => malformed(format!("`opts` must be a dictionary, but got `{}`.", other)),
        None => Ok(None),
    }
}

fn parse_dictionary(value: &Value, clause: &str) -> DriverResult<Dictionary> {
    match value {
        Value::Object(map) => Ok(Dictionary::from(map.clone())),
        other => malformed(format!("`{}` must be a dictionary, but got `{}`.", clause, other)),
    }
}

fn parse_records(value: &Value) -> DriverResult<Records> {
    match value {
        Value::Object(_) => Ok(Records::One(parse_dictionary(value, "insert")?)),
        Value::Array(items) => Ok(Records::Many(
            items
                .iter()
                .map(|item| parse_dictionary(item, "insert"))
                .collect::<DriverResult<Vec<_>>>()?,
        )),
        other => malformed(format!(
            "`insert` must be a dictionary or an array of dictionaries, but got `{}`.",
            other
        )),
    }
}

fn parse_criteria(value: &Value) -> DriverResult<Criteria> {
    let Value::Object(map) = value else {
        return malformed(format!("`criteria` must be a dictionary, but got `{}`.", value));
    };

    if let Some(key) = map.keys().find(|k| !CRITERIA_KEYS.contains(&k.as_str())) {
        return malformed(format!("Unrecognized criteria clause `{}`.", key));
    }

    Ok(Criteria {
        filter: match map.get("where") {
            Some(Value::Object(node)) if node.is_empty() => None,
            Some(node) => Some(parse_predicate(node)?),
            None => None,
        },
        sort: match map.get("sort") {
            Some(sort) => parse_sort(sort)?,
            None => None,
        },
        limit: parse_count(map.get("limit"), "limit")?,
        skip: parse_count(map.get("skip"), "skip")?,
        select: match map.get("select") {
            Some(select) => parse_projection(select, "criteria.select")?,
            None => None,
        },
        opts: parse_opts(map)?,
    })
}

fn parse_count(value: Option<&Value>, clause: &str) -> DriverResult<Option<u64>> {
    match value {
        None => Ok(None),
        Some(Value::Number(number)) if number.as_u64().is_some() => Ok(number.as_u64()),
        Some(other) => malformed(format!(
            "`{}` must be a non-negative integer, but got `{}`.",
            clause, other
        )),
    }
}

fn parse_projection(value: &Value, clause: &str) -> DriverResult<Option<Vec<String>>> {
    let Value::Array(items) = value else {
        return malformed(format!("`{}` must be an array of attribute names, but got `{}`.", clause, value));
    };

    let attributes = items
        .iter()
        .map(|item| match item {
            Value::String(attribute) => Ok(attribute.clone()),
            other => malformed(format!("`{}` entries must be strings, but got `{}`.", clause, other)),
        })
        .collect::<DriverResult<Vec<_>>>()?;

    if attributes.iter().any(|a| a == "*") {
        return Ok(None);
    }

    Ok(Some(attributes))
}

fn parse_sort(value: &Value) -> DriverResult<Option<Vec<Sort>>> {
    let Value::Array(items) = value else {
        return malformed(format!("`sort` must be an array, but got `{}`.", value));
    };

    let sort = items
        .iter()
        .map(|item| match item {
            Value::Object(entry) if entry.len() == 1 => {
                let mut entries = entry.iter();
                match entries.next() {
                    Some((attribute, direction)) => Ok(Sort {
                        attribute: attribute.clone(),
                        direction: parse_direction(attribute, direction)?,
                    }),
                    None => malformed("A `sort` entry must name an attribute."),
                }
            }
            other => malformed(format!(
                "Each `sort` entry must be a dictionary with exactly one attribute, but got `{}`.",
                other
            )),
        })
        .collect::<DriverResult<Vec<_>>>()?;

    Ok(Some(sort).filter(|s| !s.is_empty()))
}

fn parse_direction(attribute: &str, value: &Value) -> DriverResult<SortDirection> {
    match value {
        Value::String(direction) if direction.eq_ignore_ascii_case("asc") => Ok(SortDirection::Asc),
        Value::String(direction) if direction.eq_ignore_ascii_case("desc") => Ok(SortDirection::Desc),
        Value::Number(number) if number.as_i64() == Some(1) => Ok(SortDirection::Asc),
        Value::Number(number) if number.as_i64() == Some(-1) => Ok(SortDirection::Desc),
        other => malformed(format!(
            "Sort direction for `{}` must be `ASC` or `DESC`, but got `{}`.",
            attribute, other
        )),
    }
}

fn parse_predicate(value: &Value) -> DriverResult<Predicate> {
    let Value::Object(map) = value else {
        return malformed(format!("A predicate must be a dictionary, but got `{}`.", value));
    };

    let mut entries = map
        .iter()
        .filter(|(k, _)| k.as_str() != OPTS_KEY)
        .collect::<Vec<_>>();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut clauses = entries
        .into_iter()
        .map(|(key, value)| match key.as_str() {
            "and" => Ok(Predicate::And(parse_predicate_list(key, value)?)),
            "or" => Ok(Predicate::Or(parse_predicate_list(key, value)?)),
            attribute => parse_attribute(attribute, value),
        })
        .collect::<DriverResult<Vec<_>>>()?;

    let predicate = match clauses.len() {
        0 => return malformed(format!("A predicate must not be empty, but got `{}`.", value)),
        1 => clauses.remove(0),
        _ => Predicate::All(clauses),
    };

    Ok(match parse_opts(map)? {
        Some(opts) => predicate.with_opts(opts),
        None => predicate,
    })
}

fn parse_predicate_list(key: &str, value: &Value) -> DriverResult<Vec<Predicate>> {
    match value {
        Value::Array(items) => items.iter().map(parse_predicate).collect(),
        other => malformed(format!("`{}` must be an array of predicates, but got `{}`.", key, other)),
    }
}

fn parse_attribute(attribute: &str, value: &Value) -> DriverResult<Predicate> {
    match value {
        Value::Array(_) => Ok(Predicate::compare(attribute, Operator::In, value.clone())),
        Value::Object(_) if crate::coerce::is_date_like(value) => Ok(Predicate::equal(attribute, value.clone())),
        Value::Object(map) => {
            let mut modifiers = map
                .iter()
                .filter(|(k, _)| k.as_str() != OPTS_KEY)
                .map(|(token, value)| Modifier::new(Operator::from_token(token), value.clone()))
                .collect::<Vec<_>>();
            modifiers.sort_by(|a, b| a.operator.token().cmp(b.operator.token()));

            Ok(Predicate::Compare {
                attribute: attribute.to_string(),
                modifiers,
                opts: parse_opts(map)?,
            })
        }
        primitive => Ok(Predicate::equal(attribute, primitive.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::statement::Filter;

    fn parse(value: Value) -> DriverResult<Statement> {
        Statement::from_json(&value)
    }

    fn assert_malformed(value: Value) {
        match parse(value.clone()) {
            Err(DriverError::Malformed(_)) => {}
            other => panic!("expected malformed for {}, got {:?}", value, other),
        }
    }

    #[test]
    fn test_kind_defaults_to_find() {
        let statement = parse(json!({ "using": "people" })).unwrap();

        assert_eq!(statement.kind, StatementKind::Find);
        assert_eq!(statement.criteria, None);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            parse(json!({ "using": "people", "insert": { "name": "A" } })).unwrap().kind,
            StatementKind::Insert(Records::One(Dictionary::new().with("name", "A")))
        );
        assert_eq!(
            parse(json!({ "using": "people", "insert": [{ "name": "A" }, { "name": "B" }] })).unwrap().kind,
            StatementKind::Insert(Records::Many(vec![
                Dictionary::new().with("name", "A"),
                Dictionary::new().with("name", "B"),
            ]))
        );
        assert_eq!(
            parse(json!({ "using": "people", "update": { "name": "A" } })).unwrap().kind,
            StatementKind::Update(Dictionary::new().with("name", "A"))
        );
        assert_eq!(
            parse(json!({ "using": "people", "delete": true })).unwrap().kind,
            StatementKind::Destroy
        );
    }

    #[test]
    fn test_structural_defects_are_malformed() {
        assert_malformed(json!("people"));
        assert_malformed(json!({ "criteria": {} }));
        assert_malformed(json!({ "using": 3 }));
        assert_malformed(json!({ "using": "people", "insert": {}, "delete": true }));
        assert_malformed(json!({ "using": "people", "delete": false }));
        assert_malformed(json!({ "using": "people", "insert": "record" }));
        assert_malformed(json!({ "using": "people", "insert": [1] }));
        assert_malformed(json!({ "using": "people", "update": [] }));
        assert_malformed(json!({ "using": "people", "from": "people" }));
        assert_malformed(json!({ "using": "people", "opts": true }));
        assert_malformed(json!({ "using": "people", "criteria": [] }));
        assert_malformed(json!({ "using": "people", "criteria": { "groupBy": ["a"] } }));
        assert_malformed(json!({ "using": "people", "criteria": { "limit": -1 } }));
        assert_malformed(json!({ "using": "people", "criteria": { "skip": 1.5 } }));
        assert_malformed(json!({ "using": "people", "criteria": { "limit": "10" } }));
        assert_malformed(json!({ "using": "people", "criteria": { "sort": { "a": "ASC" } } }));
        assert_malformed(json!({ "using": "people", "criteria": { "sort": [{ "a": "UP" }] } }));
        assert_malformed(json!({ "using": "people", "criteria": { "sort": [{ "a": 1, "b": 1 }] } }));
        assert_malformed(json!({ "using": "people", "criteria": { "select": "name" } }));
        assert_malformed(json!({ "using": "people", "criteria": { "where": [] } }));
        assert_malformed(json!({ "using": "people", "criteria": { "where": { "and": {} } } }));
        assert_malformed(json!({ "using": "people", "criteria": { "where": { "or": [3] } } }));
        assert_malformed(json!({ "using": "people", "criteria": { "where": { "opts": {} } } }));
        assert_malformed(json!({ "using": "people", "criteria": { "where": { "and": [{}] } } }));
    }

    #[test]
    fn test_top_level_select_moves_into_criteria() {
        let statement = parse(json!({ "using": "people", "select": ["name", "age"] })).unwrap();

        assert_eq!(statement.kind, StatementKind::Find);
        assert_eq!(
            statement.criteria.unwrap().select,
            Some(vec!["name".to_string(), "age".to_string()])
        );
    }

    #[test]
    fn test_star_selects_everything() {
        let statement = parse(json!({ "using": "people", "select": ["*"] })).unwrap();

        assert_eq!(statement.criteria, None);
    }

    #[test]
    fn test_select_in_both_places_is_malformed() {
        assert_malformed(json!({
            "using": "people",
            "select": ["name"],
            "criteria": { "select": ["age"] },
        }));
    }

    #[test]
    fn test_empty_where_means_no_filter() {
        let statement = parse(json!({ "using": "people", "criteria": { "where": {} } })).unwrap();

        assert_eq!(statement.criteria, None);
    }

    #[test]
    fn test_where_tree_preserves_list_order() {
        let statement = parse(json!({
            "using": "people",
            "criteria": {
                "where": {
                    "or": [
                        { "name": "Zed" },
                        { "age": { ">": 18 } },
                        { "and": [{ "a": 1 }, { "b": 2 }] },
                    ]
                }
            }
        }))
        .unwrap();

        assert_eq!(
            statement.criteria.unwrap().filter,
            Some(Filter::or([
                Filter::eq("name", "Zed"),
                Filter::gt("age", 18),
                Filter::and([Filter::eq("a", 1), Filter::eq("b", 2)]),
            ]))
        );
    }

    #[test]
    fn test_sibling_keys_become_an_ordered_conjunction() {
        let statement = parse(json!({
            "using": "people",
            "criteria": { "where": { "name": "A", "age": 3 } }
        }))
        .unwrap();

        assert_eq!(
            statement.criteria.unwrap().filter,
            Some(Predicate::All(vec![Filter::eq("age", 3), Filter::eq("name", "A")]))
        );
    }

    #[test]
    fn test_modifier_maps() {
        let statement = parse(json!({
            "using": "people",
            "criteria": {
                "where": {
                    "age": { "<": 65, ">=": 18, "opts": { "hint": 1 } },
                    "role": ["admin", "owner"],
                    "born": { "$date": "2000-01-01T00:00:00Z" },
                    "nick": { "$where": "1" },
                }
            }
        }))
        .unwrap();

        assert_eq!(
            statement.criteria.unwrap().filter,
            Some(Predicate::All(vec![
                Predicate::Compare {
                    attribute: "age".to_string(),
                    modifiers: vec![
                        Modifier::new(Operator::LessThan, 65),
                        Modifier::new(Operator::GreaterThanOrEqual, 18),
                    ],
                    opts: Some(Dictionary::new().with("hint", 1)),
                },
                Predicate::equal("born", json!({ "$date": "2000-01-01T00:00:00Z" })),
                Predicate::compare("nick", Operator::Unrecognized("$where".to_string()), "1"),
                Predicate::compare("role", Operator::In, json!(["admin", "owner"])),
            ]))
        );
    }

    #[test]
    fn test_node_opts_annotate_the_node() {
        let statement = parse(json!({
            "using": "people",
            "criteria": { "where": { "name": "A", "opts": { "$comment": "hi" } } }
        }))
        .unwrap();

        assert_eq!(
            statement.criteria.unwrap().filter,
            Some(Filter::eq("name", "A").with_opts(Dictionary::new().with("$comment", "hi")))
        );
    }

    #[test]
    fn test_sort_directions() {
        let statement = parse(json!({
            "using": "people",
            "criteria": { "sort": [{ "b": "desc" }, { "a": "ASC" }, { "c": -1 }, { "d": 1 }] }
        }))
        .unwrap();

        assert_eq!(
            statement.criteria.unwrap().sort.unwrap(),
            vec![
                Sort { attribute: "b".to_string(), direction: SortDirection::Desc },
                Sort { attribute: "a".to_string(), direction: SortDirection::Asc },
                Sort { attribute: "c".to_string(), direction: SortDirection::Desc },
                Sort { attribute: "d".to_string(), direction: SortDirection::Asc },
            ]
        );
    }

    #[test]
    fn test_from_json_str() {
        assert!(Statement::from_json_str(r#"{"using": "people"}"#).is_ok());
        assert!(matches!(
            Statement::from_json_str("{using"),
            Err(DriverError::Malformed(_))
        ));
    }
}
