//! Structural validation of statements.
//!
//! [`Statement::validate`] enforces the invariants the JSON parser cannot express
//! through types alone, and applies equally to statements built from Rust code.
//! Every violation is a [`DriverError::Malformed`].

use std::collections::HashSet;

use serde_json::Value;

use crate::{
    coerce,
    dictionary::Dictionary,
    error::{DriverError, DriverResult},
    statement::{Criteria, Modifier, Operator, Predicate, Records, Statement, StatementKind},
};

impl Statement {
    /// Checks that the statement is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first [`DriverError::Malformed`] found.
    pub fn validate(&self) -> DriverResult<()> {
        if self.using.is_empty() {
            return Err(DriverError::malformed("`using` must not be empty."));
        }

        match &self.kind {
            StatementKind::Find | StatementKind::Destroy => {}
            StatementKind::Insert(records) => {
                if self.criteria.is_some() {
                    return Err(DriverError::malformed("An `insert` statement does not accept `criteria`."));
                }
                match records {
                    Records::One(record) => validate_record(record)?,
                    Records::Many(records) if records.is_empty() => {
                        return Err(DriverError::malformed("`insert` must contain at least one record."));
                    }
                    Records::Many(records) => records.iter().try_for_each(validate_record)?,
                }
            }
            StatementKind::Update(values) => {
                if values.is_empty() {
                    return Err(DriverError::malformed("`update` must set at least one attribute."));
                }
                validate_record(values)?;
            }
        }

        match &self.criteria {
            Some(criteria) => validate_criteria(criteria),
            None => Ok(()),
        }
    }
}

fn validate_record(record: &Dictionary) -> DriverResult<()> {
    record.values().try_for_each(coerce::check_nested_dates)
}

fn validate_criteria(criteria: &Criteria) -> DriverResult<()> {
    if let Some(sort) = &criteria.sort {
        let mut seen = HashSet::new();
        for entry in sort {
            if entry.attribute.is_empty() {
                return Err(DriverError::malformed("Sort attributes must not be empty."));
            }
            if !seen.insert(entry.attribute.as_str()) {
                return Err(DriverError::malformed(format!(
                    "Attribute `{}` appears more than once in `sort`.",
                    entry.attribute
                )));
            }
        }
    }

    if let Some(select) = &criteria.select {
        if select.is_empty() {
            return Err(DriverError::malformed("`select` must name at least one attribute."));
        }
        if select.iter().any(String::is_empty) {
            return Err(DriverError::malformed("`select` entries must not be empty."));
        }
    }

    match &criteria.filter {
        Some(predicate) => validate_predicate(predicate),
        None => Ok(()),
    }
}

fn validate_predicate(predicate: &Predicate) -> DriverResult<()> {
    match predicate {
        Predicate::And(children) => validate_children("and", children),
        Predicate::Or(children) => validate_children("or", children),
        Predicate::All(children) => validate_children("a predicate", children),
        Predicate::Annotated { predicate, .. } => validate_predicate(predicate),
        Predicate::Equal { attribute, value } => {
            validate_attribute(attribute)?;
            if !is_scalar(value) {
                return Err(DriverError::malformed(format!(
                    "Equality on `{}` expects a string, number, boolean, null or date, but got `{}`.",
                    attribute, value
                )));
            }
            check_date(value)
        }
        Predicate::Compare { attribute, modifiers, .. } => {
            validate_attribute(attribute)?;
            if modifiers.is_empty() {
                return Err(DriverError::malformed(format!(
                    "The modifier map for `{}` must contain at least one modifier.",
                    attribute
                )));
            }
            modifiers
                .iter()
                .try_for_each(|modifier| validate_modifier(attribute, modifier))
        }
    }
}

fn validate_children(name: &str, children: &[Predicate]) -> DriverResult<()> {
    if children.is_empty() {
        return Err(DriverError::malformed(format!("`{}` must contain at least one predicate.", name)));
    }
    children.iter().try_for_each(validate_predicate)
}

fn validate_attribute(attribute: &str) -> DriverResult<()> {
    if attribute.is_empty() {
        return Err(DriverError::malformed("Attribute names must not be empty."));
    }
    Ok(())
}

fn validate_modifier(attribute: &str, modifier: &Modifier) -> DriverResult<()> {
    let value = &modifier.value;
    let valid = match &modifier.operator {
        Operator::LessThan
        | Operator::LessThanOrEqual
        | Operator::GreaterThan
        | Operator::GreaterThanOrEqual => {
            matches!(value, Value::String(_) | Value::Number(_)) || coerce::is_date_like(value)
        }
        Operator::NotEqual => is_scalar(value),
        Operator::In | Operator::NotIn => match value {
            Value::Array(items) => items.iter().all(is_scalar),
            _ => false,
        },
        Operator::Like | Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            matches!(value, Value::String(_))
        }
        Operator::Unrecognized(_) => return Ok(()),
    };

    if !valid {
        return Err(DriverError::malformed(format!(
            "`{}` modifier on `{}` does not accept `{}`.",
            modifier.operator.token(),
            attribute,
            value
        )));
    }

    coerce::check_nested_dates(value)
}

fn is_scalar(value: &Value) -> bool {
    match value {
        Value::Array(_) => false,
        Value::Object(_) => coerce::is_date_like(value),
        _ => true,
    }
}

fn check_date(value: &Value) -> DriverResult<()> {
    if coerce::is_date_like(value) {
        coerce::canonical_date(value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::statement::{Filter, SortDirection};

    fn assert_malformed(statement: Statement) {
        match statement.validate() {
            Err(DriverError::Malformed(_)) => {}
            other => panic!("expected malformed for {:?}, got {:?}", statement, other),
        }
    }

    #[test]
    fn test_well_formed_statements_pass() {
        let statement = Statement::find("people")
            .filter(Filter::and([
                Filter::gt("age", 18),
                Filter::starts_with("name", "A"),
                Filter::is_in("born", [json!({ "$date": 0 })]),
            ]))
            .sort("age", SortDirection::Desc)
            .select(["name"])
            .build();

        assert!(statement.validate().is_ok());
    }

    #[test]
    fn test_empty_collections_are_malformed() {
        assert_malformed(Statement::find("").build());
        assert_malformed(Statement::find("people").filter(Filter::and([])).build());
        assert_malformed(Statement::find("people").filter(Filter::or([])).build());
        assert_malformed(Statement::find("people").filter(Predicate::All(vec![])).build());
        assert_malformed(Statement::find("people").select(Vec::<String>::new()).build());
        assert_malformed(Statement::insert_many("people", vec![]).build());
        assert_malformed(Statement::update("people", Dictionary::new()).build());
        assert_malformed(
            Statement::find("people")
                .filter(Predicate::Compare { attribute: "age".into(), modifiers: vec![], opts: None })
                .build(),
        );
    }

    #[test]
    fn test_operator_value_rules() {
        assert_malformed(Statement::find("people").filter(Filter::gt("age", json!([1]))).build());
        assert_malformed(Statement::find("people").filter(Filter::lt("age", true)).build());
        assert_malformed(Statement::find("people").filter(Filter::ne("age", json!({ "a": 1 }))).build());
        assert_malformed(
            Statement::find("people")
                .filter(Predicate::compare("age", Operator::In, 3))
                .build(),
        );
        assert_malformed(
            Statement::find("people")
                .filter(Predicate::compare("name", Operator::Like, 3))
                .build(),
        );
        assert_malformed(Statement::find("people").filter(Filter::eq("tags", json!(["a"]))).build());
        assert_malformed(Statement::find("people").filter(Filter::eq("", 1)).build());
    }

    #[test]
    fn test_unrecognized_operators_are_left_to_the_adapter() {
        let statement = Statement::find("people")
            .filter(Predicate::compare("age", Operator::Unrecognized("$mod".into()), json!([2, 0])))
            .build();

        assert!(statement.validate().is_ok());
    }

    #[test]
    fn test_invalid_dates_are_malformed() {
        assert_malformed(Statement::find("people").filter(Filter::eq("born", json!({ "$date": "then" }))).build());
        assert_malformed(Statement::find("people").filter(Filter::gte("born", json!({ "$date": "then" }))).build());
        assert_malformed(
            Statement::insert("people", Dictionary::new().with("born", json!({ "$date": [] }))).build(),
        );
    }

    #[test]
    fn test_duplicate_sort_keys_are_malformed() {
        assert_malformed(
            Statement::find("people")
                .sort("age", SortDirection::Asc)
                .sort("age", SortDirection::Desc)
                .build(),
        );
    }

    #[test]
    fn test_insert_rejects_criteria() {
        assert_malformed(
            Statement::insert("people", Dictionary::new().with("name", "A"))
                .limit(1)
                .build(),
        );
    }
}
