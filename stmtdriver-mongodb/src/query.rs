//! Predicate translation from the statement model to MongoDB filter syntax.
//!
//! This module translates `where` trees into MongoDB BSON filter documents.

use bson::{Bson, Document, doc};
use serde_json::Value;

use stmtdriver_core::{
    dictionary::Dictionary,
    error::{DriverError, DriverResult},
    statement::{Modifier, Operator, Predicate},
    visitor::PredicateVisitor,
};

use crate::convert::BsonConverter;


/// Translates predicate trees into MongoDB filter documents.
///
/// This struct implements the [`PredicateVisitor`] trait. Explicit `and`/`or` nodes
/// become `$and`/`$or` with their children in order. Sibling keys of one node are
/// merged into a single document, or wrapped in `$and` when two of them produce the
/// same top-level key.
pub(crate) struct MongoQueryTranslator;

impl PredicateVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DriverError;

    fn visit_and(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { "$and": self.visit_children(predicates)? })
    }

    fn visit_or(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { "$or": self.visit_children(predicates)? })
    }

    fn visit_all(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error> {
        let children = predicates
            .iter()
            .map(|predicate| self.visit_predicate(predicate))
            .collect::<Result<Vec<_>, _>>()?;

        let mut merged = Document::new();
        for child in &children {
            if child.keys().any(|key| merged.contains_key(key)) {
                return Ok(doc! { "$and": children });
            }
            merged.extend(child.clone());
        }
        Ok(merged)
    }

    fn visit_equal(&mut self, attribute: &str, value: &Value) -> Result<Self::Output, Self::Error> {
        Ok(doc! { attribute: BsonConverter::canonical(value)? })
    }

    fn visit_modifiers(
        &mut self,
        attribute: &str,
        modifiers: &[Modifier],
        opts: Option<&Dictionary>,
    ) -> Result<Self::Output, Self::Error> {
        let mut operators = Document::new();
        let mut sources: Vec<(&'static str, &str)> = Vec::with_capacity(modifiers.len());

        for modifier in modifiers {
            let (token, value) = translate_modifier(modifier)?;

            if let Some((_, previous)) = sources.iter().find(|(t, _)| *t == token) {
                return Err(DriverError::not_supported(format!(
                    "Modifiers `{}` and `{}` on attribute `{}` both translate to `{}`, \
                     which MongoDB accepts only once.",
                    previous,
                    modifier.operator.token(),
                    attribute,
                    token
                )));
            }
            sources.push((token, modifier.operator.token()));
            operators.insert(token, value);
        }

        if let Some(opts) = opts {
            mount_opts(&mut operators, opts);
        }

        Ok(doc! { attribute: operators })
    }

    fn visit_annotated(
        &mut self,
        predicate: &Predicate,
        opts: &Dictionary,
    ) -> Result<Self::Output, Self::Error> {
        let mut document = self.visit_predicate(predicate)?;
        mount_opts(&mut document, opts);
        Ok(document)
    }
}

impl MongoQueryTranslator {
    fn visit_children(&mut self, predicates: &[Predicate]) -> DriverResult<Vec<Document>> {
        predicates
            .iter()
            .map(|predicate| self.visit_predicate(predicate))
            .collect()
    }
}

/// Merges `opts` into a document; `opts` wins on collision.
pub(crate) fn mount_opts(document: &mut Document, opts: &Dictionary) {
    for (key, value) in opts.sorted_entries() {
        document.insert(key.clone(), BsonConverter::verbatim(value));
    }
}

fn translate_modifier(modifier: &Modifier) -> DriverResult<(&'static str, Bson)> {
    let value = &modifier.value;

    Ok(match &modifier.operator {
        Operator::LessThan => ("$lt", BsonConverter::canonical(value)?),
        Operator::LessThanOrEqual => ("$lte", BsonConverter::canonical(value)?),
        Operator::GreaterThan => ("$gt", BsonConverter::canonical(value)?),
        Operator::GreaterThanOrEqual => ("$gte", BsonConverter::canonical(value)?),
        Operator::NotEqual => ("$ne", BsonConverter::canonical(value)?),
        Operator::In => ("$in", BsonConverter::canonical(value)?),
        Operator::NotIn => ("$nin", BsonConverter::canonical(value)?),
        Operator::Like => ("$regex", Bson::String(like_to_regex(text(modifier)?))),
        Operator::Contains => ("$regex", Bson::String(regex::escape(text(modifier)?))),
        Operator::StartsWith => (
            "$regex",
            Bson::String(format!("^{}", regex::escape(text(modifier)?))),
        ),
        Operator::EndsWith => (
            "$regex",
            Bson::String(format!("{}$", regex::escape(text(modifier)?))),
        ),
        Operator::Unrecognized(token) => {
            return Err(DriverError::not_supported(format!(
                "Operator `{}` is not supported by MongoDB.",
                token
            )));
        }
    })
}

fn text(modifier: &Modifier) -> DriverResult<&str> {
    modifier.value.as_str().ok_or_else(|| {
        DriverError::malformed(format!(
            "`{}` expects a string, but got `{}`.",
            modifier.operator.token(),
            modifier.value
        ))
    })
}

/// Converts a `like` pattern into an anchored regular expression.
///
/// `%` matches any run of characters and `\%` matches a literal percent sign.
/// Everything else matches itself.
fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'%') => {
                chars.next();
                literal.push('%');
            }
            '%' => {
                regex.push_str(&regex::escape(&literal));
                regex.push_str(".*");
                literal.clear();
            }
            other => literal.push(other),
        }
    }

    regex.push_str(&regex::escape(&literal));
    regex.push('$');
    regex
}
