use serde_json::Value;

use crate::{
    dictionary::Dictionary,
    error::DriverError,
    statement::{Modifier, Predicate},
};

/// Depth-first traversal of a [`Predicate`] tree.
///
/// Adapters implement the `visit_*` methods to produce their native filter
/// representation; [`PredicateVisitor::visit_predicate`] dispatches on the node.
pub trait PredicateVisitor {
    type Output;
    type Error: Into<DriverError>;

    fn visit_and(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error>;
    fn visit_all(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error>;
    fn visit_equal(&mut self, attribute: &str, value: &Value) -> Result<Self::Output, Self::Error>;
    fn visit_modifiers(
        &mut self,
        attribute: &str,
        modifiers: &[Modifier],
        opts: Option<&Dictionary>,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_annotated(
        &mut self,
        predicate: &Predicate,
        opts: &Dictionary,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_predicate(&mut self, predicate: &Predicate) -> Result<Self::Output, Self::Error> {
        match predicate {
            Predicate::And(predicates) => self.visit_and(predicates),
            Predicate::Or(predicates) => self.visit_or(predicates),
            Predicate::All(predicates) => self.visit_all(predicates),
            Predicate::Equal { attribute, value } => self.visit_equal(attribute, value),
            Predicate::Compare { attribute, modifiers, opts } => {
                self.visit_modifiers(attribute, modifiers, opts.as_ref())
            }
            Predicate::Annotated { predicate, opts } => self.visit_annotated(predicate, opts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Filter;

    /// Collects attribute names in visiting order.
    struct AttributeCollector;

    impl PredicateVisitor for AttributeCollector {
        type Output = Vec<String>;
        type Error = DriverError;

        fn visit_and(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error> {
            self.visit_all(predicates)
        }

        fn visit_or(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error> {
            self.visit_all(predicates)
        }

        fn visit_all(&mut self, predicates: &[Predicate]) -> Result<Self::Output, Self::Error> {
            Ok(predicates
                .iter()
                .map(|p| self.visit_predicate(p))
                .collect::<Result<Vec<_>, _>>()?
                .concat())
        }

        fn visit_equal(&mut self, attribute: &str, _: &Value) -> Result<Self::Output, Self::Error> {
            Ok(vec![attribute.to_string()])
        }

        fn visit_modifiers(
            &mut self,
            attribute: &str,
            _: &[Modifier],
            _: Option<&Dictionary>,
        ) -> Result<Self::Output, Self::Error> {
            Ok(vec![attribute.to_string()])
        }

        fn visit_annotated(&mut self, predicate: &Predicate, _: &Dictionary) -> Result<Self::Output, Self::Error> {
            self.visit_predicate(predicate)
        }
    }

    #[test]
    fn test_visits_depth_first_in_order() {
        let predicate = Filter::or([
            Filter::eq("a", 1),
            Filter::and([Filter::gt("b", 2), Filter::eq("c", 3).with_opts(Dictionary::new())]),
            Filter::lt("d", 4),
        ]);

        assert_eq!(
            AttributeCollector.visit_predicate(&predicate).unwrap(),
            vec!["a", "b", "c", "d"]
        );
    }
}
