//! Predicate-driven tree walks.
//!
//! Cross-cutting queries (which fields does a stage read? does it contain
//! arithmetic?) are written as a predicate plus an operation instead of
//! another recursive match over every variant. The walk is pre-order and
//! visits each node exactly once.

use crate::ast::Expression;

impl Expression {
    /// Applies `operation` to this node and every descendant matching `predicate`.
    pub fn select<P, O>(&self, predicate: &mut P, operation: &mut O)
    where
        P: FnMut(&Expression) -> bool,
        O: FnMut(&Expression),
    {
        if predicate(self) {
            operation(self);
        }
        self.select_members(predicate, operation);
    }

    /// Applies `operation` to every descendant matching `predicate`, not
    /// including this node.
    pub fn select_members<P, O>(&self, predicate: &mut P, operation: &mut O)
    where
        P: FnMut(&Expression) -> bool,
        O: FnMut(&Expression),
    {
        for child in self.children() {
            child.select(predicate, operation);
        }
    }

    /// Names of all document fields read by this tree, in first-seen order.
    pub fn input_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        self.select(
            &mut |expr| matches!(expr, Expression::Input(_)),
            &mut |expr| {
                if let Expression::Input(name) = expr
                    && !fields.contains(name)
                {
                    fields.push(name.clone());
                }
            },
        );
        fields
    }

    /// Whether this node or any descendant matches `predicate`.
    pub fn contains<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&Expression) -> bool,
    {
        self.count(&mut predicate) > 0
    }

    /// Number of nodes, this one included, matching `predicate`.
    pub fn count<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&Expression) -> bool,
    {
        let mut matches = 0;
        self.select(&mut predicate, &mut |_| matches += 1);
        matches
    }
}
