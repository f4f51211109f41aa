use crate::ast::{ArithmeticExpression, Expression};
use crate::error::{Error, Result};

/// Tree-to-tree rewrite.
///
/// `convert` is called on a node; if the converter claims the node through
/// [`should_convert`](ExpressionConverter::should_convert), its replacement
/// comes from [`do_convert`](ExpressionConverter::do_convert). Otherwise the
/// node is rebuilt with every direct child converted, and leaves come back
/// unchanged.
///
/// # Examples
///
/// ```
/// use indexing_expr::{Expression, ExpressionConverter, IdentityConverter};
///
/// let expr = Expression::statement([Expression::input("title"), Expression::ToArray]);
/// let copy = IdentityConverter.convert(&expr).unwrap();
/// assert_eq!(copy, expr);
/// ```
pub trait ExpressionConverter {
    /// Whether this converter replaces `expr` outright.
    fn should_convert(&self, expr: &Expression) -> bool {
        let _ = expr;
        false
    }

    /// Produces the replacement for a node claimed by `should_convert`.
    ///
    /// The default fails, naming the variant, so a converter that claims a
    /// node it has no rule for cannot silently pass it through.
    fn do_convert(&mut self, expr: &Expression) -> Result<Expression> {
        Err(Error::UnsupportedConversion {
            variant: expr.kind_name(),
            expression: expr.to_string(),
        })
    }

    fn convert(&mut self, expr: &Expression) -> Result<Expression> {
        if self.should_convert(expr) {
            return self.do_convert(expr);
        }
        expr.convert_children(self)
    }
}

/// Converter that replaces nothing; rebuilds a structurally equal tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl ExpressionConverter for IdentityConverter {}

/// Converter driven by a closure.
///
/// The closure is offered every node top-down. Returning `Some` replaces the
/// node (its subtree is not visited further); returning `None` descends into
/// its children.
pub struct Rewrite<F>(pub F);

impl<F> ExpressionConverter for Rewrite<F>
where
    F: FnMut(&Expression) -> Option<Expression>,
{
    fn convert(&mut self, expr: &Expression) -> Result<Expression> {
        match (self.0)(expr) {
            Some(replacement) => Ok(replacement),
            None => expr.convert_children(self),
        }
    }
}

impl Expression {
    /// Returns a copy of this node with every direct child replaced by the
    /// converter's output. Operators and other node metadata are kept.
    ///
    /// Rebuilt arithmetic nodes re-check their operands' input requirements,
    /// so a rewrite that introduces a conflict fails here.
    pub fn convert_children<C>(&self, converter: &mut C) -> Result<Expression>
    where
        C: ExpressionConverter + ?Sized,
    {
        match self {
            Expression::Constant(_)
            | Expression::This
            | Expression::Input(_)
            | Expression::ToArray
            | Expression::ToNumeric(_)
            | Expression::Function(_) => Ok(self.clone()),
            Expression::Arithmetic(arithmetic) => {
                let left = converter.convert(arithmetic.left())?;
                let right = converter.convert(arithmetic.right())?;
                Ok(ArithmeticExpression::new(left, arithmetic.op(), right)?.into())
            }
            Expression::Statement(stages) => stages
                .iter()
                .map(|stage| converter.convert(stage))
                .collect::<Result<Vec<_>>>()
                .map(Expression::Statement),
        }
    }

    /// Rewrites this tree with a closure; see [`Rewrite`].
    pub fn rewrite<F>(&self, f: F) -> Result<Expression>
    where
        F: FnMut(&Expression) -> Option<Expression>,
    {
        Rewrite(f).convert(self)
    }
}
