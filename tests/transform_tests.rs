#[cfg(test)]
mod tests {
    use indexing_expr::*;

    // Helper functions to build trees for testing
    fn input(name: &str) -> Expression {
        Expression::input(name)
    }

    fn number(n: i32) -> Expression {
        Expression::constant(n)
    }

    fn arith(left: Expression, op: ArithmeticOperator, right: Expression) -> Expression {
        Expression::arithmetic(left, op, right).unwrap()
    }

    fn add(left: Expression, right: Expression) -> Expression {
        arith(left, ArithmeticOperator::Add, right)
    }

    /// Folds arithmetic over two constants into a single constant.
    struct ConstantFolder;

    impl ExpressionConverter for ConstantFolder {
        fn should_convert(&self, expr: &Expression) -> bool {
            match expr {
                Expression::Arithmetic(arithmetic) => {
                    matches!(arithmetic.left(), Expression::Constant(_))
                        && matches!(arithmetic.right(), Expression::Constant(_))
                }
                _ => false,
            }
        }

        fn do_convert(&mut self, expr: &Expression) -> Result<Expression> {
            let value = ExecutionContext::new().execute(expr, None)?;
            Ok(value.map(Expression::Constant).unwrap_or_else(|| expr.clone()))
        }
    }

    /// Claims every `to_array` node without providing a rule for it.
    struct ClaimsArrays;

    impl ExpressionConverter for ClaimsArrays {
        fn should_convert(&self, expr: &Expression) -> bool {
            matches!(expr, Expression::ToArray)
        }
    }

    // ========================================================================
    // Identity Conversion Tests
    // ========================================================================

    #[test]
    fn test_identity_round_trip() {
        let trees = [
            number(1),
            add(input("a"), input("b")),
            arith(
                add(input("a"), number(1)),
                ArithmeticOperator::Divide,
                Expression::This,
            ),
            Expression::statement([
                input("title"),
                Expression::Function(Function::Lowercase),
                Expression::ToArray,
            ]),
            Expression::statement([]),
        ];

        for tree in &trees {
            let copy = IdentityConverter.convert(tree).unwrap();
            assert_eq!(&copy, tree);
            assert_eq!(copy.to_string(), tree.to_string());
        }
    }

    #[test]
    fn test_operator_preserved() {
        for op in [
            ArithmeticOperator::Subtract,
            ArithmeticOperator::Multiply,
            ArithmeticOperator::Modulo,
        ] {
            let tree = arith(input("a"), op, input("b"));
            let Expression::Arithmetic(copy) = IdentityConverter.convert(&tree).unwrap() else {
                panic!("expected arithmetic");
            };
            assert_eq!(copy.op(), op);
        }
    }

    // ========================================================================
    // Rewrite Tests
    // ========================================================================

    #[test]
    fn test_rewrite_renames_inputs() {
        let tree = Expression::statement([
            add(input("a"), arith(input("b"), ArithmeticOperator::Multiply, input("a"))),
            Expression::ToArray,
        ]);

        let renamed = tree
            .rewrite(|expr| match expr {
                Expression::Input(name) if name == "a" => Some(input("x")),
                _ => None,
            })
            .unwrap();

        assert_eq!(renamed.input_fields(), vec!["x".to_string(), "b".to_string()]);
        assert_eq!(renamed.to_string(), "input x + input b * input x | to_array");
        // The source tree is untouched.
        assert_eq!(tree.input_fields(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_rewrite_replaces_whole_subtree() {
        let tree = add(add(number(1), number(2)), input("a"));

        let rewritten = tree
            .rewrite(|expr| match expr {
                Expression::Arithmetic(inner) if inner.left() == &number(1) => Some(number(10)),
                _ => None,
            })
            .unwrap();

        assert_eq!(rewritten, add(number(10), input("a")));
    }

    #[test]
    fn test_rewrite_conflict_fails() {
        let tree = add(input("a"), Expression::Function(Function::Lowercase));

        let err = tree
            .rewrite(|expr| match expr {
                Expression::Input(_) => Some(Expression::Function(Function::HexEncode)),
                _ => None,
            })
            .unwrap_err();

        assert_eq!(
            err,
            Error::Verification(VerificationError::ConflictingInputTypes {
                left: DataType::Long,
                op: ArithmeticOperator::Add,
                right: DataType::String,
            })
        );
    }

    // ========================================================================
    // Custom Converter Tests
    // ========================================================================

    #[test]
    fn test_constant_folding() {
        let tree = arith(
            add(number(2), number(3)),
            ArithmeticOperator::Multiply,
            input("x"),
        );

        let folded = ConstantFolder.convert(&tree).unwrap();
        assert_eq!(folded.to_string(), "5 * input x");

        let mut ctx = ExecutionContext::new().with_field("x", 4i32);
        assert_eq!(
            ctx.execute(&folded, None).unwrap(),
            ctx.execute(&tree, None).unwrap()
        );
    }

    #[test]
    fn test_folding_is_single_pass() {
        let tree = arith(
            add(number(1), number(2)),
            ArithmeticOperator::Multiply,
            add(number(3), number(4)),
        );

        let folded = ConstantFolder.convert(&tree).unwrap();
        assert_eq!(folded.to_string(), "3 * 7");
    }

    #[test]
    fn test_claimed_node_without_rule_fails() {
        let tree = Expression::statement([input("a"), Expression::ToArray]);

        let err = ClaimsArrays.convert(&tree).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedConversion { variant: "to_array", .. }
        ));
        assert!(err.to_string().contains("to_array"));
    }

    #[test]
    fn test_unclaimed_tree_passes_through() {
        let tree = add(input("a"), number(1));
        assert_eq!(ClaimsArrays.convert(&tree).unwrap(), tree);
    }
}
