// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! The typed expression tree.
//!
//! [`Expression`] is a closed set of variants, one per operation kind, so
//! `lower`/`format_one_line`/`children` dispatch exhaustively at compile
//! time. Every node carries its result type, fixed at construction; the
//! typed factory constructors take owned children, so a node with a missing
//! operand cannot be expressed, and checks that can fail (operand types,
//! arity) return a [`CompileError`] the instant the node is built.

mod lower;

use std::fmt::{Display, Formatter};

use keeldb_type::{GetType, Type, Value};

use crate::{
	error::{CompileError, Result},
	instruction::{ArithOp, CompareOp},
	registry::FunctionSignature,
};

/// A node of the typed expression tree.
///
/// Trees are built bottom-up by the analyzer, are immutable afterwards, and
/// are lowered once per compiled routine. Lowering only reads node state,
/// so a built tree may be shared read-only across threads.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
	/// A compile-time constant.
	Constant(Value),
	/// A field of the current input row.
	Field {
		index: u16,
		name: String,
		ty: Type,
	},
	/// An arithmetic combination of two same-typed numeric operands.
	Arith {
		op: ArithOp,
		left: Box<Expression>,
		right: Box<Expression>,
	},
	/// A comparison of two same-typed comparable operands.
	Compare {
		op: CompareOp,
		left: Box<Expression>,
		right: Box<Expression>,
	},
	/// A call of a registered function.
	Invoke {
		signature: FunctionSignature,
		arguments: Vec<Expression>,
	},
	/// A two-armed conditional; both arms share one result type.
	Conditional {
		condition: Box<Expression>,
		then_expr: Box<Expression>,
		else_expr: Box<Expression>,
	},
	/// A numeric or identity conversion.
	Cast {
		inner: Box<Expression>,
		target: Type,
	},
	/// Evaluate the child for its side effect and discard its value.
	Pop {
		inner: Box<Expression>,
	},
}

impl Expression {
	/// A constant node; the value carries its own type.
	pub fn constant(value: Value) -> Expression {
		Expression::Constant(value)
	}

	/// A constant node built from a native Rust literal.
	pub fn literal<T>(value: T) -> Expression
	where
		T: GetType + Into<Value>,
	{
		Expression::Constant(value.into())
	}

	/// A row-field access node. Fields cannot be void.
	pub fn field(index: u16, name: impl Into<String>, ty: Type) -> Result<Expression> {
		let name = name.into();
		if ty.is_void() {
			return Err(CompileError::InvalidExpression {
				message: format!("field '{}' cannot have type Void", name),
			});
		}
		Ok(Expression::Field {
			index,
			name,
			ty,
		})
	}

	/// An arithmetic node; operands must share one numeric type.
	pub fn arith(op: ArithOp, left: Expression, right: Expression) -> Result<Expression> {
		if left.ty() != right.ty() {
			return Err(CompileError::TypeMismatch {
				expected: left.ty(),
				found: right.ty(),
				context: format!("{} operands", op),
			});
		}
		if !left.ty().is_number() {
			return Err(CompileError::UndefinedOperator {
				operator: op.to_string(),
				operand: left.ty(),
			});
		}
		Ok(Expression::Arith {
			op,
			left: Box::new(left),
			right: Box::new(right),
		})
	}

	/// A comparison node; operands must share one comparable type.
	pub fn compare(op: CompareOp, left: Expression, right: Expression) -> Result<Expression> {
		if left.ty() != right.ty() {
			return Err(CompileError::TypeMismatch {
				expected: left.ty(),
				found: right.ty(),
				context: format!("{} operands", op),
			});
		}
		if !left.ty().is_comparable() {
			return Err(CompileError::UndefinedOperator {
				operator: op.to_string(),
				operand: left.ty(),
			});
		}
		Ok(Expression::Compare {
			op,
			left: Box::new(left),
			right: Box::new(right),
		})
	}

	/// An invocation node; arguments are checked against the signature the
	/// analyzer resolved from the function registry.
	pub fn invoke(signature: FunctionSignature, arguments: Vec<Expression>) -> Result<Expression> {
		if arguments.len() != signature.params.len() {
			return Err(CompileError::ArityMismatch {
				name: signature.name,
				expected: signature.params.len(),
				found: arguments.len(),
			});
		}
		for (position, (argument, param)) in arguments.iter().zip(&signature.params).enumerate() {
			if argument.ty() != *param {
				return Err(CompileError::TypeMismatch {
					expected: *param,
					found: argument.ty(),
					context: format!("argument {} of '{}'", position, signature.name),
				});
			}
		}
		Ok(Expression::Invoke {
			signature,
			arguments,
		})
	}

	/// A conditional node; the condition must be boolean and both arms must
	/// agree on one result type.
	pub fn conditional(condition: Expression, then_expr: Expression, else_expr: Expression) -> Result<Expression> {
		if condition.ty() != Type::Boolean {
			return Err(CompileError::TypeMismatch {
				expected: Type::Boolean,
				found: condition.ty(),
				context: "conditional condition".to_string(),
			});
		}
		if then_expr.ty() != else_expr.ty() {
			return Err(CompileError::TypeMismatch {
				expected: then_expr.ty(),
				found: else_expr.ty(),
				context: "conditional arms".to_string(),
			});
		}
		Ok(Expression::Conditional {
			condition: Box::new(condition),
			then_expr: Box::new(then_expr),
			else_expr: Box::new(else_expr),
		})
	}

	/// A cast node; only numeric-to-numeric and identity conversions have a
	/// lowering.
	pub fn cast(inner: Expression, target: Type) -> Result<Expression> {
		let from = inner.ty();
		let supported = from == target || (from.is_number() && target.is_number());
		if !supported {
			return Err(CompileError::UnsupportedCast {
				from,
				to: target,
			});
		}
		Ok(Expression::Cast {
			inner: Box::new(inner),
			target,
		})
	}

	/// The discard variant: evaluates the child for its side effect or for
	/// sequencing and leaves nothing on the stack. Its own type is void.
	pub fn pop(inner: Expression) -> Expression {
		Expression::Pop {
			inner: Box::new(inner),
		}
	}

	/// The result type, fixed at construction and never mutated.
	pub fn ty(&self) -> Type {
		match self {
			Expression::Constant(value) => value.ty(),
			Expression::Field {
				ty,
				..
			} => *ty,
			Expression::Arith {
				left,
				..
			} => left.ty(),
			Expression::Compare {
				..
			} => Type::Boolean,
			Expression::Invoke {
				signature,
				..
			} => signature.returns,
			Expression::Conditional {
				then_expr,
				..
			} => then_expr.ty(),
			Expression::Cast {
				target,
				..
			} => *target,
			Expression::Pop {
				..
			} => Type::Void,
		}
	}

	/// The syntactic operands of this node, in construction order.
	///
	/// This is the canonical edge set of the expression tree, used by
	/// traversal tools (rewriting, visualization); it never reflects the
	/// lowered form.
	pub fn children(&self) -> Vec<&Expression> {
		match self {
			Expression::Constant(_)
			| Expression::Field {
				..
			} => Vec::new(),
			Expression::Arith {
				left,
				right,
				..
			}
			| Expression::Compare {
				left,
				right,
				..
			} => vec![left, right],
			Expression::Invoke {
				arguments,
				..
			} => arguments.iter().collect(),
			Expression::Conditional {
				condition,
				then_expr,
				else_expr,
			} => vec![condition, then_expr, else_expr],
			Expression::Cast {
				inner,
				..
			}
			| Expression::Pop {
				inner,
			} => vec![inner],
		}
	}

	/// A concise single-line rendering for plan-explain output.
	///
	/// The discard variant renders as its child: the discard is a silent
	/// wrapper, not a user-visible operation.
	pub fn format_one_line(&self) -> String {
		match self {
			Expression::Constant(value) => value.to_string(),
			Expression::Field {
				name,
				..
			} => name.clone(),
			Expression::Arith {
				op,
				left,
				right,
			} => format!("({} {} {})", left.format_one_line(), op, right.format_one_line()),
			Expression::Compare {
				op,
				left,
				right,
			} => format!("({} {} {})", left.format_one_line(), op, right.format_one_line()),
			Expression::Invoke {
				signature,
				arguments,
			} => {
				let arguments: Vec<String> = arguments.iter().map(|a| a.format_one_line()).collect();
				format!("{}({})", signature.name, arguments.join(", "))
			}
			Expression::Conditional {
				condition,
				then_expr,
				else_expr,
			} => format!(
				"({} ? {} : {})",
				condition.format_one_line(),
				then_expr.format_one_line(),
				else_expr.format_one_line()
			),
			Expression::Cast {
				inner,
				target,
			} => format!("cast({} as {})", inner.format_one_line(), target),
			Expression::Pop {
				inner,
			} => inner.format_one_line(),
		}
	}
}

impl Display for Expression {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.format_one_line())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn age_field() -> Expression {
		Expression::field(0, "age", Type::Int8).unwrap()
	}

	#[test]
	fn test_constant_type_comes_from_value() {
		assert_eq!(Expression::constant(Value::Utf8("x".to_string())).ty(), Type::Utf8);
		assert_eq!(Expression::literal(7i64).ty(), i64::get_type());
	}

	#[test]
	fn test_field_rejects_void() {
		let result = Expression::field(0, "f", Type::Void);
		assert!(matches!(result, Err(CompileError::InvalidExpression { .. })));
	}

	#[test]
	fn test_arith_requires_matching_numbers() {
		let mismatched = Expression::arith(ArithOp::Add, Expression::literal(1i64), Expression::literal(1i32));
		assert_eq!(
			mismatched.unwrap_err(),
			CompileError::TypeMismatch {
				expected: Type::Int8,
				found: Type::Int4,
				context: "+ operands".to_string(),
			}
		);

		let non_numeric = Expression::arith(ArithOp::Add, Expression::literal("a"), Expression::literal("b"));
		assert_eq!(
			non_numeric.unwrap_err(),
			CompileError::UndefinedOperator {
				operator: "+".to_string(),
				operand: Type::Utf8,
			}
		);
	}

	#[test]
	fn test_compare_result_is_boolean() {
		let expression = Expression::compare(CompareOp::Ge, age_field(), Expression::literal(18i64)).unwrap();
		assert_eq!(expression.ty(), Type::Boolean);
	}

	#[test]
	fn test_compare_rejects_blob() {
		let result = Expression::compare(
			CompareOp::Lt,
			Expression::literal(vec![1u8]),
			Expression::literal(vec![2u8]),
		);
		assert!(matches!(result, Err(CompileError::UndefinedOperator { .. })));
	}

	#[test]
	fn test_invoke_checks_arity_and_types() {
		let signature = FunctionSignature::new("concat", vec![Type::Utf8, Type::Utf8], Type::Utf8);

		let too_few = Expression::invoke(signature.clone(), vec![Expression::literal("a")]);
		assert!(matches!(too_few, Err(CompileError::ArityMismatch { .. })));

		let wrong_type =
			Expression::invoke(signature.clone(), vec![Expression::literal("a"), Expression::literal(1i64)]);
		assert_eq!(
			wrong_type.unwrap_err(),
			CompileError::TypeMismatch {
				expected: Type::Utf8,
				found: Type::Int8,
				context: "argument 1 of 'concat'".to_string(),
			}
		);

		let ok = Expression::invoke(signature, vec![Expression::literal("a"), Expression::literal("b")]);
		assert_eq!(ok.unwrap().ty(), Type::Utf8);
	}

	#[test]
	fn test_conditional_checks() {
		let non_boolean = Expression::conditional(
			Expression::literal(1i64),
			Expression::literal(1i64),
			Expression::literal(2i64),
		);
		assert!(matches!(non_boolean, Err(CompileError::TypeMismatch { .. })));

		let mismatched_arms = Expression::conditional(
			Expression::literal(true),
			Expression::literal(1i64),
			Expression::literal("x"),
		);
		assert!(matches!(mismatched_arms, Err(CompileError::TypeMismatch { .. })));

		let ok = Expression::conditional(
			Expression::literal(true),
			Expression::literal(1i64),
			Expression::literal(2i64),
		)
		.unwrap();
		assert_eq!(ok.ty(), Type::Int8);
	}

	#[test]
	fn test_cast_support() {
		assert!(Expression::cast(Expression::literal(1i32), Type::Int8).is_ok());
		assert!(Expression::cast(Expression::literal("x"), Type::Utf8).is_ok());
		assert_eq!(
			Expression::cast(Expression::literal("x"), Type::Int8).unwrap_err(),
			CompileError::UnsupportedCast {
				from: Type::Utf8,
				to: Type::Int8,
			}
		);
	}

	#[test]
	fn test_children_are_construction_order_operands() {
		let left = age_field();
		let right = Expression::literal(18i64);
		let expression = Expression::compare(CompareOp::Ge, left.clone(), right.clone()).unwrap();
		assert_eq!(expression.children(), vec![&left, &right]);
		assert!(left.children().is_empty());
	}

	#[test]
	fn test_format_one_line() {
		let expression = Expression::compare(CompareOp::Ge, age_field(), Expression::literal(18i64)).unwrap();
		assert_eq!(expression.format_one_line(), "(age >= 18)");
		assert_eq!(expression.to_string(), "(age >= 18)");

		let conditional = Expression::conditional(
			expression,
			Expression::literal("adult"),
			Expression::literal("minor"),
		)
		.unwrap();
		assert_eq!(conditional.format_one_line(), "((age >= 18) ? 'adult' : 'minor')");

		let cast = Expression::cast(Expression::literal(1i32), Type::Int8).unwrap();
		assert_eq!(cast.format_one_line(), "cast(1 as Int8)");
	}

	#[test]
	fn test_pop_renders_as_its_child() {
		let child = Expression::literal(7i64);
		let pop = Expression::pop(child.clone());
		assert_eq!(pop.format_one_line(), child.format_one_line());
		assert_eq!(pop.ty(), Type::Void);
		assert_eq!(pop.children(), vec![&child]);
	}
}
