// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! Lowering of expression nodes into instruction blocks.
//!
//! Every variant lowers its children left-to-right in construction order,
//! then appends its own type-aware instructions. The net stack effect of
//! the produced block is exactly one value of the node's declared type,
//! or nothing for `Void`; `stack::net_effect` proves this before a routine
//! leaves the compiler.

use crate::{
	block::Block,
	expression::Expression,
	instruction::{Instruction, LabelId},
};

/// Hands out labels unique within one `lower()` call.
///
/// A fresh allocator per call keeps lowering idempotent: two lowerings of
/// the same tree produce structurally equal, independently owned blocks.
struct LabelAllocator {
	next: u32,
}

impl LabelAllocator {
	fn new() -> Self {
		Self {
			next: 0,
		}
	}

	fn fresh(&mut self) -> LabelId {
		let label = LabelId(self.next);
		self.next += 1;
		label
	}
}

impl Expression {
	/// Lower this node into a fresh [`Block`].
	///
	/// Only reads node state; may be called repeatedly and from multiple
	/// threads on a shared tree.
	pub fn lower(&self) -> Block {
		let mut labels = LabelAllocator::new();
		self.lower_into(&mut labels)
	}

	fn lower_into(&self, labels: &mut LabelAllocator) -> Block {
		match self {
			Expression::Constant(value) => Block::new().append(Instruction::Const(value.clone())),
			Expression::Field {
				index,
				ty,
				..
			} => Block::new().append(Instruction::LoadField {
				index: *index,
				ty: *ty,
			}),
			Expression::Arith {
				op,
				left,
				right,
			} => Block::new()
				.append(left.lower_into(labels))
				.append(right.lower_into(labels))
				.append(Instruction::Arith {
					op: *op,
					operand: left.ty(),
				}),
			Expression::Compare {
				op,
				left,
				right,
			} => Block::new()
				.append(left.lower_into(labels))
				.append(right.lower_into(labels))
				.append(Instruction::Compare {
					op: *op,
					operand: left.ty(),
				}),
			Expression::Invoke {
				signature,
				arguments,
			} => {
				let mut block = Block::new();
				for argument in arguments {
					block = block.append(argument.lower_into(labels));
				}
				block.append(Instruction::Invoke {
					function: signature.name.clone(),
					params: signature.params.clone(),
					returns: signature.returns,
				})
			}
			Expression::Conditional {
				condition,
				then_expr,
				else_expr,
			} => {
				let else_label = labels.fresh();
				let end_label = labels.fresh();
				Block::new()
					.append(condition.lower_into(labels))
					.append(Instruction::JumpIfFalse(else_label))
					.append(then_expr.lower_into(labels))
					.append(Instruction::Jump(end_label))
					.append(Instruction::Label(else_label))
					.append(else_expr.lower_into(labels))
					.append(Instruction::Label(end_label))
			}
			Expression::Cast {
				inner,
				target,
			} => Block::new().append(inner.lower_into(labels)).append(Instruction::Cast {
				from: inner.ty(),
				to: *target,
			}),
			// The discard is chosen from the child's type, not this
			// node's own (void) type: what is on the stack is the child.
			Expression::Pop {
				inner,
			} => Block::new().append(inner.lower_into(labels)).pop(inner.ty()),
		}
	}
}

#[cfg(test)]
mod tests {
	use keeldb_type::{Type, Value};

	use super::*;
	use crate::instruction::{ArithOp, CompareOp};

	#[test]
	fn test_constant_lowering() {
		let block = Expression::literal(7i64).lower();
		assert_eq!(block.instructions(), vec![Instruction::Const(Value::Int8(7))]);
	}

	#[test]
	fn test_operands_lower_left_to_right() {
		let expression =
			Expression::arith(ArithOp::Sub, Expression::literal(10i64), Expression::literal(3i64)).unwrap();
		assert_eq!(
			expression.lower().instructions(),
			vec![
				Instruction::Const(Value::Int8(10)),
				Instruction::Const(Value::Int8(3)),
				Instruction::Arith {
					op: ArithOp::Sub,
					operand: Type::Int8,
				},
			]
		);
	}

	#[test]
	fn test_conditional_lowering_shape() {
		let expression = Expression::conditional(
			Expression::literal(true),
			Expression::literal(1i32),
			Expression::literal(2i32),
		)
		.unwrap();
		assert_eq!(
			expression.lower().instructions(),
			vec![
				Instruction::Const(Value::Boolean(true)),
				Instruction::JumpIfFalse(LabelId(0)),
				Instruction::Const(Value::Int4(1)),
				Instruction::Jump(LabelId(1)),
				Instruction::Label(LabelId(0)),
				Instruction::Const(Value::Int4(2)),
				Instruction::Label(LabelId(1)),
			]
		);
	}

	#[test]
	fn test_nested_conditionals_get_distinct_labels() {
		let inner = Expression::conditional(
			Expression::literal(true),
			Expression::literal(1i32),
			Expression::literal(2i32),
		)
		.unwrap();
		let outer = Expression::conditional(Expression::literal(false), inner, Expression::literal(3i32)).unwrap();

		let instructions = outer.lower().instructions();
		let labels: Vec<LabelId> = instructions
			.iter()
			.filter_map(|instruction| match instruction {
				Instruction::Label(label) => Some(*label),
				_ => None,
			})
			.collect();
		assert_eq!(labels.len(), 4);
		let mut deduplicated = labels.clone();
		deduplicated.sort_by_key(|label| label.0);
		deduplicated.dedup();
		assert_eq!(deduplicated.len(), 4);
	}

	#[test]
	fn test_compare_operand_type_comes_from_children() {
		let expression =
			Expression::compare(CompareOp::Eq, Expression::literal("a"), Expression::literal("b")).unwrap();
		let instructions = expression.lower().instructions();
		assert_eq!(
			instructions.last(),
			Some(&Instruction::Compare {
				op: CompareOp::Eq,
				operand: Type::Utf8,
			})
		);
	}

	#[test]
	fn test_cast_lowering_records_both_types() {
		let expression = Expression::cast(Expression::literal(1i32), Type::Float8).unwrap();
		assert_eq!(
			expression.lower().instructions(),
			vec![
				Instruction::Const(Value::Int4(1)),
				Instruction::Cast {
					from: Type::Int4,
					to: Type::Float8,
				},
			]
		);
	}
}
