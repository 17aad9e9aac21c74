// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! Static stack-effect verification for flattened instruction streams.
//!
//! Generated code runs with no runtime stack checks, so every lowered
//! routine is simulated here before it leaves the compiler. The simulator
//! tracks the typed operand stack through straight-line code and merges
//! branch states at labels: every inbound edge of a label must agree on the
//! stack shape, the same discipline a bytecode verifier applies.

use std::collections::HashMap;

use keeldb_type::{StackWidth, Type};
use thiserror::Error;

use crate::instruction::{Instruction, LabelId};

/// A stack-effect violation found while simulating a routine.
///
/// These indicate a bug in a variant's lowering, not a recoverable runtime
/// condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StackError {
	#[error("stack underflow at instruction {offset}")]
	Underflow {
		offset: usize,
	},

	#[error("expected {expected} on the stack, found {found} at instruction {offset}")]
	OperandMismatch {
		expected: Type,
		found: Type,
		offset: usize,
	},

	#[error("instruction {offset} handles {expected:?} values but the top of the stack is {found}")]
	WidthMismatch {
		expected: StackWidth,
		found: Type,
		offset: usize,
	},

	#[error("conflicting stack shapes at {label}")]
	LabelConflict {
		label: LabelId,
	},

	#[error("unreachable instruction at {offset}")]
	Unreachable {
		offset: usize,
	},

	#[error("control flow does not fall through to the end of the stream")]
	NoFallthrough,
}

/// Simulate a flattened instruction stream against an empty entry stack and
/// return the types it leaves behind, bottom first.
pub fn net_effect(instructions: &[Instruction]) -> Result<Vec<Type>, StackError> {
	// Stack shape recorded at each label, from jumps and from falling into
	// the label marker itself.
	let mut at_label: HashMap<LabelId, Vec<Type>> = HashMap::new();
	// None while the current position is unreachable (after an
	// unconditional jump, before the next label).
	let mut current: Option<Vec<Type>> = Some(Vec::new());

	for (offset, instruction) in instructions.iter().enumerate() {
		match instruction {
			Instruction::Label(label) => {
				current = Some(match (current.take(), at_label.get(label)) {
					(Some(stack), Some(recorded)) => {
						if &stack != recorded {
							return Err(StackError::LabelConflict {
								label: *label,
							});
						}
						stack
					}
					(Some(stack), None) => {
						at_label.insert(*label, stack.clone());
						stack
					}
					(None, Some(recorded)) => recorded.clone(),
					(None, None) => {
						return Err(StackError::Unreachable {
							offset,
						});
					}
				});
			}
			Instruction::Jump(label) => {
				let stack = current.take().ok_or(StackError::Unreachable {
					offset,
				})?;
				merge(&mut at_label, *label, stack)?;
			}
			Instruction::JumpIfFalse(label) => {
				let mut stack = current.take().ok_or(StackError::Unreachable {
					offset,
				})?;
				pop_expect(&mut stack, Type::Boolean, offset)?;
				merge(&mut at_label, *label, stack.clone())?;
				current = Some(stack);
			}
			other => {
				let mut stack = current.take().ok_or(StackError::Unreachable {
					offset,
				})?;
				apply(other, &mut stack, offset)?;
				current = Some(stack);
			}
		}
	}

	current.ok_or(StackError::NoFallthrough)
}

/// Record the stack shape arriving at `label`, requiring agreement with any
/// previously recorded shape.
fn merge(at_label: &mut HashMap<LabelId, Vec<Type>>, label: LabelId, stack: Vec<Type>) -> Result<(), StackError> {
	match at_label.get(&label) {
		Some(recorded) => {
			if recorded != &stack {
				return Err(StackError::LabelConflict {
					label,
				});
			}
			Ok(())
		}
		None => {
			at_label.insert(label, stack);
			Ok(())
		}
	}
}

fn pop_expect(stack: &mut Vec<Type>, expected: Type, offset: usize) -> Result<(), StackError> {
	let found = stack.pop().ok_or(StackError::Underflow {
		offset,
	})?;
	if found != expected {
		return Err(StackError::OperandMismatch {
			expected,
			found,
			offset,
		});
	}
	Ok(())
}

fn pop_width(stack: &mut Vec<Type>, expected: StackWidth, offset: usize) -> Result<Type, StackError> {
	let found = stack.pop().ok_or(StackError::Underflow {
		offset,
	})?;
	if found.stack_width() != expected {
		return Err(StackError::WidthMismatch {
			expected,
			found,
			offset,
		});
	}
	Ok(found)
}

/// A void value leaves nothing on the stack, so it is never pushed.
fn push_value(stack: &mut Vec<Type>, ty: Type) {
	if !ty.is_void() {
		stack.push(ty);
	}
}

fn apply(instruction: &Instruction, stack: &mut Vec<Type>, offset: usize) -> Result<(), StackError> {
	match instruction {
		Instruction::Const(value) => push_value(stack, value.ty()),
		Instruction::LoadField {
			ty,
			..
		}
		| Instruction::LoadVar {
			ty,
			..
		} => push_value(stack, *ty),
		Instruction::StoreVar {
			ty,
			..
		} => pop_expect(stack, *ty, offset)?,
		Instruction::Invoke {
			params,
			returns,
			..
		} => {
			// Arguments were pushed in order, so the last one is on top.
			for param in params.iter().rev() {
				pop_expect(stack, *param, offset)?;
			}
			push_value(stack, *returns);
		}
		Instruction::Arith {
			operand,
			..
		} => {
			pop_expect(stack, *operand, offset)?;
			pop_expect(stack, *operand, offset)?;
			push_value(stack, *operand);
		}
		Instruction::Compare {
			operand,
			..
		} => {
			pop_expect(stack, *operand, offset)?;
			pop_expect(stack, *operand, offset)?;
			push_value(stack, Type::Boolean);
		}
		Instruction::Cast {
			from,
			to,
		} => {
			pop_expect(stack, *from, offset)?;
			push_value(stack, *to);
		}
		Instruction::Pop => {
			pop_width(stack, StackWidth::One, offset)?;
		}
		Instruction::PopWide => {
			pop_width(stack, StackWidth::Two, offset)?;
		}
		Instruction::Dup => {
			let ty = pop_width(stack, StackWidth::One, offset)?;
			stack.push(ty);
			stack.push(ty);
		}
		Instruction::DupWide => {
			let ty = pop_width(stack, StackWidth::Two, offset)?;
			stack.push(ty);
			stack.push(ty);
		}
		Instruction::Label(_) | Instruction::Jump(_) | Instruction::JumpIfFalse(_) => {
			// Handled by the caller.
			unreachable!("flow control reached apply")
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use keeldb_type::Value;

	use super::*;
	use crate::instruction::{ArithOp, CompareOp};

	#[test]
	fn test_straight_line_effect() {
		let instructions = vec![
			Instruction::Const(Value::Int8(1)),
			Instruction::Const(Value::Int8(2)),
			Instruction::Arith {
				op: ArithOp::Add,
				operand: Type::Int8,
			},
		];
		assert_eq!(net_effect(&instructions), Ok(vec![Type::Int8]));
	}

	#[test]
	fn test_empty_stream() {
		assert_eq!(net_effect(&[]), Ok(vec![]));
	}

	#[test]
	fn test_underflow() {
		assert_eq!(
			net_effect(&[Instruction::Pop]),
			Err(StackError::Underflow {
				offset: 0
			})
		);
	}

	#[test]
	fn test_pop_width_mismatch() {
		let instructions = vec![Instruction::Const(Value::Int8(1)), Instruction::Pop];
		assert_eq!(
			net_effect(&instructions),
			Err(StackError::WidthMismatch {
				expected: StackWidth::One,
				found: Type::Int8,
				offset: 1,
			})
		);
	}

	#[test]
	fn test_operand_mismatch() {
		let instructions = vec![
			Instruction::Const(Value::Int8(1)),
			Instruction::Const(Value::Float8(2.0)),
			Instruction::Arith {
				op: ArithOp::Add,
				operand: Type::Int8,
			},
		];
		assert_eq!(
			net_effect(&instructions),
			Err(StackError::OperandMismatch {
				expected: Type::Int8,
				found: Type::Float8,
				offset: 2,
			})
		);
	}

	#[test]
	fn test_branches_merge() {
		// if true then 1i32 else 2i32
		let instructions = vec![
			Instruction::Const(Value::Boolean(true)),
			Instruction::JumpIfFalse(LabelId(0)),
			Instruction::Const(Value::Int4(1)),
			Instruction::Jump(LabelId(1)),
			Instruction::Label(LabelId(0)),
			Instruction::Const(Value::Int4(2)),
			Instruction::Label(LabelId(1)),
		];
		assert_eq!(net_effect(&instructions), Ok(vec![Type::Int4]));
	}

	#[test]
	fn test_branches_conflict() {
		// Arms push different types; the join label must reject that.
		let instructions = vec![
			Instruction::Const(Value::Boolean(true)),
			Instruction::JumpIfFalse(LabelId(0)),
			Instruction::Const(Value::Int4(1)),
			Instruction::Jump(LabelId(1)),
			Instruction::Label(LabelId(0)),
			Instruction::Const(Value::Utf8("x".to_string())),
			Instruction::Label(LabelId(1)),
		];
		assert_eq!(
			net_effect(&instructions),
			Err(StackError::LabelConflict {
				label: LabelId(1)
			})
		);
	}

	#[test]
	fn test_jump_condition_must_be_boolean() {
		let instructions = vec![Instruction::Const(Value::Int4(1)), Instruction::JumpIfFalse(LabelId(0))];
		assert_eq!(
			net_effect(&instructions),
			Err(StackError::OperandMismatch {
				expected: Type::Boolean,
				found: Type::Int4,
				offset: 1,
			})
		);
	}

	#[test]
	fn test_invoke_pops_args_in_reverse() {
		let instructions = vec![
			Instruction::Const(Value::Utf8("a".to_string())),
			Instruction::Const(Value::Int4(1)),
			Instruction::Invoke {
				function: "substr".to_string(),
				params: vec![Type::Utf8, Type::Int4],
				returns: Type::Utf8,
			},
		];
		assert_eq!(net_effect(&instructions), Ok(vec![Type::Utf8]));
	}

	#[test]
	fn test_void_return_pushes_nothing() {
		let instructions = vec![Instruction::Invoke {
			function: "log".to_string(),
			params: vec![],
			returns: Type::Void,
		}];
		assert_eq!(net_effect(&instructions), Ok(vec![]));
	}

	#[test]
	fn test_compare_pushes_boolean() {
		let instructions = vec![
			Instruction::Const(Value::Int8(1)),
			Instruction::Const(Value::Int8(2)),
			Instruction::Compare {
				op: CompareOp::Lt,
				operand: Type::Int8,
			},
		];
		assert_eq!(net_effect(&instructions), Ok(vec![Type::Boolean]));
	}
}
