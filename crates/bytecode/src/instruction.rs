// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! The primitive stack-machine instruction set emitted by lowering.
//!
//! Each instruction carries the type information the stack verifier needs
//! to prove balance statically. Jump targets are symbolic [`LabelId`]s; the
//! downstream assembler resolves them into concrete offsets.

use std::fmt::{Display, Formatter};

use keeldb_type::{Type, Value};
use serde::{Deserialize, Serialize};

/// Symbolic jump target, unique within one lowered routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelId(pub u32);

impl Display for LabelId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "L{}", self.0)
	}
}

/// Arithmetic operator kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
	Add,
	Sub,
	Mul,
	Div,
	Rem,
}

impl ArithOp {
	pub fn symbol(&self) -> &'static str {
		match self {
			ArithOp::Add => "+",
			ArithOp::Sub => "-",
			ArithOp::Mul => "*",
			ArithOp::Div => "/",
			ArithOp::Rem => "%",
		}
	}

	pub fn mnemonic(&self) -> &'static str {
		match self {
			ArithOp::Add => "add",
			ArithOp::Sub => "sub",
			ArithOp::Mul => "mul",
			ArithOp::Div => "div",
			ArithOp::Rem => "rem",
		}
	}
}

impl Display for ArithOp {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.symbol())
	}
}

/// Comparison operator kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

impl CompareOp {
	pub fn symbol(&self) -> &'static str {
		match self {
			CompareOp::Eq => "=",
			CompareOp::Ne => "<>",
			CompareOp::Lt => "<",
			CompareOp::Le => "<=",
			CompareOp::Gt => ">",
			CompareOp::Ge => ">=",
		}
	}

	pub fn mnemonic(&self) -> &'static str {
		match self {
			CompareOp::Eq => "cmp.eq",
			CompareOp::Ne => "cmp.ne",
			CompareOp::Lt => "cmp.lt",
			CompareOp::Le => "cmp.le",
			CompareOp::Gt => "cmp.gt",
			CompareOp::Ge => "cmp.ge",
		}
	}
}

impl Display for CompareOp {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.symbol())
	}
}

/// A primitive instruction of the target stack machine.
///
/// The stack effect of every instruction is fully determined by its fields;
/// see `stack::net_effect` for the exact discipline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
	/// Push a constant.
	Const(Value),
	/// Push a row field of the current input row.
	LoadField {
		index: u16,
		ty: Type,
	},
	/// Push a local variable slot.
	LoadVar {
		slot: u16,
		ty: Type,
	},
	/// Pop the top value into a local variable slot.
	StoreVar {
		slot: u16,
		ty: Type,
	},
	/// Pop `params` (last argument on top), push the return value.
	Invoke {
		function: String,
		params: Vec<Type>,
		returns: Type,
	},
	/// Pop two `operand` values, push their combination.
	Arith {
		op: ArithOp,
		operand: Type,
	},
	/// Pop two `operand` values, push a boolean.
	Compare {
		op: CompareOp,
		operand: Type,
	},
	/// Pop a `from` value, push it converted to `to`.
	Cast {
		from: Type,
		to: Type,
	},
	/// Discard the top one-slot value.
	Pop,
	/// Discard the top two-slot value.
	PopWide,
	/// Duplicate the top one-slot value.
	Dup,
	/// Duplicate the top two-slot value.
	DupWide,
	/// Jump target marker; resolved by the assembler.
	Label(LabelId),
	/// Unconditional jump.
	Jump(LabelId),
	/// Pop a boolean, jump when it is false.
	JumpIfFalse(LabelId),
}

impl Display for Instruction {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Instruction::Const(value) => write!(f, "const {}", value),
			Instruction::LoadField {
				index,
				ty,
			} => write!(f, "field {} : {}", index, ty),
			Instruction::LoadVar {
				slot,
				ty,
			} => write!(f, "loadvar {} : {}", slot, ty),
			Instruction::StoreVar {
				slot,
				ty,
			} => write!(f, "storevar {} : {}", slot, ty),
			Instruction::Invoke {
				function,
				params,
				returns,
			} => {
				write!(f, "invoke {}(", function)?;
				for (i, param) in params.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}", param)?;
				}
				write!(f, ") : {}", returns)
			}
			Instruction::Arith {
				op,
				operand,
			} => write!(f, "{} {}", op.mnemonic(), operand),
			Instruction::Compare {
				op,
				operand,
			} => write!(f, "{} {}", op.mnemonic(), operand),
			Instruction::Cast {
				from,
				to,
			} => write!(f, "cast {} -> {}", from, to),
			Instruction::Pop => f.write_str("pop"),
			Instruction::PopWide => f.write_str("pop2"),
			Instruction::Dup => f.write_str("dup"),
			Instruction::DupWide => f.write_str("dup2"),
			Instruction::Label(label) => write!(f, "{}:", label),
			Instruction::Jump(label) => write!(f, "jump {}", label),
			Instruction::JumpIfFalse(label) => write!(f, "jumpiffalse {}", label),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		assert_eq!(Instruction::Const(Value::Int8(7)).to_string(), "const 7");
		assert_eq!(
			Instruction::LoadField {
				index: 2,
				ty: Type::Utf8
			}
			.to_string(),
			"field 2 : Utf8"
		);
		assert_eq!(
			Instruction::Arith {
				op: ArithOp::Add,
				operand: Type::Int8
			}
			.to_string(),
			"add Int8"
		);
		assert_eq!(
			Instruction::Invoke {
				function: "concat".to_string(),
				params: vec![Type::Utf8, Type::Utf8],
				returns: Type::Utf8,
			}
			.to_string(),
			"invoke concat(Utf8, Utf8) : Utf8"
		);
		assert_eq!(Instruction::JumpIfFalse(LabelId(3)).to_string(), "jumpiffalse L3");
	}
}
