// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Number of operand-stack slots a value occupies on the target machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackWidth {
	/// Nothing is pushed (the void type).
	Zero,
	/// Narrow primitives and references.
	One,
	/// Wide primitives.
	Two,
}

impl StackWidth {
	pub fn slots(&self) -> usize {
		match self {
			StackWidth::Zero => 0,
			StackWidth::One => 1,
			StackWidth::Two => 2,
		}
	}
}

/// A runtime type descriptor.
///
/// Descriptors are compared by identity of the described type; two
/// descriptors are the same type exactly when the enum variants are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
	/// A boolean: true or false
	Boolean,
	/// A 1-byte signed integer
	Int1,
	/// A 2-byte signed integer
	Int2,
	/// A 4-byte signed integer
	Int4,
	/// An 8-byte signed integer
	Int8,
	/// A 4-byte floating point
	Float4,
	/// An 8-byte floating point
	Float8,
	/// A UTF-8 encoded text reference
	Utf8,
	/// A raw byte sequence reference
	Blob,
	/// The unit type; an expression of this type leaves nothing on the stack
	Void,
}

impl Type {
	/// The operand-stack width of a value of this type.
	///
	/// 8-byte primitives occupy two slots on the target machine; every
	/// other value, including references, occupies one. `Void` occupies
	/// none, which is what makes discarding a void value a no-op.
	pub fn stack_width(&self) -> StackWidth {
		match self {
			Type::Void => StackWidth::Zero,
			Type::Int8 | Type::Float8 => StackWidth::Two,
			Type::Boolean
			| Type::Int1
			| Type::Int2
			| Type::Int4
			| Type::Float4
			| Type::Utf8
			| Type::Blob => StackWidth::One,
		}
	}

	pub fn is_void(&self) -> bool {
		matches!(self, Type::Void)
	}

	pub fn is_wide(&self) -> bool {
		self.stack_width() == StackWidth::Two
	}

	pub fn is_number(&self) -> bool {
		matches!(self, Type::Int1 | Type::Int2 | Type::Int4 | Type::Int8 | Type::Float4 | Type::Float8)
	}

	/// Reference types live on the heap of the target machine and are
	/// represented by a one-slot handle on the operand stack.
	pub fn is_reference(&self) -> bool {
		matches!(self, Type::Utf8 | Type::Blob)
	}

	/// Types with a defined ordering for comparison instructions.
	pub fn is_comparable(&self) -> bool {
		self.is_number() || matches!(self, Type::Boolean | Type::Utf8)
	}

	pub fn name(&self) -> &'static str {
		match self {
			Type::Boolean => "Boolean",
			Type::Int1 => "Int1",
			Type::Int2 => "Int2",
			Type::Int4 => "Int4",
			Type::Int8 => "Int8",
			Type::Float4 => "Float4",
			Type::Float8 => "Float8",
			Type::Utf8 => "Utf8",
			Type::Blob => "Blob",
			Type::Void => "Void",
		}
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Maps a native Rust type to its KeelDB type descriptor.
pub trait GetType {
	fn get_type() -> Type;
}

impl GetType for bool {
	fn get_type() -> Type {
		Type::Boolean
	}
}

impl GetType for i8 {
	fn get_type() -> Type {
		Type::Int1
	}
}

impl GetType for i16 {
	fn get_type() -> Type {
		Type::Int2
	}
}

impl GetType for i32 {
	fn get_type() -> Type {
		Type::Int4
	}
}

impl GetType for i64 {
	fn get_type() -> Type {
		Type::Int8
	}
}

impl GetType for f32 {
	fn get_type() -> Type {
		Type::Float4
	}
}

impl GetType for f64 {
	fn get_type() -> Type {
		Type::Float8
	}
}

impl GetType for String {
	fn get_type() -> Type {
		Type::Utf8
	}
}

impl GetType for &str {
	fn get_type() -> Type {
		Type::Utf8
	}
}

impl GetType for Vec<u8> {
	fn get_type() -> Type {
		Type::Blob
	}
}
