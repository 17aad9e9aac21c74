// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Type;

/// A compile-time constant value, represented as a native Rust type.
///
/// Constants only exist inside expression trees and compiled routines; they
/// are never ordered or stored, so floats are carried as plain `f32`/`f64`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// A boolean: true or false.
	Boolean(bool),
	/// A 1-byte signed integer
	Int1(i8),
	/// A 2-byte signed integer
	Int2(i16),
	/// A 4-byte signed integer
	Int4(i32),
	/// An 8-byte signed integer
	Int8(i64),
	/// A 4-byte floating point
	Float4(f32),
	/// An 8-byte floating point
	Float8(f64),
	/// A UTF-8 encoded text
	Utf8(String),
	/// A raw byte sequence
	Blob(Vec<u8>),
}

impl Value {
	/// The type descriptor of this constant.
	pub fn ty(&self) -> Type {
		match self {
			Value::Boolean(_) => Type::Boolean,
			Value::Int1(_) => Type::Int1,
			Value::Int2(_) => Type::Int2,
			Value::Int4(_) => Type::Int4,
			Value::Int8(_) => Type::Int8,
			Value::Float4(_) => Type::Float4,
			Value::Float8(_) => Type::Float8,
			Value::Utf8(_) => Type::Utf8,
			Value::Blob(_) => Type::Blob,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Boolean(value) => write!(f, "{}", value),
			Value::Int1(value) => write!(f, "{}", value),
			Value::Int2(value) => write!(f, "{}", value),
			Value::Int4(value) => write!(f, "{}", value),
			Value::Int8(value) => write!(f, "{}", value),
			Value::Float4(value) => write!(f, "{}", value),
			Value::Float8(value) => write!(f, "{}", value),
			Value::Utf8(value) => write!(f, "'{}'", value),
			Value::Blob(value) => {
				f.write_str("0x")?;
				for byte in value {
					write!(f, "{:02x}", byte)?;
				}
				Ok(())
			}
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Boolean(value)
	}
}

impl From<i8> for Value {
	fn from(value: i8) -> Self {
		Value::Int1(value)
	}
}

impl From<i16> for Value {
	fn from(value: i16) -> Self {
		Value::Int2(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Int4(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int8(value)
	}
}

impl From<f32> for Value {
	fn from(value: f32) -> Self {
		Value::Float4(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float8(value)
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Utf8(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Utf8(value.to_string())
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Value::Blob(value)
	}
}
