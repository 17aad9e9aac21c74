// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! Function signature registry.
//!
//! The semantic analyzer resolves operation names against this registry
//! before it builds expression nodes, so an unsupported operation surfaces
//! at analysis time, never during lowering.

use std::collections::HashMap;

use keeldb_type::Type;

use crate::error::{CompileError, Result};

/// The declared contract of a callable function: parameter types and
/// return type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
	pub name: String,
	pub params: Vec<Type>,
	pub returns: Type,
}

impl FunctionSignature {
	pub fn new(name: impl Into<String>, params: Vec<Type>, returns: Type) -> Self {
		Self {
			name: name.into(),
			params,
			returns,
		}
	}
}

/// Name-keyed lookup of function signatures.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
	functions: HashMap<String, FunctionSignature>,
}

impl FunctionRegistry {
	pub fn new() -> Self {
		Self {
			functions: HashMap::new(),
		}
	}

	/// A registry pre-populated with the scalar builtins.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		for signature in [
			FunctionSignature::new("abs", vec![Type::Int8], Type::Int8),
			FunctionSignature::new("sqrt", vec![Type::Float8], Type::Float8),
			FunctionSignature::new("length", vec![Type::Utf8], Type::Int4),
			FunctionSignature::new("concat", vec![Type::Utf8, Type::Utf8], Type::Utf8),
			FunctionSignature::new("substr", vec![Type::Utf8, Type::Int4, Type::Int4], Type::Utf8),
		] {
			registry.functions.insert(signature.name.clone(), signature);
		}
		registry
	}

	pub fn register(&mut self, signature: FunctionSignature) -> Result<()> {
		if self.functions.contains_key(&signature.name) {
			return Err(CompileError::DuplicateFunction {
				name: signature.name,
			});
		}
		self.functions.insert(signature.name.clone(), signature);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
		self.functions.get(name)
	}

	/// Resolve a function by name, failing with `UnknownFunction` so the
	/// analyzer can reject the query before any tree is built.
	pub fn resolve(&self, name: &str) -> Result<&FunctionSignature> {
		self.functions.get(name).ok_or_else(|| CompileError::UnknownFunction {
			name: name.to_string(),
		})
	}
}
