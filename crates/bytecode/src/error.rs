// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! Error types for expression construction and compilation.

use keeldb_type::Type;
use thiserror::Error;

use crate::stack::StackError;

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// An error raised while building or compiling an expression tree.
///
/// Construction-time errors fail the single node being built and propagate
/// up as the tree is assembled, aborting compilation of the enclosing
/// expression. There is no local recovery: a malformed tree is a failed
/// compilation of the query, never a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
	#[error("type mismatch: expected {expected}, found {found} in {context}")]
	TypeMismatch {
		expected: Type,
		found: Type,
		context: String,
	},

	#[error("operator {operator} is not defined for {operand}")]
	UndefinedOperator {
		operator: String,
		operand: Type,
	},

	#[error("function '{name}' expects {expected} arguments, got {found}")]
	ArityMismatch {
		name: String,
		expected: usize,
		found: usize,
	},

	#[error("unknown function: {name}")]
	UnknownFunction {
		name: String,
	},

	#[error("function already registered: {name}")]
	DuplicateFunction {
		name: String,
	},

	#[error("unsupported cast: {from} to {to}")]
	UnsupportedCast {
		from: Type,
		to: Type,
	},

	#[error("invalid expression: {message}")]
	InvalidExpression {
		message: String,
	},

	#[error("stack effect violation: {0}")]
	Stack(#[from] StackError),

	#[error("internal compiler error: {message}")]
	Internal {
		message: String,
	},
}
