// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! The compiled routine boundary.
//!
//! The execution layer asks the root expression to compile itself and
//! receives a [`CompiledRoutine`]: the flattened instruction stream plus
//! its result type, ready for the code assembler/loader.

use keeldb_type::Type;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
	error::{CompileError, Result},
	expression::Expression,
	instruction::Instruction,
	stack::net_effect,
};

/// The flattened artifact handed to the code assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRoutine {
	pub instructions: Vec<Instruction>,
	pub result_type: Type,
}

/// Lower an expression tree once, flatten it, and audit its net stack
/// effect against the declared result type.
///
/// An imbalance here is a bug in a variant's lowering; it is reported as an
/// internal compiler error instead of being handed to the runtime, where it
/// would silently corrupt the operand stack.
#[instrument(name = "bytecode::compile", level = "trace", skip(expression))]
pub fn compile(expression: &Expression) -> Result<CompiledRoutine> {
	let block = expression.lower();
	let instructions = block.instructions();

	let effect = net_effect(&instructions)?;
	let result_type = expression.ty();
	let balanced = match result_type {
		Type::Void => effect.is_empty(),
		declared => effect.as_slice() == [declared],
	};
	if !balanced {
		return Err(CompileError::Internal {
			message: format!(
				"lowering of '{}' left {:?} on the stack, declared {}",
				expression, effect, result_type
			),
		});
	}

	debug!(instructions = instructions.len(), "compiled expression");
	Ok(CompiledRoutine {
		instructions,
		result_type,
	})
}
