// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! KeelDB bytecode - expression-to-bytecode compilation.
//!
//! This crate lowers typed scalar expressions into stack-machine
//! instruction streams, once per compiled query.
//!
//! # Architecture
//!
//! - **Expressions** form a closed tree of typed variants ([`Expression`]);
//!   every node carries its result [`Type`](keeldb_type::Type), fixed at
//!   construction
//! - **Lowering** turns a node into a [`Block`] whose net stack effect is
//!   exactly one value of the node's declared type (nothing for `Void`)
//! - **Verification** ([`net_effect`]) simulates a flattened stream and
//!   proves the effect statically, so generated code runs without any
//!   runtime stack check
//!
//! # Example
//!
//! ```ignore
//! use keeldb_bytecode::{compile, ArithOp, CompareOp, Expression};
//!
//! // age >= 18
//! let predicate = Expression::compare(
//! 	CompareOp::Ge,
//! 	Expression::field(0, "age", Type::Int8)?,
//! 	Expression::literal(18i64),
//! )?;
//!
//! let routine = compile(&predicate)?;
//! ```

mod block;
mod error;
mod explain;
mod expression;
mod instruction;
mod node;
mod registry;
mod routine;
mod stack;

pub use block::Block;
pub use error::{CompileError, Result};
pub use explain::{explain_expression, explain_routine};
pub use expression::Expression;
pub use instruction::{ArithOp, CompareOp, Instruction, LabelId};
pub use node::InstructionNode;
pub use registry::{FunctionRegistry, FunctionSignature};
pub use routine::{CompiledRoutine, compile};
pub use stack::{StackError, net_effect};
