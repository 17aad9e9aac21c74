// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! The unit of emitted code: a primitive instruction or a nested block.

use crate::{block::Block, instruction::Instruction};

/// One node of an instruction sequence.
///
/// A node is either a single primitive [`Instruction`] or a composite
/// [`Block`]. Nodes are exclusively owned by the block they were appended
/// to; embedding a block moves it.
#[derive(Debug, PartialEq)]
pub enum InstructionNode {
	Instruction(Instruction),
	Block(Block),
}

impl InstructionNode {
	/// Append the flattened instruction stream of this node to `out`.
	pub fn flatten_into(&self, out: &mut Vec<Instruction>) {
		match self {
			InstructionNode::Instruction(instruction) => out.push(instruction.clone()),
			InstructionNode::Block(block) => block.flatten_into(out),
		}
	}

	/// The nested nodes of this node, for generic traversal.
	///
	/// Primitive instructions have none; a block reports the nodes
	/// appended to it.
	pub fn child_nodes(&self) -> &[InstructionNode] {
		match self {
			InstructionNode::Instruction(_) => &[],
			InstructionNode::Block(block) => block.nodes(),
		}
	}
}

impl From<Instruction> for InstructionNode {
	fn from(instruction: Instruction) -> Self {
		InstructionNode::Instruction(instruction)
	}
}

impl From<Block> for InstructionNode {
	fn from(block: Block) -> Self {
		InstructionNode::Block(block)
	}
}
