// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! Ordered builder of instruction nodes with an auditable stack effect.

use keeldb_type::{StackWidth, Type};

use crate::{instruction::Instruction, node::InstructionNode};

/// An ordered, growable sequence of [`InstructionNode`]s.
///
/// `append` is stack-effect transparent: it only concatenates. The
/// `pop`/`dup`/`store` helpers are the operations that change the net
/// effect, and they take a [`Type`] because the correct instruction depends
/// on the value's stack width.
///
/// All composition methods consume and return the block, so a block under
/// construction is never aliased and is moved when embedded into a parent.
#[derive(Debug, Default, PartialEq)]
pub struct Block {
	label: Option<String>,
	nodes: Vec<InstructionNode>,
}

impl Block {
	pub fn new() -> Self {
		Self {
			label: None,
			nodes: Vec::new(),
		}
	}

	/// A block with a human-readable label, used only for debug rendering.
	pub fn with_label(label: impl Into<String>) -> Self {
		Self {
			label: Some(label.into()),
			nodes: Vec::new(),
		}
	}

	/// Append a node (a primitive instruction or a nested block).
	pub fn append(mut self, node: impl Into<InstructionNode>) -> Self {
		self.nodes.push(node.into());
		self
	}

	/// Discard the top value of the given type.
	///
	/// Emits the width-correct discard instruction; discarding `Void` is a
	/// no-op, since a void value leaves nothing on the stack.
	pub fn pop(self, ty: Type) -> Self {
		match ty.stack_width() {
			StackWidth::Zero => self,
			StackWidth::One => self.append(Instruction::Pop),
			StackWidth::Two => self.append(Instruction::PopWide),
		}
	}

	/// Duplicate the top value of the given type. `Void` is a no-op.
	pub fn dup(self, ty: Type) -> Self {
		match ty.stack_width() {
			StackWidth::Zero => self,
			StackWidth::One => self.append(Instruction::Dup),
			StackWidth::Two => self.append(Instruction::DupWide),
		}
	}

	/// Pop the top value of the given type into a local slot. `Void` is a
	/// no-op.
	pub fn store(self, slot: u16, ty: Type) -> Self {
		match ty.stack_width() {
			StackWidth::Zero => self,
			StackWidth::One | StackWidth::Two => self.append(Instruction::StoreVar {
				slot,
				ty,
			}),
		}
	}

	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	pub fn nodes(&self) -> &[InstructionNode] {
		&self.nodes
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Append the flattened instruction stream of this block to `out`.
	pub fn flatten_into(&self, out: &mut Vec<Instruction>) {
		for node in &self.nodes {
			node.flatten_into(out);
		}
	}

	/// The flattened instruction stream of this block.
	pub fn instructions(&self) -> Vec<Instruction> {
		let mut out = Vec::new();
		self.flatten_into(&mut out);
		out
	}
}
