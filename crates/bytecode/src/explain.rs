// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! Human-readable explanation of expression trees and compiled routines.
//!
//! Consumed by textual EXPLAIN output and graph-based plan renderers. Both
//! formatters only read node state; they never re-lower.

use crate::{expression::Expression, routine::CompiledRoutine};

/// Explain an expression tree as an ASCII tree, one node per line with its
/// one-line rendering and result type.
pub fn explain_expression(expression: &Expression) -> String {
	let mut output = String::new();
	let mut formatter = ExpressionFormatter::new(&mut output);
	formatter.format_root(expression);
	output
}

/// Explain a compiled routine as an offset-annotated disassembly.
pub fn explain_routine(routine: &CompiledRoutine) -> String {
	let mut output = String::new();
	output.push_str(&format!(
		"routine: {} instructions, result {}\n",
		routine.instructions.len(),
		routine.result_type
	));
	for (offset, instruction) in routine.instructions.iter().enumerate() {
		output.push_str(&format!("{:04}  {}\n", offset, instruction));
	}
	output
}

/// Formatter for expression nodes using ASCII tree drawing.
struct ExpressionFormatter<'a> {
	output: &'a mut String,
	/// Stack tracking whether each ancestor level has more siblings
	/// following. `true` means more siblings follow (draw `│`), `false`
	/// means the ancestor was the last child (draw a blank).
	prefixes: Vec<bool>,
}

impl<'a> ExpressionFormatter<'a> {
	fn new(output: &'a mut String) -> Self {
		Self {
			output,
			prefixes: Vec::new(),
		}
	}

	fn write_prefix(&mut self) {
		for &has_more in &self.prefixes {
			self.output.push_str(if has_more {
				"│   "
			} else {
				"    "
			});
		}
	}

	fn write_node(&mut self, expression: &Expression) {
		self.output.push_str(&format!("{} : {}\n", expression.format_one_line(), expression.ty()));
	}

	fn format_root(&mut self, expression: &Expression) {
		self.write_node(expression);
		self.format_children(expression);
	}

	fn format_children(&mut self, expression: &Expression) {
		let children = expression.children();
		let count = children.len();
		for (position, child) in children.into_iter().enumerate() {
			let is_last = position + 1 == count;
			self.write_prefix();
			self.output.push_str(if is_last {
				"└── "
			} else {
				"├── "
			});
			self.write_node(child);
			self.prefixes.push(!is_last);
			self.format_children(child);
			self.prefixes.pop();
		}
	}
}
