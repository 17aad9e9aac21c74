// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 KeelDB

//! Type descriptors for the KeelDB bytecode layer.
//!
//! A [`Type`] identifies a runtime type together with its operand-stack
//! width: how many machine stack slots a value of that type occupies while
//! it sits on the stack of the target machine. Wide primitives take two
//! slots, ordinary values and references take one, and [`Type::Void`] takes
//! none. Every typed expression node carries exactly one `Type`, fixed at
//! construction.
//!
//! [`Value`] is the compile-time constant counterpart: a literal the
//! analyzer embedded in an expression tree, carrying its own `Type`.

mod r#type;
mod value;

pub use r#type::{GetType, StackWidth, Type};
pub use value::Value;
