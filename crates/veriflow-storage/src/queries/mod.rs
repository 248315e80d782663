// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity family.

pub mod cases;
pub mod conversations;
pub mod evidence;
pub mod pool;
pub mod rules;
