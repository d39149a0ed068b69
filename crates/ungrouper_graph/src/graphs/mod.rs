// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node type registries for the supported tree kinds.

pub mod material;
