//! # termcalc-core
//!
//! The document model of the termcalc evaluation engine.
//!
//! This crate provides:
//! - Arena-allocated term trees addressed by 32-bit handles
//! - Interned names
//! - Equations and documents with versioned settings
//! - The differentiability rank used to pick a derivative strategy
//!
//! ## Design Principles
//!
//! - **Immutable trees**: evaluation reads the arena, never writes it
//! - **Closed node set**: every node kind is a [`TermNode`] variant
//! - **Versioned documents**: derived data is keyed by [`Document::version`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod differentiability;
pub mod document;
pub mod equation;
pub mod error;
pub mod handle;
pub mod intern;
pub mod term;

pub use arena::TermArena;
pub use differentiability::DifferentiabilityType;
pub use document::{Document, DocumentSettings};
pub use equation::{Equation, EquationKind};
pub use error::DocumentError;
pub use handle::{EquationId, TermHandle};
pub use intern::{SymbolId, SymbolTable};
pub use term::{Args, LoopKind, OperatorKind, TermField, TermNode, UserFunctionKind};

/// Hash map with the fast non-cryptographic Fx hasher.
pub type FxHashMap<K, V> =
    hashbrown::HashMap<K, V, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

/// Hash set with the fast non-cryptographic Fx hasher.
pub type FxHashSet<K> = hashbrown::HashSet<K, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>;
