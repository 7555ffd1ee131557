//! # termcalc-value
//!
//! The numeric value carried through every evaluation step.
//!
//! This crate provides:
//! - [`NumericValue`]: a real or complex scalar with an explicit invalid state
//! - [`Unit`]: SI dimensions attached to values as a side channel
//! - The built-in function catalog ([`FunctionKind`])
//! - Result formatting to a number of significant digits
//!
//! ## Arithmetic Model
//!
//! - Operations write into `self` and return the resulting [`ValueKind`]
//! - Real operands give real results; any complex operand promotes
//! - An invalid operand propagates its [`ValueError`] reason

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod format;
pub mod functions;
pub mod unit;
pub mod value;

mod proptests;

pub use format::{round_to_significant_digits, DEFAULT_SIGNIFICANT_DIGITS};
pub use functions::{FunctionKind, NTH_ROOT_TOLERANCE};
pub use unit::{Dimensions, Unit};
pub use value::{NumericValue, ValueError, ValueKind};
