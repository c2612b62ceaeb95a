// SPDX: CC0-1.0

//! Turns typed formulas in one variable into sampled curves ready to draw.
//!
//! A run goes `sample` → `parse` → `eval` → `range` → `curve`, and
//! [`pipeline::run`] does all of it for one [`pipeline::Request`].

pub mod curve;
pub mod eval;
pub mod gnuplot;
pub mod lex;
pub mod parse;
pub mod pipeline;
pub mod range;
pub mod sample;
pub mod shell;
pub mod stdlib;

pub type Number = f64;

/// Marker for a sample whose value is not a finite number. Renderers draw a
/// gap there.
pub const UNDEFINED: Number = Number::NAN;

#[inline]
pub fn is_undefined(val: Number) -> bool {
    val.is_nan()
}
