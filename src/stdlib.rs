// SPDX: CC0-1.0

use crate::{eval::*, Number};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

pub const X: &str = "x";

/// Words that mean something in a general purpose language. They are never
/// identifiers here.
pub const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();

    let unary: &[(&'static str, fn(Number) -> Number)] = &[
        ("abs", abs),
        ("fabs", abs),
        ("sign", sign),
        ("floor", floor),
        ("ceil", ceil),
        ("sqrt", sqrt),
        ("cbrt", cbrt),
        ("exp", exp),
        ("expm1", expm1),
        ("log", ln),
        ("ln", ln),
        ("log2", log2),
        ("log10", log10),
        ("log1p", log1p),
        // trig
        ("sin", sin),
        ("cos", cos),
        ("tan", tan),
        ("asin", arcsin),
        ("acos", arccos),
        ("atan", arctan),
        ("arcsin", arcsin),
        ("arccos", arccos),
        ("arctan", arctan),
        // hyperbolic
        ("sinh", sinh),
        ("cosh", cosh),
        ("tanh", tanh),
        ("asinh", arsinh),
        ("acosh", arcosh),
        ("atanh", artanh),
        ("arcsinh", arsinh),
        ("arccosh", arcosh),
        ("arctanh", artanh),
    ];
    for &(name, fun) in unary {
        ret.insert(name.into(), Ident::Fun(Fun::Unary(fun)));
    }

    let binary: &[(&'static str, fn(Number, Number) -> Number)] = &[
        ("pow", pow),
        ("hypot", hypot),
        ("atan2", arctan2),
        ("arctan2", arctan2),
    ];
    for &(name, fun) in binary {
        ret.insert(name.into(), Ident::Fun(Fun::Binary(fun)));
    }

    ret.insert("pi".into(), Ident::Const(consts::PI));
    ret.insert("tau".into(), Ident::Const(consts::TAU));
    ret.insert("e".into(), Ident::Const(consts::E));
    ret
}

pub fn neg(x: Number) -> Number {
    -x
}

pub fn pos(x: Number) -> Number {
    x
}

pub fn add(x: Number, y: Number) -> Number {
    x + y
}

pub fn sub(x: Number, y: Number) -> Number {
    x - y
}

pub fn mul(x: Number, y: Number) -> Number {
    x * y
}

pub fn div(x: Number, y: Number) -> Number {
    x / y
}

pub fn pow(x: Number, exp: Number) -> Number {
    x.powf(exp)
}

pub fn hypot(x: Number, y: Number) -> Number {
    x.hypot(y)
}

pub fn arctan2(y: Number, x: Number) -> Number {
    y.atan2(x)
}

pub fn abs(x: Number) -> Number {
    x.abs()
}

// zero keeps its sign of zero, unlike `f64::signum`
pub fn sign(x: Number) -> Number {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

pub fn floor(x: Number) -> Number {
    x.floor()
}

pub fn ceil(x: Number) -> Number {
    x.ceil()
}

pub fn sqrt(x: Number) -> Number {
    x.sqrt()
}

pub fn cbrt(x: Number) -> Number {
    x.cbrt()
}

pub fn exp(x: Number) -> Number {
    x.exp()
}

pub fn expm1(x: Number) -> Number {
    x.exp_m1()
}

pub fn ln(x: Number) -> Number {
    x.ln()
}

pub fn log2(x: Number) -> Number {
    x.log2()
}

pub fn log10(x: Number) -> Number {
    x.log10()
}

pub fn log1p(x: Number) -> Number {
    x.ln_1p()
}

pub fn sin(x: Number) -> Number {
    x.sin()
}

pub fn cos(x: Number) -> Number {
    x.cos()
}

pub fn tan(x: Number) -> Number {
    x.tan()
}

pub fn arcsin(x: Number) -> Number {
    x.asin()
}

pub fn arccos(x: Number) -> Number {
    x.acos()
}

pub fn arctan(x: Number) -> Number {
    x.atan()
}

pub fn sinh(x: Number) -> Number {
    x.sinh()
}

pub fn cosh(x: Number) -> Number {
    x.cosh()
}

pub fn tanh(x: Number) -> Number {
    x.tanh()
}

pub fn arsinh(x: Number) -> Number {
    x.asinh()
}

pub fn arcosh(x: Number) -> Number {
    x.acosh()
}

pub fn artanh(x: Number) -> Number {
    x.atanh()
}
