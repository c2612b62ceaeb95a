// SPDX: CC0-1.0

use crate::{lex::SubStr, sample::Domain, stdlib, Number, UNDEFINED};
use core::fmt;
use std::{borrow::Cow, collections::HashMap, sync::Arc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Pos,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::Neg => 4,
            Self::Pos => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Neg => Right,
            Self::Pos => Right,
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::Pow => Right,
        }
    }

    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Neg | Self::Pos)
    }

    /// Prefix form of an operator that can start an operand.
    pub const fn as_prefix(&self) -> Option<Self> {
        match self {
            Self::Sub | Self::Neg => Some(Self::Neg),
            Self::Add | Self::Pos => Some(Self::Pos),
            _ => None,
        }
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Neg | Self::Sub => "-",
            Self::Pos | Self::Add => "+",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        }
    }

    pub const fn fun(&self) -> Fun {
        match self {
            Self::Neg => Fun::Unary(stdlib::neg),
            Self::Pos => Fun::Unary(stdlib::pos),
            Self::Add => Fun::Binary(stdlib::add),
            Self::Sub => Fun::Binary(stdlib::sub),
            Self::Mul => Fun::Binary(stdlib::mul),
            Self::Div => Fun::Binary(stdlib::div),
            Self::Pow => Fun::Binary(stdlib::pow),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Fun {
    Unary(fn(Number) -> Number),
    Binary(fn(Number, Number) -> Number),
}

impl Fun {
    pub const fn arity(&self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Ident {
    Const(Number),
    Fun(Fun),
}

#[derive(Clone, Debug, Eq)]
pub enum IdentKey {
    Arc(SubStr),
    Static(&'static str),
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for IdentKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

impl IdentKey {
    pub fn get(&self) -> &str {
        match self {
            Self::Arc(s) => s.get(),
            Self::Static(s) => s,
        }
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

impl From<SubStr> for IdentKey {
    fn from(s: SubStr) -> Self {
        Self::Arc(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

#[derive(Clone, Debug)]
pub enum NodeTyp {
    Num(Number),
    Const(Number),
    Var,
    Unary(OperatorTyp, Box<Node>),
    Binary(OperatorTyp, Box<Node>, Box<Node>),
    Call(Fun, Vec<Node>),
}

/// One node of a parsed expression. `loc` points at the literal, name or
/// operator the node was built from.
#[derive(Clone, Debug)]
pub struct Node {
    pub typ: NodeTyp,
    pub loc: SubStr,
    depth: usize,
}

impl Node {
    pub fn leaf(typ: NodeTyp, loc: SubStr) -> Self {
        Self { typ, loc, depth: 1 }
    }

    pub fn branch(typ: NodeTyp, loc: SubStr) -> Self {
        let depth = 1 + match &typ {
            NodeTyp::Num(_) | NodeTyp::Const(_) | NodeTyp::Var => 0,
            NodeTyp::Unary(_, arg) => arg.depth,
            NodeTyp::Binary(_, lhs, rhs) => lhs.depth.max(rhs.depth),
            NodeTyp::Call(_, args) => args.iter().map(|arg| arg.depth).max().unwrap_or(0),
        };
        Self { typ, loc, depth }
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub fn mentions_var(&self) -> bool {
        match &self.typ {
            NodeTyp::Num(_) | NodeTyp::Const(_) => false,
            NodeTyp::Var => true,
            NodeTyp::Unary(_, arg) => arg.mentions_var(),
            NodeTyp::Binary(_, lhs, rhs) => lhs.mentions_var() || rhs.mentions_var(),
            NodeTyp::Call(_, args) => args.iter().any(Node::mentions_var),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            NodeTyp::Num(val) => write!(f, "{val}"),
            NodeTyp::Const(_) | NodeTyp::Var => write!(f, "{}", self.loc),
            NodeTyp::Unary(op, arg) => write!(f, "({}{arg})", op.symbol()),
            NodeTyp::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            NodeTyp::Call(_, args) => {
                write!(f, "{}(", self.loc)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A validated formula in one free variable. Only [`crate::parse`] builds
/// these.
#[derive(Clone, Debug)]
pub struct Expression {
    src: Arc<String>,
    var: String,
    root: Node,
}

impl Expression {
    pub(crate) fn new(src: Arc<String>, var: String, root: Node) -> Self {
        Self { src, var, root }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn is_constant(&self) -> bool {
        !self.root.mentions_var()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrTyp {
    ShapeMismatch { expected: usize, found: usize },
}

#[derive(Clone, Debug)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub loc: Option<SubStr>, // if none, associated with the final result
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            EvalErrTyp::ShapeMismatch { expected, found } => write!(
                f,
                "shape mismatch: expected {expected} value{s} but found {found}",
                s = if *expected == 1 { "" } else { "s" }
            ),
        }
    }
}

impl std::error::Error for EvalErr {}

/// Intermediate result of one node over the whole domain.
#[derive(Clone, Debug, PartialEq)]
enum Column<'d> {
    Scalar(Number),
    Vector(Cow<'d, [Number]>),
}

impl<'d> Column<'d> {
    fn map(self, f: fn(Number) -> Number) -> Self {
        match self {
            Self::Scalar(val) => Self::Scalar(defined(f(val))),
            Self::Vector(Cow::Borrowed(vals)) => {
                Self::Vector(Cow::Owned(vals.iter().map(|&val| defined(f(val))).collect()))
            }
            Self::Vector(Cow::Owned(mut vals)) => {
                for val in vals.iter_mut() {
                    *val = defined(f(*val));
                }
                Self::Vector(Cow::Owned(vals))
            }
        }
    }

    fn zip(
        self,
        other: Self,
        f: fn(Number, Number) -> Number,
        loc: &SubStr,
    ) -> Result<Self, EvalErr> {
        let col = match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(defined(f(a, b))),
            (Self::Scalar(a), Self::Vector(bs)) => {
                Self::Vector(bs.iter().map(|&b| defined(f(a, b))).collect())
            }
            (Self::Vector(as_), Self::Scalar(b)) => {
                Self::Vector(as_.iter().map(|&a| defined(f(a, b))).collect())
            }
            (Self::Vector(as_), Self::Vector(bs)) => {
                if as_.len() != bs.len() {
                    return Err(EvalErr {
                        typ: EvalErrTyp::ShapeMismatch {
                            expected: as_.len(),
                            found: bs.len(),
                        },
                        loc: Some(loc.clone()),
                    });
                }
                Self::Vector(
                    as_.iter()
                        .zip(bs.iter())
                        .map(|(&a, &b)| defined(f(a, b)))
                        .collect(),
                )
            }
        };
        Ok(col)
    }

    fn apply(self, fun: Fun, mut rest: Vec<Self>, loc: &SubStr) -> Result<Self, EvalErr> {
        match fun {
            Fun::Unary(f) => Ok(self.map(f)),
            Fun::Binary(f) => {
                // arity was checked while parsing
                let other = rest.pop().unwrap_or(Self::Scalar(UNDEFINED));
                self.zip(other, f, loc)
            }
        }
    }
}

/// Maps everything that is not a finite number to the undefined marker.
#[inline]
pub fn defined(val: Number) -> Number {
    if val.is_finite() {
        val
    } else {
        UNDEFINED
    }
}

fn eval_node<'d>(node: &Node, xs: &'d [Number]) -> Result<Column<'d>, EvalErr> {
    let col = match &node.typ {
        NodeTyp::Num(val) | NodeTyp::Const(val) => Column::Scalar(defined(*val)),
        NodeTyp::Var => Column::Vector(Cow::Borrowed(xs)),
        NodeTyp::Unary(op, arg) => eval_node(arg, xs)?.apply(op.fun(), Vec::new(), &node.loc)?,
        NodeTyp::Binary(op, lhs, rhs) => {
            let lhs = eval_node(lhs, xs)?;
            let rhs = eval_node(rhs, xs)?;
            lhs.apply(op.fun(), vec![rhs], &node.loc)?
        }
        NodeTyp::Call(fun, args) => {
            let mut cols = args
                .iter()
                .map(|arg| eval_node(arg, xs))
                .collect::<Result<Vec<_>, _>>()?;
            if cols.is_empty() {
                Column::Scalar(UNDEFINED)
            } else {
                let first = cols.remove(0);
                first.apply(*fun, cols, &node.loc)?
            }
        }
    };
    Ok(col)
}

fn into_samples(col: Column<'_>, len: usize) -> Result<Vec<Number>, EvalErr> {
    match col {
        Column::Scalar(val) => Ok(vec![val; len]),
        Column::Vector(vals) if vals.len() == len => Ok(vals.into_owned()),
        Column::Vector(vals) => Err(EvalErr {
            typ: EvalErrTyp::ShapeMismatch {
                expected: len,
                found: vals.len(),
            },
            loc: None,
        }),
    }
}

/// Evaluates `expr` over every abscissa of `domain` in one pass. Positions
/// where the result is not a finite number hold [`UNDEFINED`].
pub fn evaluate(expr: &Expression, domain: &Domain) -> Result<Vec<Number>, EvalErr> {
    let xs = domain.xs();
    let col = eval_node(expr.root(), xs)?;
    into_samples(col, xs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_undefined, parse::parse, sample::sample};
    use approx::assert_relative_eq;

    fn eval_str(src: &str, domain: &Domain) -> Vec<Number> {
        let expr = parse(src, "x").expect("expression should parse");
        evaluate(&expr, domain).expect("expression should evaluate")
    }

    #[test]
    fn reciprocal_is_undefined_only_at_zero() {
        let domain = sample(-2.0, 2.0, 5).unwrap();
        let ys = eval_str("1/x", &domain);
        assert_eq!(ys.len(), 5);
        for (i, y) in ys.iter().enumerate() {
            if i == 2 {
                assert!(is_undefined(*y));
            } else {
                assert!(y.is_finite());
            }
        }
        assert_relative_eq!(ys[0], -0.5);
        assert_relative_eq!(ys[4], 0.5);
    }

    #[test]
    fn sqrt_of_negative_is_undefined() {
        let domain = sample(-4.0, 4.0, 9).unwrap();
        let ys = eval_str("sqrt(x)", &domain);
        for (x, y) in domain.xs().iter().zip(&ys) {
            if *x < 0.0 {
                assert!(is_undefined(*y), "sqrt({x}) = {y}");
            } else {
                assert!(*y >= 0.0);
            }
        }
        assert_relative_eq!(ys[8], 2.0);
    }

    #[test]
    fn constant_is_broadcast() {
        let domain = sample(0.0, 1.0, 7).unwrap();
        let ys = eval_str("2 * pi", &domain);
        assert_eq!(ys.len(), 7);
        for y in ys {
            assert_relative_eq!(y, 2.0 * core::f64::consts::PI);
        }
    }

    #[test]
    fn overflow_and_log_domain() {
        let domain = sample(-1.0, 1000.0, 2).unwrap();
        let ys = eval_str("exp(x)", &domain);
        assert!(ys[0].is_finite());
        assert!(is_undefined(ys[1]));

        let ys = eval_str("log(x)", &sample(-1.0, 0.0, 2).unwrap());
        assert!(ys.iter().all(|y| is_undefined(*y)));
    }

    #[test]
    fn zero_to_negative_power() {
        let domain = sample(0.0, 1.0, 2).unwrap();
        let ys = eval_str("x**-1", &domain);
        assert!(is_undefined(ys[0]));
        assert_relative_eq!(ys[1], 1.0);
    }

    #[test]
    fn undefined_propagates_through_later_operations() {
        let domain = sample(-1.0, 1.0, 3).unwrap();
        let ys = eval_str("exp(-1/x**2)", &domain);
        assert!(is_undefined(ys[1]));
        assert_relative_eq!(ys[0], (-1.0f64).exp());
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let domain = sample(2.0, 3.0, 2).unwrap();
        let ys = eval_str("-x**2", &domain);
        assert_relative_eq!(ys[0], -4.0);
        let ys = eval_str("2**-x", &domain);
        assert_relative_eq!(ys[0], 0.25);
        let ys = eval_str("2**3**2", &domain);
        assert_relative_eq!(ys[0], 512.0);
    }

    #[test]
    fn binary_functions() {
        let domain = sample(3.0, 6.0, 2).unwrap();
        let ys = eval_str("hypot(x, 4)", &domain);
        assert_relative_eq!(ys[0], 5.0);
        let ys = eval_str("pow(2, x) - atan2(0, 1)", &domain);
        assert_relative_eq!(ys[1], 64.0);
    }

    #[test]
    fn vectors_of_different_length_do_not_combine() {
        let long = [1.0, 2.0, 3.0];
        let short = [1.0, 2.0];
        let src = Arc::new(String::from("+"));
        let err = Column::Vector(Cow::Borrowed(&long[..]))
            .zip(
                Column::Vector(Cow::Borrowed(&short[..])),
                stdlib::add,
                &SubStr::all(src),
            )
            .unwrap_err();
        assert_eq!(
            err.typ,
            EvalErrTyp::ShapeMismatch {
                expected: 3,
                found: 2
            }
        );
        assert!(err.loc.is_some());
    }

    #[test]
    fn result_length_is_checked() {
        let short = [1.0, 2.0];
        let err = into_samples(Column::Vector(Cow::Borrowed(&short[..])), 4).unwrap_err();
        assert!(err.loc.is_none());
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected 4 values but found 2"
        );
    }

    #[test]
    fn borrowed_domain_is_not_modified() {
        let domain = sample(1.0, 2.0, 2).unwrap();
        let ys = eval_str("x * 10", &domain);
        assert_eq!(domain.xs(), &[1.0, 2.0]);
        assert_eq!(ys, vec![10.0, 20.0]);
    }
}
