// SPDX: CC0-1.0

// implementation of shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm),
// reducing straight into an expression tree instead of a postfix program

use crate::{
    eval::{Associativity, Expression, Fun, Ident, IdentKey, Idents, Node, NodeTyp, OperatorTyp},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, Tok, TokTyp},
    stdlib, Number,
};
use core::{fmt, num::ParseFloatError};
use std::sync::Arc;

/// Deepest tree accepted from user input, which bounds evaluation recursion.
pub const MAX_DEPTH: usize = 1024;

// minimum normalized similarity for a name to be suggested
const SIMILARITY: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrTyp {
    Empty,
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    Keyword,
    UnknownVar { var: String, similar: Option<String> },
    UnknownFun { similar: Option<String> },
    FunWithoutCall,
    Arity { arity: usize, found: usize },
    ExpectedOperand,
    ExpectedOperator,
    UnexpectedEnd,
    StrayComma,
    ParenMismatch,
    TooDeep,
    InvalidVar,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl ParseErr {
    fn new(typ: ParseErrTyp, loc: SubStr) -> Self {
        Self { typ, loc }
    }

    pub fn is_empty_input(&self) -> bool {
        self.typ == ParseErrTyp::Empty
    }

    /// Byte offset of the offending token in the source, when there is one.
    pub fn position(&self) -> Option<usize> {
        match self.typ {
            ParseErrTyp::Empty | ParseErrTyp::InvalidVar => None,
            _ => Some(self.loc.start()),
        }
    }

    pub fn note(&self) -> Option<&'static str> {
        match self.typ {
            ParseErrTyp::LexErr(LexErrTyp::Unsupported(tok)) => tok.note(),
            ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => Some(
                "available tokens are numbers, identifiers, the operators + - * / ** and the symbols ( ) ,",
            ),
            ParseErrTyp::ExpectedOperator => Some(
                "implicit multiplication is not supported, so for example '5x' would be '5*x'",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.loc.get();
        match &self.typ {
            ParseErrTyp::Empty => write!(f, "expression is empty")?,
            ParseErrTyp::LexErr(err) => write!(f, "{err} '{text}'")?,
            ParseErrTyp::ParseNum(err) => write!(f, "invalid number '{text}': {err}")?,
            ParseErrTyp::Keyword => write!(f, "keyword '{text}' is not allowed")?,
            ParseErrTyp::UnknownVar { var, similar } => {
                write!(f, "unknown name '{text}', the only variable is '{var}'")?;
                if let Some(similar) = similar {
                    write!(f, " (did you mean '{similar}'?)")?;
                }
            }
            ParseErrTyp::UnknownFun { similar } => {
                write!(f, "unknown function '{text}'")?;
                if let Some(similar) = similar {
                    write!(f, " (did you mean '{similar}'?)")?;
                }
            }
            ParseErrTyp::FunWithoutCall => write!(
                f,
                "function '{text}' must be called with parentheses, as in '{text}(x)'"
            )?,
            ParseErrTyp::Arity { arity, found } => write!(
                f,
                "function '{text}' takes {arity} argument{s} but {found} {were} given",
                s = if *arity == 1 { "" } else { "s" },
                were = if *found == 1 { "was" } else { "were" },
            )?,
            ParseErrTyp::ExpectedOperand => write!(f, "expected a value but found '{text}'")?,
            ParseErrTyp::ExpectedOperator => write!(f, "expected an operator before '{text}'")?,
            ParseErrTyp::UnexpectedEnd => write!(f, "expression ends unexpectedly")?,
            ParseErrTyp::StrayComma => {
                write!(f, "',' is only allowed between function arguments")?
            }
            ParseErrTyp::ParenMismatch => write!(f, "mismatched parenthesis '{text}'")?,
            ParseErrTyp::TooDeep => {
                write!(f, "expression is nested more than {MAX_DEPTH} levels deep")?
            }
            ParseErrTyp::InvalidVar => write!(f, "'{text}' cannot be used as a variable name")?,
        }
        if let Some(note) = self.note() {
            write!(f, ": {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErr {}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    Fun(Fun),
    OpenParen { call: bool },
}

#[derive(Clone, Debug)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

fn similar_name<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut candidates: Vec<&str> = candidates.collect();
    candidates.sort_unstable();
    let name = name.to_ascii_lowercase();
    candidates
        .into_iter()
        .map(|cand| {
            (
                strsim::normalized_damerau_levenshtein(&name, &cand.to_ascii_lowercase()),
                cand,
            )
        })
        .reduce(|(acc_sim, acc), (elem_sim, elem)| {
            if elem_sim > acc_sim {
                (elem_sim, elem)
            } else {
                (acc_sim, acc)
            }
        })
        .filter(|(sim, _)| *sim > SIMILARITY)
        .map(|(_, cand)| cand.to_string())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .map_or(false, |chr| chr.is_ascii_alphabetic() || chr == '_')
        && chars.all(|chr| chr.is_ascii_alphanumeric() || chr == '_')
}

fn check_var(var: &str, idents: &Idents) -> Result<(), ParseErr> {
    let loc = SubStr::all(Arc::new(var.to_string()));
    if is_identifier(var)
        && !stdlib::KEYWORDS.contains(&var)
        && idents.get(&IdentKey::from(loc.clone())).is_none()
    {
        Ok(())
    } else {
        Err(ParseErr::new(ParseErrTyp::InvalidVar, loc))
    }
}

struct Shunt<'a> {
    src: &'a Arc<String>,
    var: &'a str,
    idents: &'a Idents,
    out: Vec<Node>,     // output
    ops: Vec<ShuntOp>,  // operator stack
    args: Vec<usize>,   // argument count of each open call
    expect_operand: bool,
    prev: Option<TokTyp>,
}

impl<'a> Shunt<'a> {
    fn new(src: &'a Arc<String>, var: &'a str, idents: &'a Idents) -> Self {
        Self {
            src,
            var,
            idents,
            out: Vec::new(),
            ops: Vec::new(),
            args: Vec::new(),
            expect_operand: true,
            prev: None,
        }
    }

    fn operand_allowed(&self, tok: &Tok) -> Result<(), ParseErr> {
        if self.expect_operand {
            Ok(())
        } else {
            Err(ParseErr::new(ParseErrTyp::ExpectedOperator, tok.loc.clone()))
        }
    }

    fn operator_allowed(&self, tok: &Tok) -> Result<(), ParseErr> {
        if self.expect_operand {
            Err(ParseErr::new(ParseErrTyp::ExpectedOperand, tok.loc.clone()))
        } else {
            Ok(())
        }
    }

    fn unknown(&self, tok: Tok, is_call: bool) -> ParseErr {
        let name = tok.loc.get();
        let typ = if stdlib::KEYWORDS.contains(&name) {
            ParseErrTyp::Keyword
        } else if is_call {
            let funs = self.idents.iter().filter_map(|(key, ident)| match ident {
                Ident::Fun(_) => Some(key.get()),
                Ident::Const(_) => None,
            });
            ParseErrTyp::UnknownFun {
                similar: similar_name(name, funs),
            }
        } else {
            let vals = self
                .idents
                .iter()
                .filter_map(|(key, ident)| match ident {
                    Ident::Const(_) => Some(key.get()),
                    Ident::Fun(_) => None,
                })
                .chain([self.var]);
            ParseErrTyp::UnknownVar {
                var: self.var.to_string(),
                similar: similar_name(name, vals),
            }
        };
        ParseErr::new(typ, tok.loc)
    }

    fn push_node(&mut self, node: Node) -> Result<(), ParseErr> {
        if node.depth() > MAX_DEPTH {
            return Err(ParseErr::new(ParseErrTyp::TooDeep, node.loc));
        }
        self.out.push(node);
        Ok(())
    }

    fn pop_operand(&mut self, loc: &SubStr) -> Result<Node, ParseErr> {
        self.out
            .pop()
            .ok_or_else(|| ParseErr::new(ParseErrTyp::ExpectedOperand, loc.clone()))
    }

    fn apply(&mut self, op: ShuntOp) -> Result<(), ParseErr> {
        let typ = match op.typ {
            ShuntOpTyp::Operator(typ) if typ.is_prefix() => {
                let arg = self.pop_operand(&op.loc)?;
                NodeTyp::Unary(typ, Box::new(arg))
            }
            ShuntOpTyp::Operator(typ) => {
                let rhs = self.pop_operand(&op.loc)?;
                let lhs = self.pop_operand(&op.loc)?;
                NodeTyp::Binary(typ, Box::new(lhs), Box::new(rhs))
            }
            ShuntOpTyp::Fun(_) | ShuntOpTyp::OpenParen { .. } => {
                return Err(ParseErr::new(ParseErrTyp::ParenMismatch, op.loc));
            }
        };
        self.push_node(Node::branch(typ, op.loc))
    }

    fn apply_call(&mut self, op: ShuntOp, found: usize) -> Result<(), ParseErr> {
        let ShuntOpTyp::Fun(fun) = op.typ else {
            return Err(ParseErr::new(ParseErrTyp::ParenMismatch, op.loc));
        };
        if fun.arity() != found {
            return Err(ParseErr::new(
                ParseErrTyp::Arity {
                    arity: fun.arity(),
                    found,
                },
                op.loc,
            ));
        }
        let at = self
            .out
            .len()
            .checked_sub(found)
            .ok_or_else(|| ParseErr::new(ParseErrTyp::ExpectedOperand, op.loc.clone()))?;
        let args = self.out.split_off(at);
        self.push_node(Node::branch(NodeTyp::Call(fun, args), op.loc))
    }

    fn pop_until_paren(&mut self) -> Result<(), ParseErr> {
        while let Some(op) = self.ops.last() {
            if let ShuntOpTyp::OpenParen { .. } = op.typ {
                break;
            }
            if let Some(op) = self.ops.pop() {
                self.apply(op)?;
            }
        }
        Ok(())
    }

    fn push(&mut self, tok: Tok, is_call: bool) -> Result<(), ParseErr> {
        let typ = tok.typ;
        match tok.typ {
            TokTyp::Number => {
                self.operand_allowed(&tok)?;
                let num: Number = tok
                    .loc
                    .get()
                    .parse()
                    .map_err(|err| ParseErr::new(ParseErrTyp::ParseNum(err), tok.loc.clone()))?;
                self.push_node(Node::leaf(NodeTyp::Num(num), tok.loc))?;
                self.expect_operand = false;
            }

            TokTyp::Ident => {
                self.operand_allowed(&tok)?;
                if tok.loc.get() == self.var {
                    self.push_node(Node::leaf(NodeTyp::Var, tok.loc))?;
                    self.expect_operand = false;
                } else {
                    match self.idents.get(&IdentKey::from(tok.loc.clone())).copied() {
                        Some(Ident::Const(val)) => {
                            self.push_node(Node::leaf(NodeTyp::Const(val), tok.loc))?;
                            self.expect_operand = false;
                        }
                        Some(Ident::Fun(fun)) if is_call => self.ops.push(ShuntOp {
                            typ: ShuntOpTyp::Fun(fun),
                            loc: tok.loc,
                        }),
                        Some(Ident::Fun(_)) => {
                            return Err(ParseErr::new(ParseErrTyp::FunWithoutCall, tok.loc));
                        }
                        None => return Err(self.unknown(tok, is_call)),
                    }
                }
            }

            TokTyp::Op(o1) => {
                if self.expect_operand {
                    match o1.as_prefix() {
                        Some(prefix) => self.ops.push(ShuntOp {
                            typ: ShuntOpTyp::Operator(prefix),
                            loc: tok.loc,
                        }),
                        None => {
                            return Err(ParseErr::new(ParseErrTyp::ExpectedOperand, tok.loc));
                        }
                    }
                } else {
                    loop {
                        let o2 = match self.ops.last().map(|op| op.typ) {
                            Some(ShuntOpTyp::Operator(o2)) => o2,
                            _ => break,
                        };
                        if (o2.precedence() > o1.precedence())
                            || ((o1.precedence() == o2.precedence())
                                && (o1.associativity() == Associativity::Left))
                        {
                            if let Some(op) = self.ops.pop() {
                                self.apply(op)?;
                            }
                        } else {
                            break;
                        }
                    }
                    self.ops.push(ShuntOp {
                        typ: ShuntOpTyp::Operator(o1),
                        loc: tok.loc,
                    });
                    self.expect_operand = true;
                }
            }

            TokTyp::Comma => {
                self.operator_allowed(&tok)?;
                self.pop_until_paren()?;
                match self.ops.last() {
                    Some(ShuntOp {
                        typ: ShuntOpTyp::OpenParen { call: true },
                        ..
                    }) => {
                        if let Some(count) = self.args.last_mut() {
                            *count += 1;
                        }
                    }
                    _ => return Err(ParseErr::new(ParseErrTyp::StrayComma, tok.loc)),
                }
                self.expect_operand = true;
            }

            TokTyp::OpenParen => {
                self.operand_allowed(&tok)?;
                let call = matches!(
                    self.ops.last(),
                    Some(ShuntOp {
                        typ: ShuntOpTyp::Fun(_),
                        ..
                    })
                );
                if call {
                    self.args.push(1);
                }
                self.ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen { call },
                    loc: tok.loc,
                });
            }

            TokTyp::CloseParen => {
                if self.expect_operand {
                    let empty_call = self.prev == Some(TokTyp::OpenParen)
                        && matches!(
                            self.ops.last(),
                            Some(ShuntOp {
                                typ: ShuntOpTyp::OpenParen { call: true },
                                ..
                            })
                        );
                    match self.args.last_mut() {
                        Some(count) if empty_call => *count = 0,
                        _ => return Err(ParseErr::new(ParseErrTyp::ExpectedOperand, tok.loc)),
                    }
                }

                self.pop_until_paren()?;

                match self.ops.pop() {
                    Some(ShuntOp {
                        typ: ShuntOpTyp::OpenParen { call: true },
                        ..
                    }) => {
                        let found = self.args.pop().unwrap_or(0);
                        match self.ops.pop() {
                            Some(fun) => self.apply_call(fun, found)?,
                            None => {
                                return Err(ParseErr::new(ParseErrTyp::ParenMismatch, tok.loc))
                            }
                        }
                    }
                    Some(ShuntOp {
                        typ: ShuntOpTyp::OpenParen { call: false },
                        ..
                    }) => {}
                    _ => return Err(ParseErr::new(ParseErrTyp::ParenMismatch, tok.loc)),
                }
                self.expect_operand = false;
            }

            TokTyp::XEqual
            | TokTyp::XGreater
            | TokTyp::XLess
            | TokTyp::XPipe
            | TokTyp::XCaret
            | TokTyp::XPercent
            | TokTyp::XFloorDiv
            | TokTyp::XDot
            | TokTyp::XOpenSquareBracket
            | TokTyp::XCloseSquareBracket
            | TokTyp::XOpenCurly
            | TokTyp::XCloseCurly
            | TokTyp::XSemicolon
            | TokTyp::XQuote => {
                // the lexer reports these, but refuse them here too
                return Err(ParseErr::new(
                    ParseErrTyp::LexErr(LexErrTyp::Unsupported(tok.typ)),
                    tok.loc,
                ));
            }
        }
        self.prev = Some(typ);
        Ok(())
    }

    fn finish(mut self) -> Result<Node, ParseErr> {
        if self.expect_operand {
            return Err(ParseErr::new(
                ParseErrTyp::UnexpectedEnd,
                SubStr::end_of(Arc::clone(self.src)),
            ));
        }

        while let Some(op) = self.ops.pop() {
            self.apply(op)?;
        }

        match self.out.pop() {
            Some(root) if self.out.is_empty() => Ok(root),
            _ => Err(ParseErr::new(
                ParseErrTyp::ExpectedOperator,
                SubStr::all(Arc::clone(self.src)),
            )),
        }
    }
}

/// Parses `text` as a formula in the single free variable `var`, using the
/// standard functions and constants.
pub fn parse(text: &str, var: &str) -> Result<Expression, ParseErr> {
    let src = Arc::new(text.to_string());
    parse_with(&src, var, &stdlib::standard_idents())
}

pub fn parse_with(src: &Arc<String>, var: &str, idents: &Idents) -> Result<Expression, ParseErr> {
    if src.trim().is_empty() {
        return Err(ParseErr::new(ParseErrTyp::Empty, SubStr::all(Arc::clone(src))));
    }
    check_var(var, idents)?;

    let mut shunt = Shunt::new(src, var, idents);
    let mut lex = Lexer::new(src).peekable();
    let mut count = 0_usize;
    while let Some(tok) = lex.next() {
        let tok = tok?;
        // report e.g. attribute access before complaining about the name
        if let Some(Err(err)) = lex.peek() {
            return Err(err.clone().into());
        }
        let is_call = matches!(
            lex.peek(),
            Some(Ok(Tok {
                typ: TokTyp::OpenParen,
                ..
            }))
        );
        shunt.push(tok, is_call)?;
        count += 1;
    }
    let root = shunt.finish()?;
    log::trace!(
        "parsed {count} tokens of '{src}' into a tree of depth {}",
        root.depth()
    );

    Ok(Expression::new(Arc::clone(src), var.to_string(), root))
}
