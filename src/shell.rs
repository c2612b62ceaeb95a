// SPDX: CC0-1.0

use crate::{
    curve::CurveSet,
    eval::{Expression, Node, NodeTyp},
    lex::SubStr,
};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    SetSecond,
    ToggleSecond,
    SetWin,
    PrintTree,
    Plot,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::SetSecond,
            Self::ToggleSecond,
            Self::Plot,
            Self::SetWin,
            Self::PrintTree,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set the first expression to plot",
            Self::SetSecond => "set the second expression to plot",
            Self::ToggleSecond => "show or hide the second curve",
            Self::SetWin => "set domain, number of points and zoom",
            Self::PrintTree => "print the parsed expressions (for debugging)",
            Self::Plot => "plot the expressions that have been set",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::SetSecond => "set2",
            Self::ToggleSecond => "second",
            Self::SetWin => "window",
            Self::PrintTree => "tree",
            Self::Plot => "plot",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::exhaustive()
            .iter()
            .find(|c| c.name() == s)
            .copied()
            .ok_or(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        "^".repeat(span.len().max(1))
    )?;
    Ok(())
}

fn dump_node<W: Write>(out: &mut W, node: &Node, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match &node.typ {
        NodeTyp::Num(val) => writeln!(out, "{indent}push {val}"),
        NodeTyp::Const(val) => writeln!(out, "{indent}push '{}' ({val})", node.loc),
        NodeTyp::Var => writeln!(out, "{indent}push '{}'", node.loc),
        NodeTyp::Unary(op, arg) => {
            writeln!(out, "{indent}prefix '{}'", op.symbol())?;
            dump_node(out, arg, depth + 1)
        }
        NodeTyp::Binary(op, lhs, rhs) => {
            writeln!(out, "{indent}apply '{}'", op.symbol())?;
            dump_node(out, lhs, depth + 1)?;
            dump_node(out, rhs, depth + 1)
        }
        NodeTyp::Call(_, args) => {
            writeln!(out, "{indent}call '{}'", node.loc)?;
            args.iter()
                .try_for_each(|arg| dump_node(out, arg, depth + 1))
        }
    }
}

pub fn dump_tree<W: Write>(
    mut out: W,
    expr: &Expression,
    title: core::fmt::Arguments,
) -> io::Result<()> {
    writeln!(out, "{title}: {expr}")?;
    if expr.is_constant() {
        writeln!(out, "  (constant, does not depend on '{}')", expr.var())?;
    }
    dump_node(&mut out, expr.root(), 1)
}

/// Prints every message of a run, underlining the offending text.
pub fn report<W: Write>(mut out: W, set: &CurveSet) -> io::Result<()> {
    for msg in set.messages.iter() {
        if let Some(ref loc) = msg.loc {
            underline(&mut out, loc)?;
        }
        writeln!(out, "{msg}")?;
    }
    Ok(())
}
