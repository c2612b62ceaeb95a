// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    // shared with every span of the same input
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl SubStr {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    /// One past the last character, for errors about missing input.
    pub fn end_of(src: Arc<String>) -> Self {
        let start = src.len();
        Self::new(src, start, 1)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text under the span, empty if the span points past the source.
    pub fn get(&self) -> &str {
        self.src.get(self.start..self.end()).unwrap_or("")
    }

    pub fn shift_right(&mut self, by: usize) {
        self.len += by;
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,

    // unsupported tokens
    XEqual,
    XGreater,
    XLess,
    XPipe,
    XCaret,
    XPercent,
    XFloorDiv,
    XDot,
    XOpenSquareBracket,
    XCloseSquareBracket,
    XOpenCurly,
    XCloseCurly,
    XSemicolon,
    XQuote,
}

impl TokTyp {
    pub const fn is_unsupported(&self) -> bool {
        !matches!(
            self,
            Self::Ident
                | Self::Number
                | Self::Op(_)
                | Self::Comma
                | Self::OpenParen
                | Self::CloseParen
        )
    }

    /// Extra help for a token that the grammar refuses.
    pub const fn note(&self) -> Option<&'static str> {
        match self {
            Self::XEqual => Some("expected an expression but found an assignment or equation"),
            Self::XGreater | Self::XLess => Some("expected an expression but found an inequality"),
            Self::XPipe => Some("use the 'abs' function to compute absolute value"),
            Self::XCaret => Some("use '**' for exponentiation"),
            Self::XPercent => Some("the modulo operator is not supported"),
            Self::XFloorDiv => Some("use 'floor(a / b)' for floor division"),
            Self::XDot => Some("attribute access is not allowed, call functions by their bare name"),
            Self::XOpenSquareBracket | Self::XCloseSquareBracket => {
                Some("indexing and lists are not supported")
            }
            Self::XOpenCurly | Self::XCloseCurly => Some("use parentheses for grouping"),
            Self::XSemicolon => Some("only a single expression is allowed"),
            Self::XQuote => Some("strings are not supported"),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Unsupported(TokTyp),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Unsupported(_) => write!(f, "unsupported token"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    cur: Peekable<CharIndices<'src>>,
    has_errored: bool, // tells iter to yield None after error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            cur: src.char_indices().peekable(),
            has_errored: false,
        }
    }

    pub fn trim_whitespace(&mut self) {
        while let Some((_, chr)) = self.cur.peek() {
            if chr.is_whitespace() {
                self.cur.next();
            } else {
                break;
            }
        }
    }

    fn loc(&self, start: usize, len: usize) -> SubStr {
        SubStr::new(Arc::clone(self.src), start, len)
    }

    fn peek_chr(&mut self) -> Option<char> {
        self.cur.peek().map(|&(_, chr)| chr)
    }

    fn second_chr(&self) -> Option<char> {
        let mut ahead = self.cur.clone();
        ahead.next();
        ahead.next().map(|(_, chr)| chr)
    }

    pub fn consume_unambiguous(&mut self) -> Option<Tok> {
        let (idx, chr) = self.cur.peek().copied()?;
        let typ = match chr {
            '+' => TokTyp::Op(OperatorTyp::Add),
            '-' => TokTyp::Op(OperatorTyp::Sub),
            ',' => TokTyp::Comma,
            '(' => TokTyp::OpenParen,
            ')' => TokTyp::CloseParen,

            '=' => TokTyp::XEqual,
            '>' => TokTyp::XGreater,
            '<' => TokTyp::XLess,
            '|' => TokTyp::XPipe,
            '^' => TokTyp::XCaret,
            '%' => TokTyp::XPercent,
            '[' => TokTyp::XOpenSquareBracket,
            ']' => TokTyp::XCloseSquareBracket,
            '{' => TokTyp::XOpenCurly,
            '}' => TokTyp::XCloseCurly,
            ';' => TokTyp::XSemicolon,
            '\'' | '"' => TokTyp::XQuote,
            _ => return None,
        };
        self.cur.next(); // consume because we only peeked
        Some(Tok {
            typ,
            loc: self.loc(idx, chr.len_utf8()),
        })
    }

    /// Operators whose meaning changes when the character is doubled.
    pub fn consume_doubled(&mut self) -> Option<Tok> {
        let (idx, chr) = self.cur.peek().copied()?;
        let (single, double) = match chr {
            '*' => (TokTyp::Op(OperatorTyp::Mul), TokTyp::Op(OperatorTyp::Pow)),
            '/' => (TokTyp::Op(OperatorTyp::Div), TokTyp::XFloorDiv),
            _ => return None,
        };
        self.cur.next();
        let tok = if self.peek_chr() == Some(chr) {
            self.cur.next();
            Tok {
                typ: double,
                loc: self.loc(idx, 2),
            }
        } else {
            Tok {
                typ: single,
                loc: self.loc(idx, 1),
            }
        };
        Some(tok)
    }

    pub fn consume_while<P>(&mut self, start: usize, typ: TokTyp, predicate: P) -> Tok
    where
        P: Fn(char) -> bool,
    {
        let mut tok = Tok {
            typ,
            loc: self.loc(start, 0),
        };
        while let Some(chr) = self.peek_chr() {
            if !predicate(chr) {
                break;
            }
            tok.loc.shift_right(chr.len_utf8());
            self.cur.next();
        }
        tok
    }

    fn consume_number(&mut self, start: usize) -> Tok {
        let mut tok = self.consume_while(start, TokTyp::Number, |chr| {
            chr.is_ascii_digit() || chr == '.'
        });

        // exponent only counts if digits follow, so `2e` stays `2` then `e`
        if let Some('e' | 'E') = self.peek_chr() {
            let mut ahead = self.cur.clone();
            ahead.next();
            let mut marker_len = 1;
            if let Some(&(_, '+' | '-')) = ahead.peek() {
                ahead.next();
                marker_len += 1;
            }
            if ahead.peek().map_or(false, |&(_, chr)| chr.is_ascii_digit()) {
                self.cur = ahead;
                tok.loc.shift_right(marker_len);
                let digits = self.consume_while(tok.loc.end(), TokTyp::Number, |chr| {
                    chr.is_ascii_digit()
                });
                tok.loc.shift_right(digits.loc.len());
            }
        }
        tok
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.trim_whitespace();

        let (next_idx, next_chr) = self.cur.peek().copied()?;
        let tok = if let Some(tok) = self.consume_unambiguous() {
            tok
        } else if let Some(tok) = self.consume_doubled() {
            tok
        } else if next_chr.is_ascii_alphabetic() || next_chr == '_' {
            self.consume_while(next_idx, TokTyp::Ident, |chr| {
                chr.is_ascii_alphanumeric() || chr == '_'
            })
        } else if next_chr.is_ascii_digit()
            || (next_chr == '.' && self.second_chr().map_or(false, |chr| chr.is_ascii_digit()))
        {
            self.consume_number(next_idx)
        } else if next_chr == '.' {
            self.cur.next();
            Tok {
                typ: TokTyp::XDot,
                loc: self.loc(next_idx, 1),
            }
        } else {
            self.has_errored = true;
            return Some(Err(LexErr {
                typ: LexErrTyp::InvalidChar,
                loc: self.loc(next_idx, next_chr.len_utf8()),
            }));
        };

        if tok.typ.is_unsupported() {
            self.has_errored = true;
            return Some(Err(LexErr {
                typ: LexErrTyp::Unsupported(tok.typ),
                loc: tok.loc,
            }));
        }
        Some(Ok(tok))
    }
}
