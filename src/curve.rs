// SPDX: CC0-1.0

use crate::{
    eval::{self, EvalErr},
    is_undefined,
    lex::SubStr,
    parse::{self, ParseErr},
    range::{self, AxisRange},
    sample::{ConfigErr, Domain},
    Number,
};
use core::fmt;
use std::sync::Arc;

/// Position of a curve in the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// One-based number shown to the user.
    pub const fn number(&self) -> usize {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    pub const fn style(&self) -> Style {
        match self {
            Self::First => Style {
                color: "skyblue",
                edge_color: "blue",
                fill_color: "lightblue",
                marker: Marker::Circle,
                line_width: 2.5,
                marker_size: 4.0,
            },
            Self::Second => Style {
                color: "lightcoral",
                edge_color: "red",
                fill_color: "pink",
                marker: Marker::Square,
                line_width: 2.5,
                marker_size: 4.0,
            },
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curve {}", self.number())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Circle,
    Square,
}

/// How the renderer should draw a curve. Colors are X11 color names.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub color: &'static str,
    pub edge_color: &'static str,
    pub fill_color: &'static str,
    pub marker: Marker,
    pub line_width: Number,
    pub marker_size: Number,
}

/// A successfully evaluated curve; `y[i]` belongs to `x.xs()[i]` and may be
/// [`crate::UNDEFINED`].
#[derive(Clone, Debug)]
pub struct Curve {
    pub slot: Slot,
    pub label: String,
    pub source: String,
    pub style: Style,
    pub x: Arc<Domain>,
    pub y: Vec<Number>,
}

impl Curve {
    pub fn points(&self) -> impl Iterator<Item = (Number, Number)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn defined_count(&self) -> usize {
        self.y.iter().filter(|y| !is_undefined(**y)).count()
    }
}

#[derive(Clone, Debug)]
pub enum Outcome {
    Success(Curve),
    ParseFailure(ParseErr),
    EvaluationFailure(EvalErr),
}

/// Parses and evaluates the expression for one slot.
pub fn evaluate_curve(slot: Slot, text: &str, var: &str, domain: &Arc<Domain>) -> Outcome {
    let expr = match parse::parse(text, var) {
        Ok(expr) => expr,
        Err(err) => return Outcome::ParseFailure(err),
    };
    match eval::evaluate(&expr, domain) {
        Ok(y) => {
            let source = text.trim().to_string();
            Outcome::Success(Curve {
                slot,
                label: format!("y{} = {source}", slot.number()),
                source,
                style: slot.style(),
                x: Arc::clone(domain),
                y,
            })
        }
        Err(err) => Outcome::EvaluationFailure(err),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "note"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Message {
    pub curve: Option<Slot>, // if none, about the request as a whole
    pub severity: Severity,
    pub text: String,
    pub loc: Option<SubStr>,
}

impl Message {
    pub fn position(&self) -> Option<usize> {
        self.loc.as_ref().map(SubStr::start)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

/// What the presentation layer should show for a curve set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetState {
    /// At least one curve can be drawn.
    Ready,
    /// Nothing was typed yet.
    NoInput,
    /// Input was given but none of it can be drawn.
    Invalid,
}

#[derive(Clone, Debug)]
pub struct CurveSet {
    pub curves: Vec<Curve>,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub messages: Vec<Message>,
    pub state: SetState,
}

impl CurveSet {
    pub fn from_config_err(err: &ConfigErr, x_range: AxisRange) -> Self {
        Self {
            curves: Vec::new(),
            x_range,
            y_range: range::DEFAULT_RANGE,
            messages: vec![Message {
                curve: None,
                severity: Severity::Error,
                text: format!("invalid settings: {err}"),
                loc: None,
            }],
            state: SetState::Invalid,
        }
    }

    pub fn curve(&self, slot: Slot) -> Option<&Curve> {
        self.curves.iter().find(|curve| curve.slot == slot)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages
            .iter()
            .filter(|msg| msg.severity == Severity::Error)
    }
}

fn parse_message(slot: Slot, err: ParseErr) -> Message {
    if err.is_empty_input() {
        Message {
            curve: Some(slot),
            severity: Severity::Info,
            text: format!("no expression for {slot}"),
            loc: None,
        }
    } else {
        Message {
            curve: Some(slot),
            severity: Severity::Error,
            text: format!("{slot}: invalid expression: {err}"),
            loc: err.position().map(|_| err.loc),
        }
    }
}

/// Keeps every curve that could be drawn and turns every failure into a
/// message, then fits the y axis to what is left.
pub fn build<I>(outcomes: I, x_range: AxisRange, y_zoom: Number) -> CurveSet
where
    I: IntoIterator<Item = (Slot, Outcome)>,
{
    let mut curves = Vec::new();
    let mut messages = Vec::new();
    let mut requested = 0_usize;
    let mut empty = 0_usize;

    for (slot, outcome) in outcomes {
        requested += 1;
        match outcome {
            Outcome::Success(curve) => {
                if curve.defined_count() == 0 {
                    messages.push(Message {
                        curve: Some(slot),
                        severity: Severity::Warning,
                        text: format!("{slot} is undefined everywhere on the domain"),
                        loc: None,
                    });
                }
                curves.push(curve);
            }
            Outcome::ParseFailure(err) => {
                if err.is_empty_input() {
                    empty += 1;
                }
                messages.push(parse_message(slot, err));
            }
            Outcome::EvaluationFailure(err) => messages.push(Message {
                curve: Some(slot),
                severity: Severity::Error,
                text: format!("{slot}: evaluation failed: {err}"),
                loc: err.loc,
            }),
        }
    }
    curves.sort_by_key(|curve| curve.slot);

    let y_range = range::normalize_axis(
        curves.iter().flat_map(|curve| curve.y.iter().copied()),
        y_zoom,
    );
    let state = if !curves.is_empty() {
        SetState::Ready
    } else if empty == requested {
        SetState::NoInput
    } else {
        SetState::Invalid
    };

    CurveSet {
        curves,
        x_range,
        y_range,
        messages,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{range::scale_domain, sample::sample, stdlib::X};

    fn domain() -> Arc<Domain> {
        Arc::new(sample(-2.0, 2.0, 5).unwrap())
    }

    fn run(exprs: &[(Slot, &str)]) -> CurveSet {
        let domain = domain();
        let outcomes = exprs
            .iter()
            .map(|&(slot, text)| (slot, evaluate_curve(slot, text, X, &domain)));
        build(outcomes, scale_domain(-2.0, 2.0, 1.0), 1.0)
    }

    #[test]
    fn labels_and_styles() {
        let set = run(&[(Slot::First, " x**2 "), (Slot::Second, "x")]);
        assert_eq!(set.state, SetState::Ready);
        assert_eq!(set.curves.len(), 2);
        let first = set.curve(Slot::First).unwrap();
        assert_eq!(first.label, "y1 = x**2");
        assert_eq!(first.style.marker, Marker::Circle);
        assert_eq!(first.y.len(), first.x.len());
        let second = set.curve(Slot::Second).unwrap();
        assert_eq!(second.label, "y2 = x");
        assert_eq!(second.style.color, "lightcoral");
        assert!(set.messages.is_empty());
    }

    #[test]
    fn partial_failure_keeps_good_curve() {
        let set = run(&[(Slot::First, "x +"), (Slot::Second, "cos(x)")]);
        assert_eq!(set.state, SetState::Ready);
        assert_eq!(set.curves.len(), 1);
        assert_eq!(set.curves[0].slot, Slot::Second);
        assert_eq!(set.messages.len(), 1);
        assert_eq!(set.messages[0].curve, Some(Slot::First));
        assert_eq!(set.messages[0].severity, Severity::Error);
        assert!(set.messages[0].text.starts_with("curve 1: invalid expression"));
    }

    #[test]
    fn no_input_differs_from_invalid_input() {
        let set = run(&[(Slot::First, "")]);
        assert_eq!(set.state, SetState::NoInput);
        assert_eq!(set.messages[0].severity, Severity::Info);
        assert_eq!(set.y_range, range::DEFAULT_RANGE);

        let set = run(&[(Slot::First, "   "), (Slot::Second, "")]);
        assert_eq!(set.state, SetState::NoInput);

        let set = run(&[(Slot::First, ""), (Slot::Second, "sin(")]);
        assert_eq!(set.state, SetState::Invalid);

        let set = run(&[(Slot::First, "2x")]);
        assert_eq!(set.state, SetState::Invalid);
        assert_eq!(set.errors().count(), 1);
        assert_eq!(set.messages[0].position(), Some(1));
        assert!(set.messages[0].text.contains("implicit multiplication"));
    }

    #[test]
    fn undefined_curve_is_kept_with_warning() {
        let set = run(&[(Slot::First, "log(-1 - x**2)")]);
        assert_eq!(set.state, SetState::Ready);
        assert_eq!(set.curves.len(), 1);
        assert_eq!(set.messages[0].severity, Severity::Warning);
        assert_eq!(set.y_range, range::DEFAULT_RANGE);
    }

    #[test]
    fn y_range_covers_all_curves() {
        let set = run(&[(Slot::First, "x"), (Slot::Second, "x + 100")]);
        assert!(set.y_range.min < -1.0);
        assert!(set.y_range.max > 100.0);
    }

    #[test]
    fn config_failure() {
        let err = sample(0.0, 1.0, 1).unwrap_err();
        let set = CurveSet::from_config_err(&err, range::DEFAULT_RANGE);
        assert_eq!(set.state, SetState::Invalid);
        assert_eq!(set.messages.len(), 1);
        assert_eq!(set.messages[0].curve, None);
    }
}
