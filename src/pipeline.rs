// SPDX: CC0-1.0

use crate::{
    curve::{self, CurveSet, Severity, Slot},
    range,
    sample::{self, ConfigErr, ConfigErrTyp},
    stdlib::X,
    Number,
};
use core::fmt;
use std::sync::Arc;

/// Everything one plot depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub x_min: Number,
    pub x_max: Number,
    pub num_points: usize,
    pub expr_1: String,
    pub expr_2: String,
    pub show_second: bool,
    pub x_zoom: Number,
    pub y_zoom: Number,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            num_points: 200,
            expr_1: String::from("sin(x)"),
            expr_2: String::from("cos(x)"),
            show_second: true,
            x_zoom: 1.0,
            y_zoom: 1.0,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("x min", &self.x_min)
            .field("x max", &self.x_max)
            .field("points", &self.num_points)
            .field("x zoom", &self.x_zoom)
            .field("y zoom", &self.y_zoom)
            .field("second curve", &self.show_second)
            .finish()
    }
}

impl Request {
    /// Expressions that take part in a run, in slot order.
    pub fn exprs(&self) -> impl Iterator<Item = (Slot, &str)> + '_ {
        [
            Some((Slot::First, self.expr_1.as_str())),
            self.show_second.then_some((Slot::Second, self.expr_2.as_str())),
        ]
        .into_iter()
        .flatten()
    }

    /// Checks the parameters that the sampler does not see.
    pub fn validate(&self) -> Result<(), ConfigErr> {
        for (param, value) in [("x zoom", self.x_zoom), ("y zoom", self.y_zoom)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigErr {
                    typ: ConfigErrTyp::BadZoom { value },
                    param,
                });
            }
        }
        Ok(())
    }
}

/// Runs the whole pipeline once. Failures end up as messages in the result.
pub fn run(req: &Request) -> CurveSet {
    log::debug!("running {req}");
    let x_range = range::scale_domain(req.x_min, req.x_max, req.x_zoom);

    let domain = match req
        .validate()
        .and_then(|()| sample::sample(req.x_min, req.x_max, req.num_points))
    {
        Ok(domain) => Arc::new(domain),
        Err(err) => {
            log::warn!("rejected request: {err}");
            return CurveSet::from_config_err(&err, x_range);
        }
    };
    log::debug!("sampled {} points", domain.len());

    let outcomes: Vec<_> = req
        .exprs()
        .map(|(slot, text)| (slot, curve::evaluate_curve(slot, text, X, &domain)))
        .collect();
    let set = curve::build(outcomes, x_range, req.y_zoom);

    for msg in set.messages.iter() {
        if msg.severity == Severity::Error {
            log::warn!("{msg}");
        } else {
            log::debug!("{msg}");
        }
    }
    log::debug!(
        "{} curve(s), x {}, y {}, state {:?}",
        set.curves.len(),
        set.x_range,
        set.y_range,
        set.state
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::SetState;

    #[test]
    fn defaults_plot_two_curves() {
        let set = run(&Request::default());
        assert_eq!(set.state, SetState::Ready);
        assert_eq!(set.curves.len(), 2);
        assert_eq!(set.curves[0].y.len(), 200);
    }

    #[test]
    fn second_curve_is_gated() {
        let req = Request {
            expr_2: String::from("undefined_name(x)"),
            show_second: false,
            ..Request::default()
        };
        assert_eq!(req.exprs().count(), 1);
        let set = run(&req);
        assert_eq!(set.curves.len(), 1);
        assert!(set.messages.is_empty());
    }

    #[test]
    fn bad_zoom_is_a_config_failure() {
        for zoom in [0.0, -1.0, Number::NAN, Number::INFINITY] {
            let req = Request {
                y_zoom: zoom,
                ..Request::default()
            };
            let err = req.validate().unwrap_err();
            assert_eq!(err.param, "y zoom");
            let set = run(&req);
            assert_eq!(set.state, SetState::Invalid);
            assert!(set.curves.is_empty());
        }
    }

    #[test]
    fn x_range_follows_zoom() {
        let req = Request {
            x_zoom: 0.5,
            ..Request::default()
        };
        let set = run(&req);
        assert_eq!(set.x_range.min, -5.0);
        assert_eq!(set.x_range.max, 5.0);
    }
}
