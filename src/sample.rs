// SPDX: CC0-1.0

use crate::Number;
use core::fmt;

pub const MIN_POINTS: usize = 2;
pub const MAX_POINTS: usize = 10_000;

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigErrTyp {
    TooFewPoints { found: usize },
    TooManyPoints { found: usize },
    NonFinite { value: Number },
    RangeOverflow,
    BadZoom { value: Number },
}

/// An invalid sampling or scaling parameter, named by `param`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigErr {
    pub typ: ConfigErrTyp,
    pub param: &'static str,
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let param = self.param;
        match &self.typ {
            ConfigErrTyp::TooFewPoints { found } => {
                write!(f, "{param} must be at least {MIN_POINTS}, but is {found}")
            }
            ConfigErrTyp::TooManyPoints { found } => {
                write!(f, "{param} must be at most {MAX_POINTS}, but is {found}")
            }
            ConfigErrTyp::NonFinite { value } => {
                write!(f, "{param} must be a finite number, but is {value}")
            }
            ConfigErrTyp::RangeOverflow => write!(f, "{param} is too wide to sample"),
            ConfigErrTyp::BadZoom { value } => {
                write!(f, "{param} must be a finite number above zero, but is {value}")
            }
        }
    }
}

impl std::error::Error for ConfigErr {}

/// Ordered abscissas shared by every curve of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Domain {
    xs: Vec<Number>,
}

impl Domain {
    pub fn xs(&self) -> &[Number] {
        &self.xs
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    // never true for a sampled domain
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Number> {
        self.xs.iter()
    }
}

/// `count` evenly spaced points from `min` to `max`, both included. Reversed
/// bounds give a descending sequence.
pub fn sample(min: Number, max: Number, count: usize) -> Result<Domain, ConfigErr> {
    if count < MIN_POINTS {
        return Err(ConfigErr {
            typ: ConfigErrTyp::TooFewPoints { found: count },
            param: "number of points",
        });
    }
    if count > MAX_POINTS {
        return Err(ConfigErr {
            typ: ConfigErrTyp::TooManyPoints { found: count },
            param: "number of points",
        });
    }
    for (param, value) in [("x min", min), ("x max", max)] {
        if !value.is_finite() {
            return Err(ConfigErr {
                typ: ConfigErrTyp::NonFinite { value },
                param,
            });
        }
    }
    let span = max - min;
    if !span.is_finite() {
        return Err(ConfigErr {
            typ: ConfigErrTyp::RangeOverflow,
            param: "x range",
        });
    }

    let step = span / (count - 1) as Number;
    let mut xs: Vec<Number> = (0..count).map(|i| min + step * i as Number).collect();
    // land exactly on the requested end
    if let Some(last) = xs.last_mut() {
        *last = max;
    }
    Ok(Domain { xs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_and_endpoints() {
        for count in [2, 3, 10, 200, 1001] {
            let domain = sample(-10.0, 10.0, count).unwrap();
            assert_eq!(domain.len(), count);
            assert_eq!(domain.xs()[0], -10.0);
            assert_eq!(domain.xs()[count - 1], 10.0);
        }
    }

    #[test]
    fn monotonic_in_direction_of_bounds() {
        let bounds = [(-10.0, 10.0), (10.0, -10.0), (0.1, 0.3), (-1e6, 1e-6), (3.0, 3.0)];
        for (min, max) in bounds {
            for count in [2, 7, 199, 1000] {
                let xs = sample(min, max, count).unwrap();
                for pair in xs.xs().windows(2) {
                    if max >= min {
                        assert!(pair[0] <= pair[1], "{min}..{max} ({count}): {pair:?}");
                    } else {
                        assert!(pair[0] >= pair[1], "{min}..{max} ({count}): {pair:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn evenly_spaced() {
        let domain = sample(-4.0, 4.0, 9).unwrap();
        assert_eq!(
            domain.xs(),
            &[-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn invalid_counts() {
        for count in [0, 1] {
            assert_eq!(
                sample(0.0, 1.0, count).unwrap_err().typ,
                ConfigErrTyp::TooFewPoints { found: count }
            );
        }
        assert_eq!(
            sample(0.0, 1.0, MAX_POINTS + 1).unwrap_err().typ,
            ConfigErrTyp::TooManyPoints {
                found: MAX_POINTS + 1
            }
        );
    }

    #[test]
    fn invalid_bounds() {
        let err = sample(Number::NAN, 1.0, 10).unwrap_err();
        assert_eq!(err.param, "x min");
        let err = sample(0.0, Number::INFINITY, 10).unwrap_err();
        assert_eq!(err.param, "x max");
        assert_eq!(
            sample(-Number::MAX, Number::MAX, 10).unwrap_err().typ,
            ConfigErrTyp::RangeOverflow
        );
    }

    #[test]
    fn messages() {
        let err = sample(0.0, 1.0, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "number of points must be at least 2, but is 1"
        );
    }
}
