// SPDX: CC0-1.0

use curve_plotter::{
    curve::{SetState, Severity, Slot},
    eval::evaluate,
    is_undefined,
    parse::{parse, ParseErrTyp},
    pipeline::{run, Request},
    range::{normalize_axis, DEFAULT_RANGE},
    sample::sample,
    stdlib::X,
    UNDEFINED,
};

fn request(expr_1: &str, expr_2: &str, show_second: bool) -> Request {
    Request {
        expr_1: expr_1.to_string(),
        expr_2: expr_2.to_string(),
        show_second,
        ..Request::default()
    }
}

#[test]
fn sine_and_cosine() {
    let req = Request {
        x_min: -10.0,
        x_max: 10.0,
        num_points: 200,
        ..request("sin(x)", "cos(x)", true)
    };
    let set = run(&req);
    assert_eq!(set.state, SetState::Ready);
    assert_eq!(set.curves.len(), 2);
    assert!(set.messages.is_empty());

    let first = &set.curves[0];
    assert_eq!(first.slot, Slot::First);
    assert_eq!(first.x.len(), 200);
    assert_eq!(first.y.len(), 200);
    for y in first.y.iter().filter(|y| y.is_finite()) {
        assert!((-1.0..=1.0).contains(y), "{y}");
    }
    assert!(set.y_range.min >= -1.0 && set.y_range.max <= 1.0);
    assert_eq!(set.x_range.min, -10.0);
    assert_eq!(set.x_range.max, 10.0);
}

#[test]
fn invalid_second_curve_does_not_hide_the_first() {
    let set = run(&request("x**2", "undefined_name(x)", true));
    assert_eq!(set.state, SetState::Ready);
    assert_eq!(set.curves.len(), 1);
    assert_eq!(set.curves[0].slot, Slot::First);
    assert_eq!(set.messages.len(), 1);
    assert_eq!(set.messages[0].curve, Some(Slot::Second));
    assert_eq!(set.messages[0].severity, Severity::Error);
    assert!(set.messages[0].text.contains("curve 2"));
    assert!(set.messages[0].text.contains("undefined_name"));
}

#[test]
fn empty_input_prompts_instead_of_failing() {
    let failure = parse("", X).unwrap_err();
    assert_eq!(failure.typ, ParseErrTyp::Empty);

    let set = run(&request("", "", false));
    assert_eq!(set.state, SetState::NoInput);
    assert!(set.curves.is_empty());
    assert_eq!(set.messages.len(), 1);
    assert_eq!(set.messages[0].severity, Severity::Info);

    let set = run(&request("sin(", "", false));
    assert_eq!(set.state, SetState::Invalid);
    assert_eq!(set.messages[0].severity, Severity::Error);
}

#[test]
fn unsafe_input_never_parses() {
    for src in [
        "import os",
        "__import__('os').system('ls')",
        "os.system('ls')",
        "np.sin(x)",
        "x.real",
        "x.__class__",
        "x = 1",
        "open('/etc/passwd')",
        "lambda: 0",
        "globals()",
        "x if x else 0",
        "[1, 2]",
        "{}",
        "x; y",
        "`x`",
    ] {
        assert!(parse(src, X).is_err(), "'{src}' parsed");
    }
}

#[test]
fn lengths_match_the_domain() {
    let domain = sample(-3.0, 3.0, 61).unwrap();
    for src in ["x", "1", "pi", "1/x", "sqrt(x)", "log(x)", "tan(x)", "x**x", "exp(x**2)"] {
        let expr = parse(src, X).unwrap();
        let ys = evaluate(&expr, &domain).unwrap();
        assert_eq!(ys.len(), domain.len(), "{src}");
        assert!(ys.iter().all(|y| y.is_finite() || is_undefined(*y)), "{src}");
    }
}

#[test]
fn reciprocal_gap_at_zero() {
    let domain = sample(-1.0, 1.0, 11).unwrap();
    let ys = evaluate(&parse("1/x", X).unwrap(), &domain).unwrap();
    let zero = domain.iter().position(|x| *x == 0.0).unwrap();
    for (i, y) in ys.iter().enumerate() {
        assert_eq!(is_undefined(*y), i == zero, "index {i}");
    }
}

#[test]
fn square_root_of_negatives() {
    let domain = sample(-4.0, 4.0, 9).unwrap();
    let ys = evaluate(&parse("sqrt(x)", X).unwrap(), &domain).unwrap();
    for (x, y) in domain.iter().zip(ys) {
        if *x < 0.0 {
            assert!(is_undefined(y), "sqrt({x}) = {y}");
        } else {
            assert!(y >= 0.0, "sqrt({x}) = {y}");
        }
    }
}

#[test]
fn default_range_for_nothing() {
    let range = normalize_axis(vec![UNDEFINED; 10], 1.0);
    assert_eq!(range, DEFAULT_RANGE);
    assert!(range.min < range.max);
}

#[test]
fn nearly_constant_curve_has_a_visible_range() {
    let req = Request {
        y_zoom: 0.1,
        ..request("1000 + x*1e-14", "", false)
    };
    let set = run(&req);
    assert_eq!(set.state, SetState::Ready);
    assert!(set.y_range.min < set.y_range.max, "{}", set.y_range);
    assert!(set.y_range.contains(1000.0), "{}", set.y_range);
}

#[test]
fn long_polynomial_is_accepted() {
    let src = (0..200).map(|k| format!("{k}*x**2")).collect::<Vec<_>>().join(" + ");
    let set = run(&request(&src, "", false));
    assert_eq!(set.state, SetState::Ready);
    assert!(set.messages.is_empty());
}

#[test]
fn bad_settings_are_reported_not_raised() {
    let req = Request {
        num_points: 1,
        ..Request::default()
    };
    let set = run(&req);
    assert_eq!(set.state, SetState::Invalid);
    assert_eq!(set.messages.len(), 1);
    assert_eq!(set.messages[0].curve, None);
    assert!(set.messages[0].text.contains("number of points"));
}

#[test]
fn reversed_domain_still_plots() {
    let req = Request {
        x_min: 5.0,
        x_max: -5.0,
        ..request("x", "", false)
    };
    let set = run(&req);
    assert_eq!(set.state, SetState::Ready);
    let xs = set.curves[0].x.xs();
    assert_eq!(xs[0], 5.0);
    assert_eq!(xs[xs.len() - 1], -5.0);
    assert!(set.x_range.min < set.x_range.max);
}
