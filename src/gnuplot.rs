// SPDX: CC0-1.0

use crate::{
    curve::{CurveSet, Marker},
    is_undefined,
    stdlib::X,
};
use std::io::{self, Write};

pub const OUTPUT_RES: [u32; 2] = [1920, 1080];
pub const TITLE: &str = "Curve Plotter";

/// Files a gnuplot script refers to.
#[derive(Clone, Debug)]
pub struct Paths<'a> {
    pub data: &'a str,
    pub svg: &'a str,
}

/// Filled and outlined gnuplot point types for a marker.
const fn point_types(marker: Marker) -> (u8, u8) {
    match marker {
        Marker::Circle => (7, 6),
        Marker::Square => (5, 4),
    }
}

/// One block per curve, separated by two blank lines so that gnuplot can
/// address each with `index`. Undefined samples are written as `NaN`, which
/// interrupts the line.
pub fn write_data<W: Write>(mut out: W, set: &CurveSet) -> io::Result<()> {
    for (i, curve) in set.curves.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
            writeln!(out)?;
        }
        writeln!(out, "# {}", curve.label)?;
        for (x, y) in curve.points() {
            if is_undefined(y) {
                writeln!(out, "{x} NaN")?;
            } else {
                writeln!(out, "{x} {y}")?;
            }
        }
    }
    Ok(())
}

pub fn write_script<W: Write>(mut out: W, set: &CurveSet, paths: &Paths<'_>) -> io::Result<()> {
    writeln!(out, "reset")?;
    writeln!(out, "set term push")?;
    // set output info
    let [width, height] = OUTPUT_RES;
    writeln!(out, "set terminal svg size {width},{height} enhanced")?;
    writeln!(out, "set output '{}'", paths.svg)?;

    // set window
    writeln!(
        out,
        "set xrange[{min}:{max}]",
        min = set.x_range.min,
        max = set.x_range.max
    )?;
    writeln!(
        out,
        "set yrange[{min}:{max}]",
        min = set.y_range.min,
        max = set.y_range.max
    )?;

    // configure appearence
    writeln!(out, r#"set title "{TITLE}""#)?;
    writeln!(out, r#"set xlabel "{X}""#)?;
    writeln!(out, r#"set ylabel "y""#)?;
    writeln!(out, "set grid lt 0")?;
    writeln!(out, "set xzeroaxis lt -1 lc rgb 'gray'")?;
    writeln!(out, "set yzeroaxis lt -1 lc rgb 'gray'")?;
    writeln!(out, "set tics out nomirror")?;
    writeln!(out, "set key inside top right box")?;

    if set.curves.is_empty() {
        // keeps the axes so an empty plot still shows the window
        writeln!(out, "plot NaN notitle")?;
    } else {
        write!(out, "plot")?;
        for (i, curve) in set.curves.iter().enumerate() {
            let style = curve.style;
            let (filled, outline) = point_types(style.marker);
            let ps = style.marker_size / 8.0;
            let source = format!("'{data}' index {i} using 1:2", data = paths.data);
            if i > 0 {
                writeln!(out, ", \\")?;
            }
            // line, then marker fill, then marker edge on top
            writeln!(
                out,
                r#" {source} with lines lw {lw} lc rgb '{color}' title "{label}" noenhanced, \"#,
                lw = style.line_width,
                color = style.color,
                label = curve.label,
            )?;
            writeln!(
                out,
                r#" {source} with points pt {filled} ps {ps} lc rgb '{fill}' notitle, \"#,
                fill = style.fill_color,
            )?;
            write!(
                out,
                r#" {source} with points pt {outline} ps {ps} lc rgb '{edge}' notitle"#,
                edge = style.edge_color,
            )?;
        }
        writeln!(out)?;
    }

    // display window
    writeln!(out, "set term pop")?;
    writeln!(out, "replot")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{run, Request};

    fn request(expr_1: &str, expr_2: &str) -> Request {
        Request {
            x_min: -1.0,
            x_max: 1.0,
            num_points: 3,
            expr_1: expr_1.to_string(),
            expr_2: expr_2.to_string(),
            ..Request::default()
        }
    }

    #[test]
    fn data_blocks_mark_gaps() {
        let set = run(&request("1/x", "x"));
        let mut buf = Vec::new();
        write_data(&mut buf, &set).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "# y1 = 1/x\n-1 -1\n0 NaN\n1 1\n\n\n# y2 = x\n-1 -1\n0 0\n1 1\n"
        );
    }

    #[test]
    fn script_plots_every_curve() {
        let set = run(&request("x**2", "x"));
        let mut buf = Vec::new();
        let paths = Paths {
            data: "out.data",
            svg: "out.svg",
        };
        write_script(&mut buf, &set, &paths).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("set output 'out.svg'"));
        assert!(text.contains("'out.data' index 0 using 1:2"));
        assert!(text.contains("'out.data' index 1 using 1:2"));
        assert!(text.contains(
            r#"'out.data' index 0 using 1:2 with lines lw 2.5 lc rgb 'skyblue' title "y1 = x**2" noenhanced"#
        ));
        assert!(text.contains("index 0 using 1:2 with points pt 7 ps 0.5 lc rgb 'lightblue' notitle"));
        assert!(text.contains("index 0 using 1:2 with points pt 6 ps 0.5 lc rgb 'blue' notitle"));
        assert!(text.contains("index 1 using 1:2 with lines lw 2.5 lc rgb 'lightcoral'"));
        assert!(text.contains("index 1 using 1:2 with points pt 5 ps 0.5 lc rgb 'pink' notitle"));
        assert!(text.contains("index 1 using 1:2 with points pt 4 ps 0.5 lc rgb 'red' notitle"));
        // every clause but the last continues onto the next line
        let plot = &text[text.find("plot '").unwrap()..text.find("set term pop").unwrap()];
        assert_eq!(plot.matches(", \\\n").count(), 5);
        assert!(text.contains("set xrange[-1:1]"));
    }

    #[test]
    fn empty_set_still_has_a_plot_command() {
        let set = run(&request("", ""));
        let mut buf = Vec::new();
        let paths = Paths {
            data: "d",
            svg: "s",
        };
        write_script(&mut buf, &set, &paths).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("plot NaN notitle"));
    }
}
