// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use curve_plotter::{
    curve::{SetState, Slot},
    gnuplot::{self, Paths},
    parse,
    pipeline::{self, Request},
    sample::sample,
    shell::{self, Command},
    stdlib::X,
    Number,
};
use env_logger::Env;
#[cfg(not(debug_assertions))]
use std::process::Stdio;
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    process::{self, Child, ExitCode},
};

fn output_filename(now: DateTime<Local>, ext: &str) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        ext
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    req: Request,
    gnuplot: Option<Child>,
}

fn try_main() -> anyhow::Result<()> {
    let mut state = State {
        req: Request::default(),
        gnuplot: None,
    };

    let mut stdout = BufWriter::new(stdout());
    loop {
        for (slot, expr) in state.req.exprs() {
            writeln!(stdout, "y{} = {expr}", slot.number())?;
        }
        if !state.req.show_second {
            writeln!(stdout, "(second curve hidden)")?;
        }

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => set_expr(&mut stdout, &mut state, Slot::First)?,

                Command::SetSecond => set_expr(&mut stdout, &mut state, Slot::Second)?,

                Command::ToggleSecond => {
                    state.req.show_second = !state.req.show_second;
                    let shown = if state.req.show_second { "shown" } else { "hidden" };
                    writeln!(stdout, "second curve is {shown}")?;
                }

                Command::Plot => plot(&mut stdout, &mut state)?,

                Command::SetWin => set_win(&mut stdout, &mut state)?,

                Command::PrintTree => print_trees(&mut stdout, &state)?,
            }
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn set_win<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "win = {:#}", state.req)?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to skip")?;

    for (name, dst) in [
        ("x min", &mut state.req.x_min),
        ("x max", &mut state.req.x_max),
        ("x zoom", &mut state.req.x_zoom),
        ("y zoom", &mut state.req.y_zoom),
    ] {
        match shell::read_fromstr::<_, Number>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    writeln!(out, "note: the number of points must be an integer")?;
    match shell::read_fromstr::<_, usize>(
        &mut out,
        format_args!("?points (is {cur}) = ", cur = state.req.num_points),
        true,
    )? {
        Ok(Some(new)) => state.req.num_points = new,
        Ok(None) => {}
        Err(_) => return Ok(()),
    }

    // report bad values now instead of at the next plot
    if let Err(err) = state
        .req
        .validate()
        .and_then(|()| sample(state.req.x_min, state.req.x_max, state.req.num_points).map(drop))
    {
        writeln!(out, "warning: {err}")?;
    }
    Ok(())
}

fn set_expr<W: Write>(mut out: W, state: &mut State, slot: Slot) -> anyhow::Result<()> {
    let input = shell::input(&mut out, format_args!("y{} = ", slot.number()))?;
    match slot {
        Slot::First => state.req.expr_1 = input,
        Slot::Second => {
            state.req.expr_2 = input;
            state.req.show_second = true;
        }
    }

    // check it right away so mistakes show up next to the input
    let text = match slot {
        Slot::First => &state.req.expr_1,
        Slot::Second => &state.req.expr_2,
    };
    if let Err(err) = parse::parse(text, X) {
        if err.position().is_some() {
            writeln!(out)?;
            shell::underline(&mut out, &err.loc)?;
        }
        writeln!(out, "parse error: {err}")?;
    }
    Ok(())
}

fn print_trees<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    for (slot, text) in state.req.exprs() {
        match parse::parse(text, X) {
            Ok(expr) => {
                shell::dump_tree(&mut out, &expr, format_args!("y{}", slot.number()))?
            }
            Err(err) => writeln!(out, "y{}: parse error: {err}", slot.number())?,
        }
    }
    Ok(())
}

fn plot<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let set = pipeline::run(&state.req);
    shell::report(&mut out, &set)?;

    match set.state {
        SetState::Ready => {}
        SetState::NoInput => {
            writeln!(
                out,
                "note: enter an expression with 'set' and set the window with 'window' to see a curve"
            )?;
            return Ok(());
        }
        SetState::Invalid => {
            writeln!(out, "nothing to plot")?;
            return Ok(());
        }
    }

    // set up gnuplot
    if let Some(mut old_child) = state.gnuplot.take() {
        old_child
            .kill()
            .context("failed to kill previous gnuplot child")?;
    }
    let now = Local::now();
    let data_path = output_filename(now, "data");
    let gnuplot_path = output_filename(now, "gnuplot");
    let svg_path = output_filename(now, "svg");
    let mut data = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .context("failed to open output data file")?,
    );
    let mut script = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&gnuplot_path)
            .context("failed to open output gnuplot file")?,
    );

    gnuplot::write_data(&mut data, &set).context("failed to write to output data file")?;
    data.flush()?;
    data.get_mut().sync_data()?;
    drop(data);

    let paths = Paths {
        data: &data_path,
        svg: &svg_path,
    };
    gnuplot::write_script(&mut script, &set, &paths)
        .context("failed to write to output gnuplot file")?;
    script.flush()?;
    script.get_mut().sync_data()?;
    drop(script);

    writeln!(
        out,
        "plotted {n} curve{s}, x in {x}, y in {y}",
        n = set.curves.len(),
        s = if set.curves.len() == 1 { "" } else { "s" },
        x = set.x_range,
        y = set.y_range,
    )?;

    // spawn gnuplot and provide the path to the file
    let mut cmd = process::Command::new("gnuplot");
    cmd.arg("--persist").arg(&gnuplot_path);
    #[cfg(not(debug_assertions))]
    {
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
    }
    let child = cmd
        .spawn()
        .context("failed to spawn gnuplot (is it installed and in ${{PATH}}?)")?;
    log::info!("gnuplot started for {gnuplot_path}");

    state.gnuplot = Some(child);
    Ok(())
}
