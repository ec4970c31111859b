//! Inspect, generate and combine serialized scanline streams.
//!
//! Usage:
//!   sl-inspect dump <file> [--cover 8|16|32] [--bin] [--dx N] [--dy N]
//!   sl-inspect combine <op> <a> <b> -o <out> [--cover 8|16|32] [--bin]
//!   sl-inspect disc <cx> <cy> <r> -o <out> [--cover 8|16|32] [--bin]
//!   sl-inspect ops

use agg_scanline::scanline::{CoverValue, Scanline, ScanlineGenerator, ScanlineRead, Span};
use agg_scanline::scanline_boolean_algebra::{
    sbool_combine_storages_aa, sbool_combine_storages_bin, SBoolOp,
};
use agg_scanline::scanline_p::Scanline32P8;
use agg_scanline::scanline_serialization::{
    DecodeError, SerializedScanlinesAdaptorAa, SerializedScanlinesAdaptorBin,
};
use agg_scanline::scanline_storage_aa::ScanlineStorageAa;
use agg_scanline::scanline_storage_bin::ScanlineStorageBin;
use anyhow::{bail, Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;
use std::env;
use std::fs;
use strum::IntoEnumIterator;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "error".red().bold().to_string(),
            Level::Warn => "warn".yellow().bold().to_string(),
            Level::Info => "info".green().to_string(),
            Level::Debug => "debug".blue().to_string(),
            Level::Trace => "trace".dimmed().to_string(),
        };
        eprintln!("{tag}: {}", record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoverWidth {
    U8,
    U16,
    U32,
}

#[derive(Debug)]
struct Options {
    cover: CoverWidth,
    bin: bool,
    dx: i32,
    dy: i32,
    output: Option<String>,
    verbose: u8,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut opts = Options {
        cover: CoverWidth::U8,
        bin: false,
        dx: 0,
        dy: 0,
        output: None,
        verbose: 0,
        positional: Vec::new(),
    };
    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .with_context(|| format!("{} requires a value", args[i]))
        };
        match args[i].as_str() {
            "--cover" => {
                opts.cover = match value(i)?.as_str() {
                    "8" => CoverWidth::U8,
                    "16" => CoverWidth::U16,
                    "32" => CoverWidth::U32,
                    other => bail!("unsupported cover width: {other}"),
                };
                i += 2;
            }
            "--dx" => {
                opts.dx = value(i)?.parse().context("invalid --dx")?;
                i += 2;
            }
            "--dy" => {
                opts.dy = value(i)?.parse().context("invalid --dy")?;
                i += 2;
            }
            "-o" => {
                opts.output = Some(value(i)?.clone());
                i += 2;
            }
            "--bin" => {
                opts.bin = true;
                i += 1;
            }
            "-v" => {
                opts.verbose += 1;
                i += 1;
            }
            "-vv" => {
                opts.verbose += 2;
                i += 1;
            }
            _ => {
                opts.positional.push(args[i].clone());
                i += 1;
            }
        }
    }
    Ok(opts)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let opts = parse_options(&args[2..])?;
    log::set_logger(&LOGGER).map_err(|e| anyhow::anyhow!("{e}"))?;
    log::set_max_level(match opts.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });

    match args[1].as_str() {
        "dump" => cmd_dump(&opts),
        "combine" => cmd_combine(&opts),
        "disc" => cmd_disc(&opts),
        "ops" => {
            cmd_ops();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("sl-inspect: inspect and combine serialized scanline streams");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  dump <file> [--cover 8|16|32] [--bin] [--dx N] [--dy N]");
    eprintln!("      Print the bounds and every non-empty row of a stream.");
    eprintln!();
    eprintln!("  combine <op> <a> <b> -o <out> [--cover 8|16|32] [--bin]");
    eprintln!("      Combine two streams with a boolean operation.");
    eprintln!();
    eprintln!("  disc <cx> <cy> <r> -o <out> [--cover 8|16|32] [--bin]");
    eprintln!("      Write an anti-aliased disc, handy as combine input.");
    eprintln!();
    eprintln!("  ops");
    eprintln!("      List boolean operation names.");
    eprintln!();
    eprintln!("  -v / -vv raise the log level to debug / trace.");
}

fn cmd_ops() {
    println!("Boolean operations:");
    for op in SBoolOp::iter() {
        println!("  {op}");
    }
}

fn positional<'a>(opts: &'a Options, n: usize, usage: &str) -> Result<&'a [String]> {
    if opts.positional.len() != n {
        bail!("usage: sl-inspect {usage}");
    }
    Ok(&opts.positional)
}

fn parse_op(name: &str) -> Result<SBoolOp> {
    name.parse()
        .with_context(|| format!("unknown operation `{name}` (see `sl-inspect ops`)"))
}

fn read_stream(path: &str) -> Result<Vec<u8>> {
    let data = fs::read(path).with_context(|| format!("reading {path}"))?;
    log::debug!("{path}: {} bytes", data.len());
    Ok(data)
}

fn write_stream(path: &str, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("writing {path}"))?;
    log::info!("wrote {} bytes to {path}", data.len());
    Ok(())
}

fn check_decode(path: &str, err: Option<&DecodeError>) -> Result<()> {
    match err {
        Some(e) => bail!("{path}: {e}"),
        None => Ok(()),
    }
}

// ----------------------------------------------------------------------------
// dump
// ----------------------------------------------------------------------------

fn print_row<SL: ScanlineRead<Cover = u8>>(sl: &SL) {
    print!("{:>6}:", sl.y().bold());
    for span in sl.spans() {
        match span {
            Span::Solid { x, len, cover } => print!(" {x}+{len}x{cover}"),
            Span::Cells { x, covers } => print!(" {x}{covers:?}"),
        }
    }
    println!();
}

/// Prints every row of `g`; returns the number of rows.
fn dump_rows<G: ScanlineGenerator>(g: &mut G) -> usize {
    if !g.rewind_scanlines() {
        println!("(empty)");
        return 0;
    }
    let r = g.bounding_rect();
    println!(
        "{} x: {}..={}  y: {}..={}",
        "bounds".cyan(),
        r.x1,
        r.x2,
        r.y1,
        r.y2
    );
    let mut sl = Scanline32P8::new();
    sl.reset(g.min_x(), g.max_x());
    let mut rows = 0;
    while g.sweep_scanline(&mut sl) {
        print_row(&sl);
        rows += 1;
    }
    rows
}

fn dump_aa<T: CoverValue>(path: &str, data: &[u8], opts: &Options) -> Result<usize> {
    let mut ad = SerializedScanlinesAdaptorAa::<T>::new(data, data.len(), opts.dx, opts.dy);
    let rows = dump_rows(&mut ad);
    check_decode(path, ad.error())?;
    Ok(rows)
}

fn cmd_dump(opts: &Options) -> Result<()> {
    let args = positional(opts, 1, "dump <file>")?;
    let path = args[0].as_str();
    let data = read_stream(path)?;
    let rows = if opts.bin {
        let mut ad = SerializedScanlinesAdaptorBin::new(&data, data.len(), opts.dx, opts.dy);
        let rows = dump_rows(&mut ad);
        check_decode(path, ad.error())?;
        rows
    } else {
        match opts.cover {
            CoverWidth::U8 => dump_aa::<u8>(path, &data, opts)?,
            CoverWidth::U16 => dump_aa::<u16>(path, &data, opts)?,
            CoverWidth::U32 => dump_aa::<u32>(path, &data, opts)?,
        }
    };
    println!("{rows} rows");
    Ok(())
}

// ----------------------------------------------------------------------------
// combine
// ----------------------------------------------------------------------------

fn combine_aa<T: CoverValue>(op: SBoolOp, a: &[u8], b: &[u8], names: (&str, &str)) -> Result<Vec<u8>> {
    let mut ga = SerializedScanlinesAdaptorAa::<T>::from_bytes(a);
    let mut gb = SerializedScanlinesAdaptorAa::<T>::from_bytes(b);
    let mut out = ScanlineStorageAa::<T>::new();
    sbool_combine_storages_aa(op, &mut ga, &mut gb, &mut out);
    check_decode(names.0, ga.error())?;
    check_decode(names.1, gb.error())?;
    log::debug!("{op}: {} rows", out.num_scanlines());
    Ok(out.serialize_to_vec())
}

fn cmd_combine(opts: &Options) -> Result<()> {
    let args = positional(opts, 3, "combine <op> <a> <b> -o <out>")?;
    let op = parse_op(&args[0])?;
    let out_path = opts.output.as_deref().context("combine requires -o <out>")?;
    let names = (args[1].as_str(), args[2].as_str());
    let a = read_stream(names.0)?;
    let b = read_stream(names.1)?;

    let data = if opts.bin {
        let mut ga = SerializedScanlinesAdaptorBin::from_bytes(&a);
        let mut gb = SerializedScanlinesAdaptorBin::from_bytes(&b);
        let mut out = ScanlineStorageBin::new();
        sbool_combine_storages_bin(op, &mut ga, &mut gb, &mut out);
        check_decode(names.0, ga.error())?;
        check_decode(names.1, gb.error())?;
        out.serialize_to_vec()
    } else {
        match opts.cover {
            CoverWidth::U8 => combine_aa::<u8>(op, &a, &b, names)?,
            CoverWidth::U16 => combine_aa::<u16>(op, &a, &b, names)?,
            CoverWidth::U32 => combine_aa::<u32>(op, &a, &b, names)?,
        }
    };
    write_stream(out_path, &data)
}

// ----------------------------------------------------------------------------
// disc
// ----------------------------------------------------------------------------

/// Largest radius `disc` accepts; every row is a full-width container.
const MAX_DISC_RADIUS: i32 = 1 << 20;

/// Solid half-width and antialiased rim cover of disc row `y`.
fn disc_row(r: i32, y: i32) -> (i32, u32) {
    let rr = i64::from(r) * i64::from(r) - i64::from(y) * i64::from(y);
    let exact = (rr.max(0) as f64).sqrt();
    let half = exact as i32;
    let rim = ((exact - f64::from(half)) * 255.0).round() as u32;
    (half, rim)
}

/// Sweeps a disc into `sl` row by row, handing each finalized row to `emit`.
fn sweep_disc(cx: i32, cy: i32, r: i32, mut emit: impl FnMut(&Scanline32P8)) {
    let mut sl = Scanline32P8::new();
    sl.reset(cx - r - 1, cx + r + 1);
    for y in -r..=r {
        let (half, rim) = disc_row(r, y);
        sl.reset_spans();
        if rim > 0 {
            sl.add_cell(cx - half - 1, rim);
        }
        sl.add_span(cx - half, 2 * half.unsigned_abs() + 1, 255);
        if rim > 0 {
            sl.add_cell(cx + half + 1, rim);
        }
        sl.finalize(cy + y);
        emit(&sl);
    }
}

/// Rejects radii whose rows or columns would leave the `i32` range.
fn check_disc(cx: i32, cy: i32, r: i32) -> Result<()> {
    if r < 0 {
        bail!("radius must not be negative");
    }
    if r > MAX_DISC_RADIUS {
        bail!("radius {r} exceeds {MAX_DISC_RADIUS}");
    }
    let fits = cx.checked_sub(r + 1).is_some()
        && cx.checked_add(r + 1).is_some()
        && cy.checked_sub(r).is_some()
        && cy.checked_add(r).is_some();
    if !fits {
        bail!("disc at ({cx}, {cy}) with radius {r} leaves the coordinate range");
    }
    Ok(())
}

fn cmd_disc(opts: &Options) -> Result<()> {
    let args = positional(opts, 3, "disc <cx> <cy> <r> -o <out>")?;
    let cx: i32 = args[0].parse().context("invalid cx")?;
    let cy: i32 = args[1].parse().context("invalid cy")?;
    let r: i32 = args[2].parse().context("invalid r")?;
    check_disc(cx, cy, r)?;
    let out_path = opts.output.as_deref().context("disc requires -o <out>")?;

    let data = if opts.bin {
        let mut st = ScanlineStorageBin::new();
        sweep_disc(cx, cy, r, |sl| st.render(sl));
        st.serialize_to_vec()
    } else {
        match opts.cover {
            CoverWidth::U8 => disc_aa::<u8>(cx, cy, r),
            CoverWidth::U16 => disc_aa::<u16>(cx, cy, r),
            CoverWidth::U32 => disc_aa::<u32>(cx, cy, r),
        }
    };
    write_stream(out_path, &data)
}

fn disc_aa<T: CoverValue>(cx: i32, cy: i32, r: i32) -> Vec<u8> {
    let mut st = ScanlineStorageAa::<T>::new();
    sweep_disc(cx, cy, r, |sl| st.render(sl));
    st.serialize_to_vec()
}
