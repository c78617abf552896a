use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use slanted::canvas::PixmapCanvas;
use slanted::clock::ClockFields;
use slanted::color::Color;
use slanted::complications::{ComplicationData, ComplicationHolder, SlotId, MAX_NUMBER_OF_SLOTS};
use slanted::error_codes::{envelope_for, find_coded_error, CodedError, CodedErrorKind};
use slanted::face::SlantedFace;
use slanted::font_assets::{FontLibrary, DEFAULT_DATE_FONT_FILE};
use slanted::geometry::Rect;
use slanted::measure::{EstimateMeasurer, FontdueMeasurer, TextMeasurer};
use slanted::settings::{load_settings, resolve_settings, Settings};
use slanted::typefaces::FontConfig;
use slanted::veneer::Veneer;

const DEFAULT_SIZE: &str = "454x454";

#[derive(Debug, Parser)]
#[command(name = "slanted")]
#[command(about = "Slanted watch face: render frames, inspect layout, resolve taps")]
#[command(version = env!("SLANTED_LONG_VERSION"))]
struct Cli {
    /// Print results and errors as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render one frame to a PNG.
    Render {
        #[command(flatten)]
        face: FaceArgs,
        /// Directory with the typeface files and the date font.
        #[arg(long)]
        fonts: PathBuf,
        #[arg(long, default_value = DEFAULT_DATE_FONT_FILE)]
        date_font: String,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Print the unrotated field and complication rectangles of one frame.
    Layout {
        #[command(flatten)]
        face: FaceArgs,
        /// Measure with real fonts instead of the built-in estimate.
        #[arg(long)]
        fonts: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_DATE_FONT_FILE)]
        date_font: String,
    },
    /// Resolve a tap at surface coordinates X Y.
    Hit {
        x: f32,
        y: f32,
        #[command(flatten)]
        face: FaceArgs,
        #[arg(long)]
        fonts: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_DATE_FONT_FILE)]
        date_font: String,
    },
    /// List the typeface presets.
    Typefaces,
    /// Validate a settings file.
    Check { settings: PathBuf },
}

#[derive(Debug, Args)]
struct FaceArgs {
    /// Settings YAML; defaults to the user config file when present.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// RFC 3339 timestamp, or HH:MM:SS on today's date. Defaults to now.
    #[arg(long)]
    time: Option<String>,
    #[arg(long, default_value = DEFAULT_SIZE)]
    size: String,
    #[arg(long)]
    ambient: bool,
    /// Comma-separated slot positions (1-3) to fill with sample data.
    #[arg(long, value_delimiter = ',')]
    slots: Vec<usize>,
    #[arg(long, value_name = "BOOL")]
    left_handed: Option<bool>,
    #[arg(long)]
    twelve_hour: bool,
    #[arg(long)]
    larger_date: bool,
    #[arg(long)]
    typeface: Option<String>,
    /// Base color (#RRGGBB) to recolor the face around.
    #[arg(long)]
    color_scheme: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if json_output {
                match serde_json::to_string_pretty(&envelope_for(&error)) {
                    Ok(body) => println!("{body}"),
                    Err(_) => eprintln!("error: {error:#}"),
                }
            } else {
                eprintln!("error: {error:#}");
            }
            match find_coded_error(&error).map(|coded| coded.kind) {
                Some(CodedErrorKind::Usage) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            face,
            fonts,
            date_font,
            output,
        } => run_render(&face, &fonts, &date_font, &output, cli.json),
        Commands::Layout {
            face,
            fonts,
            date_font,
        } => run_layout(&face, fonts.as_deref(), &date_font, cli.json),
        Commands::Hit {
            x,
            y,
            face,
            fonts,
            date_font,
        } => run_hit(x, y, &face, fonts.as_deref(), &date_font, cli.json),
        Commands::Typefaces => run_typefaces(cli.json),
        Commands::Check { settings } => run_check(&settings, cli.json),
    }
}

struct Frame {
    face: SlantedFace<ComplicationHolder>,
    bounds: Rect,
    time: ClockFields,
}

impl Frame {
    fn prepare(args: &FaceArgs, measurer: Rc<dyn TextMeasurer>) -> Result<Self> {
        let settings = face_settings(args)?;
        let (width, height) = parse_size(&args.size)?;
        let time = parse_time(args.time.as_deref())?;
        let holder = sample_complications(&args.slots)?;

        let mut face = SlantedFace::new(settings, holder, measurer);
        face.set_ambient(args.ambient);
        let bounds = Rect::from_size(width as f32, height as f32);
        face.prepare(bounds, &time);
        Ok(Self { face, bounds, time })
    }
}

fn run_render(
    args: &FaceArgs,
    font_dir: &Path,
    date_font: &str,
    output: &Path,
    json_output: bool,
) -> Result<()> {
    let fonts = Rc::new(FontLibrary::load(font_dir, date_font)?);
    let measurer: Rc<dyn TextMeasurer> = Rc::new(FontdueMeasurer::new(Rc::clone(&fonts)));
    let mut frame = Frame::prepare(args, measurer)?;
    let (width, height) = parse_size(&args.size)?;

    let mut canvas = PixmapCanvas::new(width, height, fonts)?;
    frame.face.render(&mut canvas, frame.bounds, &frame.time);
    canvas.save_png(output)?;
    tracing::info!(output = %output.display(), width, height, "rendered frame");

    if json_output {
        print_json(&json!({
            "ok": true,
            "output": output.display().to_string(),
            "width": width,
            "height": height,
        }))
    } else {
        println!("Wrote {}", output.display());
        Ok(())
    }
}

fn run_layout(
    args: &FaceArgs,
    font_dir: Option<&Path>,
    date_font: &str,
    json_output: bool,
) -> Result<()> {
    let frame = Frame::prepare(args, measurer_for(font_dir, date_font)?)?;
    let painter = frame
        .face
        .painter()
        .ok_or_else(|| anyhow!("painter was not built"))?;
    let rects = painter.frame_rects(&frame.time);
    let paint = painter.paint_data(&frame.time);

    if json_output {
        return print_json(&json!({
            "ok": true,
            "typeface": painter.veneer().typeface.display_name,
            "ambient": frame.face.is_ambient(),
            "rects": rects,
            "paint": paint,
        }));
    }

    println!(
        "angle {} about ({}, {})",
        rects.angle, rects.center.x, rects.center.y
    );
    for (label, rect) in [
        ("hours", rects.hours),
        ("minutes", rects.minutes),
        ("seconds", rects.seconds),
        ("date", rects.date),
    ] {
        println!(
            "{label:<8} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
            rect.left, rect.top, rect.right, rect.bottom
        );
    }
    for (slot, rect) in rects.complications.iter() {
        println!(
            "slot {:<3} {:>8} {:>8} {:>8} {:>8}",
            slot.0, rect.left, rect.top, rect.right, rect.bottom
        );
    }
    Ok(())
}

fn run_hit(
    x: f32,
    y: f32,
    args: &FaceArgs,
    font_dir: Option<&Path>,
    date_font: &str,
    json_output: bool,
) -> Result<()> {
    let frame = Frame::prepare(args, measurer_for(font_dir, date_font)?)?;
    let target = frame.face.hit_test(x, y, &frame.time);

    if json_output {
        return print_json(&json!({ "ok": true, "x": x, "y": y, "hit": target }));
    }
    match target {
        Some(target) => println!("{target:?}"),
        None => println!("none"),
    }
    Ok(())
}

fn run_typefaces(json_output: bool) -> Result<()> {
    if json_output {
        return print_json(&json!({ "ok": true, "typefaces": FontConfig::all() }));
    }
    for config in FontConfig::all() {
        println!("{:<18} {}", config.display_name, config.asset_id);
    }
    Ok(())
}

fn run_check(path: &Path, json_output: bool) -> Result<()> {
    let settings = load_settings(path)?;
    let typeface = FontConfig::by_name(&settings.typeface);
    if json_output {
        return print_json(&json!({
            "ok": true,
            "settings": settings,
            "typeface": typeface.display_name,
        }));
    }
    println!(
        "OK: {} (typeface {}, {}, {})",
        path.display(),
        typeface.display_name,
        if settings.is24h { "24h" } else { "12h" },
        if settings.left_handed {
            "left-handed"
        } else {
            "right-handed"
        }
    );
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn measurer_for(font_dir: Option<&Path>, date_font: &str) -> Result<Rc<dyn TextMeasurer>> {
    match font_dir {
        Some(dir) => {
            let fonts = Rc::new(FontLibrary::load(dir, date_font)?);
            Ok(Rc::new(FontdueMeasurer::new(fonts)))
        }
        None => Ok(Rc::new(EstimateMeasurer)),
    }
}

fn face_settings(args: &FaceArgs) -> Result<Settings> {
    let mut settings = resolve_settings(args.settings.as_deref())?;
    if let Some(left_handed) = args.left_handed {
        settings.left_handed = left_handed;
    }
    if args.twelve_hour {
        settings.is24h = false;
    }
    if args.larger_date {
        settings.larger_date = true;
    }
    if let Some(typeface) = &args.typeface {
        settings.typeface = typeface.clone();
    }
    if let Some(base) = &args.color_scheme {
        let base = Color::parse(base)?;
        Veneer::from_settings(&settings, false)
            .with_color_scheme(base)
            .write_to(&mut settings);
    }
    Ok(settings)
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let invalid = || {
        anyhow!(CodedError::usage(
            "INVALID_SIZE",
            format!("size must look like WIDTHxHEIGHT, got '{value}'"),
        ))
    };
    let (width, height) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

fn parse_time(value: Option<&str>) -> Result<ClockFields> {
    let Some(value) = value else {
        return Ok(ClockFields::from_datetime(&Local::now()));
    };
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(ClockFields::from_datetime(&time));
    }
    if let Ok(time) = NaiveTime::parse_from_str(value, "%H:%M:%S") {
        let wall = Local::now().date_naive().and_time(time);
        // wall-clock fields only; the zone does not matter past this point
        return Ok(ClockFields::from_datetime(&Utc.from_utc_datetime(&wall)));
    }
    Err(anyhow!(CodedError::usage(
        "INVALID_TIME",
        format!("time must be RFC 3339 or HH:MM:SS, got '{value}'"),
    )))
}

fn sample_complications(positions: &[usize]) -> Result<ComplicationHolder> {
    let mut holder = ComplicationHolder::new();
    for &position in positions {
        if !(1..=MAX_NUMBER_OF_SLOTS).contains(&position) {
            return Err(anyhow!(CodedError::usage(
                "INVALID_SLOT",
                format!("slot positions run from 1 to {MAX_NUMBER_OF_SLOTS}, got {position}"),
            )));
        }
        let Some(slot) = SlotId::all().nth(position - 1) else {
            continue;
        };
        holder.on_data_update(
            slot,
            Some(ComplicationData::ShortText {
                text: format!("{}%", 40 + 10 * position),
                title: None,
            }),
        );
    }
    Ok(holder)
}
