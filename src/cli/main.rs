use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use exif_datemark::color::color_names;
use exif_datemark::config::Config;
use exif_datemark::exif::DateResolver;
use exif_datemark::layout::Anchor;
use exif_datemark::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "exif-datemark",
    version,
    about = "Stamp the EXIF capture date onto photos as a watermark"
)]
struct Cli {
    /// Image file or directory to process (prompted for when omitted)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Font size in pixels ("24") or as a fraction of the image width ("0.04")
    #[arg(long, value_name = "SIZE")]
    font_size: Option<String>,

    /// Text color: #RRGGBB or white, black, red, yellow, blue, green
    #[arg(long, value_name = "COLOR")]
    color: Option<String>,

    /// top-left, top-right, bottom-left, bottom-right or center
    #[arg(long, value_name = "POSITION")]
    position: Option<String>,

    /// TrueType/OpenType font file (default: embedded DejaVu Sans Mono)
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Output directory (default: <name>_watermark next to the input)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if cli.init {
        let path = Config::default().save(cli.config.as_deref())?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;

    let input = match cli.path.clone() {
        Some(path) => {
            apply_flags(&mut config, &cli);
            path
        }
        None => prompt_for_settings(&mut config, &cli)?,
    };

    let images = pipeline::collect_images(&input);
    if images.is_empty() {
        anyhow::bail!("No supported image files found at {}", input.display());
    }

    let out_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| pipeline::output_dir_for(&input, &config.output.dir_suffix));
    let style = config.style();
    let resolver = DateResolver::default();

    log::info!("Found {} image(s) to process", images.len());
    log::info!("Output directory: {}", out_dir.display());
    log::debug!("Date sources: {}", resolver.source_names().join(" → "));

    let total = images.len();
    let mut results = Vec::with_capacity(total);

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, total, image_path.display());

        let result = pipeline::process_image(image_path, &out_dir, &resolver, &style, &config.output);
        match (&result.error, &result.output_path) {
            (Some(err), _) => log::error!("  Error: {err}"),
            (None, Some(out)) => log::info!("  Saved: {}", out.display()),
            (None, None) => {}
        }
        results.push(result);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    let success = results.iter().filter(|r| r.is_success()).count();
    let failed = total - success;
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

/// Command-line flags win over config values.
fn apply_flags(config: &mut Config, cli: &Cli) {
    if let Some(size) = &cli.font_size {
        config.watermark.font_size = size.clone();
    }
    if let Some(color) = &cli.color {
        config.watermark.color = color.clone();
    }
    if let Some(position) = &cli.position {
        config.watermark.position = position.clone();
    }
    if let Some(font) = &cli.font {
        config.watermark.font_path = Some(font.display().to_string());
    }
}

/// Ask for the input path and the watermark settings on stdin.
///
/// Flags given alongside still count; they become the prompt defaults.
fn prompt_for_settings(config: &mut Config, cli: &Cli) -> Result<PathBuf> {
    apply_flags(config, cli);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let path = prompt(&mut input, &mut output, "Image file or folder", "")?;
    if path.is_empty() {
        anyhow::bail!("No input file or directory specified. Use --help for usage.");
    }

    let wm = &mut config.watermark;
    wm.font_size = prompt(&mut input, &mut output, "Font size (pixels or fraction of width)", &wm.font_size)?;
    wm.color = prompt(&mut input, &mut output, &color_label(), &wm.color)?;
    wm.position = prompt(&mut input, &mut output, &position_label(), &wm.position)?;
    let font_default = wm.font_path.clone().unwrap_or_default();
    let font = prompt(&mut input, &mut output, "Font file (empty for built-in)", &font_default)?;
    wm.font_path = Some(font).filter(|f| !f.is_empty());

    Ok(Path::new(trim_quotes(&path)).to_path_buf())
}

/// Print `label [default]: `, read one line and fall back to `default` when
/// it is blank.
fn prompt(input: &mut impl BufRead, output: &mut impl Write, label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        write!(output, "{label}: ")?;
    } else {
        write!(output, "{label} [{default}]: ")?;
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read from stdin")?;
    let answer = line.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

fn color_label() -> String {
    let names: Vec<_> = color_names().collect();
    format!("Color (#RRGGBB or {})", names.join("/"))
}

fn position_label() -> String {
    let names: Vec<_> = Anchor::ALL.iter().map(|a| a.name()).collect();
    format!("Position ({})", names.join(", "))
}

/// Paths dragged into a terminal often arrive quoted.
fn trim_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}
