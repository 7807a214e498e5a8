use clap::{Parser, Subcommand, ValueEnum};
use phototone::config::{self, ToneConfig};
use phototone::export::{self, Notice};
use phototone::imaging::{
    AdjustmentState, Amount, ImageBackend, OutputFormat, Quality, RustBackend,
    build_combined_matrix,
};
use phototone::preview::Preview;
use phototone::storage::DirectoryStorage;
use phototone::{output, scan};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Adjustment flags shared by every command that filters pixels.
///
/// Each flag overrides the `[adjustments]` value from the config file.
#[derive(clap::Args, Clone, Default)]
struct AdjustmentArgs {
    /// Blend toward luminance-weighted gray (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    gray: Option<u8>,

    /// Channel scale: 0 off, 50 unchanged, 100 doubled
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    brightness: Option<u8>,

    /// Stretch around mid-gray (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    contrast: Option<u8>,

    /// Blend toward a warm brown tone (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    sepia: Option<u8>,

    /// Invert every color channel; `--negative=false` turns a configured
    /// negative off
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    negative: Option<bool>,
}

impl AdjustmentArgs {
    fn resolve(&self, mut state: AdjustmentState) -> AdjustmentState {
        if let Some(v) = self.gray {
            state.gray = Amount::new(v.into());
        }
        if let Some(v) = self.brightness {
            state.brightness = Amount::new(v.into());
        }
        if let Some(v) = self.contrast {
            state.contrast = Amount::new(v.into());
        }
        if let Some(v) = self.sepia {
            state.sepia = Amount::new(v.into());
        }
        if let Some(v) = self.negative {
            state.negative = v;
        }
        state
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

#[derive(Parser)]
#[command(name = "phototone")]
#[command(about = "Color adjustments and orientation correction for photos")]
#[command(long_about = "\
Color adjustments and orientation correction for photos

Five adjustments combine into one color transform, always applied in the
same order:

  gray → brightness → contrast → sepia → negative

Exports are rotated upright from the EXIF orientation tag, filtered, and
written as new files; sources are never modified.

  phototone export shots/ --contrast 30 --sepia 60
  phototone preview shots/001-pier.jpg --out pier.png --negative
  phototone matrix --gray 100 --json

Run 'phototone gen-config' to generate a documented phototone.toml.")]
#[command(version)]
struct Cli {
    /// Config file; missing means defaults
    #[arg(long, default_value = "phototone.toml", global = true)]
    config: PathBuf,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rotate, filter, and save images as new files
    Export {
        /// Image files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory to write exports into
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Output container
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// JPEG quality (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: Option<u32>,

        #[command(flatten)]
        adjustments: AdjustmentArgs,
    },
    /// Render one image as displayed, without orientation correction
    Preview {
        /// Source image
        source: PathBuf,

        /// Where to write the rendered preview (.png or .jpg)
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        adjustments: AdjustmentArgs,
    },
    /// Print the combined color matrix for a set of adjustments
    Matrix {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        adjustments: AdjustmentArgs,
    },
    /// Print a stock phototone.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Export {
            paths,
            out_dir,
            format,
            quality,
            adjustments,
        } => {
            let mut tone = load_config(&cli.config)?;
            if let Some(dir) = out_dir {
                tone.export.output_dir = dir;
            }
            if let Some(format) = format {
                tone.export.format = format.into();
            }
            if let Some(quality) = quality {
                tone.export.quality = quality;
            }
            let state = adjustments.resolve(tone.adjustments);
            run_export(&tone, state, &paths)?;
        }
        Command::Preview {
            source,
            out,
            adjustments,
        } => {
            let tone = load_config(&cli.config)?;
            let state = adjustments.resolve(tone.adjustments);
            run_preview(&tone, state, &source, &out)?;
        }
        Command::Matrix { json, adjustments } => {
            let tone = load_config(&cli.config)?;
            let state = adjustments.resolve(tone.adjustments);
            let matrix = build_combined_matrix(&state);
            if json {
                let report = serde_json::json!({
                    "adjustments": state,
                    "matrix": matrix,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_matrix(&state, &matrix);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ToneConfig, config::ConfigError> {
    let tone = config::load_config(path)?;
    debug!(config = %path.display(), exists = path.exists(), "loaded config");
    Ok(tone)
}

fn run_export(
    tone: &ToneConfig,
    state: AdjustmentState,
    paths: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = scan::scan_sources(paths)?;
    output::print_sources(&sources);
    for line in output::format_adjustments(&state) {
        println!("{}", line);
    }
    println!();

    init_thread_pool(&tone.processing);
    let settings = tone.export.settings();
    let requests = export::plan_requests(&sources, state, &settings);
    let storage = DirectoryStorage::new(&tone.export.output_dir);
    info!(
        out_dir = %storage.root().display(),
        images = requests.len(),
        "starting export"
    );

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_export_event(&event) {
                println!("{}", line);
            }
        }
    });
    let (_, summary) = export::export_batch(&RustBackend::new(), &storage, &requests, Some(tx));
    printer.join().map_err(|_| "output thread panicked")?;
    output::print_summary(&summary);

    if summary.failed > 0 {
        return Err(format!("{} of {} exports failed", summary.failed, requests.len()).into());
    }
    Ok(())
}

fn run_preview(
    tone: &ToneConfig,
    state: AdjustmentState,
    source: &Path,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = RustBackend::new();
    let preview = match std::fs::read(source)
        .map_err(|e| e.to_string())
        .and_then(|bytes| Preview::load(&backend, &bytes).map_err(|e| e.to_string()))
    {
        Ok(preview) => preview,
        Err(e) => {
            println!("{}", Notice::LoadFailed);
            return Err(e.into());
        }
    };

    let mut rendered = preview.render(&state);
    let format = format_for_path(out).unwrap_or(tone.export.format);
    let saved = backend
        .encode(&rendered, format, Quality::new(tone.export.quality))
        .map_err(|e| e.to_string())
        .and_then(|bytes| std::fs::write(out, bytes).map_err(|e| e.to_string()));
    rendered.dispose();

    match saved {
        Ok(()) => {
            info!(out = %out.display(), "preview written");
            println!("{}: {}", Notice::Saved, out.display());
            Ok(())
        }
        Err(e) => {
            println!("{}", Notice::SaveFailed);
            Err(e.into())
        }
    }
}

/// Output format implied by a file extension, if any.
fn format_for_path(path: &Path) -> Option<OutputFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(OutputFormat::Png),
        "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
        _ => None,
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "phototone=debug" } else { "phototone=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_args(args: &[&str]) -> AdjustmentArgs {
        let cli = Cli::try_parse_from(["phototone", "matrix"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Matrix { adjustments, .. } => adjustments,
            _ => panic!("expected matrix command"),
        }
    }

    fn configured_negative() -> AdjustmentState {
        AdjustmentState {
            negative: true,
            ..Default::default()
        }
    }

    #[test]
    fn negative_flag_turns_negative_on() {
        let state = matrix_args(&["--negative"]).resolve(AdjustmentState::default());
        assert!(state.negative);
    }

    #[test]
    fn negative_false_overrides_config() {
        let state = matrix_args(&["--negative=false"]).resolve(configured_negative());
        assert!(!state.negative);
    }

    #[test]
    fn missing_flags_keep_config_values() {
        let state = matrix_args(&[]).resolve(configured_negative());
        assert!(state.negative);
    }

    #[test]
    fn negative_flag_does_not_swallow_paths() {
        let cli = Cli::try_parse_from(["phototone", "export", "--negative", "shots"]).unwrap();
        match cli.command {
            Command::Export {
                paths, adjustments, ..
            } => {
                assert_eq!(paths, vec![PathBuf::from("shots")]);
                assert_eq!(adjustments.negative, Some(true));
            }
            _ => panic!("expected export command"),
        }
    }
}
