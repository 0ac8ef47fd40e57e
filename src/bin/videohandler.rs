use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use videohandler::{CaptureOptions, FfmpegCapture, LogLevel, PixelFormat, VideoHandle};

const CLI_AFTER_HELP: &str = "Examples:\n  videohandler info input.mp4 --json\n  videohandler frames input.mp4 --out frames --start 100 --end 200\n  videohandler seek input.mp4 --seconds 12.5 --by-fps --out frame.png\n  videohandler completions zsh > _videohandler";

#[derive(Debug, Parser)]
#[command(
    name = "videohandler",
    version,
    about = "Step through, seek, and iterate over video frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Pixel format for saved frames (rgb8, rgba8, gray8).
    #[arg(long, global = true)]
    pixel_format: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print frame size, frame count, and frame rate.
    #[command(
        about = "Print video info",
        visible_alias = "probe",
        after_help = "Examples:\n  videohandler info input.mp4\n  videohandler info input.mp4 --json"
    )]
    Info {
        /// Input video path.
        input: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Save a range of frames to a directory.
    #[command(
        about = "Save video frames",
        after_help = "Examples:\n  videohandler frames input.mp4 --out frames\n  videohandler frames input.mp4 --out frames --start 30 --end 90 --limit 10 --ext jpg"
    )]
    Frames {
        /// Input video path.
        input: PathBuf,
        /// Output directory.
        #[arg(long)]
        out: PathBuf,
        /// First frame index (inclusive).
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// Last frame index (exclusive). Defaults to the frame count.
        #[arg(long)]
        end: Option<u64>,
        /// Save at most this many frames.
        #[arg(long)]
        limit: Option<u64>,
        /// Output image extension (png, jpg, jpeg, bmp, tiff).
        #[arg(long, default_value = "png")]
        ext: String,
    },

    /// Seek to a position and report where the cursor landed.
    #[command(
        about = "Seek and report the position",
        after_help = "Examples:\n  videohandler seek input.mp4 --frame 100\n  videohandler seek input.mp4 --ratio 0.5 --by-fps --out middle.png"
    )]
    Seek {
        /// Input video path.
        input: PathBuf,
        #[command(flatten)]
        target: SeekTarget,
        /// Compute time and ratio seeks from the frame rate and frame count
        /// instead of the container's own positioning.
        #[arg(long)]
        by_fps: bool,
        /// Save the frame at the new position to this file.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
struct SeekTarget {
    /// One-based frame number.
    #[arg(long)]
    frame: Option<u64>,
    /// Zero-based frame index.
    #[arg(long)]
    index: Option<u64>,
    /// Time in seconds.
    #[arg(long)]
    seconds: Option<f64>,
    /// Time in milliseconds.
    #[arg(long)]
    millis: Option<f64>,
    /// Position between 0 and 1.
    #[arg(long)]
    ratio: Option<f64>,
}

fn parse_image_extension(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().trim_start_matches('.') {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        "bmp" => Some("bmp"),
        "tif" | "tiff" => Some("tiff"),
        _ => None,
    }
}

fn capture_options(global: &GlobalOptions) -> Result<CaptureOptions, Box<dyn std::error::Error>> {
    let mut options = CaptureOptions::new();
    if let Some(name) = &global.pixel_format {
        let format = PixelFormat::from_name(name)
            .ok_or(format!("unsupported --pixel-format: {name}"))?;
        options = options.with_pixel_format(format);
    }
    Ok(options)
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = match &global.log_level {
        Some(name) => name.parse::<LogLevel>()?,
        None if global.verbose => LogLevel::Info,
        None => LogLevel::Error,
    };
    videohandler::set_ffmpeg_log_level(level);
    Ok(())
}

fn open_input(
    input: &Path,
    options: CaptureOptions,
) -> Result<VideoHandle<FfmpegCapture>, Box<dyn std::error::Error>> {
    let capture = FfmpegCapture::try_open_with_options(input, options)?;
    Ok(VideoHandle::new(capture))
}

fn seek(video: &VideoHandle<FfmpegCapture>, target: &SeekTarget, by_fps: bool) -> bool {
    if let Some(number) = target.frame {
        video.seek_to_frame_number(number)
    } else if let Some(index) = target.index {
        video.seek_to_frame_index(index)
    } else if let Some(seconds) = target.seconds {
        if by_fps {
            video.seek_to_seconds_by_fps(seconds)
        } else {
            video.seek_to_seconds(seconds)
        }
    } else if let Some(millis) = target.millis {
        if by_fps {
            video.seek_to_millis_by_fps(millis)
        } else {
            video.seek_to_millis(millis)
        }
    } else if let Some(ratio) = target.ratio {
        if by_fps {
            video.seek_to_ratio_by_frames(ratio)
        } else {
            video.seek_to_ratio(ratio)
        }
    } else {
        false
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Info { input, json } => {
            let video = open_input(&input, capture_options(&cli.global)?)?;
            let info = video.info();
            if json {
                let payload = json!({
                    "path": input.display().to_string(),
                    "frame_width": info.frame_width,
                    "frame_height": info.frame_height,
                    "total_frames": info.total_frames,
                    "fps": info.fps,
                    "duration_seconds": info.duration_seconds(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", input.display().to_string().bold());
                println!("  {:<14} {}x{}", "frame size".cyan(), info.frame_width, info.frame_height);
                println!("  {:<14} {}", "frames".cyan(), info.total_frames);
                println!("  {:<14} {:.3}", "fps".cyan(), info.fps);
                println!("  {:<14} {:.3}s", "duration".cyan(), info.duration_seconds());
            }
        }
        Commands::Frames {
            input,
            out,
            start,
            end,
            limit,
            ext,
        } => {
            let extension =
                parse_image_extension(&ext).ok_or(format!("unsupported --ext: {ext}"))?;
            fs::create_dir_all(&out)?;

            let video = open_input(&input, capture_options(&cli.global)?)?;
            let scene = video.scene(start, end);
            if !scene.reset() {
                return Err(format!("could not seek to frame {start}").into());
            }

            let expected = limit.map_or(scene.len(), |limit| limit.min(scene.len()));
            let progress = ProgressBar::new(expected);
            progress.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} frames ({eta})")?
                    .progress_chars("=> "),
            );

            let take = limit.map_or(usize::MAX, |limit| {
                usize::try_from(limit).unwrap_or(usize::MAX)
            });
            let mut index = scene.start();
            let mut saved = 0_u64;
            for frame in scene.iter().take(take) {
                let path = out.join(format!("frame_{index:06}.{extension}"));
                frame.save(&path)?;
                if cli.global.verbose {
                    progress.println(format!("{} {}", "saved".green(), path.display()));
                }
                index += 1;
                saved += 1;
                progress.inc(1);
            }
            progress.finish_and_clear();
            println!(
                "{} {} frames to {}",
                "saved".green().bold(),
                saved,
                out.display()
            );
        }
        Commands::Seek {
            input,
            target,
            by_fps,
            out,
            json,
        } => {
            let video = open_input(&input, capture_options(&cli.global)?)?;
            let moved = seek(&video, &target, by_fps);
            if !moved {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "the source rejected the seek".yellow()
                );
            }

            let index = video.current_index();
            let millis = video.get_millis();
            let millis_by_fps = video.get_millis_by_fps();
            let ratio = video.get_ratio();
            let ratio_by_frames = video.get_ratio_by_frames();

            if json {
                let payload = json!({
                    "accepted": moved,
                    "index": index,
                    "millis": millis,
                    "millis_by_fps": millis_by_fps,
                    "ratio": ratio,
                    "ratio_by_frames": ratio_by_frames,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("  {:<16} {}", "index".cyan(), index);
                println!("  {:<16} {:.3}", "millis".cyan(), millis);
                println!("  {:<16} {:.3}", "millis (fps)".cyan(), millis_by_fps);
                println!("  {:<16} {:.5}", "ratio".cyan(), ratio);
                println!("  {:<16} {:.5}", "ratio (frames)".cyan(), ratio_by_frames);
            }

            if let Some(path) = out {
                let frame = video
                    .next_frame()
                    .ok_or(format!("no frame available at index {index}"))?;
                frame.save(&path)?;
                println!("{} {}", "saved".green().bold(), path.display());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "videohandler", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::parse_image_extension;

    #[test]
    fn parse_image_extension_aliases() {
        assert_eq!(parse_image_extension("PNG"), Some("png"));
        assert_eq!(parse_image_extension(".jpeg"), Some("jpg"));
        assert_eq!(parse_image_extension("tif"), Some("tiff"));
        assert_eq!(parse_image_extension("gif"), None);
    }
}
