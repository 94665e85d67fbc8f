use anyhow::{Context, Result};
use camfilter::{
    AvatarSettings, BackgroundMaskFilter, CircleAvatarFilter, EngineConfig, FrameStatus,
    InferenceEngine, MaskSettings, PixelFormat, VideoFilter, VideoFrame,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Background segmentation mask
    Mask,
    /// Face-following circular avatar
    Avatar,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filter to run
    #[arg(long, value_enum, default_value_t = Mode::Mask)]
    mode: Mode,

    /// Path to the model (ONNX file)
    #[arg(long)]
    model: PathBuf,

    /// Input image, fed to the filter as an RGBA frame
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the mask (mask mode only)
    #[arg(short, long, default_value = "mask.png")]
    output: PathBuf,

    /// Times to feed the image, lets the face smoother settle
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Mask probability threshold
    #[arg(long, default_value_t = 0.8)]
    threshold: f64,

    /// Face size multiplier
    #[arg(long, default_value_t = 2.0)]
    face_scale: f64,

    /// Horizontal face offset in model pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x_bias: f64,

    /// Vertical face offset in model pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y_bias: f64,

    /// Also correct the vertical axis for the crop ratio
    #[arg(long)]
    correct_height: bool,

    /// Inference threads
    #[arg(long, default_value_t = 2)]
    threads: usize,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("camfilter starting in {:?} mode", args.mode);

    let image = image::open(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    tracing::info!("Input: {}x{}", width, height);
    let frame = VideoFrame::packed(width, height, PixelFormat::Rgba, image.as_raw(), width as usize * 4);

    let config = EngineConfig::new(args.model.clone()).with_threads(args.threads);

    match args.mode {
        Mode::Mask => {
            let settings = MaskSettings {
                threshold: args.threshold,
            };
            let engine = load_engine(&config, camfilter::segmentation::SEGMENTATION_SIZE)?;
            let mut filter =
                BackgroundMaskFilter::new(engine, settings).context("Failed to create mask filter")?;
            run_frames(&mut filter, &frame, args.repeat);

            let render = filter
                .mask_render()
                .context("No mask was produced")?;
            tracing::info!("Mask {}x{}, blur {:?}", render.width, render.height, render.params);
            render
                .to_image()
                .context("Mask buffer does not match its size")?
                .save(&args.output)
                .with_context(|| format!("Failed to write {}", args.output.display()))?;
            tracing::info!("Mask written to {}", args.output.display());
        }
        Mode::Avatar => {
            let settings = AvatarSettings {
                face_size_scale: args.face_scale,
                x_bias: args.x_bias,
                y_bias: args.y_bias,
                correct_height: args.correct_height,
            };
            let engine = load_engine(&config, camfilter::detection::DETECTION_SIZE)?;
            let mut filter =
                CircleAvatarFilter::new(engine, settings).context("Failed to create avatar filter")?;
            run_frames(&mut filter, &frame, args.repeat);

            tracing::info!("Smoothed box: {:?}", filter.smoothed_box());
            match filter.focal_region() {
                Some(region) => tracing::info!(
                    "Focal region: center=({:.3}, {:.3}) size=({:.3}, {:.3})",
                    region.center.0,
                    region.center.1,
                    region.size.0,
                    region.size.1
                ),
                None => tracing::warn!("No focal region was produced"),
            }
        }
    }

    Ok(())
}

fn run_frames<F: VideoFilter>(filter: &mut F, frame: &VideoFrame<'_>, repeat: u32) {
    let mut total = Duration::ZERO;
    let mut processed = 0u32;

    for index in 0..repeat.max(1) {
        let start = Instant::now();
        let status = filter.filter_video(frame);
        total += start.elapsed();
        if status == FrameStatus::Processed {
            processed += 1;
        } else {
            tracing::warn!("Frame {}: {:?}", index, status);
        }
    }

    let avg_ms = total.as_secs_f64() * 1000.0 / repeat.max(1) as f64;
    tracing::info!(
        "{}: {} of {} frame(s) processed, avg={:.1}ms",
        filter.name(),
        processed,
        repeat.max(1),
        avg_ms
    );
}

#[cfg(feature = "onnx")]
fn load_engine(config: &EngineConfig, input_size: (u32, u32)) -> Result<Box<dyn InferenceEngine>> {
    let engine = camfilter::inference::OnnxEngine::new(config, input_size)
        .context("Failed to load model")?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "onnx"))]
fn load_engine(config: &EngineConfig, _input_size: (u32, u32)) -> Result<Box<dyn InferenceEngine>> {
    anyhow::bail!(
        "cannot load {}: built without the `onnx` feature",
        config.model_path.display()
    )
}
