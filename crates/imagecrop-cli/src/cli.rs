use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use imagecrop::{
    ChannelRegistry, CropConfig, ImageCrop, ImageCropPlugin, MethodInvocation, MethodOutcome,
    CHANNEL_NAME,
};
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "imagecrop", version, about = "Crop and sample photos through the image_crop channel")]
pub struct Cli {
    /// TOML config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for written images. Overrides `output_dir` from the config.
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crop an image by a normalized area (cropImage).
    Crop(CropArgs),

    /// Downscale an image to cover a box (sampleImage).
    Sample(SampleArgs),

    /// Print the oriented dimensions of an image (getImageOptions).
    Options {
        /// Source image.
        path: String,
    },

    /// Ask for storage permissions (requestPermissions).
    Permissions,

    /// Send a raw method call with JSON arguments.
    Call {
        /// Method name, e.g. cropImage.
        method: String,

        /// Arguments as a JSON object.
        #[arg(default_value = "{}")]
        arguments: String,
    },
}

#[derive(Args, Debug)]
pub struct CropArgs {
    /// Source image.
    pub path: String,

    /// Left edge as a fraction of the width.
    #[arg(long, default_value_t = 0.0)]
    pub left: f64,

    /// Top edge as a fraction of the height.
    #[arg(long, default_value_t = 0.0)]
    pub top: f64,

    /// Right edge as a fraction of the width.
    #[arg(long, default_value_t = 1.0)]
    pub right: f64,

    /// Bottom edge as a fraction of the height.
    #[arg(long, default_value_t = 1.0)]
    pub bottom: f64,

    /// Output scale relative to the cropped region.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Source image.
    pub path: String,

    #[arg(long)]
    pub max_width: u32,

    #[arg(long)]
    pub max_height: u32,
}

impl Command {
    /// The channel call this subcommand stands for.
    pub fn to_invocation(&self) -> Result<MethodInvocation> {
        let invocation = match self {
            Command::Crop(args) => MethodInvocation::new(
                "cropImage",
                json!({
                    "path": args.path,
                    "left": args.left,
                    "top": args.top,
                    "right": args.right,
                    "bottom": args.bottom,
                    "scale": args.scale,
                }),
            ),
            Command::Sample(args) => MethodInvocation::new(
                "sampleImage",
                json!({
                    "path": args.path,
                    "maximumWidth": args.max_width,
                    "maximumHeight": args.max_height,
                }),
            ),
            Command::Options { path } => {
                MethodInvocation::new("getImageOptions", json!({ "path": path }))
            }
            Command::Permissions => MethodInvocation::new("requestPermissions", Value::Null),
            Command::Call { method, arguments } => {
                let arguments: Value = serde_json::from_str(arguments)
                    .with_context(|| format!("arguments for {} are not valid JSON", method))?;
                MethodInvocation::new(method.as_str(), arguments)
            }
        };
        Ok(invocation)
    }
}

/// Load the config file (if any) and apply command-line overrides.
pub fn load_config(cli: &Cli) -> Result<CropConfig> {
    let mut config = match &cli.config {
        Some(path) => CropConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CropConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Register the plugin on a fresh registry and send the subcommand's call.
pub fn run(cli: &Cli) -> Result<MethodOutcome> {
    let config = load_config(cli)?;
    let invocation = cli.command.to_invocation()?;

    tracing::debug!(
        method = %invocation.method,
        output_dir = %config.resolved_output_dir().display(),
        "invoking channel method"
    );

    let engine = Arc::new(ImageCrop::with_filesystem(config));
    let mut registry = ChannelRegistry::new();
    ImageCropPlugin::register(&mut registry, engine);

    Ok(registry.invoke(CHANNEL_NAME, &invocation.method, invocation.arguments))
}

pub fn render(outcome: &MethodOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).context("serializing method outcome")
}

/// One-line report of a failed run, with the whole context chain.
pub fn error_report(err: &anyhow::Error) -> String {
    format!("error: {:#}", err)
}
