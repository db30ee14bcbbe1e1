use clap::Parser;
use log::{error, info};
use soft_rasterizer::app::run_cli;
use soft_rasterizer::io::config::Config;

/// Headless CPU rasterizer
#[derive(Parser, Debug)]
#[command(name = "soft-rasterizer")]
#[command(about = "Renders a scene with a CPU triangle rasterizer and saves the last frame")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Binary scene file; overrides [scene].path
    #[arg(short, long, value_name = "FILE")]
    scene: Option<String>,

    /// Built-in demo used when no scene file is given
    #[arg(long, value_name = "NAME")]
    demo: Option<String>,

    /// Output image path
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Number of frames to render
    #[arg(short, long)]
    frames: Option<usize>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Write the active scene in the binary scene format
    #[arg(long, value_name = "FILE")]
    export_scene: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<(Config, Option<String>), String> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config: {}", path);
                Config::load(path)?
            }
            None => {
                info!("No config given, using defaults");
                Config::default()
            }
        };

        if let Some(scene) = self.scene {
            config.scene.path = Some(scene);
        }
        if let Some(demo) = self.demo {
            config.scene.demo = demo;
        }
        if let Some(output) = self.output {
            config.render.output = output;
        }
        if let Some(frames) = self.frames {
            config.render.frames = frames;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        Ok((config, self.export_scene))
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_level(true)
        .init();

    let (config, export_scene) = Cli::parse().into_config()?;
    if let Err(e) = run_cli(&config, export_scene.as_deref()) {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}
