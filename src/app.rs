use crate::core::framebuffer::PixelBuffer;
use crate::io::config::Config;
use crate::io::image::save_buffer_to_image;
use crate::io::scene_format::{load_scene, save_scene};
use crate::pipeline::renderer::{FrameStats, update_and_render};
use crate::scene::context::RendererContext;
use crate::scene::mesh::GeometryStore;
use crate::scene::texture::TextureAtlas;
use crate::scene::utils::{Demo, build_demo};
use crate::ui::input::InputScript;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Loads the configured scene file, or builds the configured demo scene.
pub fn init_scene(config: &Config) -> Result<(GeometryStore, TextureAtlas), String> {
    match &config.scene.path {
        Some(path) => load_scene(path).map_err(|e| format!("Failed to load scene '{}': {}", path, e)),
        None => {
            let demo: Demo = config.scene.demo.parse()?;
            Ok(build_demo(demo, config.scene.seed))
        }
    }
}

/// Runs the headless renderer: plays the scripted input for the configured
/// number of frames and saves the last frame.
///
/// When `export_scene` is set the active scene is also written there in the
/// binary scene format.
pub fn run_cli(config: &Config, export_scene: Option<&str>) -> Result<FrameStats, String> {
    let width = config.render.width;
    let height = config.render.height;
    let frames = config.render.frames.max(1);
    info!(
        "Starting headless render ({}x{}, {} frame(s))...",
        width, height, frames
    );

    let (geometry, atlas) = init_scene(config)?;
    if geometry.is_empty() {
        warn!("Scene contains no triangles; output will be background only");
    }
    if let Some(path) = export_scene {
        save_scene(path, &geometry, &atlas).map_err(|e| format!("Failed to export scene: {}", e))?;
    }

    let mut context = RendererContext::from_config(config, geometry, atlas)
        .map_err(|e| format!("Invalid scene: {}", e))?;
    let script = InputScript::from_steps(&config.input.steps);
    if script.len() > frames {
        warn!(
            "Input script covers {} frames but only {} will be rendered",
            script.len(),
            frames
        );
    }

    let mut buffer = vec![0u32; width * height];
    let mut stats = FrameStats::default();
    let mut total = Duration::ZERO;

    for frame in 0..frames {
        let input = script.frame(frame);
        let start = Instant::now();
        let mut pixels =
            PixelBuffer::new(&mut buffer, width, height).map_err(|e| e.to_string())?;
        stats = update_and_render(&mut context, &mut pixels, &input)
            .map_err(|e| format!("Frame {} failed: {}", frame, e))?;
        let elapsed = start.elapsed();
        total += elapsed;
        debug!("Frame {} rendered in {:.2?}", frame, elapsed);
    }

    info!(
        "Rendered {} frame(s) in {:.2?} ({:.2?} per frame)",
        frames,
        total,
        total / frames as u32
    );
    info!(
        "Last frame: {} triangles, {} clipped, {} culled, {} rasterized, {} pixels",
        stats.submitted, stats.clipped, stats.culled, stats.rasterized, stats.pixels
    );
    let p = context.camera.position;
    info!("Camera ended at ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);

    save_buffer_to_image(&buffer, width, height, &config.render.output)?;
    info!("Done.");
    Ok(stats)
}
