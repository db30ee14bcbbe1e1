use crate::core::clipper::{NearPlane, classify, clip_triangle};
use crate::core::error::RasterError;
use crate::core::framebuffer::{DepthBuffer, PixelBuffer};
use crate::core::geometry::{ProjectedMesh, Triangle};
use crate::core::math::transform::Projection;
use crate::core::rasterizer::Rasterizer;
use crate::pipeline::shader::SurfaceShader;
use crate::pipeline::transform::transform_geometry;
use crate::scene::context::RendererContext;
use crate::scene::texture::TextureAtlas;
use crate::ui::input::FrameInput;
use log::debug;

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    /// Triangles in the geometry store.
    pub submitted: usize,
    /// Triangles behind the near plane, off-screen, back-facing or too small.
    /// Includes triangles produced by clipping.
    pub culled: usize,
    /// Triangles that straddled the near plane.
    pub clipped: usize,
    /// Triangles emitted by the clipper.
    pub generated: usize,
    /// Triangles that reached the fill loop.
    pub rasterized: usize,
    /// Pixels that passed the depth test.
    pub pixels: usize,
}

/// Renders one frame into `pixels`.
///
/// Applies `input` to the camera, resizes the depth buffer when the output
/// size changed, clears depth and color, then transforms, clips and
/// rasterizes every triangle. Every pixel of `pixels` is written; the buffer
/// is complete when this returns.
pub fn update_and_render(
    ctx: &mut RendererContext,
    pixels: &mut PixelBuffer,
    input: &FrameInput,
) -> Result<FrameStats, RasterError> {
    ctx.camera.update(input);

    let (width, height) = (pixels.width(), pixels.height());
    if ctx.depth.resize(width, height) {
        ctx.projection = Projection::new(ctx.settings.near, ctx.settings.fov, width, height);
    }
    ctx.depth.clear();
    pixels.fill(ctx.settings.background);
    ctx.arena.reset();

    let RendererContext {
        geometry,
        atlas,
        camera,
        depth,
        projection,
        rasterizer,
        mesh,
        arena,
        ..
    } = ctx;

    transform_geometry(&camera.view_matrix(), projection, geometry, mesh);

    let mut stats = FrameStats {
        frame: arena.generation(),
        submitted: geometry.triangle_count(),
        ..FrameStats::default()
    };
    let mut target = Target {
        rasterizer,
        atlas,
        pixels,
        depth,
        stats: &mut stats,
    };

    let triangles = geometry
        .vertex_indices()
        .iter()
        .zip(geometry.attribute_indices());
    for (triangle, (&vertices, &attributes)) in triangles.enumerate() {
        let depths = vertices.map(|v| mesh.raster[v].z);
        match classify(depths, projection.near) {
            NearPlane::InFront => target.draw(mesh, triangle, vertices, attributes)?,
            NearPlane::Behind => target.stats.culled += 1,
            NearPlane::Straddling => {
                target.stats.clipped += 1;
                let first = arena.len();
                target.stats.generated +=
                    clip_triangle(projection, mesh, arena, triangle, vertices, attributes)?;
                for k in first..arena.len() {
                    let (v, a) = (arena.vertex_indices()[k], arena.attribute_indices()[k]);
                    target.draw(mesh, triangle, v, a)?;
                }
            }
        }
    }

    debug!("{stats:?}");
    Ok(stats)
}

/// Per-frame output and the tools to fill it.
struct Target<'f, 'p> {
    rasterizer: &'f Rasterizer,
    atlas: &'f TextureAtlas,
    pixels: &'f mut PixelBuffer<'p>,
    depth: &'f mut DepthBuffer,
    stats: &'f mut FrameStats,
}

impl Target<'_, '_> {
    fn draw(
        &mut self,
        mesh: &ProjectedMesh,
        triangle: usize,
        vertices: Triangle,
        attributes: Triangle,
    ) -> Result<(), RasterError> {
        let raster = vertices.map(|v| mesh.raster[v]);
        let Ok(setup) = self
            .rasterizer
            .setup(&raster, self.pixels.width(), self.pixels.height())
        else {
            self.stats.culled += 1;
            return Ok(());
        };
        let shader = SurfaceShader::new(mesh, self.atlas, &setup, triangle, vertices, attributes)?;
        self.stats.rasterized += 1;
        self.stats.pixels += self
            .rasterizer
            .fill(&setup, &shader, self.pixels, self.depth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{ColorAttribute, VertexAttribute};
    use crate::scene::camera::Camera;
    use crate::scene::context::RenderSettings;
    use crate::scene::mesh::GeometryStore;
    use nalgebra::{Point3, Vector3};

    fn single_triangle(z: f32) -> GeometryStore {
        let mut geometry = GeometryStore::default();
        let a = VertexAttribute::new(Vector3::z(), ColorAttribute::rgb(255.0, 128.0, 0.0));
        geometry.push_triangle(
            [
                Point3::new(-1.0, -1.0, z),
                Point3::new(0.0, 1.0, z),
                Point3::new(1.0, -1.0, z),
            ],
            [a, a, a],
        );
        geometry
    }

    fn context(geometry: GeometryStore) -> RendererContext {
        RendererContext::new(
            geometry,
            TextureAtlas::default(),
            Camera::new(Point3::origin(), 0.1, 0.1),
            RenderSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn empty_scene_fills_background() {
        let mut ctx = context(GeometryStore::default());
        let mut data = vec![0u32; 16 * 8];
        let mut pixels = PixelBuffer::new(&mut data, 16, 8).unwrap();
        let stats = update_and_render(&mut ctx, &mut pixels, &FrameInput::default()).unwrap();
        assert_eq!(stats.pixels, 0);
        assert_eq!(stats.frame, 1);
        assert!(data.iter().all(|&p| p == 0x0032_3232));
    }

    #[test]
    fn visible_triangle_is_drawn_and_counted() {
        let mut ctx = context(single_triangle(-5.0));
        let mut data = vec![0u32; 64 * 64];
        let mut pixels = PixelBuffer::new(&mut data, 64, 64).unwrap();
        let stats = update_and_render(&mut ctx, &mut pixels, &FrameInput::default()).unwrap();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.rasterized, 1);
        assert_eq!(stats.culled, 0);
        assert!(stats.pixels > 0);
        let drawn = data.iter().filter(|&&p| p != 0x0032_3232).count();
        assert_eq!(drawn, stats.pixels);
    }

    #[test]
    fn triangle_behind_the_camera_is_culled() {
        let mut ctx = context(single_triangle(5.0));
        let mut data = vec![0u32; 32 * 32];
        let mut pixels = PixelBuffer::new(&mut data, 32, 32).unwrap();
        let stats = update_and_render(&mut ctx, &mut pixels, &FrameInput::default()).unwrap();
        assert_eq!(stats.culled, 1);
        assert_eq!(stats.pixels, 0);
    }

    #[test]
    fn resizing_the_output_resizes_depth_and_projection() {
        let mut ctx = context(single_triangle(-5.0));
        let mut small = vec![0u32; 32 * 16];
        let mut pixels = PixelBuffer::new(&mut small, 32, 16).unwrap();
        update_and_render(&mut ctx, &mut pixels, &FrameInput::default()).unwrap();
        assert_eq!(ctx.depth_buffer().width(), 32);
        assert_eq!(ctx.projection().center.y, 8.0);

        let mut large = vec![0u32; 64 * 48];
        let mut pixels = PixelBuffer::new(&mut large, 64, 48).unwrap();
        update_and_render(&mut ctx, &mut pixels, &FrameInput::default()).unwrap();
        assert_eq!(ctx.depth_buffer().height(), 48);
        assert_eq!(ctx.projection().center.x, 32.0);
        assert_eq!(ctx.frame(), 2);
    }
}
