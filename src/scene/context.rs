use crate::core::clipper::ClipArena;
use crate::core::error::RasterError;
use crate::core::framebuffer::DepthBuffer;
use crate::core::geometry::ProjectedMesh;
use crate::core::math::transform::Projection;
use crate::core::rasterizer::Rasterizer;
use crate::io::config::Config;
use crate::scene::camera::Camera;
use crate::scene::mesh::GeometryStore;
use crate::scene::texture::TextureAtlas;
use nalgebra::Point3;

/// Fixed rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub near: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub min_triangle_area: f32,
    /// Packed 0x00RRGGBB.
    pub background: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            near: 0.1,
            fov: std::f32::consts::PI / 5.0,
            min_triangle_area: 10.0,
            background: 0x0032_3232,
        }
    }
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            near: config.camera.near,
            fov: config.camera.fov_radians(),
            min_triangle_area: config.render.min_triangle_area,
            background: config.background(),
        }
    }
}

/// All state the renderer keeps between frames.
///
/// Owned by the caller and handed to
/// [`update_and_render`](crate::pipeline::renderer::update_and_render) once per
/// frame. Nothing in here is shared; one caller drives one context.
pub struct RendererContext {
    pub(crate) geometry: GeometryStore,
    pub(crate) atlas: TextureAtlas,
    pub camera: Camera,
    pub settings: RenderSettings,

    pub(crate) depth: DepthBuffer,
    pub(crate) projection: Projection,
    pub(crate) rasterizer: Rasterizer,
    /// Transformed geometry plus clip-generated vertices.
    pub(crate) mesh: ProjectedMesh,
    pub(crate) arena: ClipArena,
}

impl RendererContext {
    /// Validates `geometry` against itself and `atlas` before taking ownership,
    /// so a frame never indexes past the end of a buffer.
    pub fn new(
        geometry: GeometryStore,
        atlas: TextureAtlas,
        camera: Camera,
        settings: RenderSettings,
    ) -> Result<Self, RasterError> {
        geometry.validate()?;
        geometry.validate_textures(&atlas)?;
        let triangles = geometry.triangle_count();
        let mesh = ProjectedMesh {
            camera: Vec::with_capacity(geometry.vertices().len() + 2 * triangles),
            raster: Vec::with_capacity(geometry.vertices().len() + 2 * triangles),
            attributes: Vec::with_capacity(geometry.attributes().len() + 2 * triangles),
        };
        Ok(Self {
            geometry,
            atlas,
            camera,
            settings,
            // sized on the first frame
            depth: DepthBuffer::default(),
            projection: Projection::new(settings.near, settings.fov, 0, 0),
            rasterizer: Rasterizer::new(settings.near, settings.min_triangle_area),
            mesh,
            arena: ClipArena::with_capacity(triangles),
        })
    }

    /// Builds the camera and settings from a config file.
    pub fn from_config(
        config: &Config,
        geometry: GeometryStore,
        atlas: TextureAtlas,
    ) -> Result<Self, RasterError> {
        let [x, y, z] = config.camera.position;
        let camera = Camera::new(
            Point3::new(x, y, z),
            config.camera.speed,
            config.camera.rotation_speed,
        );
        Self::new(geometry, atlas, camera, RenderSettings::from_config(config))
    }

    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.arena.generation()
    }
}
