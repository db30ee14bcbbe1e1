use crate::core::geometry::{CameraAttribute, ProjectedMesh};
use crate::core::math::transform::{Projection, transform_normal, transform_point};
use crate::scene::mesh::GeometryStore;
use nalgebra::Matrix4;

/// Transform stage: camera-space positions, raster positions and camera-space
/// normals for every vertex and attribute of the store.
///
/// Overwrites `mesh`, which drops any vertices the clipper appended last frame.
pub fn transform_geometry(
    view: &Matrix4<f32>,
    projection: &Projection,
    geometry: &GeometryStore,
    mesh: &mut ProjectedMesh,
) {
    let ProjectedMesh {
        camera,
        raster,
        attributes,
    } = mesh;
    camera.clear();
    raster.clear();
    attributes.clear();

    camera.extend(geometry.vertices().iter().map(|v| transform_point(view, v)));
    raster.extend(camera.iter().map(|c| projection.to_raster(c)));
    attributes.extend(geometry.attributes().iter().map(|a| CameraAttribute {
        normal: transform_normal(view, &a.normal),
        color: a.color,
    }));
}
