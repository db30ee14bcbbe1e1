use crate::core::math::transform::view_from_axes;
use crate::ui::input::FrameInput;
use log::{debug, warn};
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector2, Vector3};

/// Free-flying camera driven by per-frame input deltas.
///
/// The camera looks down its local `-z`. `x` points right and `y` up; the three
/// axes stay orthonormal and right-handed (`y = z × x`).
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    x: Vector3<f32>,
    y: Vector3<f32>,
    z: Vector3<f32>,

    /// Distance moved per frame at input magnitude 1.
    pub speed: f32,
    /// Larger values turn faster for the same mouse delta.
    pub rotation_speed: f32,

    last_mouse: Vector2<f32>,
    view_matrix: Matrix4<f32>,
    needs_update: bool,
}

impl Camera {
    pub fn new(position: Point3<f32>, speed: f32, rotation_speed: f32) -> Self {
        Self {
            position,
            x: Vector3::x(),
            y: Vector3::y(),
            z: Vector3::z(),
            speed,
            rotation_speed,
            last_mouse: Vector2::zeros(),
            view_matrix: Matrix4::identity(),
            needs_update: true,
        }
    }

    /// Applies one frame of input. Returns true if the view matrix was rebuilt.
    ///
    /// The first call always builds the matrix, even with zero input.
    pub fn update(&mut self, input: &FrameInput) -> bool {
        let mut changed = self.needs_update;

        if input.is_moving() {
            changed = true;
            self.position += self.speed
                * ((input.right - input.left) * self.x + (input.down - input.up) * self.z);
        }

        if input.mouse != self.last_mouse {
            changed = true;
            let delta = self.last_mouse - input.mouse;
            self.look_towards(delta);
            self.last_mouse = input.mouse;
        }

        if changed {
            self.view_matrix = view_from_axes(&self.x, &self.y, &self.z, &self.position);
            self.needs_update = false;
            debug!(
                "Camera at ({:.3}, {:.3}, {:.3}) facing ({:.3}, {:.3}, {:.3})",
                self.position.x, self.position.y, self.position.z, -self.z.x, -self.z.y, -self.z.z
            );
        }
        changed
    }

    /// Rotates the axes by the shortest arc that takes `z` onto the target
    /// `normalize(delta.x * x + delta.y * y + (100 / rotation_speed) * z)`.
    fn look_towards(&mut self, delta: Vector2<f32>) {
        let k = 100.0 / self.rotation_speed;
        let target = delta.x * self.x + delta.y * self.y + k * self.z;
        if !target.iter().all(|c| c.is_finite()) {
            warn!(
                "Ignoring mouse delta ({}, {}) at rotation speed {}",
                delta.x, delta.y, self.rotation_speed
            );
            return;
        }
        let Some(nz) = target.try_normalize(f32::EPSILON) else {
            return;
        };
        // None only for opposite vectors, which k * z rules out for any sane rotation speed
        let q = UnitQuaternion::rotation_between(&self.z, &nz).unwrap_or_else(UnitQuaternion::identity);

        let x = q * self.x;
        let x = (x - nz * x.dot(&nz)).normalize();
        self.z = nz;
        self.x = x;
        self.y = nz.cross(&x);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    /// Right, up and backward axes, in that order.
    pub fn axes(&self) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        (self.x, self.y, self.z)
    }

    pub fn last_mouse(&self) -> Vector2<f32> {
        self.last_mouse
    }
}
