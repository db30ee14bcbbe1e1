use crate::io::config::InputStep;
use nalgebra::Vector2;

/// Input consumed by one frame.
///
/// Movement magnitudes are non-negative; at most one of each opposing pair is
/// expected to be active. `mouse` is the cumulative look position accumulated by
/// the caller; the camera diffs it against the last value it saw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
    pub mouse: Vector2<f32>,
}

impl FrameInput {
    pub fn idle(mouse: Vector2<f32>) -> Self {
        Self {
            mouse,
            ..Self::default()
        }
    }

    pub fn is_moving(&self) -> bool {
        self.up > 0.0 || self.down > 0.0 || self.left > 0.0 || self.right > 0.0
    }
}

/// A pre-recorded input sequence for headless runs.
///
/// Each step holds its movement for a number of frames and adds its mouse
/// delta to the cumulative position on the step's first frame.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    frames: Vec<FrameInput>,
}

impl InputScript {
    pub fn from_steps(steps: &[InputStep]) -> Self {
        let mut frames = Vec::new();
        let mut mouse = Vector2::zeros();
        for step in steps {
            mouse += Vector2::from(step.mouse);
            let frame = FrameInput {
                up: step.up.max(0.0),
                down: step.down.max(0.0),
                left: step.left.max(0.0),
                right: step.right.max(0.0),
                mouse,
            };
            frames.extend(std::iter::repeat_n(frame, step.frames));
        }
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Input for `frame`; past the end the last mouse position is held with no movement.
    pub fn frame(&self, frame: usize) -> FrameInput {
        match self.frames.get(frame) {
            Some(input) => *input,
            None => FrameInput::idle(self.frames.last().map_or(Vector2::zeros(), |f| f.mouse)),
        }
    }
}
