use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::{Arc, Mutex};

/// Radians of rotation per pixel of relative mouse motion at pointer speed 1.0
pub const LOOK_RADIANS_PER_PIXEL: f32 = 0.002;

/// Distance the browser client sends per key press
pub const KEY_STEP_DISTANCE: f32 = 0.25;

/// Camera shared between a session's message handler and its frame pipeline
pub type SharedCamera = Arc<Mutex<CameraController>>;

/// Look tuning for one session's camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Multiplier applied on top of `LOOK_RADIANS_PER_PIXEL`
    pub pointer_speed: f32,
    /// Smallest allowed angle from the "look straight up" axis
    pub min_polar_angle: f32,
    /// Largest allowed angle from the "look straight up" axis
    pub max_polar_angle: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pointer_speed: 1.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

impl CameraConfig {
    /// Effective look sensitivity in radians per pixel
    pub fn sensitivity(&self) -> f32 {
        LOOK_RADIANS_PER_PIXEL * self.pointer_speed
    }

    /// Inclusive pitch range implied by the polar angle limits
    pub fn pitch_range(&self) -> (f32, f32) {
        (FRAC_PI_2 - self.max_polar_angle, FRAC_PI_2 - self.min_polar_angle)
    }
}

/// Axis a relative move command travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAxis {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Camera position and orientation at one instant
///
/// Orientation is yaw about world +Y followed by pitch about the local
/// right axis, with no roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl CameraTransform {
    /// Identity orientation at `position`
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// First basis column
    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Second basis column
    pub fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    /// Negated third basis column
    pub fn forward(&self) -> Vec3 {
        -(self.rotation() * Vec3::Z)
    }
}

/// Pointer-lock style first person controls for one session
#[derive(Debug, Clone)]
pub struct CameraController {
    transform: CameraTransform,
    config: CameraConfig,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            transform: CameraTransform::default(),
            config,
        }
    }

    pub fn transform(&self) -> CameraTransform {
        self.transform
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Apply relative mouse motion.
    ///
    /// Not gated here: [`Session`](crate::session::Session) only forwards
    /// motion while the client holds pointer lock. Motion that would leave
    /// the transform non-finite is ignored.
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32) {
        let sensitivity = self.config.sensitivity();
        let (min_pitch, max_pitch) = self.config.pitch_range();

        let yaw = self.transform.yaw - dx * sensitivity;
        let pitch = self.transform.pitch - dy * sensitivity;
        if !yaw.is_finite() || !pitch.is_finite() {
            return;
        }

        self.transform.yaw = yaw;
        // f32::clamp panics on an inverted range
        self.transform.pitch = pitch.min(max_pitch).max(min_pitch);
    }

    pub fn move_relative(&mut self, axis: MoveAxis, distance: f32) {
        match axis {
            MoveAxis::Forward => self.translate(self.transform.forward(), distance),
            MoveAxis::Backward => self.move_relative(MoveAxis::Forward, -distance),
            MoveAxis::Right => self.translate(self.transform.right(), distance),
            MoveAxis::Left => self.move_relative(MoveAxis::Right, -distance),
            MoveAxis::Up => self.translate(self.transform.up(), distance),
            MoveAxis::Down => self.move_relative(MoveAxis::Up, -distance),
        }
    }

    pub fn reset(&mut self, position: Vec3) {
        self.transform = CameraTransform::at(position);
    }

    fn translate(&mut self, direction: Vec3, distance: f32) {
        let position = self.transform.position + direction * distance;
        if position.is_finite() {
            self.transform.position = position;
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
