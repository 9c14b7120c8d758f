// camera.rs — 轨道相机 (orbit camera driven by pointer drag and scroll)

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub const DEFAULT_PITCH: f32 = 0.86;
pub const DEFAULT_YAW: f32 = -0.86;
pub const DEFAULT_DISTANCE: f32 = 20.0;

/// Scroll zoom factor per wheel tick.
pub const ZOOM_BASE: f32 = 1.1;

pub const MIN_DISTANCE: f32 = 1e-3;
pub const MAX_DISTANCE: f32 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other(u16),
}

/// Camera orbiting the origin.
///
/// `pitch` is kept in `[-π/2, π/2]`, `yaw` in `(-π, π]`, and `distance` is
/// strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pitch: f32,
    yaw: f32,
    distance: f32,
    dragging: bool,
    cursor: Vec2,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(DEFAULT_PITCH, DEFAULT_YAW, DEFAULT_DISTANCE)
    }
}

impl OrbitCamera {
    pub fn new(pitch: f32, yaw: f32, distance: f32) -> Self {
        let mut camera = Self {
            pitch: DEFAULT_PITCH,
            yaw: DEFAULT_YAW,
            distance: DEFAULT_DISTANCE,
            dragging: false,
            cursor: Vec2::ZERO,
        };
        camera.set_pitch(pitch);
        camera.set_yaw(yaw);
        camera.set_distance(distance);
        camera
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        if pitch.is_finite() {
            self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
        }
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        if yaw.is_finite() {
            self.yaw = wrap_angle(yaw);
        }
    }

    pub fn set_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    pub fn reset(&mut self) {
        self.pitch = DEFAULT_PITCH;
        self.yaw = DEFAULT_YAW;
        self.distance = DEFAULT_DISTANCE;
    }

    /// Primary press starts a drag, release ends it. Angles are untouched.
    pub fn on_button(&mut self, button: PointerButton, pressed: bool) {
        if button == PointerButton::Primary {
            self.dragging = pressed;
        }
    }

    /// Pointer moved to `position` (pixels) inside a `viewport` (pixels).
    ///
    /// While dragging, each axis turns by the difference of the arc-cosines of
    /// the old and new positions measured from the viewport center in units
    /// of the half extent. The last position is recorded either way.
    pub fn on_cursor_moved(&mut self, position: Vec2, viewport: Vec2) {
        if self.dragging {
            let half = viewport / 2.0;

            if half.y > 0.0 {
                let pitch = self.pitch + arc_delta(self.cursor.y, position.y, half.y);
                self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
            }

            if half.x > 0.0 {
                let mut yaw = self.yaw + arc_delta(self.cursor.x, position.x, half.x);
                if yaw > PI {
                    yaw -= TAU;
                } else if yaw <= -PI {
                    yaw += TAU;
                }
                self.yaw = yaw;
            }
        }

        self.cursor = position;
    }

    /// Exponential zoom: each tick scales the distance by `1.1^-dy`.
    /// Scaling is exact only while the result stays inside
    /// `[MIN_DISTANCE, MAX_DISTANCE]`; past either bound it is clamped.
    pub fn on_scroll(&mut self, dy: f32) {
        if dy.is_finite() {
            self.distance = (self.distance * ZOOM_BASE.powf(-dy)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// `translate(0, 0, -distance) · rotX(pitch) · rotY(yaw)`
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.pitch)
            * Mat4::from_rotation_y(self.yaw)
    }
}

fn arc_delta(from: f32, to: f32, half: f32) -> f32 {
    let from = ((from - half) / half).clamp(-1.0, 1.0);
    let to = ((to - half) / half).clamp(-1.0, 1.0);
    from.acos() - to.acos()
}

/// Maps any finite angle into `(-π, π]`.
fn wrap_angle(angle: f32) -> f32 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn drag(camera: &mut OrbitCamera, from: Vec2, to: Vec2) {
        camera.on_cursor_moved(from, VIEWPORT);
        camera.on_button(PointerButton::Primary, true);
        camera.on_cursor_moved(to, VIEWPORT);
        camera.on_button(PointerButton::Primary, false);
    }

    #[test]
    fn moves_without_drag_only_track_position() {
        let mut camera = OrbitCamera::default();
        camera.on_cursor_moved(Vec2::new(10.0, 10.0), VIEWPORT);
        camera.on_cursor_moved(Vec2::new(700.0, 500.0), VIEWPORT);
        assert_eq!(camera.pitch(), DEFAULT_PITCH);
        assert_eq!(camera.yaw(), DEFAULT_YAW);
    }

    #[test]
    fn button_events_do_not_rotate() {
        let mut camera = OrbitCamera::default();
        camera.on_cursor_moved(Vec2::new(100.0, 100.0), VIEWPORT);
        camera.on_button(PointerButton::Primary, true);
        assert!(camera.is_dragging());
        assert_eq!(camera.pitch(), DEFAULT_PITCH);
        camera.on_button(PointerButton::Primary, false);
        assert!(!camera.is_dragging());
    }

    #[test]
    fn secondary_button_does_not_start_drag() {
        let mut camera = OrbitCamera::default();
        camera.on_button(PointerButton::Secondary, true);
        assert!(!camera.is_dragging());
    }

    #[test]
    fn drag_uses_arc_cosine_remap() {
        let mut camera = OrbitCamera::new(0.0, 0.0, 20.0);
        // from the center to a quarter of the half-width to the right
        drag(&mut camera, Vec2::new(400.0, 300.0), Vec2::new(500.0, 300.0));
        let expected = 0.0f32.acos() - 0.25f32.acos();
        assert!((camera.yaw() - expected).abs() < 1e-6);
        assert_eq!(camera.pitch(), 0.0);
    }

    #[test]
    fn pitch_clamps_at_the_poles() {
        let mut camera = OrbitCamera::new(1.5, 0.0, 20.0);
        // full-height drag downwards turns by π
        drag(&mut camera, Vec2::new(400.0, 0.0), Vec2::new(400.0, 600.0));
        assert_eq!(camera.pitch(), FRAC_PI_2);
        drag(&mut camera, Vec2::new(400.0, 600.0), Vec2::new(400.0, 0.0));
        drag(&mut camera, Vec2::new(400.0, 600.0), Vec2::new(400.0, 0.0));
        assert_eq!(camera.pitch(), -FRAC_PI_2);
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut camera = OrbitCamera::default();
        camera.on_button(PointerButton::Primary, true);
        camera.on_cursor_moved(Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert_eq!(camera.pitch(), DEFAULT_PITCH);
        assert_eq!(camera.yaw(), DEFAULT_YAW);
    }

    #[test]
    fn wrap_angle_keeps_half_open_range() {
        assert_eq!(wrap_angle(0.5), 0.5);
        assert_eq!(wrap_angle(PI), PI);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-6);
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(-7.0 * PI / 2.0) - PI / 2.0).abs() < 1e-4);
    }

    #[test]
    fn view_matrix_places_origin_in_front() {
        let camera = OrbitCamera::new(0.3, -1.2, 12.0);
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -12.0)).length() < 1e-5);
    }

    #[test]
    fn view_matrix_applies_yaw_before_pitch() {
        let camera = OrbitCamera::new(FRAC_PI_2, FRAC_PI_2, 1.0);
        // yaw turns +X to -Z, pitch then turns -Z to +Y
        let p = camera.view_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 1.0, -1.0)).length() < 1e-5, "{p:?}");
    }

    #[test]
    fn setters_reject_non_finite() {
        let mut camera = OrbitCamera::default();
        camera.set_distance(f32::NAN);
        camera.set_pitch(f32::INFINITY);
        camera.on_scroll(f32::NAN);
        assert_eq!(camera, OrbitCamera::default());
    }

    #[test]
    fn scroll_is_multiplicative_until_a_bound() {
        let mut camera = OrbitCamera::default();
        camera.on_scroll(3.0);
        camera.on_scroll(-1.0);
        let expected = DEFAULT_DISTANCE * ZOOM_BASE.powi(-2);
        assert!((camera.distance() - expected).abs() < 1e-4);

        for _ in 0..200 {
            camera.on_scroll(1.0);
        }
        assert_eq!(camera.distance(), MIN_DISTANCE);
        for _ in 0..400 {
            camera.on_scroll(-1.0);
        }
        assert_eq!(camera.distance(), MAX_DISTANCE);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut camera = OrbitCamera::new(0.1, 0.2, 3.0);
        camera.reset();
        assert_eq!(camera.pitch(), DEFAULT_PITCH);
        assert_eq!(camera.distance(), DEFAULT_DISTANCE);
    }
}
