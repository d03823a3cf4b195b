//! The track the player rides and the player's offset from it.
//!
//! The simulation never looks at track geometry directly; it only samples a
//! [`RailPath`] for a position and orientation at a progress value.

use railshot_core::math::{damp_vec3, Mat3, Quat, Vec2, Vec3};

/// Position and orientation on the rail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailPose {
    pub point: Vec3,
    pub rotation: Quat,
}

impl RailPose {
    /// Direction of travel. Identity orientation faces −z.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

/// Samples a path at progress `t`. Implementations wrap `t` into `[0, 1)`.
pub trait RailPath {
    fn pose_at(&self, t: f32) -> RailPose;
}

fn wrap(t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

/// Rotation looking along `forward` with world-up as the roll reference.
fn look_rotation(forward: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = forward.cross(Vec3::Y);
    if right.length_squared() < 1e-8 {
        right = Vec3::X;
    }
    let right = right.normalize();
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward))
}

/// Straight track running down −z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRail {
    pub start: Vec3,
    pub length: f32,
}

impl LinearRail {
    pub fn new(start: Vec3, length: f32) -> Self {
        Self { start, length }
    }
}

impl RailPath for LinearRail {
    fn pose_at(&self, t: f32) -> RailPose {
        RailPose {
            point: self.start + Vec3::NEG_Z * self.length * wrap(t),
            rotation: Quat::IDENTITY,
        }
    }
}

const ARC_SAMPLES: usize = 400;
const TENSION: f32 = 0.5;

/// Catmull-Rom spline through control points, sampled by arc length so
/// equal progress steps cover equal distance.
#[derive(Debug, Clone)]
pub struct CatmullRomRail {
    points: Vec<Vec3>,
    // Cumulative length at ARC_SAMPLES + 1 evenly spaced spline parameters.
    arc_lengths: Vec<f32>,
}

impl CatmullRomRail {
    /// Returns `None` for fewer than two control points.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        (points.len() >= 2).then(|| Self::through(points))
    }

    fn through(points: Vec<Vec3>) -> Self {
        let mut rail = Self {
            points,
            arc_lengths: Vec::with_capacity(ARC_SAMPLES + 1),
        };
        let mut total = 0.0;
        let mut last = rail.point_at_u(0.0);
        rail.arc_lengths.push(0.0);
        for i in 1..=ARC_SAMPLES {
            let p = rail.point_at_u(i as f32 / ARC_SAMPLES as f32);
            total += p.distance(last);
            rail.arc_lengths.push(total);
            last = p;
        }
        rail
    }

    /// The first level's track.
    pub fn level_one() -> Self {
        let points = vec![
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, -50.0),
            Vec3::new(10.0, 5.0, -100.0),
            Vec3::new(-10.0, 3.0, -150.0),
            Vec3::new(0.0, 8.0, -200.0),
            Vec3::new(15.0, 4.0, -250.0),
            Vec3::new(-15.0, 6.0, -300.0),
            Vec3::new(0.0, 2.0, -350.0),
            Vec3::new(0.0, 10.0, -400.0),
            Vec3::new(20.0, 5.0, -450.0),
            Vec3::new(-20.0, 8.0, -500.0),
            Vec3::new(0.0, 3.0, -550.0),
            Vec3::new(0.0, 2.0, -600.0),
        ];
        Self::through(points)
    }

    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    fn control(&self, i: isize) -> Vec3 {
        let n = self.points.len() as isize;
        if i < 0 {
            2.0 * self.points[0] - self.points[1]
        } else if i >= n {
            2.0 * self.points[(n - 1) as usize] - self.points[(n - 2) as usize]
        } else {
            self.points[i as usize]
        }
    }

    /// Point at raw spline parameter `u ∈ [0, 1]`.
    fn point_at_u(&self, u: f32) -> Vec3 {
        let segments = (self.points.len() - 1) as f32;
        let scaled = u.clamp(0.0, 1.0) * segments;
        let mut seg = scaled.floor() as isize;
        let mut w = scaled - seg as f32;
        if seg as f32 >= segments {
            seg = segments as isize - 1;
            w = 1.0;
        }

        let p0 = self.control(seg - 1);
        let p1 = self.control(seg);
        let p2 = self.control(seg + 1);
        let p3 = self.control(seg + 2);

        let t0 = TENSION * (p2 - p0);
        let t1 = TENSION * (p3 - p1);
        let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t0 - t1;
        let c3 = 2.0 * p1 - 2.0 * p2 + t0 + t1;
        p1 + w * t0 + w * w * c2 + w * w * w * c3
    }

    /// Map an arc-length fraction to the spline parameter.
    fn u_for_distance_fraction(&self, t: f32) -> f32 {
        let target = t * self.length();
        let i = self.arc_lengths.partition_point(|&len| len < target);
        if i == 0 {
            return 0.0;
        }
        if i > ARC_SAMPLES {
            return 1.0;
        }
        let before = self.arc_lengths[i - 1];
        let span = self.arc_lengths[i] - before;
        let local = if span > 0.0 { (target - before) / span } else { 0.0 };
        ((i - 1) as f32 + local) / ARC_SAMPLES as f32
    }
}

impl RailPath for CatmullRomRail {
    fn pose_at(&self, t: f32) -> RailPose {
        let t = wrap(t);
        let u = self.u_for_distance_fraction(t);
        let point = self.point_at_u(u);

        let du = 1.0 / ARC_SAMPLES as f32;
        let ahead = self.point_at_u((u + du).min(1.0));
        let behind = self.point_at_u((u - du).max(0.0));
        RailPose {
            point,
            rotation: look_rotation(ahead - behind),
        }
    }
}

/// Lateral reach of full stick deflection.
const OFFSET_RANGE_X: f32 = 6.0;
const OFFSET_RANGE_Y: f32 = 2.0;
const OFFSET_LIFT: f32 = 1.0;
const OFFSET_DAMPING: f32 = 5.0;

/// Rail progress plus the player's smoothed offset from the rail point.
#[derive(Debug, Clone, Default)]
pub struct RailRider {
    progress: f32,
    offset: Vec3,
    position: Vec3,
    pose: Option<RailPose>,
}

impl RailRider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn player_position(&self) -> Vec3 {
        self.position
    }

    pub fn pose(&self) -> Option<RailPose> {
        self.pose
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move along the rail and steer the player's offset toward the stick.
    pub fn advance(&mut self, rail: &dyn RailPath, speed: f32, movement: Vec2, delta: f32) -> Vec3 {
        self.progress += speed * delta;
        if self.progress >= 1.0 {
            self.progress = 0.0;
        }

        let pose = rail.pose_at(self.progress);
        let target = pose.right() * movement.x * OFFSET_RANGE_X
            + pose.up() * (movement.y * OFFSET_RANGE_Y + OFFSET_LIFT);
        self.offset = damp_vec3(self.offset, target, OFFSET_DAMPING, delta);
        self.position = pose.point + self.offset;
        self.pose = Some(pose);
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_rail_wraps_progress() {
        let rail = LinearRail::new(Vec3::ZERO, 100.0);
        assert_relative_eq!(rail.pose_at(0.25).point.z, -25.0);
        assert_relative_eq!(rail.pose_at(1.25).point.z, -25.0);
        assert_relative_eq!(rail.pose_at(0.0).forward().z, -1.0);
    }

    #[test]
    fn catmull_rom_passes_through_endpoints() {
        let rail = CatmullRomRail::level_one();
        let start = rail.pose_at(0.0).point;
        assert_relative_eq!(start.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(start.y, 2.0, epsilon = 1e-3);
        assert_relative_eq!(start.z, 0.0, epsilon = 1e-3);
        assert!(rail.length() > 600.0);
    }

    #[test]
    fn catmull_rom_progress_is_arc_length_uniform() {
        let rail = CatmullRomRail::level_one();
        let a = rail.pose_at(0.10).point;
        let b = rail.pose_at(0.11).point;
        let c = rail.pose_at(0.60).point;
        let d = rail.pose_at(0.61).point;
        let step = rail.length() * 0.01;
        assert_relative_eq!(a.distance(b), step, max_relative = 0.05);
        assert_relative_eq!(c.distance(d), step, max_relative = 0.05);
    }

    #[test]
    fn orientation_faces_down_the_track() {
        let rail = CatmullRomRail::level_one();
        let pose = rail.pose_at(0.02);
        assert!(pose.forward().z < -0.9);
        assert_relative_eq!(pose.right().dot(pose.forward()), 0.0, epsilon = 1e-4);
        assert!(pose.up().y > 0.0);
    }

    #[test]
    fn rejects_single_point() {
        assert!(CatmullRomRail::new(vec![Vec3::ZERO]).is_none());
    }

    #[test]
    fn rider_wraps_and_settles_on_offset() {
        let rail = LinearRail::new(Vec3::ZERO, 100.0);
        let mut rider = RailRider::new();
        for _ in 0..600 {
            rider.advance(&rail, 0.001, Vec2::new(1.0, 0.0), 1.0 / 60.0);
        }
        let pos = rider.player_position();
        assert_relative_eq!(pos.x, 6.0, epsilon = 1e-2);
        assert_relative_eq!(pos.y, 1.0, epsilon = 1e-2);

        let mut fast = RailRider::new();
        fast.advance(&rail, 2.0, Vec2::ZERO, 0.6);
        assert_eq!(fast.progress(), 0.0);
    }
}
