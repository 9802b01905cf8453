//! Motion policies for light objects
//!
//! A policy turns the current position and a time step into the next
//! position. Orbit circles a center at a fixed height; Wander performs a
//! random walk confined to a cylindrical territory.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::math::{constants, utils, Vec3};

/// Default orbit speed in radians per second
pub const DEFAULT_ORBIT_SPEED: f32 = 1.0;

/// Default orbit height
pub const DEFAULT_ORBIT_HEIGHT: f32 = 1.5;

/// Default wander speed in units per second
pub const DEFAULT_WANDER_SPEED: f32 = 2.0;

/// Margin kept from the territory boundary after clamping
pub const TERRITORY_EPSILON: f32 = 0.01;

/// Steepest wander direction, in degrees from the horizontal
pub const MAX_WANDER_ELEVATION: f32 = 30.0;

/// Circular path around a center point
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitMotion {
    /// Orbit center (only x and z are used)
    pub center: Vec3,
    /// Orbit radius
    pub radius: f32,
    /// Angular speed in radians per second
    pub speed: f32,
    /// Absolute height of the path
    pub height: f32,
    angle: f32,
}

impl OrbitMotion {
    /// Orbit at the default speed and height, starting at angle 0
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            speed: DEFAULT_ORBIT_SPEED,
            height: DEFAULT_ORBIT_HEIGHT,
            angle: 0.0,
        }
    }

    /// Builder: height
    #[must_use]
    pub const fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Current angle in radians, in [0, 2π)
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Position on the path at the current angle
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.center.x + self.radius * self.angle.cos(),
            self.height,
            self.center.z + self.radius * self.angle.sin(),
        )
    }

    fn step(&mut self, delta_time: f32) -> Vec3 {
        self.angle = (self.angle + self.speed * delta_time).rem_euclid(constants::TAU);
        self.position()
    }
}

/// Upright cylinder a wandering object must stay inside
///
/// Always well formed: `radius >= 0` and `min_height <= max_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Territory {
    /// Only x and z are used
    center: Vec3,
    radius: f32,
    min_height: f32,
    max_height: f32,
}

impl Territory {
    /// Create a territory
    ///
    /// A negative radius becomes zero and swapped heights are put back in order.
    pub fn new(center: Vec3, radius: f32, min_height: f32, max_height: f32) -> Self {
        if min_height > max_height {
            log::warn!("Territory heights {} > {}, swapping", min_height, max_height);
        }
        Self {
            center,
            radius: radius.max(0.0),
            min_height: min_height.min(max_height),
            max_height: max_height.max(min_height),
        }
    }

    /// Center of the cylinder
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Horizontal radius
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Lowest allowed height
    pub const fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Highest allowed height
    pub const fn max_height(&self) -> f32 {
        self.max_height
    }

    fn horizontal_offset(&self, position: Vec3) -> (f32, f32) {
        (position.x - self.center.x, position.z - self.center.z)
    }

    /// Whether `position` lies inside (boundary included)
    pub fn contains(&self, position: Vec3) -> bool {
        let (dx, dz) = self.horizontal_offset(position);
        dx.hypot(dz) <= self.radius && (self.min_height..=self.max_height).contains(&position.y)
    }

    /// Pull `position` inside, `TERRITORY_EPSILON` away from the boundary
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        let (dx, dz) = self.horizontal_offset(position);
        let distance = dx.hypot(dz);
        let limit = (self.radius - TERRITORY_EPSILON).max(0.0);

        let (x, z) = if distance > limit && distance > 0.0 {
            let factor = limit / distance;
            (self.center.x + dx * factor, self.center.z + dz * factor)
        } else {
            (position.x, position.z)
        };

        let low = self.min_height + TERRITORY_EPSILON;
        let high = self.max_height - TERRITORY_EPSILON;
        let y = if low <= high {
            utils::clamp(position.y, low, high)
        } else {
            (self.min_height + self.max_height) * 0.5
        };

        Vec3::new(x, y, z)
    }
}

/// Random walk inside a [`Territory`]
#[derive(Debug, Clone)]
pub struct WanderMotion {
    /// Allowed region
    pub territory: Territory,
    /// Speed in units per second
    pub speed: f32,
    velocity: Vec3,
    start: Vec3,
    rng: StdRng,
}

impl WanderMotion {
    /// Wander from a random start, seeded from the OS
    pub fn new(territory: Territory) -> Self {
        Self::from_rng(territory, StdRng::from_entropy())
    }

    /// Deterministic wander for a given seed
    pub fn seeded(territory: Territory, seed: u64) -> Self {
        Self::from_rng(territory, StdRng::seed_from_u64(seed))
    }

    fn from_rng(territory: Territory, mut rng: StdRng) -> Self {
        let start = random_point_in(&territory, &mut rng);
        let velocity = random_direction(&mut rng) * DEFAULT_WANDER_SPEED;
        Self {
            territory,
            speed: DEFAULT_WANDER_SPEED,
            velocity,
            start,
            rng,
        }
    }

    /// Random start position drawn at construction
    pub const fn start_position(&self) -> Vec3 {
        self.start
    }

    /// Current velocity
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn step(&mut self, position: Vec3, delta_time: f32) -> Vec3 {
        // keep the heading, follow speed changes
        self.velocity = self.velocity.try_normalize(1.0e-6).unwrap_or_else(Vec3::x) * self.speed;

        let next = position + self.velocity * delta_time;
        if self.territory.contains(next) {
            return next;
        }

        self.velocity = random_direction(&mut self.rng) * self.speed;
        self.territory.clamp(position + self.velocity * delta_time)
    }
}

fn random_point_in(territory: &Territory, rng: &mut StdRng) -> Vec3 {
    let angle = rng.gen_range(0.0..constants::TAU);
    let radius = territory.radius * rng.gen::<f32>().sqrt();
    let height = if territory.max_height > territory.min_height {
        rng.gen_range(territory.min_height..territory.max_height)
    } else {
        territory.min_height
    };

    territory.clamp(Vec3::new(
        territory.center.x + radius * angle.cos(),
        height,
        territory.center.z + radius * angle.sin(),
    ))
}

fn random_direction(rng: &mut StdRng) -> Vec3 {
    let yaw = rng.gen_range(0.0..constants::TAU);
    let max_elevation = utils::deg_to_rad(MAX_WANDER_ELEVATION);
    let elevation = rng.gen_range(-max_elevation..=max_elevation);

    Vec3::new(elevation.cos() * yaw.cos(), elevation.sin(), elevation.cos() * yaw.sin())
}

/// How a light object moves
#[derive(Debug, Clone)]
pub enum MotionPolicy {
    /// Circle a center point
    Orbit(OrbitMotion),
    /// Random walk in a territory
    Wander(WanderMotion),
}

impl MotionPolicy {
    /// Orbit with default speed and height
    pub fn orbit(center: Vec3, radius: f32) -> Self {
        Self::Orbit(OrbitMotion::new(center, radius))
    }

    /// Wander with an OS-seeded random source
    pub fn wander(territory: Territory) -> Self {
        Self::Wander(WanderMotion::new(territory))
    }

    /// Wander with a fixed seed
    pub fn wander_seeded(territory: Territory, seed: u64) -> Self {
        Self::Wander(WanderMotion::seeded(territory, seed))
    }

    /// Where the object starts
    pub fn start_position(&self) -> Vec3 {
        match self {
            Self::Orbit(orbit) => orbit.position(),
            Self::Wander(wander) => wander.start_position(),
        }
    }

    /// Change the speed (rad/s for orbit, units/s for wander)
    pub fn set_speed(&mut self, speed: f32) {
        match self {
            Self::Orbit(orbit) => orbit.speed = speed,
            Self::Wander(wander) => wander.speed = speed,
        }
    }

    /// Current speed
    pub const fn speed(&self) -> f32 {
        match self {
            Self::Orbit(orbit) => orbit.speed,
            Self::Wander(wander) => wander.speed,
        }
    }

    /// Next position after `delta_time` seconds
    pub fn step(&mut self, position: Vec3, delta_time: f32) -> Vec3 {
        match self {
            Self::Orbit(orbit) => orbit.step(delta_time),
            Self::Wander(wander) => wander.step(position, delta_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    fn territory() -> Territory {
        Territory::new(Vec3::new(2.0, 0.0, -3.0), 3.0, 0.5, 2.5)
    }

    #[test]
    fn test_orbit_start_and_step() {
        let mut orbit = MotionPolicy::orbit(Vec3::new(1.0, 0.0, 1.0), 2.0);
        assert_relative_eq!(orbit.start_position(), Vec3::new(3.0, DEFAULT_ORBIT_HEIGHT, 1.0), epsilon = EPSILON);

        let next = orbit.step(Vec3::zeros(), std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(next, Vec3::new(1.0, DEFAULT_ORBIT_HEIGHT, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn test_orbit_angle_wraps() {
        let mut orbit = OrbitMotion::new(Vec3::zeros(), 1.0);
        orbit.speed = 4.0;
        for _ in 0..20 {
            orbit.step(1.0);
            assert!((0.0..constants::TAU).contains(&orbit.angle()));
        }
    }

    #[test]
    fn test_territory_clamp_keeps_margin() {
        let territory = territory();
        let clamped = territory.clamp(Vec3::new(100.0, 10.0, -3.0));
        assert!(territory.contains(clamped));
        assert_relative_eq!(clamped.x, 2.0 + 3.0 - TERRITORY_EPSILON, epsilon = EPSILON);
        assert_relative_eq!(clamped.y, 2.5 - TERRITORY_EPSILON, epsilon = EPSILON);
    }

    #[test]
    fn test_inverted_territory_is_normalized() {
        let inverted = Territory::new(Vec3::new(2.0, 0.0, -3.0), -3.0, 2.5, 0.5);
        assert_eq!(inverted.min_height(), 0.5);
        assert_eq!(inverted.max_height(), 2.5);
        assert_eq!(inverted.radius(), 0.0);
        assert!(inverted.contains(Vec3::new(2.0, 1.0, -3.0)));

        let mut policy = MotionPolicy::wander_seeded(Territory::new(Vec3::zeros(), 3.0, 2.5, 0.5), 5);
        let mut position = policy.start_position();
        let mut heights = Vec::new();
        for _ in 0..200 {
            position = policy.step(position, 0.05);
            assert!((0.5..=2.5).contains(&position.y));
            heights.push(position.y);
        }
        // Not pinned to the midpoint
        assert!(heights.iter().any(|&y| (y - 1.5).abs() > EPSILON));
    }

    #[test]
    fn test_wander_start_is_inside() {
        for seed in 0..32 {
            let wander = WanderMotion::seeded(territory(), seed);
            assert!(territory().contains(wander.start_position()));
        }
    }

    #[test]
    fn test_wander_stays_inside_territory() {
        let mut policy = MotionPolicy::wander_seeded(territory(), 7);
        let mut position = policy.start_position();

        for _ in 0..5_000 {
            position = policy.step(position, 0.05);
            assert!(territory().contains(position), "escaped to {position:?}");
        }
    }

    #[test]
    fn test_wander_stays_inside_with_large_steps() {
        let mut policy = MotionPolicy::wander_seeded(territory(), 11);
        policy.set_speed(50.0);
        let mut position = policy.start_position();

        for _ in 0..500 {
            position = policy.step(position, 0.5);
            assert!(territory().contains(position));
        }
    }

    #[test]
    fn test_wander_direction_elevation_is_limited() {
        let mut rng = StdRng::seed_from_u64(3);
        let limit = utils::deg_to_rad(MAX_WANDER_ELEVATION).sin() + EPSILON;
        for _ in 0..1_000 {
            let direction = random_direction(&mut rng);
            assert_relative_eq!(direction.norm(), 1.0, epsilon = EPSILON);
            assert!(direction.y.abs() <= limit);
        }
    }

    #[test]
    fn test_seeded_wander_is_deterministic() {
        let mut a = MotionPolicy::wander_seeded(territory(), 42);
        let mut b = MotionPolicy::wander_seeded(territory(), 42);
        let (mut pa, mut pb) = (a.start_position(), b.start_position());
        for _ in 0..100 {
            pa = a.step(pa, 0.1);
            pb = b.step(pb, 0.1);
        }
        assert_eq!(pa, pb);
    }
}
