//! Car state
//!
//! One pooled car. The pool never reallocates; a car that leaves the road
//! (falls, explodes, is flung by a tornado) is reset in place.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use rand::Rng;

use super::vehicle::{DriverTraits, VehicleClass};
use crate::game::config::LaneSpec;
use crate::physics::{BallisticBody, EXPLODE_GRAVITY, FALL_GRAVITY, Spin};
use crate::render::InstanceTransform;

/// Seconds a crashed car stays frozen.
pub const CRASH_COOLDOWN: f32 = 5.0;

/// Tint of a crashed car.
pub const CRASH_TINT: [f32; 3] = [1.0, 0.0, 0.0];

/// Body colours picked at spawn.
const PALETTE: [[f32; 3]; 6] = [
    [0.85, 0.85, 0.88],
    [0.10, 0.12, 0.15],
    [0.20, 0.35, 0.75],
    [0.80, 0.65, 0.15],
    [0.25, 0.55, 0.30],
    [0.55, 0.20, 0.45],
];

/// What a car is doing this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarMode {
    /// On the road, following its lane
    Driving,
    /// Ballistic after losing the road or being thrown
    Falling,
    /// Launched by a high-speed crash or a hazard
    Exploding,
    /// Spiralling inside a tornado
    Captured { center: Vec3, angle: f32, radius: f32 },
    /// Held by the user
    Grabbed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub class: VehicleClass,
    pub traits: DriverTraits,
    /// Index into the layout's lane list
    pub lane: usize,
    pub position: Vec3,
    /// Longitudinal speed while driving (never negative)
    pub speed: f32,
    /// Free-flight velocity while airborne
    pub velocity: Vec3,
    /// Euler orientation and tumble rate
    pub spin: Spin,
    pub mode: CarMode,
    pub crashed: bool,
    pub crash_timer: f32,
    /// Remaining inattention time; braking is ignored while positive
    pub distraction_timer: f32,
    /// Inside the density cutoff
    pub active: bool,
    pub color: [f32; 3],
}

impl Car {
    pub fn new(class: VehicleClass, traits: DriverTraits, lane: usize, color: [f32; 3]) -> Self {
        Self {
            class,
            traits,
            lane,
            position: Vec3::ZERO,
            speed: 0.0,
            velocity: Vec3::ZERO,
            spin: Spin::default(),
            mode: CarMode::Driving,
            crashed: false,
            crash_timer: 0.0,
            distraction_timer: 0.0,
            active: false,
            color,
        }
    }

    /// Random class, traits and colour.
    pub fn random<R: Rng>(lane: usize, rng: &mut R) -> Self {
        let class = VehicleClass::random(rng);
        let traits = DriverTraits::sample(class, rng);
        let color = PALETTE[rng.random_range(0..PALETTE.len())];
        Self::new(class, traits, lane, color)
    }

    #[inline]
    pub fn is_driving(&self) -> bool {
        self.mode == CarMode::Driving
    }

    /// Ballistic, or held by the user (a held car drops when released).
    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.mode, CarMode::Falling | CarMode::Grabbed)
    }

    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.mode == CarMode::Exploding
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        matches!(self.mode, CarMode::Captured { .. })
    }

    #[inline]
    pub fn is_grabbed(&self) -> bool {
        self.mode == CarMode::Grabbed
    }

    /// Falling or exploding.
    #[inline]
    pub fn is_airborne(&self) -> bool {
        matches!(self.mode, CarMode::Falling | CarMode::Exploding)
    }

    /// Top speed under the global multiplier.
    #[inline]
    pub fn effective_max_speed(&self, speed_multiplier: f32) -> f32 {
        self.traits.max_speed * speed_multiplier
    }

    fn heading(spec: &LaneSpec) -> f32 {
        if spec.dir >= 0 { 0.0 } else { PI }
    }

    /// Put the car back on the road at `x` with all transient state cleared.
    pub fn place_on_road<R: Rng>(&mut self, x: f32, road_y: f32, spec: &LaneSpec, rng: &mut R) {
        let bonus = if self.traits.is_reckless() { 5.0 } else { 0.0 };
        self.position = Vec3::new(x, road_y, spec.z);
        self.speed = rng.random_range(self.class.behavior().initial_speed) + bonus;
        self.velocity = Vec3::ZERO;
        self.spin = Spin {
            angles: Vec3::new(0.0, Self::heading(spec), 0.0),
            rate: Vec3::ZERO,
        };
        self.mode = CarMode::Driving;
        self.crashed = false;
        self.crash_timer = 0.0;
        self.distraction_timer = 0.0;
    }

    /// Freeze after a collision.
    pub fn crash(&mut self) {
        self.crashed = true;
        self.crash_timer = CRASH_COOLDOWN;
        self.speed = 0.0;
    }

    /// Switch to ballistic falling with `velocity`.
    pub fn fall(&mut self, velocity: Vec3) {
        self.mode = CarMode::Falling;
        self.crashed = true;
        self.velocity = velocity;
        self.speed = 0.0;
    }

    /// Launch straight up with a random tumble.
    pub fn explode<R: Rng>(&mut self, vertical_speed: f32, rng: &mut R) {
        self.mode = CarMode::Exploding;
        self.crashed = true;
        self.velocity = Vec3::new(0.0, vertical_speed, 0.0);
        self.spin.rate = random_tumble(rng, 4.0);
        self.speed = 0.0;
    }

    /// Integrate a falling or exploding car. Returns true once it passed
    /// its respawn floor.
    pub fn fly(&mut self, dt: f32, fall_floor: f32, explode_floor: f32) -> bool {
        let (gravity, floor) = match self.mode {
            CarMode::Falling => (FALL_GRAVITY, fall_floor),
            CarMode::Exploding => (EXPLODE_GRAVITY, explode_floor),
            _ => return false,
        };
        let mut body = BallisticBody::new(self.position, self.velocity);
        body.integrate(gravity, dt);
        self.position = body.position;
        self.velocity = body.velocity;
        self.spin.integrate(dt);
        body.is_below(floor)
    }

    /// Render transform for pool slot `index` at sim time `time`.
    pub fn transform(&self, index: usize, time: f32) -> InstanceTransform {
        if !self.active {
            return InstanceTransform::hidden();
        }
        let mut position = self.position;
        let mut angles = self.spin.angles;
        if self.is_driving() {
            if self.crashed {
                angles.y += 0.2;
                angles.z += 0.1 * self.heading_sign();
                position.y += 0.2;
            } else if self.traits.is_reckless() {
                // Tailgater jitter
                position.x += (time * 10.0 + index as f32).sin() * 2.0;
            }
        }
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, angles.x, angles.y, angles.z);
        InstanceTransform::visible(position, rotation)
    }

    fn heading_sign(&self) -> f32 {
        if self.spin.angles.y.abs() < PI * 0.5 { 1.0 } else { -1.0 }
    }

    pub fn tint(&self) -> [f32; 3] {
        if self.crashed { CRASH_TINT } else { self.color }
    }
}

pub(crate) fn random_tumble<R: Rng>(rng: &mut R, max: f32) -> Vec3 {
    Vec3::new(
        rng.random_range(-max..=max),
        rng.random_range(-max..=max),
        rng.random_range(-max..=max),
    )
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn car() -> Car {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut car = Car::random(0, &mut rng);
        car.place_on_road(0.0, 69.0, &LaneSpec::new(-5.0, 1), &mut rng);
        car.active = true;
        car
    }

    #[test]
    fn test_placing_clears_transient_state() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut c = car();
        c.crash();
        c.distraction_timer = 1.0;
        c.place_on_road(10.0, 69.0, &LaneSpec::new(15.0, -1), &mut rng);
        assert!(c.is_driving());
        assert!(!c.crashed);
        assert_eq!(c.crash_timer, 0.0);
        assert_eq!(c.distraction_timer, 0.0);
        assert_eq!(c.position, Vec3::new(10.0, 69.0, 15.0));
        assert!(c.speed >= 10.0);
    }

    #[test]
    fn test_crash_sets_cooldown_and_red_tint() {
        let mut c = car();
        c.crash();
        assert_eq!(c.crash_timer, CRASH_COOLDOWN);
        assert_eq!(c.speed, 0.0);
        assert_eq!(c.tint(), CRASH_TINT);
    }

    #[test]
    fn test_falling_car_descends_until_floor() {
        let mut c = car();
        c.fall(Vec3::new(5.0, 0.0, 0.0));
        let mut last = c.position.y;
        let mut landed = false;
        for _ in 0..600 {
            if c.fly(1.0 / 60.0, -20.0, -50.0) {
                landed = true;
                break;
            }
            assert!(c.position.y < last);
            last = c.position.y;
        }
        assert!(landed);
        assert!(c.position.x > 0.0);
    }

    #[test]
    fn test_inactive_car_is_hidden() {
        let mut c = car();
        c.active = false;
        assert!(c.transform(0, 0.0).is_hidden());
    }
}
