//! Vehicle classes
//!
//! Closed set of vehicle kinds. Each carries its geometry id, length and
//! the ranges its driver traits are sampled from.

use std::ops::Range;

use rand::Rng;

/// Recklessness above this marks a reckless driver.
pub const RECKLESS_THRESHOLD: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Sedan,
    Suv,
    Sports,
    Truck,
    Van,
}

/// Sampling ranges for driver/vehicle traits.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorRanges {
    pub max_speed: Range<f32>,
    pub braking: Range<f32>,
    pub throttle: Range<f32>,
    pub initial_speed: Range<f32>,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Sedan,
        VehicleClass::Suv,
        VehicleClass::Sports,
        VehicleClass::Truck,
        VehicleClass::Van,
    ];

    /// Render geometry class; also the car-body channel index.
    pub fn geometry_id(self) -> u8 {
        match self {
            VehicleClass::Sedan => 0,
            VehicleClass::Suv => 1,
            VehicleClass::Sports => 2,
            VehicleClass::Truck => 3,
            VehicleClass::Van => 4,
        }
    }

    /// Bumper-to-bumper length (m).
    pub fn length(self) -> f32 {
        match self {
            VehicleClass::Sedan | VehicleClass::Sports => 4.5,
            VehicleClass::Suv | VehicleClass::Van => 5.0,
            VehicleClass::Truck => 10.0,
        }
    }

    pub fn behavior(self) -> BehaviorRanges {
        match self {
            VehicleClass::Truck => BehaviorRanges {
                max_speed: 22.0..30.0,
                braking: 12.0..20.0,
                throttle: 1.5..3.5,
                initial_speed: 10.0..20.0,
            },
            VehicleClass::Sports => BehaviorRanges {
                max_speed: 28.0..38.0,
                braking: 18.0..25.0,
                throttle: 3.0..5.0,
                initial_speed: 12.0..25.0,
            },
            _ => BehaviorRanges {
                max_speed: 25.0..35.0,
                braking: 15.0..25.0,
                throttle: 2.0..5.0,
                initial_speed: 10.0..25.0,
            },
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Per-car driver traits, fixed for the car's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverTraits {
    /// 0..1; above [`RECKLESS_THRESHOLD`] the driver tailgates and speeds
    pub recklessness: f32,
    pub max_speed: f32,
    pub braking: f32,
    pub throttle: f32,
}

impl DriverTraits {
    /// Sample traits for `class`. Reckless drivers get +10 top speed.
    pub fn sample<R: Rng>(class: VehicleClass, rng: &mut R) -> Self {
        let ranges = class.behavior();
        let recklessness: f32 = rng.random();
        let bonus = if recklessness > RECKLESS_THRESHOLD { 10.0 } else { 0.0 };
        Self {
            recklessness,
            max_speed: rng.random_range(ranges.max_speed) + bonus,
            braking: rng.random_range(ranges.braking),
            throttle: rng.random_range(ranges.throttle),
        }
    }

    #[inline]
    pub fn is_reckless(&self) -> bool {
        self.recklessness > RECKLESS_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn test_geometry_ids_are_distinct() {
        let mut ids: Vec<u8> = VehicleClass::ALL.iter().map(|c| c.geometry_id()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_truck_is_longest() {
        assert_eq!(VehicleClass::Truck.length(), 10.0);
        assert!(VehicleClass::ALL.iter().all(|c| c.length() <= 10.0));
    }

    #[test]
    fn test_traits_fall_in_class_ranges() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let class = VehicleClass::random(&mut rng);
            let t = DriverTraits::sample(class, &mut rng);
            let r = class.behavior();
            let bonus = if t.is_reckless() { 10.0 } else { 0.0 };
            assert!(r.max_speed.contains(&(t.max_speed - bonus)));
            assert!(r.braking.contains(&t.braking));
            assert!(r.throttle.contains(&t.throttle));
        }
    }
}
