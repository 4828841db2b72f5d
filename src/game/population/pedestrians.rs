//! Pedestrians
//!
//! Walkers pacing back and forth along sidewalk strips supplied by the
//! scenario.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::render::{InstanceTransform, RenderChannel, RenderSink};

/// Direction people walk in an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkAxis {
    X,
    Z,
}

/// A rectangular sidewalk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedestrianArea {
    /// Center of the strip; `y` is the walking surface
    pub center: Vec3,
    /// Extent along x
    pub width: f32,
    /// Extent along z
    pub length: f32,
    pub axis: WalkAxis,
}

impl PedestrianArea {
    /// Half the extent along the walking axis.
    fn half_span(&self) -> f32 {
        match self.axis {
            WalkAxis::X => self.width * 0.5,
            WalkAxis::Z => self.length * 0.5,
        }
    }

    fn along(&self) -> usize {
        match self.axis {
            WalkAxis::X => 0,
            WalkAxis::Z => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pedestrian {
    pub area: usize,
    pub position: Vec3,
    pub speed: f32,
    /// +1 or -1 along the area's axis
    pub dir: f32,
}

#[derive(Debug, Default)]
pub struct Crowd {
    areas: Vec<PedestrianArea>,
    people: Vec<Pedestrian>,
}

impl Crowd {
    /// Spread `count` walkers round-robin over `areas`.
    pub fn new<R: Rng>(areas: Vec<PedestrianArea>, count: usize, rng: &mut R) -> Self {
        if areas.is_empty() {
            return Self::default();
        }
        let people = (0..count)
            .map(|i| {
                let area_index = i % areas.len();
                let area = &areas[area_index];
                let position = area.center
                    + Vec3::new(
                        rng.random_range(-0.5..0.5) * area.width,
                        0.0,
                        rng.random_range(-0.5..0.5) * area.length,
                    );
                Pedestrian {
                    area: area_index,
                    position,
                    speed: rng.random_range(1.0..2.0),
                    dir: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
                }
            })
            .collect();
        Self { areas, people }
    }

    pub fn update(&mut self, dt: f32) {
        for person in &mut self.people {
            let Some(area) = self.areas.get(person.area) else {
                continue;
            };
            let axis = area.along();
            let lo = area.center[axis] - area.half_span();
            let hi = area.center[axis] + area.half_span();
            person.position[axis] += person.dir * person.speed * dt;
            // Turn around at the ends of the strip
            if person.position[axis] > hi {
                person.position[axis] = hi;
                person.dir = -1.0;
            } else if person.position[axis] < lo {
                person.position[axis] = lo;
                person.dir = 1.0;
            }
        }
    }

    pub fn people(&self) -> &[Pedestrian] {
        &self.people
    }

    pub fn areas(&self) -> &[PedestrianArea] {
        &self.areas
    }

    pub fn emit(&self, sink: &mut impl RenderSink) {
        for (i, person) in self.people.iter().enumerate() {
            let axis = self.areas.get(person.area).map_or(WalkAxis::X, |a| a.axis);
            let yaw = match (axis, person.dir >= 0.0) {
                (WalkAxis::X, true) => PI * 0.5,
                (WalkAxis::X, false) => -PI * 0.5,
                (WalkAxis::Z, true) => 0.0,
                (WalkAxis::Z, false) => PI,
            };
            sink.set_transform(
                RenderChannel::Pedestrian,
                i as u32,
                InstanceTransform::visible(person.position, Quat::from_rotation_y(yaw)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn sidewalk() -> PedestrianArea {
        PedestrianArea {
            center: Vec3::new(0.0, 53.0, 140.0),
            width: 20.0,
            length: 6.0,
            axis: WalkAxis::X,
        }
    }

    #[test]
    fn test_walkers_pace_inside_their_strip() {
        let mut rng = SmallRng::seed_from_u64(12);
        let mut crowd = Crowd::new(vec![sidewalk()], 10, &mut rng);
        let mut turned = false;
        let start: Vec<f32> = crowd.people().iter().map(|p| p.dir).collect();
        for _ in 0..400 {
            crowd.update(0.1);
            for p in crowd.people() {
                assert!(p.position.x.abs() <= 10.0);
                assert!((p.position.z - 140.0).abs() <= 3.0);
                assert_eq!(p.position.y, 53.0);
            }
            turned |= crowd.people().iter().zip(&start).any(|(p, d)| p.dir != *d);
        }
        assert!(turned);
    }

    #[test]
    fn test_no_areas_means_no_people() {
        let mut rng = SmallRng::seed_from_u64(12);
        let crowd = Crowd::new(Vec::new(), 50, &mut rng);
        assert!(crowd.people().is_empty());
    }
}
