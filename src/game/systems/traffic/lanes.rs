//! Lane index
//!
//! Derived per-tick ordering of driving cars in each lane. Rebuilt from
//! scratch every tick with a sort; not incremental.

use super::car::Car;
use crate::game::config::LaneSpec;

/// Gap reported for a car alone in its lane.
pub const OPEN_ROAD_GAP: f32 = 10_000.0;

/// The car directly ahead of another in the same lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leader {
    /// Pool index of the car ahead, `None` when the lane has one car
    pub index: Option<usize>,
    /// Bumper-to-bumper gap with wraparound
    pub gap: f32,
    /// Longitudinal speed of the car ahead
    pub speed: f32,
}

/// Per-lane pool indices of driving cars, sorted by x.
#[derive(Debug, Default, Clone)]
pub struct LaneIndex {
    members: Vec<Vec<usize>>,
}

impl LaneIndex {
    pub fn new(lane_count: usize) -> Self {
        Self {
            members: vec![Vec::new(); lane_count],
        }
    }

    /// Recompute membership from the cars that are on the road.
    pub fn rebuild(&mut self, cars: &[Car]) {
        for lane in &mut self.members {
            lane.clear();
        }
        for (i, car) in cars.iter().enumerate() {
            if car.active && car.is_driving() {
                if let Some(lane) = self.members.get_mut(car.lane) {
                    lane.push(i);
                }
            }
        }
        for lane in &mut self.members {
            lane.sort_by(|&a, &b| cars[a].position.x.total_cmp(&cars[b].position.x));
        }
    }

    pub fn lane(&self, lane: usize) -> &[usize] {
        self.members.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lane_count(&self) -> usize {
        self.members.len()
    }

    /// Find the car ahead of `members[slot]` in `lane`.
    ///
    /// Travelling +x the leader is the next car in sorted order, travelling
    /// -x the previous one; both wrap around the track.
    pub fn leader(&self, cars: &[Car], spec: &LaneSpec, lane: usize, slot: usize, track_length: f32) -> Leader {
        let members = self.lane(lane);
        let n = members.len();
        let me = &cars[members[slot]];
        if n < 2 {
            return Leader {
                index: None,
                gap: OPEN_ROAD_GAP,
                speed: me.traits.max_speed,
            };
        }

        let ahead = if spec.dir >= 0 {
            members[(slot + 1) % n]
        } else {
            members[(slot + n - 1) % n]
        };
        let other = &cars[ahead];
        let mut dist = (other.position.x - me.position.x) * spec.sign();
        if dist < 0.0 {
            dist += track_length;
        }
        let gap = dist - (me.class.length() + other.class.length()) * 0.5;
        Leader {
            index: Some(ahead),
            gap,
            speed: other.speed,
        }
    }
}
