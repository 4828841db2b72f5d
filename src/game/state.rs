//! Simulation State
//!
//! Central context that owns every subsystem and runs one tick in a fixed
//! order:
//!
//! 1. hazards advance and enqueue events
//! 2. queued events are dispatched (explosions, burns, bursts)
//! 3. debris falls
//! 4. traffic drives against the updated grid
//! 5. events raised by traffic are dispatched
//! 6. particles and ambient population move
//!
//! Grid mutation therefore always completes before traffic checks for
//! ground in the same tick.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::game::config::{ConfigError, ScenarioKind, SimConfig, TrafficLayout};
use crate::game::events::{EventQueue, ExplosionRequest, SimEvent};
use crate::game::input::{GrabTarget, HazardKind, HeldObject, InteractionRequest};
use crate::game::physics::AnchorPredicate;
use crate::game::population::Population;
use crate::game::scenarios::Scenario;
use crate::game::systems::traffic::DRAG_RATE;
use crate::game::systems::{
    DestructionSystem, ExplosionParticles, Hazard, HazardContext, HazardZone, MeteorSystem,
    TornadoSystem, TrafficContext, TrafficSimulator, VolcanoSystem,
};
use crate::game::terrain::BuildReport;
use crate::render::{InstanceTransform, RenderChannel, RenderSink};
use crate::world::{GridConfig, GridError, VoxelGrid};

/// Longest step a single tick integrates; slower frames are clamped.
pub const MAX_TICK_DT: f32 = 0.1;

/// Burst size for a ship going down.
const SHIP_BURST_SCALE: f32 = 4.0;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build scenario grid: {0}")]
    Grid(#[from] GridError),
}

/// Central simulation state holding all systems
pub struct Simulation {
    config: SimConfig,
    scenario: Box<dyn Scenario>,

    // === World ===
    grid: VoxelGrid,
    build: BuildReport,
    destruction: DestructionSystem,

    // === Actors ===
    traffic: TrafficSimulator,
    population: Population,
    particles: ExplosionParticles,

    // === Hazards ===
    volcano: VolcanoSystem,
    meteors: MeteorSystem,
    tornado: TornadoSystem,

    events: EventQueue,
    rng: SmallRng,
    held: Option<HeldObject>,
    /// Voxel and static transforms still need their first emit
    needs_full_emit: bool,
    last_dt: f32,
    time: f32,
    ticks: u64,
}

impl Simulation {
    /// Validate `config` and load its scenario.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let grid = VoxelGrid::new(GridConfig::default());
        let traffic = TrafficSimulator::new(TrafficLayout::default(), 0.0, &grid, &mut rng);

        let mut sim = Self {
            scenario: config.scenario.instantiate(),
            config,
            grid,
            build: BuildReport::default(),
            destruction: DestructionSystem::new(AnchorPredicate::none()),
            traffic,
            population: Population::default(),
            particles: ExplosionParticles::new(),
            volcano: VolcanoSystem::new(),
            meteors: MeteorSystem::new(),
            tornado: TornadoSystem::new(),
            events: EventQueue::new(),
            rng,
            held: None,
            needs_full_emit: true,
            last_dt: 1.0 / 60.0,
            time: 0.0,
            ticks: 0,
        };
        sim.load_scenario(sim.config.scenario)?;
        Ok(sim)
    }

    /// Tear everything down and rebuild it for `kind`.
    pub fn load_scenario(&mut self, kind: ScenarioKind) -> Result<(), SimError> {
        let scenario = kind.instantiate();
        let mut grid = VoxelGrid::new(GridConfig::default());
        let build = scenario.build(&mut grid)?;

        let layout = self
            .config
            .traffic_override
            .clone()
            .unwrap_or_else(|| scenario.traffic_layout());
        let mut traffic =
            TrafficSimulator::new(layout, self.config.traffic_density, &grid, &mut self.rng);
        traffic.set_speed_multiplier(self.config.speed_multiplier);
        traffic.set_fog_density(self.config.fog_density);

        self.destruction.reset(scenario.anchors());
        self.population = Population::new(
            scenario.has_shipping_lane(),
            scenario.pedestrian_areas(),
            scenario.pedestrian_count(),
            &mut self.rng,
        );
        self.volcano.clear();
        self.meteors.clear();
        self.tornado = TornadoSystem::new();
        self.particles.clear();
        self.events = EventQueue::new();
        self.held = None;
        self.needs_full_emit = true;

        tracing::info!(
            scenario = scenario.name(),
            voxels = grid.len(),
            static_pieces = build.static_pieces.len(),
            cars = traffic.cars().len(),
            "scenario loaded"
        );

        self.grid = grid;
        self.build = build;
        self.traffic = traffic;
        self.scenario = scenario;
        self.config.scenario = kind;
        Ok(())
    }

    // ========================================================================
    // TICK
    // ========================================================================

    /// Advance the whole simulation by `dt` seconds (clamped to
    /// [`MAX_TICK_DT`]).
    ///
    /// Hidden voxel slots and released debris ids queue up until the next
    /// [`Self::emit_render`]. A host that never renders keeps both queues
    /// bounded by the voxel count of the loaded scenario.
    pub fn tick(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        let dt = dt.min(MAX_TICK_DT);
        self.last_dt = dt;
        self.time += dt;

        {
            let mut ctx = HazardContext {
                dt,
                grid: &self.grid,
                traffic: &mut self.traffic,
                events: &mut self.events,
                rng: &mut self.rng,
            };
            self.volcano.update(&mut ctx);
            self.meteors.update(&mut ctx);
            self.tornado.update(&mut ctx);
        }
        self.dispatch();

        self.destruction.update(dt);

        {
            let zone = self.volcano.is_active().then_some(&self.volcano as &dyn HazardZone);
            let mut ctx = TrafficContext {
                dt,
                grid: &self.grid,
                zone,
                tornado: self.tornado.center(),
                events: &mut self.events,
                rng: &mut self.rng,
            };
            self.traffic.update(&mut ctx);
        }
        self.dispatch();

        self.particles.update(dt);
        let zone = self.volcano.is_active().then_some(&self.volcano as &dyn HazardZone);
        self.population.update(dt, zone, &mut self.rng);
        self.ticks += 1;
    }

    /// Drain the event queue into the subsystems that act on it.
    fn dispatch(&mut self) {
        while !self.events.is_empty() {
            for event in self.events.drain() {
                match event {
                    SimEvent::Explosion(request) => self.explode(request),
                    SimEvent::Destroy { x, z } => {
                        self.destruction.destroy_at(&mut self.grid, x, z, &mut self.rng);
                    }
                    SimEvent::Burst { position, scale } => {
                        self.particles.burst(position, scale, &mut self.rng);
                    }
                }
            }
        }
    }

    fn explode(&mut self, request: ExplosionRequest) {
        let ExplosionRequest {
            center,
            destroy_radius,
            force_radius,
            strength,
            burst_scale,
        } = request;

        let outcome = self
            .destruction
            .blast(&mut self.grid, center, destroy_radius, &mut self.rng);
        let cars = self
            .traffic
            .apply_explosion(center, force_radius, strength, &mut self.rng);
        self.destruction
            .debris_mut()
            .apply_blast(center, force_radius, strength);
        let ships = self.population.ships.sink_within(center, force_radius);
        for position in &ships {
            self.particles.burst(*position, SHIP_BURST_SCALE, &mut self.rng);
        }
        self.particles.burst(center, burst_scale, &mut self.rng);

        tracing::debug!(
            x = center.x,
            z = center.z,
            removed = outcome.removed,
            detached = outcome.detached,
            cars,
            ships = ships.len(),
            "explosion"
        );
    }

    // ========================================================================
    // REQUESTS
    // ========================================================================

    /// Apply an interaction request. Returns false when it had no effect
    /// (nothing to grab, nothing held, hazard already running).
    pub fn request(&mut self, request: InteractionRequest) -> bool {
        match request {
            InteractionRequest::Explode { point } => {
                self.events.explode(ExplosionRequest::user(point));
                true
            }
            InteractionRequest::Grab { target } => self.grab(target),
            InteractionRequest::Drag { point } => self.drag(point),
            InteractionRequest::Release => self.release(),
            InteractionRequest::Trigger(kind) => self.trigger_hazard(kind),
        }
    }

    fn grab(&mut self, target: GrabTarget) -> bool {
        self.release();
        self.held = match target {
            GrabTarget::Car(i) => self.traffic.grab(i).then_some(HeldObject::Car(i)),
            GrabTarget::Debris(id) => self.hold_debris(id),
            GrabTarget::Voxel(point) => self
                .destruction
                .pull_stack(&mut self.grid, point.x, point.z, &mut self.rng)
                .and_then(|id| self.hold_debris(id)),
            GrabTarget::Ship(i) => self.population.ships.grab(i).then_some(HeldObject::Ship(i)),
        };
        self.held.is_some()
    }

    fn hold_debris(&mut self, id: u32) -> Option<HeldObject> {
        let debris = self.destruction.debris_mut().get_mut(id)?;
        debris.grabbed = true;
        debris.body.velocity = Vec3::ZERO;
        Some(HeldObject::Debris(id))
    }

    fn drag(&mut self, point: Vec3) -> bool {
        let Some(held) = self.held else {
            return false;
        };
        let dt = self.last_dt;
        match held {
            HeldObject::Car(i) => self.traffic.drag(i, point, dt),
            HeldObject::Debris(id) => {
                if let Some(d) = self.destruction.debris_mut().get_mut(id) {
                    d.body.position = d.body.position.lerp(point, (DRAG_RATE * dt).min(1.0));
                }
            }
            HeldObject::Ship(i) => self.population.ships.drag(i, point, DRAG_RATE * dt),
        }
        true
    }

    fn release(&mut self) -> bool {
        let Some(held) = self.held.take() else {
            return false;
        };
        match held {
            HeldObject::Car(i) => self.traffic.release(i),
            HeldObject::Debris(id) => {
                if let Some(d) = self.destruction.debris_mut().get_mut(id) {
                    d.grabbed = false;
                }
            }
            HeldObject::Ship(i) => self.population.ships.release(i),
        }
        true
    }

    // ========================================================================
    // HAZARDS
    // ========================================================================

    /// Start a hazard. Returns false if it was already running.
    pub fn trigger_hazard(&mut self, kind: HazardKind) -> bool {
        let mut ctx = HazardContext {
            dt: self.last_dt,
            grid: &self.grid,
            traffic: &mut self.traffic,
            events: &mut self.events,
            rng: &mut self.rng,
        };
        let hazard: &mut dyn Hazard = match kind {
            HazardKind::Volcano => &mut self.volcano,
            HazardKind::MeteorShower => &mut self.meteors,
            HazardKind::Tornado => &mut self.tornado,
        };
        if hazard.is_active() {
            tracing::debug!(hazard = hazard.name(), "already active");
            return false;
        }
        hazard.trigger(&mut ctx);
        true
    }

    pub fn hazard_active(&self, kind: HazardKind) -> bool {
        match kind {
            HazardKind::Volcano => self.volcano.is_active(),
            HazardKind::MeteorShower => self.meteors.is_active(),
            HazardKind::Tornado => self.tornado.is_active(),
        }
    }

    /// End the tornado now; captured cars are thrown clear immediately.
    pub fn deactivate_tornado(&mut self) -> usize {
        self.tornado.deactivate(&mut self.traffic)
    }

    // ========================================================================
    // RUNTIME SETTINGS
    // ========================================================================

    pub fn set_traffic_density(&mut self, density: f32) {
        self.config.traffic_density = density.clamp(0.0, 1.0);
        self.traffic.set_density(self.config.traffic_density);
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.traffic.set_speed_multiplier(multiplier);
        self.config.speed_multiplier = self.traffic.speed_multiplier();
    }

    pub fn set_fog_density(&mut self, fog: f32) {
        self.traffic.set_fog_density(fog);
        self.config.fog_density = self.traffic.fog_density();
    }

    // ========================================================================
    // RENDER
    // ========================================================================

    /// Push this tick's transforms and tints into `sink`.
    ///
    /// The first call after a scenario load writes every voxel and static
    /// piece; later calls only write voxels that disappeared.
    pub fn emit_render(&mut self, sink: &mut impl RenderSink) {
        if self.needs_full_emit {
            for key in self.grid.cell_keys() {
                for record in self.grid.cell_records(key) {
                    let channel = RenderChannel::Voxels(record.batch);
                    sink.set_transform(
                        channel,
                        record.slot,
                        InstanceTransform::new(record.position, Quat::IDENTITY, record.extents),
                    );
                    sink.set_tint(channel, record.slot, record.material.color());
                }
            }
            if let Some(batch) = self.build.static_batch {
                for (slot, piece) in self.build.static_pieces.iter().enumerate() {
                    sink.set_transform(
                        RenderChannel::Voxels(batch),
                        slot as u32,
                        InstanceTransform::new(piece.position, Quat::IDENTITY, piece.extents),
                    );
                }
            }
            self.needs_full_emit = false;
        }
        for (batch, slot) in self.grid.drain_hidden_slots() {
            sink.set_transform(RenderChannel::Voxels(batch), slot, InstanceTransform::hidden());
        }

        let debris = self.destruction.debris_mut();
        for id in debris.drain_released() {
            sink.set_transform(RenderChannel::Debris, id, InstanceTransform::hidden());
            sink.release(RenderChannel::Debris, id);
        }
        for d in debris.iter() {
            sink.set_transform(
                RenderChannel::Debris,
                d.id,
                InstanceTransform::new(d.position(), d.rotation(), d.extents),
            );
            sink.set_tint(RenderChannel::Debris, d.id, d.material.color());
        }

        self.traffic.emit(sink);
        self.population.emit(sink);
        self.particles.emit(sink);
        self.volcano.emit(sink);
        self.meteors.emit(sink);
        self.tornado.emit(sink);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scenario_name(&self) -> &'static str {
        self.scenario.name()
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn build_report(&self) -> &BuildReport {
        &self.build
    }

    pub fn destruction(&self) -> &DestructionSystem {
        &self.destruction
    }

    pub fn traffic(&self) -> &TrafficSimulator {
        &self.traffic
    }

    pub fn traffic_mut(&mut self) -> &mut TrafficSimulator {
        &mut self.traffic
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn particles(&self) -> &ExplosionParticles {
        &self.particles
    }

    pub fn volcano(&self) -> &VolcanoSystem {
        &self.volcano
    }

    pub fn meteors(&self) -> &MeteorSystem {
        &self.meteors
    }

    pub fn tornado(&self) -> &TornadoSystem {
        &self.tornado
    }

    pub fn held(&self) -> Option<HeldObject> {
        self.held
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
