//! Momentum - Headless first-person movement simulation
//!
//! Runs the movement controller on a rapier test course at a fixed step,
//! driven by a timed input script, and logs every state change and event.
//!
//! ```text
//! momentum [SETTINGS.toml] [--trace OUT.json]
//! momentum --init
//! ```

mod course;
mod script;
mod settings;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::{Quat, Vec3};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use momentum_core::{CapsuleDimensions, GameTime};
use momentum_game::input::InputState;
use momentum_game::movement::{MovementController, MovementEvent, MovementState};
use momentum_game::stamina::{StaminaEvent, StaminaPool};
use momentum_physics::{CharacterBody, CharacterBodyConfig, PhysicsWorld};

use settings::MomentumSettings;

/// Command line options
#[derive(Debug, Default)]
struct Args {
    settings: Option<PathBuf>,
    trace: Option<PathBuf>,
    init: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Self::default();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--trace" => {
                    let path = iter.next().context("--trace needs a file path")?;
                    args.trace = Some(PathBuf::from(path));
                }
                "--init" => args.init = true,
                _ if args.settings.is_none() => args.settings = Some(PathBuf::from(arg)),
                _ => anyhow::bail!("Unexpected argument '{}'", arg),
            }
        }
        Ok(args)
    }
}

/// One fixed tick of the run, as written to the trace
#[derive(Debug, Serialize)]
struct TraceFrame {
    tick: u64,
    time: f64,
    state: MovementState,
    position: Vec3,
    velocity: Vec3,
    grounded: bool,
    capsule: CapsuleDimensions,
    stamina: u32,
    events: Vec<MovementEvent>,
}

/// Everything one headless run owns
struct Simulation {
    world: PhysicsWorld,
    body: CharacterBody,
    controller: MovementController,
    stamina: StaminaPool,
    input: InputState,
    camera: Quat,
    time: GameTime,
    trace: Vec<TraceFrame>,
}

impl Simulation {
    fn new(settings: &MomentumSettings) -> Self {
        let mut world = PhysicsWorld::new();
        course::build(&mut world);

        let mut body = CharacterBody::with_config(CharacterBodyConfig {
            capsule: settings.movement.capsule,
            ..CharacterBodyConfig::default()
        });
        body.spawn(&mut world, course::SPAWN);

        Self {
            world,
            body,
            controller: MovementController::new(settings.movement.clone()),
            stamina: StaminaPool::new(settings.stamina.clone()),
            input: InputState::new(),
            camera: Quat::IDENTITY,
            time: GameTime::new(settings.time.clone()),
            trace: Vec::new(),
        }
    }

    /// One movement tick in the order the controller expects
    fn tick(&mut self, dt: f32) {
        let snapshot = self.input.snapshot(self.camera);
        self.input.clear_frame();

        if let Some(StaminaEvent::Recharged) = self.stamina.update(dt) {
            debug!("Stamina recharged to {}", self.stamina.charges());
        }

        let previous = self.controller.state();
        let (velocity, rotation) = {
            let mut motor = self.body.motor(&self.world);
            self.controller
                .before_update(&mut motor, &mut self.stamina, &snapshot, dt);
            let velocity = self.controller.update_velocity(&motor, dt);
            (velocity, self.controller.update_rotation(&motor))
        };

        self.body.set_rotation(rotation);
        let achieved = self.body.move_with_velocity(&mut self.world, velocity, dt);
        self.controller.set_velocity(achieved);

        {
            let motor = self.body.motor(&self.world);
            self.controller.after_update(&motor, dt);
        }

        let state = self.controller.state();
        if state != previous {
            info!(
                "[{:>6.2}s] {:?} -> {:?} at {:.1}",
                self.time.total_time, previous, state, self.body.position()
            );
        }

        let events = self.controller.drain_events();
        for event in &events {
            info!("[{:>6.2}s] {:?}", self.time.total_time, event);
        }

        self.trace.push(TraceFrame {
            tick: self.time.tick_count,
            time: self.time.total_time,
            state,
            position: self.body.position(),
            velocity: self.controller.velocity(),
            grounded: self.body.grounding().is_stable_on_ground,
            capsule: self.body.capsule(),
            stamina: self.stamina.charges(),
            events,
        });
    }

    fn run(&mut self, settings: &MomentumSettings) {
        let simulation = &settings.simulation;
        let frame_dt = 1.0 / simulation.frame_rate.max(1.0);
        let mut script = simulation.script.clone();

        info!(
            "Running {:.1}s at {:.0} fps with a {:.4}s movement step and {} script steps",
            simulation.duration,
            simulation.frame_rate,
            self.time.fixed_dt(),
            script.len()
        );

        while self.time.total_time < simulation.duration as f64 {
            self.time.update(frame_dt);
            script.advance(self.time.total_time as f32, &mut self.input, &mut self.camera);

            let dt = self.time.fixed_dt();
            for _ in 0..self.time.fixed_steps() {
                self.tick(dt);
            }
        }

        if !script.is_finished() {
            debug!("Run ended before the script did");
        }
        info!(
            "Finished after {} ticks at {:.1}, state {:?}",
            self.time.tick_count,
            self.body.position(),
            self.controller.state()
        );
    }

    fn write_trace(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.trace)
            .with_context(|| format!("Failed to write trace to {:?}", path))?;
        info!("Wrote {} trace frames to {:?}", self.trace.len(), path);
        Ok(())
    }
}

fn main() -> Result<()> {
    // Initialize logging, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let args = Args::parse()?;

    if args.init {
        MomentumSettings::default().save()?;
        return Ok(());
    }

    let mut settings = match &args.settings {
        Some(path) => MomentumSettings::load_from(path)?,
        None => MomentumSettings::load(),
    };
    if args.trace.is_some() {
        settings.simulation.trace_path = args.trace;
    }

    info!("Starting Momentum simulation...");
    let mut simulation = Simulation::new(&settings);
    simulation.run(&settings);

    if let Some(path) = &settings.simulation.trace_path {
        simulation.write_trace(path)?;
    }

    Ok(())
}
