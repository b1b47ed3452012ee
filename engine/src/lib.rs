#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Caller-owned simulation engine for Flappy.
//!
//! The [`Engine`] owns the authoritative world together with the scoring,
//! collision, and spawning systems. Presentation code calls [`Engine::tick`]
//! once per frame and renders the returned snapshot, while input code calls
//! [`Engine::flap`]. The engine never schedules itself; callers stop their
//! frame loop once the status becomes [`GameStatus::Over`].

pub mod config;

use std::path::Path;

use anyhow::Result;
use flappy_core::{Command, ConfigError, Event, GameSnapshot, GameStatus, StartError, Tuning};
use flappy_system_collision::Collision;
use flappy_system_scoring::Scoring;
use flappy_system_spawning::{Config as SpawningConfig, Spawning};
use flappy_world::{self as world, query, World};

/// Single game instance driven by serialized calls from the caller.
#[derive(Debug)]
pub struct Engine {
    world: World,
    scoring: Scoring,
    collision: Collision,
    spawning: Spawning,
    events: Vec<Event>,
}

impl Engine {
    /// Creates an engine in the `Ready` state after validating the tuning.
    pub fn new(tuning: Tuning) -> Result<Self, ConfigError> {
        let spawning = Spawning::new(SpawningConfig::from_tuning(&tuning));
        let world = World::new(tuning)?;
        Ok(Self {
            world,
            scoring: Scoring,
            collision: Collision,
            spawning,
            events: Vec::new(),
        })
    }

    /// Creates an engine from TOML tuning overrides.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let tuning = config::parse_tuning(contents)?;
        Ok(Self::new(tuning)?)
    }

    /// Creates an engine from the TOML tuning file at `path`.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let tuning = config::load_tuning(path)?;
        Ok(Self::new(tuning)?)
    }

    /// Tuning the engine was built with.
    #[must_use]
    pub fn tuning(&self) -> &Tuning {
        query::tuning(&self.world)
    }

    /// Records that the background asset finished loading.
    pub fn mark_assets_ready(&mut self) {
        self.events.clear();
        self.dispatch(Command::MarkAssetsReady);
    }

    /// Reports whether [`Engine::start`] may begin a run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        query::assets_ready(&self.world)
    }

    /// Returns to the `Ready` state with a fresh bird, no pipes, and no score.
    pub fn reset(&mut self) {
        self.events.clear();
        self.dispatch(Command::Reset);
    }

    /// Starts the run.
    ///
    /// Fails while the background asset is still loading, leaving the game in
    /// `Ready`. Calling it while already playing or after the run ended does
    /// nothing.
    pub fn start(&mut self) -> Result<(), StartError> {
        self.events.clear();
        self.dispatch(Command::Start);
        let rejection = self.events.iter().find_map(|event| match event {
            Event::StartRejected { reason } => Some(*reason),
            _ => None,
        });
        match rejection {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Gives the bird an upward impulse. Ignored unless playing.
    pub fn flap(&mut self) {
        self.events.clear();
        self.dispatch(Command::Flap);
    }

    /// Advances the simulation by one frame and returns the resulting snapshot.
    ///
    /// Systems run in a fixed order after the world steps: scoring, then
    /// collision, then spawning. A point earned on the frame the run ends
    /// still counts, and no pipe spawns after the run ended.
    pub fn tick(&mut self) -> GameSnapshot {
        self.events.clear();
        let mut frame = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut frame);

        if !frame.is_empty() {
            let mut commands = Vec::new();
            self.scoring.handle(
                &frame,
                &query::bird(&self.world),
                &query::pipe_view(&self.world),
                &mut commands,
            );
            self.execute(&mut commands);

            self.collision.handle(
                &frame,
                &query::bird(&self.world),
                &query::pipe_view(&self.world),
                &query::playfield(&self.world),
                &mut commands,
            );
            self.execute(&mut commands);

            self.spawning.handle(
                &frame,
                query::status(&self.world),
                &query::pipe_view(&self.world),
                &mut commands,
            );
            self.execute(&mut commands);
        }

        frame.append(&mut self.events);
        self.events = frame;
        self.snapshot()
    }

    /// Owned copy of the current game state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        query::snapshot(&self.world)
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        query::status(&self.world)
    }

    /// Points accumulated in the current run.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Events emitted by the most recent engine call, in order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    fn dispatch(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn execute(&mut self, commands: &mut Vec<Command>) {
        for command in commands.drain(..) {
            self.dispatch(command);
        }
    }
}
