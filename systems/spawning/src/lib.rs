#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting pipe spawn commands.

use flappy_core::{Command, Event, GameStatus, PipeHeightRange, PipeView, Tuning};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_x: f32,
    spawn_spacing: f32,
    heights: PipeHeightRange,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `heights` must be non-empty; an empty range disables spawning.
    #[must_use]
    pub const fn new(
        spawn_x: f32,
        spawn_spacing: f32,
        heights: PipeHeightRange,
        rng_seed: u64,
    ) -> Self {
        Self {
            spawn_x,
            spawn_spacing,
            heights,
            rng_seed,
        }
    }

    /// Derives the configuration from validated tuning.
    #[must_use]
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(
            tuning.width as f32,
            tuning.spawn_spacing as f32,
            tuning.pipe_height_range(),
            tuning.spawn_seed,
        )
    }

    /// Left edge a pipe must fall below before the next one spawns.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.spawn_x - self.spawn_spacing
    }
}

/// Seeded system that keeps a steady stream of pipes entering the playfield.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes tick events and the pipe view to emit at most one spawn command.
    ///
    /// A pipe spawns when the playfield is empty or when the newest pipe's
    /// left edge fell below the spawn threshold.
    pub fn handle(
        &mut self,
        events: &[Event],
        status: GameStatus,
        pipes: &PipeView,
        out: &mut Vec<Command>,
    ) {
        if status != GameStatus::Playing {
            return;
        }

        let stepped = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !stepped {
            return;
        }

        let due = pipes
            .newest()
            .map_or(true, |newest| newest.x < self.config.threshold());
        if !due {
            return;
        }

        let heights = self.config.heights;
        if heights.max() <= heights.min() {
            warn!(
                min = heights.min(),
                max = heights.max(),
                "pipe height range is empty; spawning disabled"
            );
            return;
        }

        let top_height = self.rng.gen_range(heights.min()..heights.max());
        out.push(Command::SpawnPipe { top_height });
    }
}
