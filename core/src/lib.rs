#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Flappy engine.
//!
//! This crate defines the message surface that connects the engine facade, the
//! authoritative world, and pure systems. Callers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable snapshots, and
//! respond exclusively with new command batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a single run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The bird rests mid-playfield waiting for the run to start.
    #[default]
    Ready,
    /// The simulation advances on every tick.
    Playing,
    /// The run ended. Only a reset leaves this state.
    Over,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Reinitialises the bird, clears pipes and score, and returns to `Ready`.
    Reset,
    /// Records that the background asset finished loading.
    MarkAssetsReady,
    /// Requests the transition from `Ready` to `Playing`.
    Start,
    /// Overrides the bird's vertical velocity with the flap impulse.
    Flap,
    /// Advances the simulation by one fixed step.
    Tick,
    /// Requests a new pipe at the right edge of the playfield.
    SpawnPipe {
        /// Height of the top segment measured from the top of the playfield.
        top_height: u32,
    },
    /// Requests a point for a pipe the bird has passed.
    AwardPoint {
        /// Pipe that crossed the bird's x-coordinate.
        pipe: PipeId,
    },
    /// Requests that the current run ends.
    EndRun {
        /// Contact that ended the run.
        cause: CollisionCause,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The world was reinitialised.
    GameReset,
    /// The background asset is available, so runs may start.
    AssetsReady,
    /// The game moved between two statuses.
    StatusChanged {
        /// Status before the transition.
        from: GameStatus,
        /// Status after the transition.
        to: GameStatus,
    },
    /// A start request was refused; the status did not change.
    StartRejected {
        /// Reason the run could not start.
        reason: StartError,
    },
    /// The bird received a flap impulse.
    BirdFlapped {
        /// Vertical velocity after the flap.
        velocity: f32,
    },
    /// The simulation clock advanced by one step.
    TimeAdvanced {
        /// Index of the tick that just completed, starting at one for each run.
        tick: u64,
    },
    /// Gravity moved the bird.
    BirdMoved {
        /// Vertical position before integration.
        from_y: f32,
        /// Vertical position after integration.
        to_y: f32,
        /// Vertical velocity after integration.
        velocity: f32,
    },
    /// A pipe scrolled left.
    PipeAdvanced {
        /// Pipe that moved.
        pipe: PipeId,
        /// Left edge before the step.
        from_x: f32,
        /// Left edge after the step.
        to_x: f32,
    },
    /// A pipe scrolled fully past the left edge and was discarded.
    PipeDespawned {
        /// Pipe that was removed.
        pipe: PipeId,
    },
    /// A pipe entered the playfield.
    PipeSpawned {
        /// Identifier allocated to the pipe.
        pipe: PipeId,
        /// Left edge of the new pipe.
        x: f32,
        /// Height of the top segment.
        top_height: u32,
        /// Height of the bottom segment above the ground band.
        bottom_height: u32,
    },
    /// The score increased after the bird passed a pipe.
    ScoreIncreased {
        /// Pipe that was cleared.
        pipe: PipeId,
        /// Score after the increment.
        score: u32,
    },
    /// The run ended after a collision.
    RunEnded {
        /// Contact that ended the run.
        cause: CollisionCause,
        /// Score at the moment the run ended.
        final_score: u32,
    },
}

/// Unique identifier assigned to a pipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PipeId(u32);

impl PipeId {
    /// Creates a new pipe identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Contact that ends a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionCause {
    /// The bird touched the ground band.
    Ground,
    /// The bird hit one of the pipe's segments.
    Pipe(PipeId),
}

/// Reasons a start request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum StartError {
    /// The background asset has not finished loading.
    #[error("background asset has not finished loading")]
    AssetsNotReady,
}

/// Reasons a [`Tuning`] is rejected at construction time.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A kinematic parameter is NaN or infinite.
    #[error("`{field}` must be finite, got {value}")]
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied for the field.
        value: f32,
    },
    /// A length or speed that must be strictly positive is not.
    #[error("`{field}` must be greater than zero")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The ground band leaves no room for the sky.
    #[error("ground height {ground_height} must be smaller than playfield height {height}")]
    GroundTooTall {
        /// Configured ground band height.
        ground_height: u32,
        /// Configured playfield height.
        height: u32,
    },
    /// The bird does not fit inside the playfield at its resting position.
    #[error("bird of size {size} at x {x} does not fit a {width}x{sky_height} sky")]
    BirdOutOfBounds {
        /// Configured bird x-coordinate.
        x: f32,
        /// Configured bird size.
        size: u32,
        /// Configured playfield width.
        width: u32,
        /// Playfield height above the ground band.
        sky_height: u32,
    },
    /// The gap and minimum segment height leave no room for random pipe heights.
    #[error(
        "pipe gap {gap} leaves no valid top heights: maximum {max_height} must exceed minimum {min_height}"
    )]
    GapTooLarge {
        /// Configured pipe gap.
        gap: u32,
        /// Smallest permitted segment height.
        min_height: u32,
        /// Derived exclusive upper bound for the top segment, saturating at zero.
        max_height: u32,
    },
}

/// Fixed playfield geometry shared by collision, spawning, and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Playfield {
    width: u32,
    height: u32,
    ground_height: u32,
}

impl Playfield {
    /// Creates a new playfield description.
    #[must_use]
    pub const fn new(width: u32, height: u32, ground_height: u32) -> Self {
        Self {
            width,
            height,
            ground_height,
        }
    }

    /// Horizontal extent of the playfield.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Vertical extent of the playfield, ground band included.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Height of the ground band at the bottom of the playfield.
    #[must_use]
    pub const fn ground_height(&self) -> u32 {
        self.ground_height
    }

    /// Height available above the ground band.
    #[must_use]
    pub const fn sky_height(&self) -> u32 {
        self.height.saturating_sub(self.ground_height)
    }

    /// Vertical coordinate of the ground band's top edge.
    #[must_use]
    pub fn ground_y(&self) -> f32 {
        self.sky_height() as f32
    }
}

/// Half-open range `[min, max)` of permitted top-segment heights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipeHeightRange {
    min: u32,
    max: u32,
}

impl PipeHeightRange {
    /// Creates a new height range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether the provided top height lies inside the range.
    #[must_use]
    pub const fn contains(&self, top_height: u32) -> bool {
        top_height >= self.min && top_height < self.max
    }
}

/// Every constant that shapes a game, loadable from configuration files.
///
/// Missing fields fall back to [`Tuning::default`], which reproduces the
/// classic 480x640 layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Velocity added to the bird on every tick.
    pub gravity: f32,
    /// Velocity assigned to the bird by a flap. Negative values point up.
    pub flap_strength: f32,
    /// Vertical opening between the two segments of a pipe.
    pub pipe_gap: u32,
    /// Horizontal extent of a pipe.
    pub pipe_width: u32,
    /// Distance a pipe scrolls left on every tick.
    pub pipe_speed: f32,
    /// Side length of the bird's square body.
    pub bird_size: u32,
    /// Fixed x-coordinate of the bird's left edge.
    pub bird_x: f32,
    /// Horizontal extent of the playfield.
    pub width: u32,
    /// Vertical extent of the playfield, ground band included.
    pub height: u32,
    /// Height of the ground band.
    pub ground_height: u32,
    /// Distance the newest pipe must travel before the next one spawns.
    pub spawn_spacing: u32,
    /// Smallest height of either pipe segment.
    pub min_pipe_height: u32,
    /// Seed for the pipe height generator.
    pub spawn_seed: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            flap_strength: -8.0,
            pipe_gap: 150,
            pipe_width: 80,
            pipe_speed: 2.0,
            bird_size: 40,
            bird_x: 100.0,
            width: 480,
            height: 640,
            ground_height: 20,
            spawn_spacing: 300,
            min_pipe_height: 50,
            spawn_seed: 0x5eed_f1a9_b1d5_0001,
        }
    }
}

impl Tuning {
    /// Checks every constraint the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("gravity", self.gravity),
            ("flap_strength", self.flap_strength),
            ("pipe_speed", self.pipe_speed),
            ("bird_x", self.bird_x),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        if self.pipe_speed <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "pipe_speed",
            });
        }

        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("pipe_gap", self.pipe_gap),
            ("pipe_width", self.pipe_width),
            ("bird_size", self.bird_size),
            ("spawn_spacing", self.spawn_spacing),
        ] {
            if value == 0 {
                return Err(ConfigError::NotPositive { field });
            }
        }

        if self.ground_height >= self.height {
            return Err(ConfigError::GroundTooTall {
                ground_height: self.ground_height,
                height: self.height,
            });
        }

        let playfield = self.playfield();
        let fits_horizontally =
            self.bird_x >= 0.0 && self.bird_x + self.bird_size as f32 <= self.width as f32;
        let rest_y = self.bird_rest_y();
        let fits_vertically = self.bird_size < playfield.sky_height()
            && rest_y >= 0.0
            && rest_y + (self.bird_size as f32) < playfield.ground_y();
        if !fits_horizontally || !fits_vertically {
            return Err(ConfigError::BirdOutOfBounds {
                x: self.bird_x,
                size: self.bird_size,
                width: self.width,
                sky_height: playfield.sky_height(),
            });
        }

        let range = self.pipe_height_range();
        if range.max() <= range.min() {
            return Err(ConfigError::GapTooLarge {
                gap: self.pipe_gap,
                min_height: range.min(),
                max_height: range.max(),
            });
        }

        Ok(())
    }

    /// Playfield geometry described by this tuning.
    #[must_use]
    pub const fn playfield(&self) -> Playfield {
        Playfield::new(self.width, self.height, self.ground_height)
    }

    /// Range of top-segment heights that keep both segments at least
    /// `min_pipe_height` tall.
    #[must_use]
    pub const fn pipe_height_range(&self) -> PipeHeightRange {
        let max = self
            .height
            .saturating_sub(self.pipe_gap)
            .saturating_sub(self.min_pipe_height)
            .saturating_sub(self.ground_height);
        PipeHeightRange::new(self.min_pipe_height, max)
    }

    /// Bottom-segment height that completes the gap invariant for `top_height`.
    ///
    /// Returns `None` when the top segment and gap do not fit above the ground.
    #[must_use]
    pub fn bottom_height_for(&self, top_height: u32) -> Option<u32> {
        self.height
            .checked_sub(top_height)?
            .checked_sub(self.pipe_gap)?
            .checked_sub(self.ground_height)
    }

    /// Vertical coordinate of the bird's resting position.
    #[must_use]
    pub fn bird_rest_y(&self) -> f32 {
        self.height as f32 / 2.0 - self.bird_size as f32 / 2.0
    }
}

/// Immutable representation of the bird used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BirdSnapshot {
    /// Left edge of the bird.
    pub x: f32,
    /// Top edge of the bird.
    pub y: f32,
    /// Vertical velocity. Positive values point down.
    pub velocity: f32,
    /// Side length of the bird's square body.
    pub size: f32,
}

impl BirdSnapshot {
    /// Right edge of the bird.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.size
    }

    /// Bottom edge of the bird.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.size
    }
}

/// Immutable representation of a single pipe used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipeSnapshot {
    /// Identifier allocated to the pipe by the world.
    pub id: PipeId,
    /// Left edge of the pipe.
    pub x: f32,
    /// Horizontal extent of the pipe.
    pub width: f32,
    /// Height of the top segment.
    pub top_height: u32,
    /// Height of the bottom segment above the ground band.
    pub bottom_height: u32,
    /// Whether the pipe already awarded its point.
    pub scored: bool,
}

impl PipeSnapshot {
    /// Right edge of the pipe.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Lower edge of the top segment, which is the top of the gap.
    #[must_use]
    pub fn gap_top(&self) -> f32 {
        self.top_height as f32
    }

    /// Upper edge of the bottom segment, which is the bottom of the gap.
    #[must_use]
    pub fn gap_bottom(&self, playfield: &Playfield) -> f32 {
        playfield.ground_y() - self.bottom_height as f32
    }
}

/// Read-only snapshot describing all pipes in spawn order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipeView {
    snapshots: Vec<PipeSnapshot>,
}

impl PipeView {
    /// Creates a new pipe view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PipeSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured pipes, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PipeSnapshot> {
        self.snapshots.iter()
    }

    /// Most recently spawned pipe, if any.
    #[must_use]
    pub fn newest(&self) -> Option<&PipeSnapshot> {
        self.snapshots.last()
    }

    /// Looks up a pipe by identifier.
    #[must_use]
    pub fn get(&self, pipe: PipeId) -> Option<&PipeSnapshot> {
        self.snapshots
            .binary_search_by_key(&pipe, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of pipes captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no pipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PipeSnapshot> {
        self.snapshots
    }
}

/// Owned copy of everything a render sink needs for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Current lifecycle status.
    pub status: GameStatus,
    /// Points accumulated in the current run.
    pub score: u32,
    /// Number of ticks simulated in the current run.
    pub tick: u64,
    /// Whether the background asset finished loading.
    pub assets_ready: bool,
    /// Player body.
    pub bird: BirdSnapshot,
    /// Pipes in spawn order, oldest first.
    pub pipes: Vec<PipeSnapshot>,
    /// Playfield geometry.
    pub playfield: Playfield,
}
