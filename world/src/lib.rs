#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Flappy.

use flappy_core::{
    CollisionCause, Command, ConfigError, Event, GameStatus, PipeId, StartError, Tuning,
};
use tracing::{debug, info, warn};

/// Represents the authoritative Flappy world state.
#[derive(Debug)]
pub struct World {
    tuning: Tuning,
    bird: Bird,
    pipes: Vec<Pipe>,
    score: u32,
    status: GameStatus,
    assets_ready: bool,
    tick_index: u64,
    next_pipe_id: u32,
}

impl World {
    /// Creates a new world in the `Ready` state after validating the tuning.
    pub fn new(tuning: Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let bird = Bird::at_rest(&tuning);
        Ok(Self {
            tuning,
            bird,
            pipes: Vec::new(),
            score: 0,
            status: GameStatus::Ready,
            assets_ready: false,
            tick_index: 0,
            next_pipe_id: 0,
        })
    }

    fn reset(&mut self) {
        self.bird = Bird::at_rest(&self.tuning);
        self.pipes.clear();
        self.score = 0;
        self.status = GameStatus::Ready;
        self.tick_index = 0;
    }

    fn transition(&mut self, to: GameStatus, out_events: &mut Vec<Event>) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        info!(?from, ?to, score = self.score, "game status changed");
        out_events.push(Event::StatusChanged { from, to });
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        let from_y = self.bird.y;
        self.bird.velocity += self.tuning.gravity;
        self.bird.y += self.bird.velocity;
        out_events.push(Event::BirdMoved {
            from_y,
            to_y: self.bird.y,
            velocity: self.bird.velocity,
        });

        let speed = self.tuning.pipe_speed;
        for pipe in self.pipes.iter_mut().rev() {
            let from_x = pipe.x;
            pipe.x -= speed;
            out_events.push(Event::PipeAdvanced {
                pipe: pipe.id,
                from_x,
                to_x: pipe.x,
            });
        }

        let width = self.tuning.pipe_width as f32;
        self.pipes.retain(|pipe| {
            let visible = pipe.x + width >= 0.0;
            if !visible {
                debug!(pipe = pipe.id.get(), "pipe left the playfield");
                out_events.push(Event::PipeDespawned { pipe: pipe.id });
            }
            visible
        });
    }

    fn spawn_pipe(&mut self, top_height: u32, out_events: &mut Vec<Event>) {
        let range = self.tuning.pipe_height_range();
        if !range.contains(top_height) {
            warn!(
                top_height,
                min = range.min(),
                max = range.max(),
                "pipe spawn rejected: top height out of range"
            );
            return;
        }

        let Some(bottom_height) = self.tuning.bottom_height_for(top_height) else {
            warn!(top_height, "pipe spawn rejected: segments exceed playfield");
            return;
        };

        let x = self.tuning.width as f32;
        if self.pipes.last().is_some_and(|newest| newest.x >= x) {
            warn!("pipe spawn rejected: newest pipe has not left the spawn edge");
            return;
        }

        let Some(next_pipe_id) = self.next_pipe_id.checked_add(1) else {
            warn!("pipe spawn rejected: pipe ids exhausted");
            return;
        };
        let id = PipeId::new(self.next_pipe_id);
        self.next_pipe_id = next_pipe_id;
        self.pipes.push(Pipe {
            id,
            x,
            top_height,
            bottom_height,
            scored: false,
        });
        debug!(pipe = id.get(), top_height, bottom_height, "pipe spawned");
        out_events.push(Event::PipeSpawned {
            pipe: id,
            x,
            top_height,
            bottom_height,
        });
    }

    fn award_point(&mut self, pipe_id: PipeId, out_events: &mut Vec<Event>) {
        let Some(pipe) = self.pipes.iter_mut().find(|pipe| pipe.id == pipe_id) else {
            debug!(pipe = pipe_id.get(), "point ignored: pipe no longer exists");
            return;
        };
        if pipe.scored {
            debug!(pipe = pipe_id.get(), "point ignored: pipe already scored");
            return;
        }

        pipe.scored = true;
        self.score = self.score.saturating_add(1);
        debug!(pipe = pipe_id.get(), score = self.score, "pipe cleared");
        out_events.push(Event::ScoreIncreased {
            pipe: pipe_id,
            score: self.score,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Reset => {
            let from = world.status;
            world.reset();
            out_events.push(Event::GameReset);
            if from != GameStatus::Ready {
                info!(?from, "game reset");
                out_events.push(Event::StatusChanged {
                    from,
                    to: GameStatus::Ready,
                });
            }
        }
        Command::MarkAssetsReady => {
            if !world.assets_ready {
                world.assets_ready = true;
                info!("background asset ready");
                out_events.push(Event::AssetsReady);
            }
        }
        Command::Start => match world.status {
            GameStatus::Ready if world.assets_ready => {
                world.transition(GameStatus::Playing, out_events);
            }
            GameStatus::Ready => {
                warn!("start rejected: background asset not loaded");
                out_events.push(Event::StartRejected {
                    reason: StartError::AssetsNotReady,
                });
            }
            GameStatus::Playing | GameStatus::Over => {
                debug!(status = ?world.status, "start ignored");
            }
        },
        Command::Flap => {
            if world.status == GameStatus::Playing {
                world.bird.velocity = world.tuning.flap_strength;
                out_events.push(Event::BirdFlapped {
                    velocity: world.bird.velocity,
                });
            }
        }
        Command::Tick => {
            if world.status == GameStatus::Playing {
                world.advance(out_events);
            }
        }
        Command::SpawnPipe { top_height } => {
            if world.status == GameStatus::Playing {
                world.spawn_pipe(top_height, out_events);
            }
        }
        Command::AwardPoint { pipe } => {
            if world.status == GameStatus::Playing {
                world.award_point(pipe, out_events);
            }
        }
        Command::EndRun { cause } => {
            if world.status == GameStatus::Playing {
                world.transition(GameStatus::Over, out_events);
                info!(?cause, final_score = world.score, "run ended");
                out_events.push(Event::RunEnded {
                    cause,
                    final_score: world.score,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use flappy_core::{
        BirdSnapshot, GameSnapshot, GameStatus, PipeSnapshot, PipeView, Playfield, Tuning,
    };

    /// Current lifecycle status.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Points accumulated in the current run.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of ticks simulated since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the background asset finished loading.
    #[must_use]
    pub fn assets_ready(world: &World) -> bool {
        world.assets_ready
    }

    /// Provides read-only access to the validated tuning.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Playfield geometry shared by all systems.
    #[must_use]
    pub fn playfield(world: &World) -> Playfield {
        world.tuning.playfield()
    }

    /// Captures the bird's current state.
    #[must_use]
    pub fn bird(world: &World) -> BirdSnapshot {
        BirdSnapshot {
            x: world.tuning.bird_x,
            y: world.bird.y,
            velocity: world.bird.velocity,
            size: world.tuning.bird_size as f32,
        }
    }

    /// Captures a read-only view of the pipes in spawn order.
    #[must_use]
    pub fn pipe_view(world: &World) -> PipeView {
        let width = world.tuning.pipe_width as f32;
        PipeView::from_snapshots(
            world
                .pipes
                .iter()
                .map(|pipe| PipeSnapshot {
                    id: pipe.id,
                    x: pipe.x,
                    width,
                    top_height: pipe.top_height,
                    bottom_height: pipe.bottom_height,
                    scored: pipe.scored,
                })
                .collect(),
        )
    }

    /// Captures an owned copy of the whole game for rendering.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot {
            status: world.status,
            score: world.score,
            tick: world.tick_index,
            assets_ready: world.assets_ready,
            bird: bird(world),
            pipes: pipe_view(world).into_vec(),
            playfield: playfield(world),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Bird {
    y: f32,
    velocity: f32,
}

impl Bird {
    fn at_rest(tuning: &Tuning) -> Self {
        Self {
            y: tuning.bird_rest_y(),
            velocity: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
struct Pipe {
    id: PipeId,
    x: f32,
    top_height: u32,
    bottom_height: u32,
    scored: bool,
}
