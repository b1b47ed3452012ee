#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scoring system that awards a point when a pipe scrolls past the bird.

use flappy_core::{BirdSnapshot, Command, Event, PipeView};

/// Reports whether a pipe's right edge crossed the bird's x-coordinate during
/// a single step.
///
/// The test fires on exactly one step for a pipe moving left at any positive
/// speed, so fractional speeds never skip the point.
#[must_use]
pub fn crossed(previous_right: f32, new_right: f32, bird_x: f32) -> bool {
    previous_right >= bird_x && new_right < bird_x
}

/// Stateless system that turns pipe movement into point awards.
#[derive(Debug, Default)]
pub struct Scoring;

impl Scoring {
    /// Consumes tick events and emits one `AwardPoint` per pipe that crossed
    /// the bird on this step.
    ///
    /// Pipes missing from `pipes` were despawned during the step and pipes
    /// already marked as scored are skipped.
    pub fn handle(
        &mut self,
        events: &[Event],
        bird: &BirdSnapshot,
        pipes: &PipeView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::PipeAdvanced { pipe, from_x, to_x } = *event else {
                continue;
            };
            let Some(snapshot) = pipes.get(pipe) else {
                continue;
            };
            if snapshot.scored {
                continue;
            }

            if crossed(from_x + snapshot.width, to_x + snapshot.width, bird.x) {
                out.push(Command::AwardPoint { pipe });
            }
        }
    }
}
