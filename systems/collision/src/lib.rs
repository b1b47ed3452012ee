#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision predicates and the pure system that ends a run on contact.

use flappy_core::{
    BirdSnapshot, CollisionCause, Command, Event, PipeSnapshot, PipeView, Playfield,
};

/// Reports whether the bird overlaps either segment of the pipe.
///
/// The bird must overlap the pipe horizontally and stick out of the gap
/// vertically: its top above the top segment's lower edge, or its bottom
/// below the bottom segment's upper edge. Touching edges do not count.
#[must_use]
pub fn collides(bird: &BirdSnapshot, pipe: &PipeSnapshot, playfield: &Playfield) -> bool {
    let overlaps_horizontally = bird.right() > pipe.x && bird.x < pipe.right();
    if !overlaps_horizontally {
        return false;
    }

    bird.y < pipe.gap_top() || bird.bottom() > pipe.gap_bottom(playfield)
}

/// Reports whether the bird's lower edge reached the ground band.
#[must_use]
pub fn touches_ground(bird: &BirdSnapshot, playfield: &Playfield) -> bool {
    bird.bottom() >= playfield.ground_y()
}

/// Stateless system that detects contact after every simulation step.
#[derive(Debug, Default)]
pub struct Collision;

impl Collision {
    /// Emits a single `EndRun` command when the latest step left the bird
    /// touching the ground or any pipe.
    ///
    /// Ground contact wins over pipe contact. Pipes are checked newest first
    /// and the search stops at the first hit.
    pub fn handle(
        &mut self,
        events: &[Event],
        bird: &BirdSnapshot,
        pipes: &PipeView,
        playfield: &Playfield,
        out: &mut Vec<Command>,
    ) {
        let stepped = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !stepped {
            return;
        }

        if touches_ground(bird, playfield) {
            out.push(Command::EndRun {
                cause: CollisionCause::Ground,
            });
            return;
        }

        if let Some(pipe) = pipes
            .iter()
            .rev()
            .find(|pipe| collides(bird, pipe, playfield))
        {
            out.push(Command::EndRun {
                cause: CollisionCause::Pipe(pipe.id),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_core::{PipeId, Tuning};

    fn bird_at(x: f32, y: f32) -> BirdSnapshot {
        BirdSnapshot {
            x,
            y,
            velocity: 0.0,
            size: 40.0,
        }
    }

    fn pipe_at(x: f32) -> PipeSnapshot {
        PipeSnapshot {
            id: PipeId::new(0),
            x,
            width: 80.0,
            top_height: 200,
            bottom_height: 270,
            scored: false,
        }
    }

    #[test]
    fn bird_inside_gap_is_clear() {
        let playfield = Tuning::default().playfield();
        assert!(!collides(&bird_at(100.0, 250.0), &pipe_at(90.0), &playfield));
    }

    #[test]
    fn bird_flush_with_gap_edges_is_clear() {
        let playfield = Tuning::default().playfield();
        assert!(!collides(&bird_at(100.0, 200.0), &pipe_at(90.0), &playfield));
        assert!(!collides(&bird_at(100.0, 310.0), &pipe_at(90.0), &playfield));
    }

    #[test]
    fn bird_in_top_segment_collides() {
        let playfield = Tuning::default().playfield();
        assert!(collides(&bird_at(100.0, 150.0), &pipe_at(90.0), &playfield));
    }

    #[test]
    fn bird_in_bottom_segment_collides() {
        let playfield = Tuning::default().playfield();
        assert!(collides(&bird_at(100.0, 320.0), &pipe_at(90.0), &playfield));
    }

    #[test]
    fn horizontally_clear_bird_never_collides() {
        let playfield = Tuning::default().playfield();
        assert!(!collides(&bird_at(100.0, 10.0), &pipe_at(140.0), &playfield));
        assert!(!collides(&bird_at(100.0, 10.0), &pipe_at(20.0), &playfield));
    }

    #[test]
    fn ground_contact_starts_at_the_band_edge() {
        let playfield = Tuning::default().playfield();
        assert!(!touches_ground(&bird_at(100.0, 579.9), &playfield));
        assert!(touches_ground(&bird_at(100.0, 580.0), &playfield));
        assert!(touches_ground(&bird_at(100.0, 700.0), &playfield));
    }
}
