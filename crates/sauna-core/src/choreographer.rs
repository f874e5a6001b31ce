//! Time-based camera moves between two poses
//!
//! The choreographer owns at most one animation. Progress is derived from the
//! elapsed time passed into [`Choreographer::tick`], so a move lasts the same
//! wall-clock duration at any frame rate. When an animation ends the final pose
//! is exactly the requested end pose and the completion token is handed back
//! once, in that same tick.

use std::time::Duration;
use thiserror::Error;

use crate::easing::ease_in_out_cubic;
use crate::pose::CameraPose;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoreographyError {
    #[error("a camera animation is already in flight")]
    Busy,
}

/// One camera move and the token to hand back when it lands
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest<C> {
    pub from: CameraPose,
    pub to: CameraPose,
    pub duration: Duration,
    pub on_complete: C,
}

impl<C> AnimationRequest<C> {
    pub fn new(from: CameraPose, to: CameraPose, duration: Duration, on_complete: C) -> Self {
        Self {
            from,
            to,
            duration,
            on_complete,
        }
    }
}

/// Result of advancing the choreographer by one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Tick<C> {
    /// Nothing in flight; the camera belongs to the active control scheme
    Idle,
    /// Mid-flight pose for this frame
    Moving(CameraPose),
    /// The animation landed on its end pose
    Finished { pose: CameraPose, completion: C },
}

#[derive(Debug)]
struct Flight<C> {
    request: AnimationRequest<C>,
    started_at: Duration,
}

#[derive(Debug)]
pub struct Choreographer<C> {
    flight: Option<Flight<C>>,
}

impl<C> Default for Choreographer<C> {
    fn default() -> Self {
        Self { flight: None }
    }
}

impl<C> Choreographer<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a move. Rejects while another move is in flight.
    pub fn animate(
        &mut self,
        request: AnimationRequest<C>,
        now: Duration,
    ) -> Result<(), ChoreographyError> {
        if self.flight.is_some() {
            return Err(ChoreographyError::Busy);
        }
        tracing::debug!(
            from = ?request.from.position,
            to = ?request.to.position,
            duration_ms = request.duration.as_millis() as u64,
            "Camera animation started"
        );
        self.flight = Some(Flight {
            request,
            started_at: now,
        });
        Ok(())
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// Raw (un-eased) progress of the current move in `[0, 1]`
    pub fn progress(&self, now: Duration) -> Option<f32> {
        self.flight.as_ref().map(|flight| flight.progress(now))
    }

    /// End pose of the current move, if any
    pub fn destination(&self) -> Option<CameraPose> {
        self.flight.as_ref().map(|flight| flight.request.to)
    }

    pub fn tick(&mut self, now: Duration) -> Tick<C> {
        let Some(flight) = self.flight.as_ref() else {
            return Tick::Idle;
        };

        let t = flight.progress(now);
        if t < 1.0 {
            let eased = ease_in_out_cubic(t);
            return Tick::Moving(flight.request.from.lerp(&flight.request.to, eased));
        }

        match self.flight.take() {
            Some(flight) => Tick::Finished {
                pose: flight.request.to,
                completion: flight.request.on_complete,
            },
            None => Tick::Idle,
        }
    }
}

impl<C> Flight<C> {
    fn progress(&self, now: Duration) -> f32 {
        let duration = self.request.duration.as_secs_f32();
        if duration <= 0.0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at).as_secs_f32();
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn poses() -> (CameraPose, CameraPose) {
        (
            CameraPose::new(Vec3::new(1.52, 0.53, -3.4), Vec3::ZERO),
            CameraPose::new(Vec3::new(0.07, 0.29, -3.18), Vec3::new(0.0, 0.1, 0.0)),
        )
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_lands_exactly_and_completes_once() {
        let (from, to) = poses();
        let mut choreo = Choreographer::new();
        choreo
            .animate(AnimationRequest::new(from, to, ms(1000), "done"), ms(0))
            .unwrap();

        let mut completions = 0;
        let mut last_pose = from;
        for frame in 0..=70 {
            // Uneven frame spacing, ~16ms on average
            let now = ms(frame * 16 + (frame % 3));
            match choreo.tick(now) {
                Tick::Moving(pose) => last_pose = pose,
                Tick::Finished { pose, completion } => {
                    assert_eq!(completion, "done");
                    completions += 1;
                    last_pose = pose;
                }
                Tick::Idle => {}
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(last_pose, to);
        assert!(!choreo.is_animating());
    }

    #[test]
    fn test_duration_is_wall_clock() {
        let (from, to) = poses();
        let mut choreo = Choreographer::new();
        choreo
            .animate(AnimationRequest::new(from, to, ms(1000), ()), ms(500))
            .unwrap();

        // A single huge frame still finishes exactly at the end pose
        assert!(matches!(choreo.tick(ms(999)), Tick::Moving(_)));
        assert_eq!(
            choreo.tick(ms(1500)),
            Tick::Finished {
                pose: to,
                completion: ()
            }
        );
        assert_eq!(choreo.tick(ms(1600)), Tick::Idle);
    }

    #[test]
    fn test_midpoint_is_half_way() {
        let (from, to) = poses();
        let mut choreo = Choreographer::new();
        choreo
            .animate(AnimationRequest::new(from, to, ms(1000), ()), ms(0))
            .unwrap();
        match choreo.tick(ms(500)) {
            Tick::Moving(pose) => assert!(pose.approx_eq(&from.lerp(&to, 0.5), 1e-5)),
            other => panic!("expected a mid-flight pose, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_while_busy() {
        let (from, to) = poses();
        let mut choreo = Choreographer::new();
        choreo
            .animate(AnimationRequest::new(from, to, ms(1000), 1), ms(0))
            .unwrap();
        let second = choreo.animate(AnimationRequest::new(to, from, ms(1000), 2), ms(100));
        assert_eq!(second, Err(ChoreographyError::Busy));

        // The first animation keeps its destination and its completion
        assert_eq!(choreo.destination(), Some(to));
        match choreo.tick(ms(1000)) {
            Tick::Finished { completion, .. } => assert_eq!(completion, 1),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let (from, to) = poses();
        let mut choreo = Choreographer::new();
        choreo
            .animate(AnimationRequest::new(from, to, Duration::ZERO, ()), ms(10))
            .unwrap();
        assert!(choreo.is_animating());
        assert!(matches!(choreo.tick(ms(10)), Tick::Finished { .. }));
    }

    #[test]
    fn test_progress_before_start_is_clamped() {
        let (from, to) = poses();
        let mut choreo = Choreographer::new();
        choreo
            .animate(AnimationRequest::new(from, to, ms(1000), ()), ms(200))
            .unwrap();
        assert_eq!(choreo.progress(ms(100)), Some(0.0));
        assert_eq!(choreo.tick(ms(100)), Tick::Moving(from));
    }
}
