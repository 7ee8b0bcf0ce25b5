//! Morph timeline driver.
//!
//! Loops forever through four phases:
//!
//! ```text
//! WaitingToForward -> MorphingForward (p: 0 -> 1)
//!   -> WaitingToBackward -> MorphingBackward (p: 1 -> 0) -> (advance cursor)
//! ```
//!
//! The simulation blends `target1` (p = 0) into `target2` (p = 1). After a
//! forward morph `target1` jumps to the shape under the cursor, after a
//! backward morph `target2` jumps to the one after it. Every index wraps
//! modulo the shape count.

use bevy::prelude::*;

use crate::error::MorphError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// `1 - (1 - t)²`
    #[default]
    QuadOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphPhase {
    WaitingToForward,
    MorphingForward,
    WaitingToBackward,
    MorphingBackward,
}

impl MorphPhase {
    fn next(self) -> Self {
        match self {
            MorphPhase::WaitingToForward => MorphPhase::MorphingForward,
            MorphPhase::MorphingForward => MorphPhase::WaitingToBackward,
            MorphPhase::WaitingToBackward => MorphPhase::MorphingBackward,
            MorphPhase::MorphingBackward => MorphPhase::WaitingToForward,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineSettings {
    pub wait_secs: f32,
    pub morph_secs: f32,
    pub easing: Easing,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            wait_secs: 1.0,
            morph_secs: 0.5,
            easing: Easing::QuadOut,
        }
    }
}

/// Transition emitted by [`MorphTimeline::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineEvent {
    /// Progress reached 1; `target1` now points at this shape
    ForwardComplete { target1: usize },
    /// Progress reached 0; `target2` now points at this shape
    BackwardComplete { target2: usize },
    /// One full loop finished; the cursor moved to this shape
    CycleComplete { cursor: usize },
}

#[derive(Resource, Clone, Debug)]
pub struct MorphTimeline {
    settings: TimelineSettings,
    shape_count: usize,
    phase: MorphPhase,
    elapsed: f32,
    progress: f32,
    cursor: usize,
    target1: usize,
    target2: usize,
    cycles: u64,
    paused: bool,
}

impl MorphTimeline {
    pub fn new(shape_count: usize, settings: TimelineSettings) -> Result<Self, MorphError> {
        if shape_count == 0 {
            return Err(MorphError::NoShapes);
        }
        if !(settings.morph_secs > 0.0) || !(settings.wait_secs >= 0.0) {
            return Err(MorphError::InvalidConfig(format!(
                "timeline needs wait >= 0 and morph > 0 (got {} / {})",
                settings.wait_secs, settings.morph_secs
            )));
        }

        Ok(Self {
            settings,
            shape_count,
            phase: MorphPhase::WaitingToForward,
            elapsed: 0.0,
            progress: 0.0,
            cursor: 1 % shape_count,
            target1: 0,
            target2: 1 % shape_count,
            cycles: 0,
            paused: false,
        })
    }

    pub fn phase(&self) -> MorphPhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// `(target1, target2)` shape indices currently being blended.
    pub fn targets(&self) -> (usize, usize) {
        (self.target1, self.target2)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.update_progress();
    }

    /// Pin progress to `value` for inspection. Only honoured while paused;
    /// the schedule recomputes progress as soon as it resumes.
    pub fn override_progress(&mut self, value: f32) {
        if self.paused {
            self.progress = value.clamp(0.0, 1.0);
        }
    }

    fn phase_duration(&self) -> f32 {
        match self.phase {
            MorphPhase::WaitingToForward | MorphPhase::WaitingToBackward => self.settings.wait_secs,
            MorphPhase::MorphingForward | MorphPhase::MorphingBackward => self.settings.morph_secs,
        }
    }

    fn update_progress(&mut self) {
        let t = self.elapsed / self.settings.morph_secs;
        match self.phase {
            MorphPhase::MorphingForward => self.progress = self.settings.easing.apply(t),
            MorphPhase::MorphingBackward => self.progress = 1.0 - self.settings.easing.apply(t),
            // Waits hold the value the previous morph ended on
            MorphPhase::WaitingToForward => self.progress = 0.0,
            MorphPhase::WaitingToBackward => self.progress = 1.0,
        }
    }

    fn complete_phase(&mut self, events: &mut Vec<TimelineEvent>) {
        match self.phase {
            MorphPhase::MorphingForward => {
                self.progress = 1.0;
                self.target1 = self.cursor;
                events.push(TimelineEvent::ForwardComplete {
                    target1: self.target1,
                });
            }
            MorphPhase::MorphingBackward => {
                self.progress = 0.0;
                self.target2 = (self.cursor + 1) % self.shape_count;
                events.push(TimelineEvent::BackwardComplete {
                    target2: self.target2,
                });
                self.cursor = (self.cursor + 1) % self.shape_count;
                self.cycles += 1;
                events.push(TimelineEvent::CycleComplete {
                    cursor: self.cursor,
                });
            }
            MorphPhase::WaitingToForward | MorphPhase::WaitingToBackward => {}
        }
        self.phase = self.phase.next();
        self.elapsed = 0.0;
    }

    /// Advance the schedule by `dt` seconds, crossing as many phase
    /// boundaries as `dt` covers.
    pub fn tick(&mut self, dt: f32) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if self.paused {
            return events;
        }

        let mut remaining = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        loop {
            let left = self.phase_duration() - self.elapsed;
            if remaining < left {
                self.elapsed += remaining;
                self.update_progress();
                break;
            }
            remaining -= left;
            self.complete_phase(&mut events);
        }
        events
    }
}
