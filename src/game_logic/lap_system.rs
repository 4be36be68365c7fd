use crate::game_logic::track::TrackSurface;
use crate::game_logic::{Kart, Racer};
use bevy::prelude::*;
use serde::Serialize;
use std::cmp::{Ordering, Reverse};

/// Checkpoint and lap progress for one kart.
///
/// `current_lap` is 0 until the kart first crosses the start line, which
/// only starts the count. Every later crossing completes a lap.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RaceProgress {
    pub current_lap: u32,
    /// Index of the last checkpoint cleared in order, `None` before the first
    pub last_checkpoint: Option<usize>,
    pub finished: bool,
    /// Race clock reading when the kart finished
    pub finish_time: Option<f32>,
    /// 1-based rank, refreshed every tick
    pub race_position: usize,
}

impl Default for RaceProgress {
    fn default() -> Self {
        Self {
            current_lap: 0,
            last_checkpoint: None,
            finished: false,
            finish_time: None,
            race_position: 1,
        }
    }
}

impl RaceProgress {
    /// The only checkpoint this kart may clear next.
    pub fn next_checkpoint(&self, checkpoint_count: usize) -> usize {
        self.last_checkpoint
            .map_or(0, |index| (index + 1) % checkpoint_count)
    }

    /// Total checkpoints cleared, counted across laps.
    pub fn checkpoints_cleared(&self, checkpoint_count: usize) -> usize {
        self.current_lap as usize * checkpoint_count + self.last_checkpoint.map_or(0, |i| i + 1)
    }

    /// Lap number as shown on the HUD.
    pub fn display_lap(&self, total_laps: u32) -> u32 {
        (self.current_lap + 1).min(total_laps)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Something that happened to a kart while checking checkpoints.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    Checkpoint { racer: usize, index: usize },
    /// First crossing of the start line
    LapStarted { racer: usize },
    LapCompleted { racer: usize, lap: u32 },
    Finished { racer: usize, time: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LapTracker {
    pub total_laps: u32,
    pub checkpoint_radius: f32,
}

impl LapTracker {
    pub fn new(total_laps: u32, checkpoint_radius: f32) -> Self {
        Self {
            total_laps,
            checkpoint_radius,
        }
    }

    /// Check every unfinished kart against the checkpoints, then re-rank.
    pub fn update(
        &self,
        racers: &mut [Racer],
        track: &TrackSurface,
        race_time: f32,
    ) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        for (index, racer) in racers.iter_mut().enumerate() {
            self.check_checkpoints(
                index,
                &mut racer.kart,
                &mut racer.progress,
                track,
                race_time,
                &mut events,
            );
        }

        rank(racers, track.checkpoint_count());
        events
    }

    /// Advance one kart by at most one checkpoint.
    ///
    /// Only the next checkpoint in sequence counts; arriving anywhere else
    /// changes nothing.
    pub fn check_checkpoints(
        &self,
        racer: usize,
        kart: &mut Kart,
        progress: &mut RaceProgress,
        track: &TrackSurface,
        race_time: f32,
        events: &mut Vec<ProgressEvent>,
    ) {
        if progress.finished {
            return;
        }

        let count = track.checkpoint_count();
        let expected = progress.next_checkpoint(count);
        let Some((index, checkpoint)) = track
            .checkpoints()
            .iter()
            .enumerate()
            .find(|(i, cp)| *i == expected && kart.position.distance(**cp) < self.checkpoint_radius)
        else {
            return;
        };

        progress.last_checkpoint = Some(index);
        kart.set_respawn_point(*checkpoint, kart.heading);
        debug!("Racer {} reached checkpoint {}", racer, index);
        events.push(ProgressEvent::Checkpoint { racer, index });

        if index != 0 {
            return;
        }

        if progress.current_lap == 0 {
            progress.current_lap = 1;
            events.push(ProgressEvent::LapStarted { racer });
            return;
        }

        progress.current_lap += 1;
        info!("Racer {} lap complete {}", racer, progress.current_lap);
        events.push(ProgressEvent::LapCompleted {
            racer,
            lap: progress.current_lap,
        });

        if progress.current_lap >= self.total_laps {
            progress.finished = true;
            progress.finish_time = Some(race_time);
            info!("Racer {} finished all laps at {:.2}s", racer, race_time);
            events.push(ProgressEvent::Finished {
                racer,
                time: race_time,
            });
        }
    }
}

// Finished karts outrank everyone; earlier finish ranks higher.
// Unfinished karts rank by checkpoints cleared.
#[derive(PartialEq, PartialOrd)]
enum Standing {
    Racing(usize),
    Finished(Reverse<f32>),
}

fn standing(progress: &RaceProgress, checkpoint_count: usize) -> Standing {
    match progress.finish_time {
        Some(time) if progress.finished => Standing::Finished(Reverse(time)),
        _ => Standing::Racing(progress.checkpoints_cleared(checkpoint_count)),
    }
}

/// Order of racer indices from first to last place. Ties keep entry order.
pub fn ranking(progress: &[&RaceProgress], checkpoint_count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..progress.len()).collect();
    order.sort_by(|a, b| {
        let a = standing(progress[*a], checkpoint_count);
        let b = standing(progress[*b], checkpoint_count);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    order
}

/// Recompute `race_position` for every racer.
pub fn rank(racers: &mut [Racer], checkpoint_count: usize) {
    let order = {
        let progress: Vec<&RaceProgress> = racers.iter().map(|r| &r.progress).collect();
        ranking(&progress, checkpoint_count)
    };
    for (place, index) in order.into_iter().enumerate() {
        racers[index].progress.race_position = place + 1;
    }
}

/// The race is over once the player (racer 0) finishes, or everyone has.
pub fn is_race_finished(racers: &[Racer]) -> bool {
    racers.first().is_some_and(|player| player.progress.finished)
        || racers.iter().all(|racer| racer.progress.finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_logic::config::KartTuning;
    use crate::game_logic::control::ControlSource;
    use crate::game_logic::track::{TrackId, TrackShape};

    fn racer_at(position: Vec2) -> Racer {
        Racer::new(
            "Test",
            Kart::new(position, 0.0, KartTuning::default()),
            ControlSource::Player,
        )
    }

    fn park(racers: &mut [Racer], racer: usize, track: &TrackSurface, checkpoint: usize) {
        racers[racer].kart.position = track.checkpoints()[checkpoint];
    }

    fn drive_lap(
        tracker: &LapTracker,
        racers: &mut [Racer],
        racer: usize,
        track: &TrackSurface,
        time: f32,
    ) {
        for checkpoint in 1..track.checkpoint_count() {
            park(racers, racer, track, checkpoint);
            tracker.update(racers, track, time);
        }
        park(racers, racer, track, 0);
        tracker.update(racers, track, time);
    }

    #[test]
    fn test_oval_lap_counting() {
        let track = TrackSurface::build(TrackId::Oval);
        let tracker = LapTracker::new(3, 80.0);
        let mut racers = vec![racer_at(track.start_line())];

        let events = tracker.update(&mut racers, &track, 0.5);
        assert_eq!(racers[0].progress.current_lap, 1);
        assert_eq!(racers[0].progress.last_checkpoint, Some(0));
        assert!(events.contains(&ProgressEvent::LapStarted { racer: 0 }));

        // parked on the line, nothing more happens
        tracker.update(&mut racers, &track, 0.6);
        assert_eq!(racers[0].progress.current_lap, 1);

        drive_lap(&tracker, &mut racers, 0, &track, 20.0);
        assert_eq!(racers[0].progress.current_lap, 2);
        assert_eq!(racers[0].progress.last_checkpoint, Some(0));
        assert!(!racers[0].progress.finished);
    }

    #[test]
    fn test_out_of_order_checkpoint_is_ignored() {
        let track = TrackSurface::build(TrackId::Oval);
        let tracker = LapTracker::new(3, 80.0);
        let mut racers = vec![racer_at(track.checkpoints()[3])];

        let events = tracker.update(&mut racers, &track, 1.0);

        assert!(events.is_empty());
        assert_eq!(racers[0].progress, RaceProgress::default());
    }

    #[test]
    fn test_checkpoint_moves_respawn_point() {
        let track = TrackSurface::build(TrackId::Oval);
        let tracker = LapTracker::new(3, 80.0);
        let mut racers = vec![racer_at(track.start_line() + Vec2::new(10.0, 10.0))];
        racers[0].kart.heading = 95.0;

        tracker.update(&mut racers, &track, 0.1);

        assert_eq!(racers[0].kart.respawn.position, track.start_line());
        assert_eq!(racers[0].kart.respawn.heading, 95.0);
    }

    #[test]
    fn test_one_checkpoint_per_tick() {
        // two consecutive checkpoints close enough to touch both at once
        let track = TrackSurface::from_parts(
            TrackId::Oval,
            1000.0,
            1000.0,
            vec![Vec2::new(100.0, 100.0), Vec2::new(150.0, 100.0), Vec2::new(500.0, 500.0)],
            Vec::new(),
            TrackShape::Open,
        )
        .unwrap();
        let tracker = LapTracker::new(3, 80.0);
        let mut racers = vec![racer_at(Vec2::new(125.0, 100.0))];

        tracker.update(&mut racers, &track, 0.1);
        assert_eq!(racers[0].progress.last_checkpoint, Some(0));

        tracker.update(&mut racers, &track, 0.2);
        assert_eq!(racers[0].progress.last_checkpoint, Some(1));
    }

    #[test]
    fn test_finish_time_is_set_once() {
        let track = TrackSurface::build(TrackId::Oval);
        let tracker = LapTracker::new(2, 80.0);
        let mut racers = vec![racer_at(track.start_line())];

        tracker.update(&mut racers, &track, 0.0);
        drive_lap(&tracker, &mut racers, 0, &track, 42.0);

        assert!(racers[0].progress.finished);
        assert_eq!(racers[0].progress.finish_time, Some(42.0));

        drive_lap(&tracker, &mut racers, 0, &track, 80.0);
        assert_eq!(racers[0].progress.current_lap, 2);
        assert_eq!(racers[0].progress.finish_time, Some(42.0));
    }

    #[test]
    fn test_laps_never_decrease() {
        let track = TrackSurface::build(TrackId::Forest);
        let tracker = LapTracker::new(5, 80.0);
        let mut racers = vec![racer_at(track.start_line())];

        let mut last_lap = 0;
        for step in 0..60 {
            let checkpoint = (step * 7) % track.checkpoint_count();
            park(&mut racers, 0, &track, checkpoint);
            tracker.update(&mut racers, &track, step as f32);
            assert!(racers[0].progress.current_lap >= last_lap);
            last_lap = racers[0].progress.current_lap;
        }
    }

    #[test]
    fn test_ranking_orders_finishers_then_progress() {
        let finished = |time: f32| RaceProgress {
            current_lap: 3,
            last_checkpoint: Some(0),
            finished: true,
            finish_time: Some(time),
            ..Default::default()
        };
        let racing = |lap: u32, checkpoint: usize| RaceProgress {
            current_lap: lap,
            last_checkpoint: Some(checkpoint),
            ..Default::default()
        };

        let a = racing(2, 5);
        let b = finished(61.0);
        let c = racing(2, 6);
        let d = finished(58.5);

        let order = ranking(&[&a, &b, &c, &d], 8);
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_ranking_ties_keep_entry_order() {
        let progress = RaceProgress::default();
        let order = ranking(&[&progress, &progress, &progress], 8);
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_positions_form_a_permutation() {
        let track = TrackSurface::build(TrackId::Oval);
        let tracker = LapTracker::new(3, 80.0);
        let mut racers: Vec<Racer> = (0..4).map(|_| racer_at(Vec2::ZERO)).collect();
        park(&mut racers, 2, &track, 0);

        tracker.update(&mut racers, &track, 1.0);

        let mut positions: Vec<usize> = racers.iter().map(|r| r.progress.race_position).collect();
        assert_eq!(racers[2].progress.race_position, 1);
        positions.sort();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_race_finishes_with_player() {
        let mut racers = vec![
            racer_at(Vec2::ZERO),
            racer_at(Vec2::ZERO),
            racer_at(Vec2::ZERO),
        ];
        assert!(!is_race_finished(&racers));

        racers[1].progress.finished = true;
        racers[2].progress.finished = true;
        assert!(!is_race_finished(&racers));

        racers[0].progress.finished = true;
        assert!(is_race_finished(&racers));

        racers[1].progress.finished = false;
        assert!(is_race_finished(&racers));
    }

    #[test]
    fn test_display_lap_is_capped() {
        let mut progress = RaceProgress::default();
        assert_eq!(progress.display_lap(3), 1);
        progress.current_lap = 1;
        assert_eq!(progress.display_lap(3), 2);
        progress.current_lap = 3;
        assert_eq!(progress.display_lap(3), 3);
    }
}
