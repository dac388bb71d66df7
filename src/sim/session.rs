//! Round/session controller
//!
//! Owns the game state, the timer queue and the leaderboard. The UI calls the
//! transition methods (`start`, `pause`, `resume`, `hit`, `restart`), drives
//! time with `advance`, and observes changes through `SessionEvent`s.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::scheduler::{TaskId, TaskQueue};
use super::state::{GamePhase, GameState, PlayArea, Target, round_budget_ms};
use super::target::generate_target;
use crate::consts::*;
use crate::leaderboard::{self, Leaderboard, ScoreRecord};
use crate::persistence::KeyValueStore;

/// Timer callbacks owned by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTask {
    /// One countdown decrement
    CountdownStep,
    /// Replace the hit target with a fresh one
    SpawnTarget,
}

/// Change notifications for observers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    Paused,
    Resumed,
    TargetSpawned { id: u64 },
    TargetHit { score: u32 },
    Tick { time_left_ms: u32 },
    GameOver { score: u32, new_best: bool },
    Restarted,
    LeaderboardChanged,
}

type Subscriber = Box<dyn FnMut(&SessionEvent)>;

/// The round controller
pub struct Session {
    state: GameState,
    tasks: TaskQueue<SessionTask>,
    countdown: Option<TaskId>,
    spawn: Option<TaskId>,
    /// Remaining spawn delay captured when pausing mid-delay
    paused_spawn_ms: Option<f64>,
    leaderboard: Leaderboard,
    store: Box<dyn KeyValueStore>,
    rng: Pcg32,
    play_area: Option<PlayArea>,
    next_target_id: u64,
    /// Unix time (ms) corresponding to session clock zero
    epoch_ms: f64,
    events: Vec<SessionEvent>,
    subscribers: Vec<Subscriber>,
}

impl Session {
    /// Create a session, loading the leaderboard from `store`
    pub fn new(seed: u64, store: Box<dyn KeyValueStore>, epoch_ms: f64) -> Self {
        let leaderboard = Leaderboard::load(store.as_ref());
        Self {
            state: GameState::new(),
            tasks: TaskQueue::new(),
            countdown: None,
            spawn: None,
            paused_spawn_ms: None,
            leaderboard,
            store,
            rng: Pcg32::seed_from_u64(seed),
            play_area: None,
            next_target_id: 1,
            epoch_ms,
            events: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn time_left_ms(&self) -> u32 {
        self.state.time_left_ms
    }

    pub fn max_time_ms(&self) -> u32 {
        self.state.max_time_ms
    }

    pub fn time_progress(&self) -> f32 {
        self.state.time_progress()
    }

    pub fn target(&self) -> Option<&Target> {
        self.state.target.as_ref()
    }

    pub fn is_target_hit(&self) -> bool {
        self.state.target_hit
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn best_score(&self) -> u32 {
        self.leaderboard.best()
    }

    /// Session clock (ms)
    pub fn now_ms(&self) -> f64 {
        self.tasks.now_ms()
    }

    /// Whether a next-target spawn is scheduled (or held by a pause)
    pub fn spawn_pending(&self) -> bool {
        self.spawn.is_some() || self.paused_spawn_ms.is_some()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    // === Observers ===

    /// Register a callback invoked for every event
    pub fn subscribe(&mut self, callback: impl FnMut(&SessionEvent) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Take the queued events
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: SessionEvent) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&event);
        }
        self.events.push(event);
    }

    // === Layout ===

    /// Update the measured play area (None until laid out)
    pub fn set_play_area(&mut self, area: Option<PlayArea>) {
        self.play_area = area;
    }

    pub fn play_area(&self) -> Option<PlayArea> {
        self.play_area
    }

    // === Transitions ===

    /// menu/ended -> playing
    pub fn start(&mut self) -> bool {
        if !matches!(self.state.phase, GamePhase::Menu | GamePhase::Ended) {
            return false;
        }

        self.cancel_timers();
        self.state.phase = GamePhase::Playing;
        self.state.score = 0;
        self.emit(SessionEvent::Started);
        self.start_round();

        log::info!("Session started");
        true
    }

    /// playing -> paused, countdown and pending spawn are suspended
    pub fn pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }

        if let Some(id) = self.countdown.take() {
            self.tasks.cancel(id);
        }
        if let Some(id) = self.spawn.take() {
            self.paused_spawn_ms = self.tasks.remaining_ms(id);
            self.tasks.cancel(id);
        }

        self.state.phase = GamePhase::Paused;
        self.emit(SessionEvent::Paused);
        true
    }

    /// paused -> playing
    pub fn resume(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }

        self.state.phase = GamePhase::Playing;
        self.schedule_countdown();
        if let Some(remaining) = self.paused_spawn_ms.take() {
            self.spawn = Some(self.tasks.schedule(remaining, SessionTask::SpawnTarget));
        }
        self.emit(SessionEvent::Resumed);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Register a click on the current target.
    /// Ignored unless playing with an un-hit target.
    pub fn hit(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing
            || self.state.target.is_none()
            || self.state.target_hit
        {
            return false;
        }

        self.state.target_hit = true;
        self.state.hit_at_ms = Some(self.now_ms());
        self.state.score += 1;

        let delay = NEXT_TARGET_DELAY_MS as f64;
        self.spawn = Some(self.tasks.schedule(delay, SessionTask::SpawnTarget));

        let score = self.state.score;
        self.emit(SessionEvent::TargetHit { score });
        true
    }

    /// Click at a play-area point; hits the target if the point lands on it
    pub fn click_at(&mut self, point: Vec2) -> bool {
        let on_target = self
            .state
            .target
            .as_ref()
            .is_some_and(|t| t.contains(point));
        on_target && self.hit()
    }

    /// any -> menu, clearing score, target and timers
    pub fn restart(&mut self) {
        self.cancel_timers();
        self.state = GameState::new();
        self.emit(SessionEvent::Restarted);
        log::info!("Session reset to menu");
    }

    /// Advance the session clock, running every timer that comes due
    pub fn advance(&mut self, elapsed_ms: f64) {
        let until = self.now_ms() + elapsed_ms.max(0.0);
        while let Some((id, task)) = self.tasks.pop_due(until) {
            match task {
                SessionTask::CountdownStep => {
                    if self.countdown == Some(id) {
                        self.countdown = None;
                        self.countdown_step();
                    }
                }
                SessionTask::SpawnTarget => {
                    if self.spawn == Some(id) {
                        self.spawn = None;
                        self.start_round();
                    }
                }
            }
        }
        self.tasks.advance_clock(until);
    }

    // === Internals ===

    fn cancel_timers(&mut self) {
        if let Some(id) = self.countdown.take() {
            self.tasks.cancel(id);
        }
        if let Some(id) = self.spawn.take() {
            self.tasks.cancel(id);
        }
        self.paused_spawn_ms = None;
    }

    fn schedule_countdown(&mut self) {
        if let Some(id) = self.countdown.take() {
            self.tasks.cancel(id);
        }
        self.countdown = Some(
            self.tasks
                .schedule(COUNTDOWN_TICK_MS as f64, SessionTask::CountdownStep),
        );
    }

    /// New target with a budget scaled to the current score
    fn start_round(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }

        let id = self.next_target_id;
        self.next_target_id += 1;
        let now = self.now_ms();
        self.state.target = Some(generate_target(&mut self.rng, self.play_area, id, now));
        self.state.target_hit = false;
        self.state.hit_at_ms = None;

        let budget = round_budget_ms(self.state.score);
        self.state.max_time_ms = budget;
        self.state.time_left_ms = budget;

        self.schedule_countdown();
        self.emit(SessionEvent::TargetSpawned { id });
    }

    fn countdown_step(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }

        self.state.time_left_ms = self.state.time_left_ms.saturating_sub(COUNTDOWN_TICK_MS);
        let time_left_ms = self.state.time_left_ms;
        self.emit(SessionEvent::Tick { time_left_ms });

        if time_left_ms == 0 {
            self.end_session();
        } else {
            self.schedule_countdown();
        }
    }

    /// playing -> ended, record and persist the score
    fn end_session(&mut self) {
        self.cancel_timers();
        self.state.phase = GamePhase::Ended;

        let score = self.state.score;
        let record = ScoreRecord {
            score,
            date: leaderboard::iso8601_from_unix_ms(self.epoch_ms + self.now_ms()),
            id: leaderboard::new_record_id(&mut self.rng),
        };
        self.leaderboard.record(record);
        if let Err(e) = self.leaderboard.save(self.store.as_ref()) {
            log::warn!("Failed to save scores: {}", e);
        }
        self.emit(SessionEvent::LeaderboardChanged);

        let new_best = score > 0 && score == self.leaderboard.best();
        if new_best {
            log::info!("New best score: {}", score);
        }
        log::info!("Game over, final score {}", score);
        self.emit(SessionEvent::GameOver { score, new_best });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Store handle that tests can inspect after the session takes ownership
    #[derive(Clone, Default)]
    struct SharedStore(Rc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, crate::persistence::PersistenceError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), crate::persistence::PersistenceError> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), crate::persistence::PersistenceError> {
            self.0.remove(key)
        }
    }

    fn session() -> Session {
        let mut s = Session::new(12345, Box::new(MemoryStore::new()), 1_700_000_000_000.0);
        s.set_play_area(Some(PlayArea::new(800.0, 500.0)));
        s
    }

    fn click_target(s: &mut Session) -> bool {
        let pos = s.target().map(|t| t.pos).unwrap();
        s.click_at(pos)
    }

    #[test]
    fn test_start_from_menu() {
        let mut s = session();
        assert_eq!(s.phase(), GamePhase::Menu);
        assert!(s.start());
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.score(), 0);
        assert_eq!(s.max_time_ms(), 3000);
        assert_eq!(s.time_left_ms(), 3000);
        assert!(s.target().is_some());
        assert!(!s.start(), "start is only valid from menu/ended");
    }

    #[test]
    fn test_countdown_steps_every_50ms() {
        let mut s = session();
        s.start();
        s.advance(49.0);
        assert_eq!(s.time_left_ms(), 3000);
        s.advance(1.0);
        assert_eq!(s.time_left_ms(), 2950);
        s.advance(500.0);
        assert_eq!(s.time_left_ms(), 2450);
    }

    #[test]
    fn test_timeout_ends_once_and_records_once() {
        let mut s = session();
        s.start();
        assert!(click_target(&mut s));
        s.advance(300.0);
        assert!(click_target(&mut s));
        s.drain_events();

        s.advance(10_000.0);
        assert_eq!(s.phase(), GamePhase::Ended);
        assert_eq!(s.time_left_ms(), 0);
        assert_eq!(s.leaderboard().len(), 1);
        assert_eq!(s.leaderboard().entries()[0].score, 2);

        let game_overs: Vec<_> = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::GameOver { .. }))
            .collect();
        assert_eq!(game_overs, vec![SessionEvent::GameOver { score: 2, new_best: true }]);

        // Nothing left scheduled, more time changes nothing
        assert_eq!(s.pending_tasks(), 0);
        s.advance(10_000.0);
        assert_eq!(s.leaderboard().len(), 1);
    }

    #[test]
    fn test_hit_increments_once_and_spawns_once() {
        let mut s = session();
        s.start();
        let first_id = s.target().unwrap().id;

        assert!(click_target(&mut s));
        assert_eq!(s.score(), 1);
        assert!(s.is_target_hit());
        assert!(s.spawn_pending());

        // Second click inside the delay window does nothing
        assert!(!click_target(&mut s));
        assert!(!s.hit());
        assert_eq!(s.score(), 1);

        s.advance(299.0);
        assert_eq!(s.target().unwrap().id, first_id);
        s.advance(1.0);
        let second_id = s.target().unwrap().id;
        assert_ne!(second_id, first_id);
        assert!(!s.is_target_hit());
        assert!(!s.spawn_pending());

        let spawns = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::TargetSpawned { .. }))
            .count();
        assert_eq!(spawns, 2);
    }

    #[test]
    fn test_budget_shrinks_with_score() {
        let mut s = session();
        s.start();
        for expected_score in 1..=25u32 {
            assert!(click_target(&mut s));
            s.advance(NEXT_TARGET_DELAY_MS as f64);
            assert_eq!(s.score(), expected_score);
            assert_eq!(s.max_time_ms(), round_budget_ms(expected_score));
            assert_eq!(s.time_left_ms(), s.max_time_ms());
        }
        assert_eq!(s.max_time_ms(), MIN_ROUND_BUDGET_MS);
    }

    #[test]
    fn test_miss_click_does_nothing() {
        let mut s = session();
        s.start();
        let t = s.target().unwrap().clone();
        let far = t.pos + Vec2::new(t.size, t.size);
        assert!(!s.click_at(far));
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut s = session();
        s.start();
        s.advance(100.0);
        assert_eq!(s.time_left_ms(), 2900);

        assert!(s.pause());
        s.advance(5000.0);
        assert_eq!(s.time_left_ms(), 2900);
        assert_eq!(s.phase(), GamePhase::Paused);
        assert!(!s.hit(), "clicks ignored while paused");

        assert!(s.resume());
        s.advance(50.0);
        assert_eq!(s.time_left_ms(), 2850);
    }

    #[test]
    fn test_pause_holds_pending_spawn() {
        let mut s = session();
        s.start();
        let first_id = s.target().unwrap().id;
        click_target(&mut s);
        s.advance(100.0);

        s.pause();
        s.advance(1000.0);
        assert_eq!(s.target().unwrap().id, first_id);
        assert!(s.spawn_pending());

        s.resume();
        s.advance(199.0);
        assert_eq!(s.target().unwrap().id, first_id);
        s.advance(1.0);
        assert_ne!(s.target().unwrap().id, first_id);
    }

    #[test]
    fn test_restart_cancels_pending_spawn() {
        let mut s = session();
        s.start();
        click_target(&mut s);
        s.restart();

        assert_eq!(s.phase(), GamePhase::Menu);
        assert_eq!(s.score(), 0);
        assert!(s.target().is_none());
        assert_eq!(s.time_left_ms(), 3000);
        assert_eq!(s.max_time_ms(), 3000);
        assert_eq!(s.pending_tasks(), 0);

        s.advance(1000.0);
        assert!(s.target().is_none());
        assert_eq!(s.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_restart_while_paused_drops_held_spawn() {
        let mut s = session();
        s.start();
        click_target(&mut s);
        s.advance(100.0);
        s.pause();
        assert!(s.spawn_pending());

        s.restart();
        assert!(!s.spawn_pending());
        s.drain_events();

        s.start();
        s.advance(300.0);
        s.pause();
        s.resume();
        s.advance(300.0);

        let spawned = s
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::TargetSpawned { .. }))
            .count();
        assert_eq!(spawned, 1);
    }

    #[test]
    fn test_timeout_during_spawn_delay_cancels_spawn() {
        let mut s = session();
        s.start();
        // Burn the clock down to 100ms left, then hit
        s.advance(2900.0);
        assert_eq!(s.time_left_ms(), 100);
        click_target(&mut s);
        s.advance(100.0);
        assert_eq!(s.phase(), GamePhase::Ended);
        assert_eq!(s.pending_tasks(), 0);
        assert_eq!(s.leaderboard().entries()[0].score, 1);
    }

    #[test]
    fn test_play_again_from_ended() {
        let mut s = session();
        s.start();
        s.advance(3000.0);
        assert_eq!(s.phase(), GamePhase::Ended);
        assert!(s.start());
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.score(), 0);
        assert_eq!(s.max_time_ms(), 3000);
    }

    #[test]
    fn test_scores_persist_across_sessions() {
        let store = SharedStore::default();
        let mut s = Session::new(1, Box::new(store.clone()), 0.0);
        s.start();
        click_target(&mut s);
        s.advance(10_000.0);
        assert_eq!(s.phase(), GamePhase::Ended);

        let reloaded = Leaderboard::load(&store);
        assert_eq!(reloaded.best(), 1);
        assert_eq!(reloaded.entries()[0].date.len(), "1970-01-01T00:00:00.000Z".len());

        let s2 = Session::new(2, Box::new(store), 0.0);
        assert_eq!(s2.best_score(), 1);
    }

    #[test]
    fn test_subscribers_see_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut s = session();
        let sink = seen.clone();
        s.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        s.start();
        s.pause();
        s.resume();
        s.restart();

        let seen = seen.borrow();
        assert_eq!(seen[0], SessionEvent::Started);
        assert!(matches!(seen[1], SessionEvent::TargetSpawned { .. }));
        assert_eq!(seen[2], SessionEvent::Paused);
        assert_eq!(seen[3], SessionEvent::Resumed);
        assert_eq!(seen[4], SessionEvent::Restarted);
    }

    #[test]
    fn test_unmeasured_area_uses_fallback() {
        let mut s = Session::new(5, Box::new(MemoryStore::new()), 0.0);
        s.start();
        assert_eq!(s.target().unwrap().pos, Vec2::new(FALLBACK_TARGET_X, FALLBACK_TARGET_Y));
    }

    #[test]
    fn test_zero_score_not_new_best() {
        let mut s = session();
        s.start();
        s.advance(3000.0);
        let events = s.drain_events();
        assert!(events.contains(&SessionEvent::GameOver { score: 0, new_best: false }));
        assert_eq!(s.leaderboard().len(), 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = session();
        let mut b = session();
        for s in [&mut a, &mut b] {
            s.start();
            for _ in 0..5 {
                click_target(s);
                s.advance(350.0);
            }
        }
        assert_eq!(a.target(), b.target());
        assert_eq!(a.time_left_ms(), b.time_left_ms());
    }
}
