use crate::core::{HighlightEvent, HighlightSequence};
use crate::playback::{PlaybackController, PlaybackSnapshot, PlaybackState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// State shared with the timer task
struct Shared {
    controller: PlaybackController,
    /// Bumped whenever the pending tick is cancelled; a tick carrying an
    /// older generation does nothing.
    generation: u64,
    updates: watch::Sender<PlaybackSnapshot>,
}

impl Shared {
    fn publish(&self) {
        self.updates.send_replace(self.controller.snapshot());
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a transport call means for the pending tick
enum TimerAction {
    /// Leave the pending tick alone, starting one if playback needs it
    Keep,
    /// Drop the pending tick and wait a full period from now
    Restart,
    Cancel,
}

/// Timer-driven playback over a highlight sequence.
///
/// Owns at most one pending tick task. Every transport call is synchronous;
/// the task only ever advances the index by one per period. Dropping the
/// engine aborts the task.
pub struct PlaybackEngine {
    shared: Arc<Mutex<Shared>>,
    timer: Option<JoinHandle<()>>,
    runtime: Option<Handle>,
}

impl PlaybackEngine {
    /// Create an engine with an empty sequence. Automatic playback needs a
    /// Tokio runtime to be current at construction.
    pub fn new(speed_ms: u64) -> Self {
        let controller = PlaybackController::with_speed(speed_ms);
        let (updates, _) = watch::channel(controller.snapshot());
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!("No Tokio runtime available, automatic playback disabled");
        }

        Self {
            shared: Arc::new(Mutex::new(Shared {
                controller,
                generation: 0,
                updates,
            })),
            timer: None,
            runtime,
        }
    }

    /// Receive a snapshot after every index, play-state or speed change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        lock(&self.shared).updates.subscribe()
    }

    pub fn load(&mut self, sequence: HighlightSequence) {
        debug!("Loading highlight sequence of {} events", sequence.len());
        self.apply(|c| {
            c.load(sequence);
            TimerAction::Cancel
        });
    }

    pub fn play(&mut self) -> bool {
        self.apply(|c| {
            c.play();
            TimerAction::Keep
        });
        self.is_playing()
    }

    pub fn pause(&mut self) {
        self.apply(|c| {
            c.pause();
            TimerAction::Cancel
        });
    }

    pub fn toggle(&mut self) -> bool {
        self.apply(|c| {
            if c.toggle() {
                TimerAction::Keep
            } else {
                TimerAction::Cancel
            }
        });
        self.is_playing()
    }

    pub fn step_forward(&mut self) {
        self.apply(|c| moved(c.step_forward()));
    }

    pub fn step_backward(&mut self) {
        self.apply(|c| moved(c.step_backward()));
    }

    pub fn seek(&mut self, index: usize) {
        self.apply(|c| moved(c.seek(index)));
    }

    pub fn reset(&mut self) {
        self.apply(|c| {
            c.reset();
            TimerAction::Cancel
        });
    }

    /// Takes effect from the next scheduled tick
    pub fn set_speed(&mut self, speed_ms: u64) -> u64 {
        let mut applied = 0;
        self.apply(|c| {
            c.set_speed(speed_ms);
            applied = c.speed_ms();
            TimerAction::Keep
        });
        applied
    }

    pub fn state(&self) -> PlaybackState {
        lock(&self.shared).controller.state()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        lock(&self.shared).controller.snapshot()
    }

    pub fn current_event(&self) -> Option<HighlightEvent> {
        lock(&self.shared).controller.current_event().cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared).controller.len()
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.shared).controller.is_playing()
    }

    fn apply(&mut self, f: impl FnOnce(&mut PlaybackController) -> TimerAction) {
        let mut shared = lock(&self.shared);
        let action = f(&mut shared.controller);

        let timer_live = self.timer.as_ref().is_some_and(|t| !t.is_finished());
        let needs_tick = shared.controller.pending_delay().is_some();

        match action {
            TimerAction::Keep if timer_live || !needs_tick => {}
            TimerAction::Cancel => cancel(&mut shared, &mut self.timer),
            TimerAction::Keep | TimerAction::Restart => {
                cancel(&mut shared, &mut self.timer);
                if needs_tick {
                    match &self.runtime {
                        Some(runtime) => {
                            let task = run_timer(Arc::clone(&self.shared), shared.generation);
                            self.timer = Some(runtime.spawn(task));
                        }
                        None => shared.controller.pause(),
                    }
                }
            }
        }

        if !shared.controller.is_playing() {
            cancel(&mut shared, &mut self.timer);
        }
        shared.publish();
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        let mut shared = lock(&self.shared);
        cancel(&mut shared, &mut self.timer);
    }
}

fn moved(changed: bool) -> TimerAction {
    if changed {
        TimerAction::Restart
    } else {
        TimerAction::Keep
    }
}

fn cancel(shared: &mut Shared, timer: &mut Option<JoinHandle<()>>) {
    if let Some(task) = timer.take() {
        task.abort();
        shared.generation += 1;
    }
}

/// Tick loop for one play run. Exits when playback stops or the generation
/// it was started with is no longer current.
async fn run_timer(shared: Arc<Mutex<Shared>>, generation: u64) {
    loop {
        let delay = {
            let state = lock(&shared);
            if state.generation != generation {
                return;
            }
            match state.controller.pending_delay() {
                Some(delay) => delay,
                None => return,
            }
        };

        tokio::time::sleep(delay).await;

        let keep_going = {
            let mut state = lock(&shared);
            if state.generation != generation {
                debug!("Discarding stale playback tick");
                false
            } else if state.controller.advance() {
                debug!("Playback tick to event {}", state.controller.current_index());
                state.publish();
                state.controller.is_playing()
            } else {
                false
            }
        };

        if !keep_going {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{MAX_SPEED_MS, MIN_SPEED_MS};
    use proptest::prelude::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn sequence(len: usize) -> HighlightSequence {
        (0..len).map(|i| HighlightEvent::new(format!("n{}", i))).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_end_and_stops() {
        let mut engine = PlaybackEngine::new(100);
        engine.load(vec![
            HighlightEvent::new("a"),
            HighlightEvent::new("b"),
            HighlightEvent::new("c"),
        ]);
        assert!(engine.play());

        sleep(Duration::from_millis(150)).await;
        assert_eq!(engine.state().current_index, 1);
        assert!(engine.is_playing());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.state().current_index, 2);
        assert!(!engine.is_playing());

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(engine.state().current_index, 2);
        assert_eq!(engine.current_event().map(|e| e.node_id), Some("c".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_sequence_never_plays() {
        let mut engine = PlaybackEngine::new(100);
        assert!(!engine.play());
        engine.step_forward();
        assert!(engine.current_event().is_none());
        assert_eq!(engine.state().current_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_cancels_pending_tick() {
        let mut engine = PlaybackEngine::new(100);
        engine.load(sequence(5));
        engine.play();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(engine.state().current_index, 1);

        engine.load(sequence(2));
        assert_eq!(
            engine.state(),
            PlaybackState { current_index: 0, is_playing: false, speed_ms: 100 }
        );

        sleep(Duration::from_millis(500)).await;
        assert_eq!(engine.state().current_index, 0);
        assert!(!engine.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_ticks() {
        let mut engine = PlaybackEngine::new(100);
        engine.load(sequence(5));
        engine.play();
        sleep(Duration::from_millis(150)).await;
        engine.pause();
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(engine.state().current_index, 1);

        engine.play();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(engine.state().current_index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_step_restarts_wait() {
        let mut engine = PlaybackEngine::new(1000);
        engine.load(sequence(5));
        engine.play();

        sleep(Duration::from_millis(600)).await;
        engine.step_forward();
        assert_eq!(engine.state().current_index, 1);
        assert!(engine.is_playing());

        // the tick due at 1000ms was dropped with the step
        sleep(Duration::from_millis(500)).await;
        assert_eq!(engine.state().current_index, 1);

        sleep(Duration::from_millis(600)).await;
        assert_eq!(engine.state().current_index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_change_applies_to_next_wait() {
        let mut engine = PlaybackEngine::new(1000);
        engine.load(sequence(5));
        engine.play();

        sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.set_speed(100), 100);
        sleep(Duration::from_millis(500)).await;
        assert_eq!(engine.state().current_index, 0);

        sleep(Duration::from_millis(450)).await;
        assert_eq!(engine.state().current_index, 1);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.state().current_index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_twice_does_not_double_tick() {
        let mut engine = PlaybackEngine::new(100);
        engine.load(sequence(10));
        engine.play();
        engine.play();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(engine.state().current_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_after_steps() {
        let mut engine = PlaybackEngine::new(100);
        engine.load(sequence(5));
        engine.step_forward();
        engine.step_forward();
        engine.step_forward();
        engine.reset();
        assert_eq!(
            engine.state(),
            PlaybackState { current_index: 0, is_playing: false, speed_ms: 100 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_ticks() {
        let mut engine = PlaybackEngine::new(100);
        let mut updates = engine.subscribe();
        engine.load(sequence(3));
        engine.play();
        updates.borrow_and_update();

        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.state.current_index, 1);
        assert_eq!(snapshot.len, 3);
        assert_eq!(snapshot.event.map(|e| e.node_id), Some("n1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_timer() {
        let mut engine = PlaybackEngine::new(100);
        let updates = engine.subscribe();
        engine.load(sequence(5));
        engine.play();
        drop(engine);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(updates.borrow().state.current_index, 0);
    }

    #[test]
    fn test_without_runtime_stays_manual() {
        let mut engine = PlaybackEngine::new(100);
        engine.load(sequence(3));
        assert!(!engine.play());
        engine.step_forward();
        assert_eq!(engine.state().current_index, 1);
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Load(usize),
        Play,
        Pause,
        Toggle,
        Forward,
        Back,
        Seek(usize),
        Reset,
        Speed(u64),
        Sleep(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..8).prop_map(Op::Load),
            Just(Op::Play),
            Just(Op::Pause),
            Just(Op::Toggle),
            Just(Op::Forward),
            Just(Op::Back),
            (0usize..12).prop_map(Op::Seek),
            Just(Op::Reset),
            (0u64..3000).prop_map(Op::Speed),
            (0u64..2500).prop_map(Op::Sleep),
        ]
    }

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_timed_playback_stays_in_bounds(ops in prop::collection::vec(op(), 0..60)) {
            paused_runtime().block_on(async move {
                let mut engine = PlaybackEngine::new(MIN_SPEED_MS);

                for op in ops {
                    let before = engine.state().current_index;
                    match op {
                        Op::Load(len) => engine.load(sequence(len)),
                        Op::Play => { engine.play(); }
                        Op::Pause => engine.pause(),
                        Op::Toggle => { engine.toggle(); }
                        Op::Forward => engine.step_forward(),
                        Op::Back => engine.step_backward(),
                        Op::Seek(index) => engine.seek(index),
                        Op::Reset => engine.reset(),
                        Op::Speed(ms) => { engine.set_speed(ms); }
                        Op::Sleep(ms) => {
                            sleep(Duration::from_millis(ms)).await;
                            // at most one tick per shortest period, plus one already due
                            let ticks = engine.state().current_index.saturating_sub(before);
                            prop_assert!(ticks as u64 <= ms / MIN_SPEED_MS + 1);
                        }
                    }

                    let state = engine.state();
                    let last = engine.len().saturating_sub(1);
                    prop_assert!(state.current_index <= last);
                    if state.is_playing {
                        prop_assert!(state.current_index < last);
                    }
                    prop_assert!((MIN_SPEED_MS..=MAX_SPEED_MS).contains(&state.speed_ms));
                }

                // whatever is left plays out and stops on the last event
                engine.play();
                sleep(Duration::from_millis(MAX_SPEED_MS * 10)).await;
                let state = engine.state();
                prop_assert!(!state.is_playing);
                prop_assert_eq!(state.current_index, engine.len().saturating_sub(1));
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
