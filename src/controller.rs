//! Playback controller: sequences synthesis-and-playback cycles over one
//! sentence list at a time.
//!
//! Exactly one session is live per engine instance. Each session owns a
//! worker thread that processes batches strictly sequentially: plan, emit the
//! optimistic batch-start highlight, synthesize, play, sample position,
//! advance. A per-session cancellation token makes `stop()` an effective
//! cancellation; any synthesis response or audio event observed after
//! cancellation is discarded rather than applied, so a superseded session can
//! never touch a fresh one.

use crate::audio::{AudioBackend, AudioPlayable, RodioBackend};
use crate::batch;
use crate::config::NarratorConfig;
use crate::error::NarrationError;
use crate::estimator::PositionEstimator;
use crate::gateway::{ElevenLabsGateway, SynthesisGateway};
use crate::governor::FailureGovernor;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Callbacks bound to a single session; a superseded session's events are
/// provably dropped before they reach these.
pub struct SessionCallbacks {
    pub on_sentence_change: Box<dyn Fn(usize) + Send>,
    pub on_end: Box<dyn Fn() + Send>,
}

#[derive(Debug, Clone, Copy)]
struct ControlState {
    paused: bool,
    rate: f32,
    volume: f32,
}

struct SessionShared {
    control: Mutex<ControlState>,
    current_index: AtomicUsize,
    level: AtomicU32,
}

/// Session identity guard. Cancelling discards every not-yet-applied result
/// of the session, including in-flight synthesis responses.
#[derive(Clone, Default)]
struct SessionToken {
    cancelled: Arc<AtomicBool>,
}

impl SessionToken {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

struct SessionHandle {
    token: SessionToken,
    shared: Arc<SessionShared>,
    generation: u64,
}

/// The narration engine instance. Owned by the caller; dropping or stopping
/// it tears the active session down. A fresh instance resets the failure
/// latch.
pub struct Narrator {
    gateway: Arc<dyn SynthesisGateway>,
    backend: Arc<dyn AudioBackend>,
    governor: FailureGovernor,
    voice_id: String,
    batch_size: usize,
    words_per_minute: f64,
    poll_interval: Duration,
    /// Held by a worker for exactly as long as it owns an audio resource, so
    /// resources from consecutive sessions can never overlap.
    resource_gate: Arc<Mutex<()>>,
    generation: u64,
    session: Option<SessionHandle>,
}

impl Narrator {
    pub fn new(
        config: &NarratorConfig,
        gateway: Arc<dyn SynthesisGateway>,
        backend: Arc<dyn AudioBackend>,
    ) -> Self {
        Self {
            gateway,
            backend,
            governor: FailureGovernor::new(),
            voice_id: config.voice_id.clone(),
            batch_size: config.batch_size.max(1),
            words_per_minute: config.words_per_minute,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            resource_gate: Arc::new(Mutex::new(())),
            generation: 0,
            session: None,
        }
    }

    /// Production wiring: ElevenLabs gateway plus the host audio stack.
    /// Fails before any request when the credential is missing.
    pub fn from_config(config: &NarratorConfig) -> Result<Self, NarrationError> {
        let gateway = ElevenLabsGateway::new(config.resolved_api_key(), config.model_id.clone())?;
        Ok(Self::new(
            config,
            Arc::new(gateway),
            Arc::new(RodioBackend),
        ))
    }

    /// Tear down any existing session and begin playback of `sentences` at
    /// `from_idx`. Invalid input is absorbed as a no-op; a latched failure
    /// governor short-circuits to `on_end` without any network call.
    pub fn start(
        &mut self,
        sentences: Vec<String>,
        from_idx: usize,
        rate: f32,
        volume: f32,
        callbacks: SessionCallbacks,
    ) {
        self.stop();

        if sentences.is_empty() || from_idx >= sentences.len() {
            let err = NarrationError::Input(format!(
                "start index {from_idx} outside 0..{}",
                sentences.len()
            ));
            warn!("Ignoring start: {err}");
            return;
        }

        if let Err(err) = self.governor.check("start") {
            info!("Ending immediately: {err}");
            (callbacks.on_end)();
            return;
        }

        self.generation = self.generation.wrapping_add(1);
        let token = SessionToken::default();
        let shared = Arc::new(SessionShared {
            control: Mutex::new(ControlState {
                paused: false,
                rate,
                volume,
            }),
            current_index: AtomicUsize::new(from_idx),
            level: AtomicU32::new(0),
        });

        let worker = SessionWorker {
            gateway: Arc::clone(&self.gateway),
            backend: Arc::clone(&self.backend),
            governor: self.governor.clone(),
            token: token.clone(),
            shared: Arc::clone(&shared),
            resource_gate: Arc::clone(&self.resource_gate),
            sentences,
            voice_id: self.voice_id.clone(),
            batch_size: self.batch_size,
            words_per_minute: self.words_per_minute,
            poll_interval: self.poll_interval,
            callbacks,
        };

        let generation = self.generation;
        info!(generation, from_idx, "Starting narration session");
        thread::spawn(move || worker.run(from_idx));

        self.session = Some(SessionHandle {
            token,
            shared,
            generation,
        });
    }

    /// Pause the live resource and suspend position sampling. The resource
    /// is not released.
    pub fn pause(&self) {
        if let Some(session) = &self.session {
            debug!(generation = session.generation, "Pausing session");
            lock_control(&session.shared).paused = true;
        }
    }

    /// Resume the live resource in place, or let a worker parked between
    /// batches re-request the current batch from the current sentence.
    pub fn resume(&self, rate: f32, volume: f32) {
        if let Some(session) = &self.session {
            debug!(generation = session.generation, "Resuming session");
            let mut control = lock_control(&session.shared);
            control.rate = rate;
            control.volume = volume;
            control.paused = false;
        }
    }

    /// Cancel the session. Safe to repeat; the worker releases the audio
    /// resource and discards in-flight results on its own thread.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            info!(generation = session.generation, "Stopping session");
            session.token.cancel();
        }
    }

    /// Applies to the live resource immediately; otherwise recorded for the
    /// next batch request.
    pub fn set_rate(&self, rate: f32) {
        if let Some(session) = &self.session {
            lock_control(&session.shared).rate = rate;
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Some(session) = &self.session {
            lock_control(&session.shared).volume = volume;
        }
    }

    pub fn current_sentence_index(&self) -> Option<usize> {
        self.session
            .as_ref()
            .map(|session| session.shared.current_index.load(Ordering::Relaxed))
    }

    /// Latest sample from the optional level-metering feed.
    pub fn current_level(&self) -> f32 {
        self.session
            .as_ref()
            .map(|session| f32::from_bits(session.shared.level.load(Ordering::Relaxed)))
            .unwrap_or(0.0)
    }

    pub fn is_failed(&self) -> bool {
        self.governor.is_latched()
    }
}

impl Drop for Narrator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_control(shared: &SessionShared) -> MutexGuard<'_, ControlState> {
    shared
        .control
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_gate(gate: &Mutex<()>) -> MutexGuard<'_, ()> {
    gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct SessionWorker {
    gateway: Arc<dyn SynthesisGateway>,
    backend: Arc<dyn AudioBackend>,
    governor: FailureGovernor,
    token: SessionToken,
    shared: Arc<SessionShared>,
    resource_gate: Arc<Mutex<()>>,
    sentences: Vec<String>,
    voice_id: String,
    batch_size: usize,
    words_per_minute: f64,
    poll_interval: Duration,
    callbacks: SessionCallbacks,
}

impl SessionWorker {
    fn run(self, from_idx: usize) {
        let mut cursor = from_idx;
        let mut last_emitted: Option<usize> = None;

        loop {
            if !self.park_while_paused() {
                return;
            }

            let Some(plan) = batch::plan(&self.sentences, cursor, self.batch_size) else {
                debug!(cursor, "Document finished");
                self.emit_end();
                return;
            };

            // Optimistic feedback before audio is ready.
            self.emit_sentence(plan.start, &mut last_emitted);

            let (rate, volume) = {
                let control = lock_control(&self.shared);
                (control.rate, control.volume)
            };

            let bytes = match self.gateway.synthesize(&plan.text, &self.voice_id) {
                Ok(bytes) => bytes,
                Err(failure) => {
                    if self.token.is_cancelled() {
                        debug!("Discarding synthesis failure from cancelled session");
                        return;
                    }
                    let err = NarrationError::from(failure);
                    warn!("Synthesis failed; disabling further attempts: {err}");
                    if err.latches() {
                        self.governor.latch();
                    }
                    self.emit_end();
                    return;
                }
            };

            // A response that raced with stop() must not be applied.
            if self.token.is_cancelled() {
                debug!("Discarding synthesis response from cancelled session");
                return;
            }

            // A superseded worker may hold its player for one more poll tick;
            // the gate waits that out. Must outlive the player below.
            let _resource_slot = lock_gate(&self.resource_gate);
            let mut player = match self.backend.load(bytes) {
                Ok(player) => player,
                Err(err) => {
                    warn!("Audio resource failed; disabling further attempts: {err}");
                    if err.latches() {
                        self.governor.latch();
                    }
                    self.emit_end();
                    return;
                }
            };

            player.set_rate(rate);
            player.set_volume(volume);
            player.play();

            let batch_sentences = &self.sentences[plan.start..plan.end];
            let mut estimator =
                PositionEstimator::seed(&plan, batch_sentences, self.words_per_minute, rate as f64);

            if !self.drive_playback(player.as_mut(), &mut estimator, &mut last_emitted) {
                return; // player drops here, releasing the resource
            }

            // Natural end of the batch: report its last sentence, release the
            // resource (drop), then advance the cursor.
            self.emit_sentence(plan.end - 1, &mut last_emitted);
            drop(player);
            cursor = plan.end;
        }
    }

    /// Poll the live resource until it finishes. Returns `false` when the
    /// session was cancelled mid-batch.
    fn drive_playback(
        &self,
        player: &mut dyn AudioPlayable,
        estimator: &mut PositionEstimator,
        last_emitted: &mut Option<usize>,
    ) -> bool {
        let mut was_paused = false;

        loop {
            if self.token.is_cancelled() {
                return false;
            }

            let control = *lock_control(&self.shared);
            player.set_rate(control.rate);
            player.set_volume(control.volume);

            if control.paused != was_paused {
                if control.paused {
                    player.pause();
                } else {
                    player.resume();
                }
                was_paused = control.paused;
            }

            if !control.paused {
                if !estimator.is_refined() {
                    if let Some(duration) = player.duration() {
                        estimator.refine(duration.as_secs_f64());
                    }
                }

                if let Some(idx) = estimator.sentence_at(player.position().as_secs_f64()) {
                    self.emit_sentence(idx, last_emitted);
                }

                self.shared
                    .level
                    .store(player.level().to_bits(), Ordering::Relaxed);

                if player.is_finished() {
                    return true;
                }
            }

            thread::sleep(self.poll_interval);
        }
    }

    /// Park between batches while paused. Returns `false` on cancellation.
    fn park_while_paused(&self) -> bool {
        loop {
            if self.token.is_cancelled() {
                return false;
            }
            if !lock_control(&self.shared).paused {
                return true;
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn emit_sentence(&self, idx: usize, last_emitted: &mut Option<usize>) {
        if *last_emitted == Some(idx) || self.token.is_cancelled() {
            return;
        }
        *last_emitted = Some(idx);
        self.shared.current_index.store(idx, Ordering::Relaxed);
        (self.callbacks.on_sentence_change)(idx);
    }

    fn emit_end(&self) {
        if self.token.is_cancelled() {
            return;
        }
        (self.callbacks.on_end)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::SynthesisFailure;
    use std::sync::mpsc;
    use std::time::Instant;

    #[derive(Debug, PartialEq)]
    enum Event {
        Sentence(usize),
        End,
    }

    fn session_callbacks(tx: mpsc::Sender<Event>) -> SessionCallbacks {
        let sentence_tx = tx.clone();
        SessionCallbacks {
            on_sentence_change: Box::new(move |idx| {
                let _ = sentence_tx.send(Event::Sentence(idx));
            }),
            on_end: Box::new(move || {
                let _ = tx.send(Event::End);
            }),
        }
    }

    struct FakeGateway {
        calls: AtomicUsize,
        texts: Mutex<Vec<String>>,
        fail: bool,
        delay: Duration,
    }

    impl FakeGateway {
        fn new(fail: bool, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                texts: Mutex::new(Vec::new()),
                fail,
                delay,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SynthesisGateway for FakeGateway {
        fn synthesize(&self, text: &str, _voice: &str) -> Result<Vec<u8>, SynthesisFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.lock().unwrap().push(text.to_string());
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            if self.fail {
                Err(SynthesisFailure {
                    recoverable: false,
                    message: "scripted failure".into(),
                })
            } else {
                Ok(text.as_bytes().to_vec())
            }
        }
    }

    /// Maps payload size to playback time so batch text length controls how
    /// long the fake audio "plays". Counts live players through `Drop` to
    /// observe whether two resources ever coexist.
    struct FakeBackend {
        millis_per_byte: u64,
        loads: AtomicUsize,
        live: Arc<AtomicUsize>,
        peak: AtomicUsize,
    }

    impl FakeBackend {
        fn new(millis_per_byte: u64) -> Arc<Self> {
            Arc::new(Self {
                millis_per_byte,
                loads: AtomicUsize::new(0),
                live: Arc::new(AtomicUsize::new(0)),
                peak: AtomicUsize::new(0),
            })
        }

        fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }

        fn live_count(&self) -> usize {
            self.live.load(Ordering::SeqCst)
        }

        fn peak_live(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    impl AudioBackend for FakeBackend {
        fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn AudioPlayable>, NarrationError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(live, Ordering::SeqCst);
            Ok(Box::new(FakePlayer {
                duration: Duration::from_millis(bytes.len() as u64 * self.millis_per_byte),
                played: Duration::ZERO,
                playing_since: None,
                live: Arc::clone(&self.live),
            }))
        }
    }

    struct FakePlayer {
        duration: Duration,
        played: Duration,
        playing_since: Option<Instant>,
        live: Arc<AtomicUsize>,
    }

    impl Drop for FakePlayer {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl AudioPlayable for FakePlayer {
        fn play(&mut self) {
            if self.playing_since.is_none() {
                self.playing_since = Some(Instant::now());
            }
        }

        fn pause(&mut self) {
            if let Some(since) = self.playing_since.take() {
                self.played += since.elapsed();
            }
        }

        fn resume(&mut self) {
            self.play();
        }

        fn set_rate(&mut self, _rate: f32) {}

        fn set_volume(&mut self, _volume: f32) {}

        fn position(&self) -> Duration {
            self.played
                + self
                    .playing_since
                    .map(|since| since.elapsed())
                    .unwrap_or(Duration::ZERO)
        }

        fn duration(&self) -> Option<Duration> {
            Some(self.duration)
        }

        fn is_finished(&self) -> bool {
            self.position() >= self.duration
        }
    }

    fn test_config() -> NarratorConfig {
        NarratorConfig {
            batch_size: 2,
            poll_interval_ms: 5,
            ..NarratorConfig::default()
        }
    }

    fn sentences(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("Sentence {i}.")).collect()
    }

    fn wait_until(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn collect_until_end(rx: &mpsc::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(5)) {
                Ok(Event::End) => {
                    events.push(Event::End);
                    return events;
                }
                Ok(event) => events.push(event),
                Err(err) => panic!("no end event: {err}; saw {events:?}"),
            }
        }
    }

    #[test]
    fn batches_play_strictly_sequentially() {
        let gateway = FakeGateway::new(false, Duration::ZERO);
        let backend = FakeBackend::new(2);
        let mut narrator = Narrator::new(
            &test_config(),
            Arc::clone(&gateway) as Arc<dyn SynthesisGateway>,
            Arc::clone(&backend) as Arc<dyn AudioBackend>,
        );

        let (tx, rx) = mpsc::channel();
        narrator.start(sentences(5), 0, 1.0, 0.75, session_callbacks(tx));
        let events = collect_until_end(&rx);

        assert_eq!(gateway.call_count(), 3, "three batches for five sentences");
        let texts = gateway.texts.lock().unwrap().clone();
        assert_eq!(texts[0], "Sentence 0. Sentence 1.");
        assert_eq!(texts[1], "Sentence 2. Sentence 3.");
        assert_eq!(texts[2], "Sentence 4.");

        assert_eq!(events.first(), Some(&Event::Sentence(0)));
        let indices: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                Event::Sentence(idx) => Some(*idx),
                Event::End => None,
            })
            .collect();
        assert!(
            indices.windows(2).all(|pair| pair[0] <= pair[1]),
            "sentence indices must be monotonic: {indices:?}"
        );
        assert!(indices.contains(&2) && indices.contains(&4));
        assert_eq!(events.iter().filter(|e| **e == Event::End).count(), 1);
    }

    #[test]
    fn provider_failure_latches_permanently() {
        let gateway = FakeGateway::new(true, Duration::ZERO);
        let backend = FakeBackend::new(2);
        let mut narrator = Narrator::new(
            &test_config(),
            Arc::clone(&gateway) as Arc<dyn SynthesisGateway>,
            Arc::clone(&backend) as Arc<dyn AudioBackend>,
        );

        let (tx, rx) = mpsc::channel();
        narrator.start(sentences(5), 0, 1.0, 0.75, session_callbacks(tx));
        let events = collect_until_end(&rx);
        assert!(events.contains(&Event::End));
        assert!(narrator.is_failed());
        assert_eq!(gateway.call_count(), 1);

        // Latched: the next start makes zero network calls and ends at once.
        let (tx2, rx2) = mpsc::channel();
        narrator.start(sentences(5), 0, 1.0, 0.75, session_callbacks(tx2));
        assert_eq!(
            rx2.recv_timeout(Duration::from_millis(100)),
            Ok(Event::End)
        );
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(backend.load_count(), 0);
    }

    #[test]
    fn stop_discards_in_flight_results() {
        let gateway = FakeGateway::new(false, Duration::from_millis(300));
        let backend = FakeBackend::new(2);
        let mut narrator = Narrator::new(
            &test_config(),
            Arc::clone(&gateway) as Arc<dyn SynthesisGateway>,
            Arc::clone(&backend) as Arc<dyn AudioBackend>,
        );

        let (tx, rx) = mpsc::channel();
        narrator.start(sentences(4), 0, 1.0, 0.75, session_callbacks(tx));
        thread::sleep(Duration::from_millis(50));
        narrator.stop();

        // Wait out the slow response; it must be discarded, never played.
        thread::sleep(Duration::from_millis(500));
        assert_eq!(backend.load_count(), 0);
        let mut late_events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            late_events.push(event);
        }
        assert!(
            !late_events.contains(&Event::End),
            "stopped session must not report end: {late_events:?}"
        );
        assert!(late_events.len() <= 1, "only the optimistic batch-start emit may precede stop");
    }

    #[test]
    fn superseded_session_releases_audio_before_the_next_loads() {
        let gateway = FakeGateway::new(false, Duration::ZERO);
        // Long enough that the first batch is still playing when superseded.
        let backend = FakeBackend::new(100_000);
        let mut narrator = Narrator::new(
            &test_config(),
            Arc::clone(&gateway) as Arc<dyn SynthesisGateway>,
            Arc::clone(&backend) as Arc<dyn AudioBackend>,
        );

        let (tx, _rx) = mpsc::channel();
        narrator.start(sentences(2), 0, 1.0, 0.75, session_callbacks(tx));
        wait_until(|| backend.live_count() == 1);

        let (tx2, _rx2) = mpsc::channel();
        narrator.start(sentences(2), 0, 1.0, 0.75, session_callbacks(tx2));
        wait_until(|| backend.load_count() == 2);

        assert_eq!(backend.peak_live(), 1, "audio resources overlapped");
        narrator.stop();
        wait_until(|| backend.live_count() == 0);
    }

    #[test]
    fn invalid_input_is_a_noop() {
        let gateway = FakeGateway::new(false, Duration::ZERO);
        let backend = FakeBackend::new(2);
        let mut narrator = Narrator::new(
            &test_config(),
            Arc::clone(&gateway) as Arc<dyn SynthesisGateway>,
            Arc::clone(&backend) as Arc<dyn AudioBackend>,
        );

        let (tx, rx) = mpsc::channel();
        narrator.start(Vec::new(), 0, 1.0, 0.75, session_callbacks(tx.clone()));
        narrator.start(sentences(3), 7, 1.0, 0.75, session_callbacks(tx));

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(gateway.call_count(), 0);
        assert!(!narrator.is_failed(), "caller mistakes must not latch");
    }

    #[test]
    fn pause_then_resume_completes() {
        let gateway = FakeGateway::new(false, Duration::ZERO);
        let backend = FakeBackend::new(5);
        let mut narrator = Narrator::new(
            &test_config(),
            Arc::clone(&gateway) as Arc<dyn SynthesisGateway>,
            Arc::clone(&backend) as Arc<dyn AudioBackend>,
        );

        let (tx, rx) = mpsc::channel();
        narrator.start(sentences(2), 0, 1.0, 0.75, session_callbacks(tx));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)),
            Ok(Event::Sentence(0))
        );

        narrator.pause();
        thread::sleep(Duration::from_millis(100));
        narrator.set_rate(1.5);
        narrator.set_volume(0.5);
        narrator.resume(1.0, 0.75);

        let events = collect_until_end(&rx);
        assert!(events.contains(&Event::End));
    }

    #[test]
    fn position_advances_through_the_batch() {
        // Offsets [0, 10, 20]; the second sentence begins at 50% progress.
        let gateway = FakeGateway::new(false, Duration::ZERO);
        let backend = FakeBackend::new(20);
        let mut narrator = Narrator::new(
            &test_config(),
            Arc::clone(&gateway) as Arc<dyn SynthesisGateway>,
            Arc::clone(&backend) as Arc<dyn AudioBackend>,
        );

        let batch = vec!["Aaaa bbb.".to_string(), "Cccc dddd.".to_string()];
        let (tx, rx) = mpsc::channel();
        narrator.start(batch, 0, 1.0, 0.75, session_callbacks(tx));
        let events = collect_until_end(&rx);

        let end_pos = events.iter().position(|e| *e == Event::End).unwrap();
        assert!(
            events[..end_pos].contains(&Event::Sentence(1)),
            "second sentence must be reported before the end: {events:?}"
        );
        assert_eq!(narrator.current_sentence_index(), Some(1));
    }
}
