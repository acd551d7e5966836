//! Segment capture loop
//!
//! One control task owns the caption log, the interim transcript, and the
//! loop state. Start/stop commands, timer ticks, recognition events, and
//! classification outcomes all arrive as messages on that task, so no
//! state is ever shared across tasks.
//!
//! # Behavior
//! While listening, a repeating timer stops the current recording segment
//! on each tick, hands it to the classifier on a spawned task, and starts
//! the next segment after a short settle delay. Classification outcomes
//! come back as messages and append to the caption log in arrival order,
//! even after the loop has stopped.

mod events;

pub(crate) use events::spawn_event_handler;

use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant, Sleep};
use tracing::{debug, error, info, warn};

use crate::audio::{AudioSegment, CaptureError, SegmentRecorder};
use crate::backend::Backend;
use crate::captions::{CaptionEntry, CaptionLog};
use crate::classify::{Classification, EmotionClassifier};
use crate::config::CaptureConfig;
use crate::error::ClassifyError;
use crate::recognition::{RecognitionError, RecognitionEvent, SpeechRecognizer};

/// Session lifecycle and caption events for subscribers
#[derive(Clone, Debug)]
pub(crate) enum SessionEvent {
    /// Listening started
    Started,
    /// Listening stopped
    Stopped,
    /// Interim transcript replaced (empty text clears the ghost line)
    Interim { text: String },
    /// A caption entry was appended
    Caption { entry: CaptionEntry },
    /// A segment below the silence threshold was dropped
    SegmentSkipped { bytes: usize },
    /// Recognition is unavailable; the feature is disabled
    Unsupported { message: String },
    /// Microphone access was refused; starting again may succeed
    MicrophoneDenied,
}

enum Command {
    Start,
    Stop,
    Captions(oneshot::Sender<Vec<CaptionEntry>>),
}

/// Handle to a spawned listen session
///
/// Cloneable commands go to the control task; dropping the last handle
/// shuts the task down.
pub(crate) struct SessionHandle {
    cmd_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Request the loop to start listening
    pub async fn start(&self) {
        let _ = self.cmd_tx.send(Command::Start).await;
    }

    /// Request the loop to stop listening
    pub async fn stop(&self) {
        let _ = self.cmd_tx.send(Command::Stop).await;
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Snapshot of the caption log
    pub async fn captions(&self) -> Vec<CaptionEntry> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(Command::Captions(reply_tx))
            .await
            .is_err()
        {
            return Vec::new();
        }
        reply_rx.await.unwrap_or_default()
    }
}

/// Spawn a listen session on its own control task
pub(crate) fn spawn(backend: Backend, capture: CaptureConfig) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, _) = broadcast::channel(100);
    let (outcome_tx, outcome_rx) = mpsc::channel(32);

    let listen_loop = ListenLoop {
        recorder: backend.recorder,
        recognizer: backend.recognizer,
        classifier: backend.classifier,
        capture,
        captions: CaptionLog::default(),
        interim: String::new(),
        active: false,
        recording: false,
        event_tx: event_tx.clone(),
        outcome_tx,
    };

    tokio::spawn(run(listen_loop, cmd_rx, outcome_rx));

    SessionHandle { cmd_tx, event_tx }
}

struct ListenLoop {
    recorder: Box<dyn SegmentRecorder>,
    recognizer: Box<dyn SpeechRecognizer>,
    classifier: Option<Arc<dyn EmotionClassifier>>,
    capture: CaptureConfig,
    captions: CaptionLog,
    interim: String,
    active: bool,
    recording: bool,
    event_tx: broadcast::Sender<SessionEvent>,
    outcome_tx: mpsc::Sender<Result<Classification, ClassifyError>>,
}

async fn run(
    mut this: ListenLoop,
    mut cmd_rx: mpsc::Receiver<Command>,
    mut outcome_rx: mpsc::Receiver<Result<Classification, ClassifyError>>,
) {
    let period = this.capture.segment_duration();
    let mut ticker = time::interval(period);
    let mut settle: Option<Pin<Box<Sleep>>> = None;
    let mut recog_rx = this.recognizer.subscribe();
    let mut recog_closed = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Start) => {
                    if this.start_listening() {
                        // First boundary fires one full period from now
                        ticker = time::interval_at(Instant::now() + period, period);
                        settle = None;
                    }
                }
                Some(Command::Stop) => {
                    // A stop inside the settle window must not let the
                    // pending timer resurrect recording
                    settle = None;
                    this.stop_listening();
                }
                Some(Command::Captions(reply)) => {
                    let _ = reply.send(this.captions.snapshot());
                }
                None => break,
            },
            Some(outcome) = outcome_rx.recv() => {
                // Applied regardless of state: a response for a segment
                // submitted before stop still lands
                this.apply_classification(outcome);
            }
            _ = ticker.tick(), if this.active && this.classifier.is_some() => {
                this.segment_boundary();
                settle = Some(Box::pin(time::sleep(this.capture.settle_delay())));
            }
            _ = poll_settle(&mut settle), if settle.is_some() => {
                settle = None;
                this.settle_elapsed();
            }
            event = recog_rx.recv(), if !recog_closed => match event {
                Ok(event) => this.on_recognition(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Recognition events lagged");
                }
                Err(RecvError::Closed) => recog_closed = true,
            },
        }
    }

    if this.active {
        this.stop_listening();
    }
}

async fn poll_settle(settle: &mut Option<Pin<Box<Sleep>>>) {
    match settle.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

impl ListenLoop {
    /// Idle -> Active; returns whether the loop became active
    fn start_listening(&mut self) -> bool {
        if self.active {
            debug!("Start ignored; already listening");
            return false;
        }

        if let Err(e) = self.recognizer.start() {
            match e {
                RecognitionError::Unsupported => {
                    error!("Speech recognition unsupported; live captions disabled");
                    let _ = self.event_tx.send(SessionEvent::Unsupported {
                        message: "Speech recognition is not supported on this device".to_string(),
                    });
                }
                other => error!("Failed to start recognition: {}", other),
            }
            return false;
        }

        if self.classifier.is_some() {
            if let Err(e) = self.recorder.start() {
                self.recognizer.stop();
                match e {
                    CaptureError::PermissionDenied => {
                        warn!("Microphone access denied; listening not started");
                        let _ = self.event_tx.send(SessionEvent::MicrophoneDenied);
                    }
                    other => error!("Failed to start recording: {}", other),
                }
                return false;
            }
            self.recording = true;
        }

        self.active = true;
        self.set_interim(String::new());
        let _ = self.event_tx.send(SessionEvent::Started);
        info!("Listening started");
        true
    }

    /// Active -> Idle
    fn stop_listening(&mut self) {
        if !self.active {
            debug!("Stop ignored; not listening");
            return;
        }
        self.active = false;
        self.recognizer.stop();

        if self.recording {
            self.recording = false;
            // The blob from this final stop is discarded; only
            // classifications already in flight may still append
            if let Err(e) = self.recorder.stop() {
                error!("Failed to stop recording: {}", e);
            }
        }

        self.set_interim(String::new());
        let _ = self.event_tx.send(SessionEvent::Stopped);
        if !self.captions.is_empty() {
            info!(captions = self.captions.len(), "Listening stopped");
        } else {
            info!("Listening stopped");
        }
    }

    /// Timer tick: finish the current segment and reset the interim text
    fn segment_boundary(&mut self) {
        if self.recording {
            self.recording = false;
            match self.recorder.stop() {
                Ok(segment) => self.dispatch_segment(segment),
                Err(e) => error!("Failed to finish segment: {}", e),
            }
        }
        self.set_interim(String::new());
    }

    /// Settle delay elapsed: begin the next segment if still listening
    fn settle_elapsed(&mut self) {
        if !self.active || self.classifier.is_none() {
            return;
        }
        match self.recorder.start() {
            Ok(()) => self.recording = true,
            Err(e) => error!("Failed to restart recording: {}", e),
        }
    }

    /// Hand a completed segment to the classifier on its own task
    fn dispatch_segment(&mut self, segment: AudioSegment) {
        let Some(classifier) = self.classifier.as_ref() else {
            return;
        };

        let bytes = segment.byte_len();
        if bytes < self.capture.min_segment_bytes {
            debug!(bytes, "Segment below silence threshold; skipped");
            let _ = self.event_tx.send(SessionEvent::SegmentSkipped { bytes });
            return;
        }

        debug!(bytes, "Submitting segment for classification");
        let request = classifier.classify(segment);
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = request.await;
            let _ = outcome_tx.send(outcome).await;
        });
    }

    /// Apply one classification outcome to the caption log
    fn apply_classification(&mut self, outcome: Result<Classification, ClassifyError>) {
        match outcome {
            Ok(classification) => {
                self.append_caption(&classification.text, classification.emotion);
            }
            Err(e) => {
                // Failed segments are dropped silently; diagnostic only
                warn!("Classification failed; segment dropped: {}", e);
            }
        }
    }

    fn append_caption(&mut self, text: &str, emotion: Option<String>) {
        let text = text.trim();
        if text.is_empty() {
            debug!("Empty classification text; no caption appended");
            return;
        }
        let entry = CaptionEntry {
            text: text.to_string(),
            emotion,
        };
        self.captions.push(entry.clone());
        let _ = self.event_tx.send(SessionEvent::Caption { entry });
    }

    fn on_recognition(&mut self, event: RecognitionEvent) {
        if !self.active {
            return;
        }
        match event {
            RecognitionEvent::Interim { text } => self.set_interim(text),
            RecognitionEvent::Final { text } => {
                // Without a classifier, finalized recognition text is the
                // caption source (no emotion attached)
                if self.classifier.is_none() {
                    self.append_caption(&text, None);
                }
                self.set_interim(String::new());
            }
            RecognitionEvent::Error { message } => {
                error!("Recognition error: {}", message);
            }
        }
    }

    /// Replace the interim transcript wholesale
    fn set_interim(&mut self, text: String) {
        if self.interim == text {
            return;
        }
        self.interim = text;
        let _ = self.event_tx.send(SessionEvent::Interim {
            text: self.interim.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::{NoopRecognizer, UnsupportedRecognizer};
    use futures_util::future::BoxFuture;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Recorder that tracks start counts and single-recording violations
    struct TestRecorder {
        samples_per_segment: usize,
        recording: bool,
        starts: Arc<AtomicUsize>,
        violations: Arc<AtomicUsize>,
    }

    impl TestRecorder {
        fn new(
            samples_per_segment: usize,
            starts: Arc<AtomicUsize>,
            violations: Arc<AtomicUsize>,
        ) -> Self {
            Self {
                samples_per_segment,
                recording: false,
                starts,
                violations,
            }
        }
    }

    impl SegmentRecorder for TestRecorder {
        fn start(&mut self) -> Result<(), crate::audio::CaptureError> {
            if self.recording {
                self.violations.fetch_add(1, Ordering::SeqCst);
            }
            self.recording = true;
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) -> Result<AudioSegment, crate::audio::CaptureError> {
            if !self.recording {
                self.violations.fetch_add(1, Ordering::SeqCst);
            }
            self.recording = false;
            Ok(AudioSegment {
                samples: vec![0; self.samples_per_segment],
                sample_rate: 16_000,
            })
        }
    }

    /// Recorder standing in for a refused microphone
    struct DeniedRecorder;

    impl SegmentRecorder for DeniedRecorder {
        fn start(&mut self) -> Result<(), CaptureError> {
            Err(CaptureError::PermissionDenied)
        }

        fn stop(&mut self) -> Result<AudioSegment, CaptureError> {
            Err(CaptureError::NotRecording)
        }
    }

    /// Classifier that replays scripted outcomes after per-request delays
    struct TestClassifier {
        responses: Mutex<VecDeque<(Duration, Result<Classification, ClassifyError>)>>,
        requests: AtomicUsize,
    }

    impl TestClassifier {
        fn new(
            responses: Vec<(Duration, Result<Classification, ClassifyError>)>,
        ) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: AtomicUsize::new(0),
            })
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl EmotionClassifier for TestClassifier {
        fn classify(
            &self,
            _segment: AudioSegment,
        ) -> BoxFuture<'static, Result<Classification, ClassifyError>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let (delay, outcome) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Duration::ZERO, Ok(empty_classification())));
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                outcome
            })
        }
    }

    /// Recognizer driven directly from the test body
    struct ManualRecognizer {
        tx: broadcast::Sender<RecognitionEvent>,
    }

    impl ManualRecognizer {
        fn new() -> (Self, broadcast::Sender<RecognitionEvent>) {
            let (tx, _) = broadcast::channel(16);
            (Self { tx: tx.clone() }, tx)
        }
    }

    impl SpeechRecognizer for ManualRecognizer {
        fn start(&mut self) -> Result<(), RecognitionError> {
            Ok(())
        }

        fn stop(&mut self) {}

        fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent> {
            self.tx.subscribe()
        }
    }

    fn empty_classification() -> Classification {
        Classification {
            text: String::new(),
            emotion: None,
        }
    }

    fn ok(text: &str, emotion: &str) -> (Duration, Result<Classification, ClassifyError>) {
        ok_after(Duration::ZERO, text, emotion)
    }

    fn ok_after(
        delay: Duration,
        text: &str,
        emotion: &str,
    ) -> (Duration, Result<Classification, ClassifyError>) {
        (
            delay,
            Ok(Classification {
                text: text.to_string(),
                emotion: Some(emotion.to_string()),
            }),
        )
    }

    fn capture_config() -> CaptureConfig {
        CaptureConfig {
            segment_ms: 4000,
            settle_ms: 200,
            min_segment_bytes: 1000,
            sample_rate: 16_000,
        }
    }

    struct Fixture {
        handle: SessionHandle,
        classifier: Arc<TestClassifier>,
        starts: Arc<AtomicUsize>,
        violations: Arc<AtomicUsize>,
    }

    /// Session with a 1644-byte segment per boundary (above the threshold)
    fn fixture(
        samples_per_segment: usize,
        responses: Vec<(Duration, Result<Classification, ClassifyError>)>,
    ) -> Fixture {
        let classifier = TestClassifier::new(responses);
        let starts = Arc::new(AtomicUsize::new(0));
        let violations = Arc::new(AtomicUsize::new(0));
        let backend = Backend {
            recorder: Box::new(TestRecorder::new(
                samples_per_segment,
                starts.clone(),
                violations.clone(),
            )),
            recognizer: Box::new(NoopRecognizer::new()),
            classifier: Some(classifier.clone()),
        };
        Fixture {
            handle: spawn(backend, capture_config()),
            classifier,
            starts,
            violations,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_boundary_produces_exactly_one_caption() {
        let fx = fixture(800, vec![ok("hello", "Happy")]);
        fx.handle.start().await;
        tokio::time::sleep(Duration::from_millis(4100)).await;

        let captions = fx.handle.captions().await;
        assert_eq!(
            captions,
            vec![CaptionEntry {
                text: "hello".to_string(),
                emotion: Some("Happy".to_string()),
            }]
        );
        assert_eq!(fx.classifier.requests(), 1);
        assert_eq!(fx.violations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_segment_makes_no_request() {
        // 200 samples = 444 WAV bytes, below the 1000-byte threshold
        let fx = fixture(200, vec![ok("never", "Happy")]);
        fx.handle.start().await;
        tokio::time::sleep(Duration::from_millis(4100)).await;

        assert_eq!(fx.classifier.requests(), 0);
        assert!(fx.handle.captions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_text_appends_nothing() {
        let fx = fixture(800, vec![ok("   ", "Happy")]);
        fx.handle.start().await;
        tokio::time::sleep(Duration::from_millis(4100)).await;

        assert_eq!(fx.classifier.requests(), 1);
        assert!(fx.handle.captions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_classification_is_dropped() {
        let fx = fixture(
            800,
            vec![(
                Duration::ZERO,
                Err(ClassifyError::ServerError {
                    status: 500,
                    message: "boom".to_string(),
                }),
            )],
        );
        fx.handle.start().await;
        tokio::time::sleep(Duration::from_millis(4100)).await;

        assert_eq!(fx.classifier.requests(), 1);
        assert!(fx.handle.captions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_inside_settle_window_does_not_restart_recording() {
        let fx = fixture(800, vec![ok("hello", "Happy")]);
        fx.handle.start().await;
        // Boundary fires at 4000ms; settle would restart at 4200ms
        tokio::time::sleep(Duration::from_millis(4050)).await;
        fx.handle.stop().await;
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(fx.starts.load(Ordering::SeqCst), 1);
        assert_eq!(fx.violations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_appends_after_stop() {
        let fx = fixture(800, vec![ok_after(Duration::from_millis(500), "late", "Sad")]);
        fx.handle.start().await;
        tokio::time::sleep(Duration::from_millis(4050)).await;
        fx.handle.stop().await;
        tokio::time::sleep(Duration::from_millis(1000)).await;

        let captions = fx.handle.captions().await;
        assert_eq!(
            captions,
            vec![CaptionEntry {
                text: "late".to_string(),
                emotion: Some("Sad".to_string()),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_existing_captions() {
        let fx = fixture(800, vec![ok("first", "Happy"), ok("second", "Calm")]);
        fx.handle.start().await;
        tokio::time::sleep(Duration::from_millis(4100)).await;
        fx.handle.stop().await;

        fx.handle.start().await;
        tokio::time::sleep(Duration::from_millis(4100)).await;

        let captions = fx.handle.captions().await;
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "first");
        assert_eq!(captions[1].text, "second");
        assert_eq!(fx.violations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_arrival_appends_in_arrival_order() {
        let fx = fixture(
            800,
            vec![
                ok_after(Duration::from_millis(5000), "spoken first", "Happy"),
                ok_after(Duration::from_millis(100), "spoken second", "Calm"),
            ],
        );
        fx.handle.start().await;
        // First response lands at 9000ms, second at 8100ms
        tokio::time::sleep(Duration::from_millis(9500)).await;
        fx.handle.stop().await;

        let captions = fx.handle.captions().await;
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "spoken second");
        assert_eq!(captions[1].text, "spoken first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_restarts_after_settle_delay() {
        let fx = fixture(800, vec![ok("a", "Happy"), ok("b", "Calm")]);
        fx.handle.start().await;
        // Past the first settle window: recording must have restarted
        tokio::time::sleep(Duration::from_millis(4300)).await;
        assert_eq!(fx.starts.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(fx.handle.captions().await.len(), 2);
        assert_eq!(fx.violations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recognizer_only_captions_from_final_events() {
        let (recognizer, recog_tx) = ManualRecognizer::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let violations = Arc::new(AtomicUsize::new(0));
        let backend = Backend {
            recorder: Box::new(TestRecorder::new(800, starts.clone(), violations.clone())),
            recognizer: Box::new(recognizer),
            classifier: None,
        };
        let handle = spawn(backend, capture_config());
        let mut events = handle.subscribe();

        handle.start().await;
        // The control task must subscribe before events are sent
        tokio::time::sleep(Duration::from_millis(50)).await;
        recog_tx
            .send(RecognitionEvent::Interim {
                text: "hel".to_string(),
            })
            .expect("send interim");
        recog_tx
            .send(RecognitionEvent::Final {
                text: "hello world".to_string(),
            })
            .expect("send final");
        tokio::time::sleep(Duration::from_millis(50)).await;

        let captions = handle.captions().await;
        assert_eq!(
            captions,
            vec![CaptionEntry {
                text: "hello world".to_string(),
                emotion: None,
            }]
        );
        // The recorder is never engaged without a classifier
        assert_eq!(starts.load(Ordering::SeqCst), 0);

        assert!(matches!(events.try_recv(), Ok(SessionEvent::Started)));
        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::Interim { text }) if text == "hel"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interim_resets_at_segment_boundary() {
        let (recognizer, recog_tx) = ManualRecognizer::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let violations = Arc::new(AtomicUsize::new(0));
        let classifier = TestClassifier::new(vec![ok("hello", "Happy")]);
        let backend = Backend {
            recorder: Box::new(TestRecorder::new(800, starts, violations)),
            recognizer: Box::new(recognizer),
            classifier: Some(classifier),
        };
        let handle = spawn(backend, capture_config());
        let mut events = handle.subscribe();

        handle.start().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        recog_tx
            .send(RecognitionEvent::Interim {
                text: "ghost text".to_string(),
            })
            .expect("send interim");
        tokio::time::sleep(Duration::from_millis(4100)).await;

        let mut saw_interim = false;
        let mut saw_cleared = false;
        while let Ok(event) = events.try_recv() {
            if let SessionEvent::Interim { text } = event {
                if text == "ghost text" {
                    saw_interim = true;
                } else if text.is_empty() && saw_interim {
                    saw_cleared = true;
                }
            }
        }
        assert!(saw_interim, "interim update was not observed");
        assert!(saw_cleared, "interim was not cleared at the boundary");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_recognition_disables_feature() {
        let starts = Arc::new(AtomicUsize::new(0));
        let violations = Arc::new(AtomicUsize::new(0));
        let classifier = TestClassifier::new(Vec::new());
        let backend = Backend {
            recorder: Box::new(TestRecorder::new(800, starts.clone(), violations)),
            recognizer: Box::new(UnsupportedRecognizer::new()),
            classifier: Some(classifier.clone()),
        };
        let handle = spawn(backend, capture_config());
        let mut events = handle.subscribe();

        handle.start().await;
        tokio::time::sleep(Duration::from_millis(4500)).await;

        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::Unsupported { .. })
        ));
        assert_eq!(starts.load(Ordering::SeqCst), 0);
        assert_eq!(classifier.requests(), 0);
        assert!(handle.captions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_microphone_stays_idle() {
        let classifier = TestClassifier::new(Vec::new());
        let backend = Backend {
            recorder: Box::new(DeniedRecorder),
            recognizer: Box::new(NoopRecognizer::new()),
            classifier: Some(classifier.clone()),
        };
        let handle = spawn(backend, capture_config());
        let mut events = handle.subscribe();

        handle.start().await;
        tokio::time::sleep(Duration::from_millis(4500)).await;

        // No Started event precedes the denial; the session never left Idle
        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::MicrophoneDenied)
        ));
        assert_eq!(classifier.requests(), 0);
        assert!(handle.captions().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_mid_segment_discards_blob() {
        let fx = fixture(800, vec![ok("never", "Happy")]);
        fx.handle.start().await;
        // Stop before the first 4000ms boundary, while recording is live
        tokio::time::sleep(Duration::from_millis(2000)).await;
        fx.handle.stop().await;
        tokio::time::sleep(Duration::from_millis(5000)).await;

        assert_eq!(fx.classifier.requests(), 0);
        assert!(fx.handle.captions().await.is_empty());
        assert_eq!(fx.violations.load(Ordering::SeqCst), 0);
    }
}
