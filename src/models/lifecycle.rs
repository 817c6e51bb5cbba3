//! Model lifecycle state machine.
//!
//! One `ModelLifecycle` per process holds one slot per model kind. Models
//! load lazily on first acquire; construction is slow (weights off disk,
//! possibly a GPU transfer) so at most one construction per kind runs at a
//! time, and once a slot is Ready every later acquire is a cheap Arc clone.
//!
//! A failed load leaves the slot Failed but not dead: the next acquire
//! retries construction from scratch. Readiness is always readable without
//! blocking, even mid-load, which keeps /health responsive.

use crate::audio::AudioSegment;
use crate::engine::{
    RecognitionOptions, RecognitionOutput, Recognizer, SynthesisOptions, Synthesizer,
};
use crate::error::{ModelKind, Result, VoxError};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Load state of one model slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

/// Non-blocking view of both slots, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessSnapshot {
    pub synthesis: LoadState,
    pub recognition: LoadState,
}

type Factory<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

struct ModelSlot<T: ?Sized> {
    /// The loaded model. Written exactly once per successful load.
    cell: RwLock<Option<Arc<T>>>,
    /// Observable state, readable without touching `load_guard`.
    state: RwLock<LoadState>,
    /// Serializes construction: the Unloaded/Failed to Loading transition
    /// happens only while holding this.
    load_guard: Mutex<()>,
    /// Serializes engine calls against the loaded instance. Shared by
    /// every handle this slot hands out.
    call_lock: Arc<Mutex<()>>,
    factory: Factory<T>,
}

impl<T: ?Sized> ModelSlot<T> {
    fn new(factory: Factory<T>) -> Self {
        Self {
            cell: RwLock::new(None),
            state: RwLock::new(LoadState::Unloaded),
            load_guard: Mutex::new(()),
            call_lock: Arc::new(Mutex::new(())),
            factory,
        }
    }

    fn state(&self) -> LoadState {
        *self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: LoadState) {
        *self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn loaded(&self) -> Option<Arc<T>> {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the model, constructing it if needed. Blocks for the duration
    /// of construction; callers run this off the request-accepting path.
    fn acquire(&self, kind: ModelKind) -> Result<Arc<T>> {
        // Fast path: already loaded.
        if let Some(model) = self.loaded() {
            return Ok(model);
        }

        let _guard: MutexGuard<'_, ()> = self
            .load_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // A concurrent caller may have finished loading while we waited.
        if let Some(model) = self.loaded() {
            return Ok(model);
        }

        self.set_state(LoadState::Loading);
        log::info!("loading {} model", kind);

        match (self.factory)() {
            Ok(model) => {
                *self
                    .cell
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&model));
                self.set_state(LoadState::Ready);
                log::info!("{} model ready", kind);
                Ok(model)
            }
            Err(e) => {
                self.set_state(LoadState::Failed);
                log::error!("{} model load failed: {}", kind, e);
                Err(VoxError::ModelUnavailable {
                    kind,
                    message: e.to_string(),
                })
            }
        }
    }
}

/// Synthesizer handle that takes the slot's call lock around each call.
///
/// Engines are not required to tolerate overlapping calls; every handle
/// for a slot shares the slot's lock, so concurrent requests holding the
/// same model take turns at the engine.
struct SerialSynthesizer {
    inner: Arc<dyn Synthesizer>,
    call_lock: Arc<Mutex<()>>,
}

impl Synthesizer for SerialSynthesizer {
    fn synthesize(&self, text: &str, options: &SynthesisOptions) -> Result<AudioSegment> {
        let _call = self
            .call_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.synthesize(text, options)
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }
}

/// Recognizer handle with the same call discipline as [`SerialSynthesizer`].
struct SerialRecognizer {
    inner: Arc<dyn Recognizer>,
    call_lock: Arc<Mutex<()>>,
}

impl Recognizer for SerialRecognizer {
    fn recognize(
        &self,
        audio_path: &Path,
        options: &RecognitionOptions,
    ) -> Result<RecognitionOutput> {
        let _call = self
            .call_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.recognize(audio_path, options)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }
}

/// Process-wide model registry: one synthesis slot, one recognition slot.
pub struct ModelLifecycle {
    synthesis: ModelSlot<dyn Synthesizer>,
    recognition: ModelSlot<dyn Recognizer>,
}

impl ModelLifecycle {
    /// Build a lifecycle with the given model constructors. Neither runs
    /// until the first acquire of its kind.
    pub fn new(
        synthesis_factory: impl Fn() -> Result<Arc<dyn Synthesizer>> + Send + Sync + 'static,
        recognition_factory: impl Fn() -> Result<Arc<dyn Recognizer>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            synthesis: ModelSlot::new(Box::new(synthesis_factory)),
            recognition: ModelSlot::new(Box::new(recognition_factory)),
        }
    }

    /// Get the synthesis model, loading it on first use. Calls through the
    /// returned handle are serialized against every other handle for the
    /// same slot.
    pub fn acquire_synthesizer(&self) -> Result<Arc<dyn Synthesizer>> {
        let inner = self.synthesis.acquire(ModelKind::Synthesis)?;
        Ok(Arc::new(SerialSynthesizer {
            inner,
            call_lock: Arc::clone(&self.synthesis.call_lock),
        }))
    }

    /// Get the recognition model, loading it on first use. Same call
    /// serialization as [`ModelLifecycle::acquire_synthesizer`].
    pub fn acquire_recognizer(&self) -> Result<Arc<dyn Recognizer>> {
        let inner = self.recognition.acquire(ModelKind::Recognition)?;
        Ok(Arc::new(SerialRecognizer {
            inner,
            call_lock: Arc::clone(&self.recognition.call_lock),
        }))
    }

    /// Current state of both slots. Never blocks on a load in progress.
    pub fn snapshot(&self) -> ReadinessSnapshot {
        ReadinessSnapshot {
            synthesis: self.synthesis.state(),
            recognition: self.recognition.state(),
        }
    }
}

impl std::fmt::Debug for ModelLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("ModelLifecycle")
            .field("synthesis", &snapshot.synthesis)
            .field("recognition", &snapshot.recognition)
            .finish()
    }
}
