//! Generation Workflow Controller
//!
//! The state machine coordinating input validation, image generation and
//! content assembly. Single-threaded and cooperative: in-flight discipline
//! is a pair of flags the controller alone mutates, never a lock. A second
//! trigger while the matching operation is in flight is a no-op, not an
//! error, and nothing is ever queued.

use std::cell::{Cell, RefCell};

use chrono::Utc;
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};
use uuid::Uuid;

use crate::artifact::{ContentArtifact, GenerationRequest};
use crate::fingerprint::{DisplayFingerprinter, Fingerprinter};
use crate::image::{ImageResult, ImageService};
use crate::templates::{ContentComposer, TemplateComposer};

/// Simulated assembly round trip, mirroring the interactive generation delay.
const DEFAULT_ASSEMBLY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Please enter a prompt for image generation")]
    EmptyImagePrompt,

    #[error("Please enter a content title")]
    EmptyTitle,

    #[error("Failed to generate content: {0}")]
    Assembly(String),
}

/// Controller states. `Error` is re-enterable: the next trigger clears it
/// and proceeds through `ValidatingInput` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    ValidatingInput,
    GeneratingImage,
    AssemblingContent,
    Ready,
    Error,
}

/// How a trigger resolved: the operation ran, or was skipped because its
/// affordance was unavailable (already in flight, nothing to regenerate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Completed,
    Skipped,
}

/// The controller's sole outward interface: one call per fully-formed
/// artifact. The collaborator never sees intermediate state.
pub trait ArtifactSink {
    fn deliver(&self, artifact: ContentArtifact);
}

impl<F: Fn(ContentArtifact)> ArtifactSink for F {
    fn deliver(&self, artifact: ContentArtifact) {
        self(artifact)
    }
}

pub struct ContentWorkflow {
    images: ImageService,
    composer: Box<dyn ContentComposer>,
    fingerprinter: Box<dyn Fingerprinter>,
    sink: Box<dyn ArtifactSink>,
    assembly_delay: Duration,
    state: Cell<WorkflowState>,
    image_in_flight: Cell<bool>,
    content_in_flight: Cell<bool>,
    latest_image: RefCell<Option<ImageResult>>,
    last_error: RefCell<Option<String>>,
}

impl ContentWorkflow {
    pub fn new(images: ImageService, sink: Box<dyn ArtifactSink>) -> Self {
        ContentWorkflow {
            images,
            composer: Box::new(TemplateComposer),
            fingerprinter: Box::new(DisplayFingerprinter),
            sink,
            assembly_delay: DEFAULT_ASSEMBLY_DELAY,
            state: Cell::new(WorkflowState::Idle),
            image_in_flight: Cell::new(false),
            content_in_flight: Cell::new(false),
            latest_image: RefCell::new(None),
            last_error: RefCell::new(None),
        }
    }

    pub fn with_composer(mut self, composer: Box<dyn ContentComposer>) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_fingerprinter(mut self, fingerprinter: Box<dyn Fingerprinter>) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn with_assembly_delay(mut self, delay: Duration) -> Self {
        self.assembly_delay = delay;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state.get()
    }

    /// The user-visible message from the most recent failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    /// The latest completed image result, superseded by each new attempt.
    pub fn latest_image(&self) -> Option<ImageResult> {
        self.latest_image.borrow().clone()
    }

    /// Generate an image for the request's prompt and style.
    ///
    /// Requires a non-empty prompt. The result is stored as the latest image
    /// and the controller returns to idle; image generation is independent
    /// of, and an optional precursor to, content assembly.
    pub async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<OpOutcome, WorkflowError> {
        if self.image_in_flight.get() {
            debug!("image generation already in flight, ignoring trigger");
            return Ok(OpOutcome::Skipped);
        }

        self.state.set(WorkflowState::ValidatingInput);
        let prompt = match request.trimmed_prompt() {
            Some(p) => p.to_string(),
            None => return Err(self.fail(WorkflowError::EmptyImagePrompt)),
        };

        self.last_error.replace(None);
        self.image_in_flight.set(true);
        self.state.set(WorkflowState::GeneratingImage);

        let result = self.images.acquire_image(&prompt, request.image_style).await;
        info!(style = %result.style, origin = ?result.origin, "image resolved");
        self.latest_image.replace(Some(result));

        self.image_in_flight.set(false);
        self.state.set(WorkflowState::Idle);
        Ok(OpOutcome::Completed)
    }

    /// Regenerate the image: a fresh, independent call with no diffing
    /// against the previous result. Only available once a prior image exists
    /// and the prompt is non-empty; otherwise the trigger is skipped.
    pub async fn regenerate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<OpOutcome, WorkflowError> {
        if self.latest_image.borrow().is_none() || request.trimmed_prompt().is_none() {
            return Ok(OpOutcome::Skipped);
        }
        self.generate_image(request).await
    }

    /// Assemble the complete content artifact and emit it through the sink.
    ///
    /// Uses whatever image state is currently settled: the latest completed
    /// result if one exists, else the style's catalog fallback - never a
    /// remote re-invocation. The artifact is built atomically; on any
    /// assembly failure nothing is emitted and the controller returns to
    /// idle with a user-visible message.
    pub async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<OpOutcome, WorkflowError> {
        if self.content_in_flight.get() {
            debug!("content assembly already in flight, ignoring trigger");
            return Ok(OpOutcome::Skipped);
        }

        self.state.set(WorkflowState::ValidatingInput);
        let title = request.trimmed_title().to_string();
        if title.is_empty() {
            return Err(self.fail(WorkflowError::EmptyTitle));
        }

        self.last_error.replace(None);
        self.content_in_flight.set(true);
        self.state.set(WorkflowState::AssemblingContent);

        sleep(self.assembly_delay).await;

        match self.assemble(request, &title) {
            Ok(artifact) => {
                info!(id = %artifact.id, fingerprint = %artifact.fingerprint, "artifact assembled");
                self.sink.deliver(artifact);
                self.content_in_flight.set(false);
                self.state.set(WorkflowState::Ready);
                Ok(OpOutcome::Completed)
            }
            Err(e) => {
                self.content_in_flight.set(false);
                self.last_error.replace(Some(e.to_string()));
                self.state.set(WorkflowState::Idle);
                Err(e)
            }
        }
    }

    fn assemble(
        &self,
        request: &GenerationRequest,
        title: &str,
    ) -> Result<ContentArtifact, WorkflowError> {
        // Image first, then text: a composition failure must not leak a
        // partially built artifact.
        let image = self
            .latest_image
            .borrow()
            .clone()
            .unwrap_or_else(|| ImageResult::fallback(request.image_style));

        let body_text = self
            .composer
            .compose(title, request.language)
            .map_err(|e| WorkflowError::Assembly(e.to_string()))?;

        let fingerprint = self.fingerprinter.fingerprint(&body_text);

        Ok(ContentArtifact {
            id: Uuid::new_v4(),
            title: title.to_string(),
            language: request.language,
            body_text,
            image_url: image.source_url(),
            created_at: Utc::now(),
            fingerprint,
            image_prompt: request.trimmed_prompt().map(String::from),
            image_style: request.image_style,
        })
    }

    fn fail(&self, error: WorkflowError) -> WorkflowError {
        self.last_error.replace(Some(error.to_string()));
        self.state.set(WorkflowState::Error);
        error
    }
}
