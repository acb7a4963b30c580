//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees: fingerprint
//! determinism, fallback totality, template closure, in-flight mutual
//! exclusion, atomic artifact emission, and the end-to-end scenarios.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use tokio::time::Duration;

use vericreate_core::{
    compose, fingerprint, ArtifactSink, BufferClipboard, ComposeError, ContentArtifact,
    ContentComposer, ContentWorkflow, GenerationRequest, ImageError, ImageOrigin, ImageService,
    ImageStyle, Language, MockSigner, OpOutcome, RemoteImageClient, VerificationStage,
    WorkflowError, WorkflowState,
};

// --- Fakes ---

/// Counts remote calls, suspends like a real round trip, then succeeds.
struct SlowCountingClient {
    calls: Rc<Cell<usize>>,
}

#[async_trait(?Send)]
impl RemoteImageClient for SlowCountingClient {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ImageError> {
        self.calls.set(self.calls.get() + 1);
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(vec![0xAB])
    }
}

/// Fails every call with the configured error.
struct FailingClient {
    error: fn() -> ImageError,
}

#[async_trait(?Send)]
impl RemoteImageClient for FailingClient {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ImageError> {
        Err((self.error)())
    }
}

/// Composer that always fails, to exercise the no-partial-artifact path.
struct BrokenComposer;

impl ContentComposer for BrokenComposer {
    fn compose(&self, _title: &str, _language: Language) -> Result<String, ComposeError> {
        Err(ComposeError("template store unavailable".into()))
    }
}

fn recording_sink() -> (Rc<RefCell<Vec<ContentArtifact>>>, Box<dyn ArtifactSink>) {
    let delivered = Rc::new(RefCell::new(Vec::new()));
    let sink = delivered.clone();
    (
        delivered,
        Box::new(move |artifact| sink.borrow_mut().push(artifact)),
    )
}

// --- Determinism ---

#[test]
fn invariant_fingerprint_deterministic() {
    for text in ["", "Product Launch", "こんにちは世界", "émoji 🎯 mix", "a"] {
        assert_eq!(fingerprint(text), fingerprint(text));
    }
    assert_eq!(fingerprint(""), "0x0");
    assert!(fingerprint("Product Launch").starts_with("0x"));
}

// --- Fallback totality ---

#[tokio::test]
async fn invariant_fallback_totality_per_style() {
    let failure_modes: Vec<fn() -> ImageService> = vec![
        // No credential configured: no client at all.
        || ImageService::new(None),
        // Remote endpoint answers non-200.
        || {
            ImageService::new(Some(Box::new(FailingClient {
                error: || ImageError::Api {
                    status: 500,
                    detail: "boom".into(),
                },
            })))
        },
        // Transport-level failure.
        || {
            ImageService::new(Some(Box::new(FailingClient {
                error: || ImageError::Http("connection reset".into()),
            })))
        },
    ];

    for style in ImageStyle::ALL {
        for make_service in &failure_modes {
            let service = make_service();
            let result = service.acquire_image("any prompt", style).await;
            assert_eq!(result.origin, ImageOrigin::Fallback);
            assert_eq!(result.style, style);
            assert_eq!(result.source_url(), style.fallback_url());
            assert!(!result.source_url().is_empty());
        }
    }
}

// --- Template closure ---

#[test]
fn invariant_unsupported_language_composes_default_text() {
    let title = "Product Launch";
    let default_text = compose(title, Language::default());
    for unsupported in ["Klingon", "", "no-such-language", "123"] {
        assert_eq!(compose(title, Language::parse(unsupported)), default_text);
    }
}

// --- Mutual exclusion ---

#[tokio::test(start_paused = true)]
async fn invariant_second_image_trigger_is_noop_while_in_flight() {
    let calls = Rc::new(Cell::new(0));
    let service = ImageService::new(Some(Box::new(SlowCountingClient {
        calls: calls.clone(),
    })));
    let (_, sink) = recording_sink();
    let workflow = ContentWorkflow::new(service, sink);

    let request = GenerationRequest::new("Launch", Language::English)
        .with_image("sunset over mountains", ImageStyle::Anime);

    let (first, second) = tokio::join!(workflow.generate_image(&request), async {
        // Runs after the first trigger has suspended inside the remote call.
        workflow.generate_image(&request).await
    });

    assert_eq!(first.unwrap(), OpOutcome::Completed);
    assert_eq!(second.unwrap(), OpOutcome::Skipped);
    assert_eq!(calls.get(), 1);

    let image = workflow.latest_image().unwrap();
    assert_eq!(image.origin, ImageOrigin::Remote);
}

// --- No partial artifacts ---

#[tokio::test]
async fn invariant_no_partial_artifact_on_assembly_failure() {
    let (delivered, sink) = recording_sink();
    let workflow = ContentWorkflow::new(ImageService::new(None), sink)
        .with_composer(Box::new(BrokenComposer))
        .with_assembly_delay(Duration::ZERO);

    let request = GenerationRequest::new("Product Launch", Language::English);
    let err = workflow.generate_content(&request).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Assembly(_)));
    assert!(err
        .to_string()
        .starts_with("Failed to generate content: "));
    assert!(delivered.borrow().is_empty());
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert_eq!(
        workflow.last_error().as_deref(),
        Some("Failed to generate content: template store unavailable")
    );
}

// --- Scenario A ---

#[tokio::test]
async fn scenario_a_english_content_without_image_prompt() {
    let (delivered, sink) = recording_sink();
    let workflow = ContentWorkflow::new(ImageService::new(None), sink)
        .with_assembly_delay(Duration::ZERO);

    let request = GenerationRequest::new("Product Launch", Language::English);
    workflow.generate_content(&request).await.unwrap();

    let delivered = delivered.borrow();
    assert_eq!(delivered.len(), 1);
    let artifact = &delivered[0];

    assert_eq!(artifact.body_text, compose("Product Launch", Language::English));
    assert!(artifact.body_text.contains("Product Launch"));
    // No prompt supplied: the image resolves via the fallback path.
    assert_eq!(artifact.image_url, ImageStyle::Realistic.fallback_url());
    assert!(artifact.fingerprint.starts_with("0x"));
    assert!(artifact.fingerprint.len() > 2);
    assert!(artifact.fingerprint[2..]
        .chars()
        .all(|c| c.is_ascii_hexdigit()));
}

// --- Scenario B ---

#[tokio::test]
async fn scenario_b_anime_fallback_without_credential() {
    let service = ImageService::new(None);
    assert!(!service.remote_enabled());

    let result = service
        .acquire_image("sunset over mountains", ImageStyle::Anime)
        .await;
    assert_eq!(result.origin, ImageOrigin::Fallback);
    assert_eq!(result.source_url(), ImageStyle::Anime.fallback_url());
}

// --- Scenario C ---

#[tokio::test(start_paused = true)]
async fn scenario_c_copied_indicator_fixed_window_no_stacking() {
    let (delivered, sink) = recording_sink();
    let workflow = ContentWorkflow::new(ImageService::new(None), sink)
        .with_assembly_delay(Duration::ZERO);
    let request = GenerationRequest::new("Product Launch", Language::English);
    workflow.generate_content(&request).await.unwrap();
    let artifact = delivered.borrow()[0].clone();

    let stage = VerificationStage::new(
        Box::new(MockSigner::new()),
        Box::new(BufferClipboard::new()),
    );

    // First invocation: lit for exactly the fixed window.
    stage.copy_fingerprint(&artifact).unwrap();
    assert!(stage.copied_indicator_visible());
    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(!stage.copied_indicator_visible());

    // Second invocation after expiry: a fresh full window.
    stage.copy_fingerprint(&artifact).unwrap();
    assert!(stage.copied_indicator_visible());
    tokio::time::advance(Duration::from_millis(1500)).await;

    // Overlapping invocation: the window neither stacks nor extends.
    stage.copy_fingerprint(&artifact).unwrap();
    tokio::time::advance(Duration::from_millis(500)).await;
    assert!(!stage.copied_indicator_visible());
}

// --- Artifact round-trip determinism ---

#[tokio::test]
async fn invariant_fingerprint_reproducible_from_body_text() {
    let (delivered, sink) = recording_sink();
    let workflow = ContentWorkflow::new(ImageService::new(None), sink)
        .with_assembly_delay(Duration::ZERO);

    let request = GenerationRequest::new("Product Launch", Language::Hindi);
    workflow.generate_content(&request).await.unwrap();
    let artifact = delivered.borrow()[0].clone();

    let stage = VerificationStage::new(
        Box::new(MockSigner::new()),
        Box::new(BufferClipboard::new()),
    );
    assert!(stage.verify(&artifact));
    assert_eq!(stage.recompute_fingerprint(&artifact), artifact.fingerprint);
}

// --- Latest-settled image is what assembly observes ---

#[tokio::test(start_paused = true)]
async fn invariant_assembly_uses_settled_image_not_in_flight_one() {
    let calls = Rc::new(Cell::new(0));
    let service = ImageService::new(Some(Box::new(SlowCountingClient {
        calls: calls.clone(),
    })));
    let (delivered, sink) = recording_sink();
    let workflow =
        ContentWorkflow::new(service, sink).with_assembly_delay(Duration::ZERO);

    let request = GenerationRequest::new("Launch", Language::English)
        .with_image("sunset", ImageStyle::Photographic);

    let (image_outcome, content_outcome) = tokio::join!(
        workflow.generate_image(&request),
        // Triggered while the image request is outstanding: assembly must
        // not wait for it and uses the fallback, since nothing has settled.
        workflow.generate_content(&request)
    );

    image_outcome.unwrap();
    content_outcome.unwrap();

    let delivered = delivered.borrow();
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0].image_url,
        ImageStyle::Photographic.fallback_url()
    );
}
