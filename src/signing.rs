//! Verification/Signing Stage
//!
//! Operates only on an already-produced artifact: recompute or copy its
//! fingerprint, or run the simulated signing round trip. Independent of the
//! generation workflow; nothing here ever re-triggers generation, and
//! signing mutates no artifact field (an intentional stub boundary - swap a
//! real scheme in behind [`Signer`]).

use std::cell::{Cell, RefCell};

use thiserror::Error;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info};

use crate::artifact::ContentArtifact;
use crate::fingerprint::{DisplayFingerprinter, Fingerprinter};
use crate::workflow::OpOutcome;

/// How long the transient "copied" indicator stays lit.
const COPIED_INDICATOR_TTL: Duration = Duration::from_secs(2);

/// Simulated external wallet round trip.
const SIGNING_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard write failed: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum SignError {
    #[error("signing failed: {0}")]
    Rejected(String),
}

/// One clipboard write. Failure is recoverable and surfaced to the caller.
pub trait Clipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-memory clipboard holding the most recent write.
#[derive(Debug, Default)]
pub struct BufferClipboard {
    contents: Option<String>,
}

impl BufferClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for BufferClipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Signature seam. The mock is the only implementation in this crate; a real
/// digital-signature scheme substitutes here without touching the stage.
#[async_trait::async_trait(?Send)]
pub trait Signer {
    /// Sign `digest`, returning an opaque signature blob.
    async fn sign(&self, digest: &str) -> Result<String, SignError>;
}

/// Simulated signer: suspends for the wallet round trip, then returns a
/// placeholder signature that carries no cryptographic meaning.
#[derive(Debug, Clone)]
pub struct MockSigner {
    delay: Duration,
}

impl MockSigner {
    pub fn new() -> Self {
        MockSigner {
            delay: SIGNING_DELAY,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        MockSigner { delay }
    }
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait(?Send)]
impl Signer for MockSigner {
    async fn sign(&self, digest: &str) -> Result<String, SignError> {
        sleep(self.delay).await;
        Ok(format!("mock-signature:{}", digest))
    }
}

/// Ephemeral signing state; reset when the round trip completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningSession {
    pub in_progress: bool,
}

pub struct VerificationStage {
    signer: Box<dyn Signer>,
    clipboard: RefCell<Box<dyn Clipboard>>,
    fingerprinter: Box<dyn Fingerprinter>,
    signing: Cell<bool>,
    copied_until: Cell<Option<Instant>>,
}

impl VerificationStage {
    pub fn new(signer: Box<dyn Signer>, clipboard: Box<dyn Clipboard>) -> Self {
        VerificationStage {
            signer,
            clipboard: RefCell::new(clipboard),
            fingerprinter: Box::new(DisplayFingerprinter),
            signing: Cell::new(false),
            copied_until: Cell::new(None),
        }
    }

    pub fn with_fingerprinter(mut self, fingerprinter: Box<dyn Fingerprinter>) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn session(&self) -> SigningSession {
        SigningSession {
            in_progress: self.signing.get(),
        }
    }

    /// Recompute the digest over the artifact's body text.
    pub fn recompute_fingerprint(&self, artifact: &ContentArtifact) -> String {
        self.fingerprinter.fingerprint(&artifact.body_text)
    }

    /// Whether the stored fingerprint reproduces from the body text.
    pub fn verify(&self, artifact: &ContentArtifact) -> bool {
        self.recompute_fingerprint(artifact) == artifact.fingerprint
    }

    /// Copy the artifact's fingerprint to the clipboard and light the
    /// transient "copied" indicator for its fixed window. A copy while the
    /// indicator is already lit neither stacks nor extends the window.
    pub fn copy_fingerprint(&self, artifact: &ContentArtifact) -> Result<(), ClipboardError> {
        self.clipboard.borrow_mut().write(&artifact.fingerprint)?;
        let now = Instant::now();
        let lit = self.copied_until.get().is_some_and(|deadline| now < deadline);
        if !lit {
            self.copied_until.set(Some(now + COPIED_INDICATOR_TTL));
        }
        Ok(())
    }

    /// Whether the "copied" indicator is currently lit.
    pub fn copied_indicator_visible(&self) -> bool {
        match self.copied_until.get() {
            Some(deadline) if Instant::now() < deadline => true,
            Some(_) => {
                self.copied_until.set(None);
                false
            }
            None => false,
        }
    }

    /// Run the simulated signing round trip over the artifact's fingerprint.
    ///
    /// Re-entry is disabled while a session is in progress: a second trigger
    /// is skipped, not queued. The signature is discarded - no artifact
    /// field is mutated.
    pub async fn sign(&self, artifact: &ContentArtifact) -> Result<OpOutcome, SignError> {
        if self.signing.get() {
            debug!("signing session already in progress, ignoring trigger");
            return Ok(OpOutcome::Skipped);
        }

        self.signing.set(true);
        let result = self.signer.sign(&artifact.fingerprint).await;
        self.signing.set(false);

        let signature = result?;
        info!(fingerprint = %artifact.fingerprint, "artifact signed (signature discarded)");
        debug!(signature = %signature, "mock signature");
        Ok(OpOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ImageStyle;
    use crate::templates::Language;
    use chrono::Utc;
    use uuid::Uuid;

    fn artifact() -> ContentArtifact {
        let body_text = "body text".to_string();
        ContentArtifact {
            id: Uuid::new_v4(),
            title: "Launch".into(),
            language: Language::English,
            fingerprint: crate::fingerprint::fingerprint(&body_text),
            body_text,
            image_url: "https://example.com/i.webp".into(),
            created_at: Utc::now(),
            image_prompt: None,
            image_style: ImageStyle::Realistic,
        }
    }

    fn stage() -> VerificationStage {
        VerificationStage::new(
            Box::new(MockSigner::new()),
            Box::new(BufferClipboard::new()),
        )
    }

    struct FailingClipboard;

    impl Clipboard for FailingClipboard {
        fn write(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Write("denied".into()))
        }
    }

    #[test]
    fn test_verify_round_trip() {
        let stage = stage();
        let artifact = artifact();
        assert!(stage.verify(&artifact));

        let mut tampered = artifact;
        tampered.body_text.push('!');
        assert!(!stage.verify(&tampered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_lights_indicator_for_fixed_window() {
        let stage = stage();
        let artifact = artifact();

        stage.copy_fingerprint(&artifact).unwrap();
        assert!(stage.copied_indicator_visible());

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(stage.copied_indicator_visible());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!stage.copied_indicator_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_copy_does_not_extend_indicator() {
        let stage = stage();
        let artifact = artifact();

        stage.copy_fingerprint(&artifact).unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        stage.copy_fingerprint(&artifact).unwrap();

        // Still bounded by the first window.
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!stage.copied_indicator_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_copies_each_get_full_window() {
        let stage = stage();
        let artifact = artifact();

        stage.copy_fingerprint(&artifact).unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!stage.copied_indicator_visible());

        stage.copy_fingerprint(&artifact).unwrap();
        assert!(stage.copied_indicator_visible());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!stage.copied_indicator_visible());
    }

    #[tokio::test]
    async fn test_clipboard_failure_is_recoverable_and_unlit() {
        let stage = VerificationStage::new(
            Box::new(MockSigner::with_delay(Duration::ZERO)),
            Box::new(FailingClipboard),
        );
        let artifact = artifact();
        assert!(stage.copy_fingerprint(&artifact).is_err());
        assert!(!stage.copied_indicator_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_disables_reentry_until_complete() {
        let stage = stage();
        let artifact = artifact();

        let (first, second) = tokio::join!(
            stage.sign(&artifact),
            async {
                // First trigger sets the session flag before suspending.
                let outcome = stage.sign(&artifact).await.unwrap();
                assert_eq!(outcome, OpOutcome::Skipped);
            }
        );
        assert_eq!(first.unwrap(), OpOutcome::Completed);
        let _ = second;
        assert!(!stage.session().in_progress);
    }
}
