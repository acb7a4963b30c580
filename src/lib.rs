//! VeriCreate Core - Verifiable Content Generation Engine
//!
//! # Guarantees
//! 1. Fingerprints Are Deterministic
//! 2. Image Acquisition Never Fails (fallback totality)
//! 3. Templates Are Contracts
//! 4. Artifacts Are Atomic and Immutable
//! 5. One Operation In Flight Per Kind
//! 6. Signing Is An Explicit Stub

pub mod artifact;
pub mod fingerprint;
pub mod image;
pub mod signing;
pub mod style;
pub mod templates;
pub mod workflow;

pub use artifact::{ContentArtifact, GenerationRequest};
pub use fingerprint::{fingerprint, DisplayFingerprinter, Fingerprinter, Sha256Fingerprinter};
pub use image::{
    GenerationConfig, ImageError, ImageOrigin, ImageResult, ImageService, RemoteImageClient,
    StabilityClient,
};
pub use signing::{
    BufferClipboard, Clipboard, ClipboardError, MockSigner, SignError, Signer, SigningSession,
    VerificationStage,
};
pub use style::ImageStyle;
pub use templates::{compose, ComposeError, ContentComposer, Language, TemplateComposer};
pub use workflow::{ArtifactSink, ContentWorkflow, OpOutcome, WorkflowError, WorkflowState};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
