//! VeriCreate CLI
//!
//! Commands: compose, fingerprint, generate-image, generate, verify
//! Outputs JSON to stdout (logs go to stderr)
//! Returns non-zero on validation or verification failure

use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

use vericreate_core::{
    compose, fingerprint, BufferClipboard, ContentArtifact, ContentWorkflow, GenerationRequest,
    ImageOrigin, ImageService, ImageStyle, Language, MockSigner, VerificationStage,
};

#[derive(Parser)]
#[command(name = "vericreate-cli")]
#[command(about = "VeriCreate CLI - Verifiable Content Generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render localized body text for a title
    Compose {
        /// Content title
        #[arg(short, long)]
        title: String,

        /// Content language (unknown values fall back to English)
        #[arg(short, long, default_value = "English")]
        language: String,
    },

    /// Compute the display fingerprint of a text
    Fingerprint {
        /// Input text
        #[arg(short, long)]
        text: String,
    },

    /// Resolve a styled image for a prompt
    GenerateImage {
        /// Image prompt
        #[arg(short, long)]
        prompt: String,

        /// Image style (realistic, digital-art, photographic, anime)
        #[arg(short, long, default_value = "realistic")]
        style: String,

        /// Directory to download a remotely generated image into
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Run the full generation workflow and print the artifact
    Generate {
        /// Content title
        #[arg(short, long)]
        title: String,

        /// Content language
        #[arg(short, long, default_value = "English")]
        language: String,

        /// Optional image prompt
        #[arg(short, long)]
        prompt: Option<String>,

        /// Image style
        #[arg(short, long, default_value = "realistic")]
        style: String,
    },

    /// Recompute an artifact's fingerprint from its body text
    Verify {
        /// Artifact JSON, as printed by `generate`
        #[arg(short, long)]
        artifact: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compose { title, language } => {
            let language = Language::parse(&language);
            let output = serde_json::json!({
                "language": language.to_string(),
                "body": compose(&title, language),
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Fingerprint { text } => {
            let output = serde_json::json!({ "fingerprint": fingerprint(&text) });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }

        Commands::GenerateImage {
            prompt,
            style,
            out_dir,
        } => {
            let style = ImageStyle::parse(&style);
            let service = ImageService::from_env();
            let result = service.acquire_image(&prompt, style).await;

            let mut output = serde_json::json!({
                "style": result.style,
                "origin": result.origin,
                "acquiredAt": result.acquired_at,
            });
            match result.origin {
                ImageOrigin::Fallback => {
                    output["sourceUrl"] = serde_json::json!(result.source_url());
                }
                ImageOrigin::Remote => {
                    let dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
                    match result.download(&prompt, &dir) {
                        Ok(path) => output["downloadedTo"] = serde_json::json!(path),
                        Err(e) => {
                            println!(r#"{{"error": "Failed to write image: {}"}}"#, e);
                            return ExitCode::FAILURE;
                        }
                    }
                }
            }
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Generate {
            title,
            language,
            prompt,
            style,
        } => {
            let delivered: Rc<RefCell<Option<ContentArtifact>>> = Rc::new(RefCell::new(None));
            let slot = delivered.clone();
            let workflow = ContentWorkflow::new(
                ImageService::from_env(),
                Box::new(move |artifact| {
                    slot.borrow_mut().replace(artifact);
                }),
            );

            let mut request = GenerationRequest::new(title, Language::parse(&language));
            request.image_style = ImageStyle::parse(&style);
            if let Some(prompt) = prompt {
                request.image_prompt = Some(prompt);
            }

            if request.trimmed_prompt().is_some() {
                if let Err(e) = workflow.generate_image(&request).await {
                    println!(
                        "{}",
                        serde_json::json!({ "success": false, "error": e.to_string() })
                    );
                    return ExitCode::from(2);
                }
            }

            match workflow.generate_content(&request).await {
                Ok(_) => {
                    let artifact = delivered.borrow_mut().take();
                    let output = serde_json::json!({
                        "success": true,
                        "artifact": artifact,
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!(
                        "{}",
                        serde_json::json!({ "success": false, "error": e.to_string() })
                    );
                    ExitCode::from(2)
                }
            }
        }

        Commands::Verify { artifact } => {
            let artifact: ContentArtifact = match serde_json::from_str(&artifact) {
                Ok(a) => a,
                Err(e) => {
                    println!(r#"{{"valid": false, "error": "Invalid artifact JSON: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            let stage = VerificationStage::new(
                Box::new(MockSigner::new()),
                Box::new(BufferClipboard::new()),
            );
            let recomputed = stage.recompute_fingerprint(&artifact);
            let valid = recomputed == artifact.fingerprint;

            let output = serde_json::json!({
                "valid": valid,
                "stored": artifact.fingerprint,
                "recomputed": recomputed,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
