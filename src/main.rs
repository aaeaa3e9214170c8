// Document-identity verification pipeline.
// Emits the verification result as JSON on stdout; progress and diagnostics
// go to stderr through the logger.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use veridoc::engines::{CommandFaceVerifier, PdftoppmRenderer, TesseractRecognizer};
use veridoc::models::VerificationRequest;
use veridoc::{PipelineConfig, VerificationPipeline};

#[derive(Parser)]
#[command(name = "veridoc", about = "Verify a government ID document against a claimed identity")]
struct Args {
    /// Path to the ID document (image or PDF)
    document: PathBuf,

    /// Full name as claimed by the user
    #[arg(long)]
    name: String,

    /// Path to a selfie image for face verification
    #[arg(long)]
    selfie: Option<PathBuf>,

    /// Claimed primary ID number (e.g. PAN)
    #[arg(long)]
    primary_id: Option<String>,

    /// Claimed secondary ID number (e.g. Aadhaar or driving license)
    #[arg(long)]
    secondary_id: Option<String>,

    /// External face-comparison command; required when --selfie is given
    #[arg(long)]
    face_command: Option<PathBuf>,

    /// Honor the demo bypass sentinel in the primary ID. Never enable this
    /// in a real deployment.
    #[arg(long)]
    allow_demo_bypass: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.selfie.is_some() && args.face_command.is_none() {
        eprintln!("error: --selfie requires --face-command for face verification");
        return ExitCode::from(2);
    }

    let mut pipeline = VerificationPipeline::new(
        Box::new(PdftoppmRenderer::new()),
        Box::new(TesseractRecognizer::new()),
    )
    .with_config(PipelineConfig {
        allow_demo_bypass: args.allow_demo_bypass,
    });
    if let Some(program) = args.face_command {
        pipeline = pipeline.with_face_verifier(Box::new(CommandFaceVerifier::new(program)));
    }

    let request = VerificationRequest {
        document_path: args.document,
        selfie_path: args.selfie,
        claimed_name: args.name,
        claimed_primary_id: args.primary_id,
        claimed_secondary_id: args.secondary_id,
    };

    let result = pipeline.verify(&request);

    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            println!("{}", json);
            // Rejections are a normal verdict, not a process failure.
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize result: {}", e);
            ExitCode::FAILURE
        }
    }
}
