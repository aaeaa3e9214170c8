use thiserror::Error;

/// Unexpected faults inside the pipeline. Domain-policy failures (a document
/// that fails a verification rule) never use this type; they terminate the
/// run with a rejected result instead.
#[derive(Debug, Error)]
pub enum KycError {
    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Page rendering error: {0}")]
    PageRendering(String),

    #[error("OCR engine error: {0}")]
    Ocr(String),

    #[error("Object detection error: {0}")]
    ObjectDetection(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the face-similarity collaborator. The no-face case gets its
/// own variant because the pipeline rejects it with a distinct reason.
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("No face detected: {0}")]
    NoFaceDetected(String),

    #[error("Face engine error: {0}")]
    Engine(String),
}
