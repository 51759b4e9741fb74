use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(about = "HTTP inference service for cat/dog image classification")]
pub struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the ONNX model artifact produced by the training pipeline
    #[arg(
        short = 'm',
        long = "model",
        value_name = "MODEL_PATH",
        default_value = "cats_dogs_classifier.onnx"
    )]
    pub model_path: PathBuf,

    /// Optional JSON model spec (class labels, input dimensions); defaults
    /// to the Cat/Dog 224x224x3 configuration the model was trained with
    #[arg(long = "model-spec", value_name = "SPEC_PATH")]
    pub model_spec_path: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(short = 'b', long = "bind", default_value = "127.0.0.1:8080")]
    pub bind_addr: String,

    /// Maximum accepted upload size in bytes
    #[arg(long = "max-upload-bytes", default_value_t = 8 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}
