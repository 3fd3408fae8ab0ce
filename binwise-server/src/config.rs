use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use reqwest::Client;

use binwise_core::{
    Classifier, CouncilCatalog, CouncilName, DetectionPort, ItemCatalog, RecognitionService,
    ServiceConfig,
};
use binwise_detector_remote as remote;
use binwise_detector_stub::{self as stub, StubDetectionPort};

/// TCP connect deadline for the remote detector.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// binwise HTTP server configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Address to listen on
    #[arg(long, env = "BINWISE_ADDR", default_value = "0.0.0.0:8001")]
    pub addr: SocketAddr,

    /// Item catalog JSON (defaults to the built-in catalog)
    #[arg(long, env = "BINWISE_ITEMS", value_name = "FILE")]
    pub items: Option<PathBuf>,

    /// Council catalog JSON (defaults to the built-in catalog)
    #[arg(long, env = "BINWISE_COUNCILS", value_name = "FILE")]
    pub councils: Option<PathBuf>,

    /// Council used when a postcode matches no prefix
    #[arg(long, env = "BINWISE_DEFAULT_COUNCIL", value_name = "NAME")]
    pub default_council: Option<String>,

    /// Detection backend
    #[arg(long, env = "BINWISE_DETECTOR", value_enum, default_value_t = DetectorChoice::Stub)]
    pub detector: DetectorChoice,

    /// Base URL of the inference service (remote detector only)
    #[arg(long, env = "BINWISE_MODEL_URL", value_name = "URL")]
    pub model_url: Option<String>,

    /// Model name reported to clients (remote detector only)
    #[arg(long, env = "BINWISE_MODEL_NAME", default_value = "models/yolov8n.pt")]
    pub model_name: String,

    /// Model version reported to clients (remote detector only)
    #[arg(long, env = "BINWISE_MODEL_VERSION", default_value = "1.0.0")]
    pub model_version: String,

    /// Upper bound for one detection call, in milliseconds
    #[arg(long, env = "BINWISE_DETECT_TIMEOUT_MS", default_value = "30000")]
    pub detect_timeout_ms: u64,

    /// Replay a named demo scenario instead of the image-shape heuristic (stub detector only)
    #[arg(long, env = "BINWISE_STUB_SCENARIO", value_name = "NAME")]
    pub stub_scenario: Option<String>,

    /// Seed for scenario confidences and boxes
    #[arg(long, env = "BINWISE_STUB_SEED", default_value = "0")]
    pub stub_seed: u64,

    /// Artificial stub latency, in milliseconds
    #[arg(long, env = "BINWISE_STUB_LATENCY_MS", default_value = "0")]
    pub stub_latency_ms: u64,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "BINWISE_BODY_LIMIT", default_value = "16777216")]
    pub body_limit: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DetectorChoice {
    /// Built-in stand-in, no model required
    Stub,
    /// HTTP inference service
    Remote,
}

impl Args {
    pub(crate) fn detect_timeout(&self) -> Duration {
        Duration::from_millis(self.detect_timeout_ms)
    }
}

/// Load catalogs and the detector; every configuration problem surfaces here, before binding.
pub(crate) fn build_service(args: &Args) -> Result<RecognitionService> {
    let classifier = build_classifier(args)?;
    let detector = build_detector(args)?;

    tracing::info!(
        detector = ?detector.meta().kind,
        model = %detector.meta().model,
        timeout_ms = args.detect_timeout_ms,
        "detector configured"
    );

    Ok(RecognitionService::new(
        Arc::new(classifier),
        detector,
        ServiceConfig {
            detect_timeout: args.detect_timeout(),
        },
    ))
}

fn build_classifier(args: &Args) -> Result<Classifier> {
    let items = match &args.items {
        Some(path) => ItemCatalog::from_path(path)
            .with_context(|| format!("loading item catalog {}", path.display()))?,
        None => ItemCatalog::builtin().context("loading built-in item catalog")?,
    };

    let mut councils = match &args.councils {
        Some(path) => CouncilCatalog::from_path(path)
            .with_context(|| format!("loading council catalog {}", path.display()))?,
        None => CouncilCatalog::builtin().context("loading built-in council catalog")?,
    };

    if let Some(name) = &args.default_council {
        councils = councils
            .with_default(&CouncilName::from(name.as_str()))
            .context("applying default council override")?;
    }

    Classifier::new(Arc::new(items), Arc::new(councils)).context("validating catalogs")
}

fn build_detector(args: &Args) -> Result<Arc<dyn DetectionPort>> {
    match args.detector {
        DetectorChoice::Stub => {
            let mut port = match &args.stub_scenario {
                Some(name) => StubDetectionPort::with_scenario(name, args.stub_seed)?,
                None => StubDetectionPort::new(),
            };
            if args.stub_latency_ms > 0 {
                port = port.with_latency(Duration::from_millis(args.stub_latency_ms));
            }
            Ok(stub::adapter(port))
        }
        DetectorChoice::Remote => {
            let Some(url) = args.model_url.as_deref() else {
                bail!("--model-url is required for the remote detector");
            };
            let client = Client::builder()
                .user_agent(concat!("binwise/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(CONNECT_TIMEOUT)
                .build()?;
            Ok(remote::adapter(
                client,
                url,
                &args.model_name,
                &args.model_version,
            ))
        }
    }
}
