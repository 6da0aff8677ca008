//! Live gesture recognition runner.
//!
//! Reads newline-delimited JSON landmark frames from stdin (as produced by a
//! hand tracking process attached to the camera), classifies every hand and
//! writes one JSON overlay record per frame to stdout. Logs go to stderr.

use std::io::{BufWriter, Write};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use gesture_api::{logging, ApiConfig};
use gesture_inference::{FrameOverlay, InferenceService, JsonLinesSource, LiveSession};
use gesture_models::ClassificationResult;

/// Overlay record written for each frame.
#[derive(Serialize)]
struct OverlayRecord<'a> {
    frame: u64,
    gestures: &'a [ClassificationResult],
    overlay: Vec<String>,
}

impl<'a> From<&'a FrameOverlay> for OverlayRecord<'a> {
    fn from(overlay: &'a FrameOverlay) -> Self {
        Self {
            frame: overlay.frame_index,
            gestures: &overlay.gestures,
            overlay: overlay.lines(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_tracing(BoxMakeWriter::new(std::io::stderr));

    let config = ApiConfig::from_env();
    let service = InferenceService::load(&config.artifacts()).map_err(|e| {
        error!("Startup failed: {}", e);
        e
    })?;
    info!(
        model = %config.model_path.display(),
        labels = service.labels().len(),
        "Live recognition started, reading landmark frames from stdin"
    );

    let stdin = std::io::stdin().lock();
    let session = LiveSession::new(JsonLinesSource::new(stdin), Arc::new(service));
    let mut out = BufWriter::new(std::io::stdout().lock());

    let frames = session.run(|overlay| {
        serde_json::to_writer(&mut out, &OverlayRecord::from(overlay))?;
        writeln!(out)?;
        out.flush()
    })?;

    info!(frames, "Landmark stream ended");
    Ok(())
}
