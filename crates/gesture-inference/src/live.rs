//! Live capture adapter.
//!
//! Turns per-frame hand landmarks from an external pose estimator into
//! feature rows, classifies them through the shared [`InferenceService`] and
//! produces the overlay text for each frame.

use std::io::BufRead;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use gesture_models::{ClassificationResult, HandLandmarks};

use crate::error::InferenceError;
use crate::payload::RawFeatures;
use crate::service::InferenceService;

/// Hands detected in one video frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

/// Errors raised by a landmark source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid landmark frame on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that stop a live session.
#[derive(Debug, Error)]
pub enum LiveError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Failed to write overlay: {0}")]
    Output(#[source] std::io::Error),
}

/// Producer of landmark frames, typically backed by a camera and a hand
/// tracking model. `Ok(None)` ends the stream.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

/// Gestures recognized in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOverlay {
    pub frame_index: u64,
    pub gestures: Vec<ClassificationResult>,
}

impl FrameOverlay {
    /// One overlay line per recognized hand.
    pub fn lines(&self) -> Vec<String> {
        self.gestures
            .iter()
            .map(|g| format!("Gesture: {}", g.label))
            .collect()
    }
}

/// Pulls frames from a source and classifies every detected hand.
pub struct LiveSession<S> {
    source: S,
    service: Arc<InferenceService>,
    frame_index: u64,
}

impl<S: LandmarkSource> LiveSession<S> {
    pub fn new(source: S, service: Arc<InferenceService>) -> Self {
        Self {
            source,
            service,
            frame_index: 0,
        }
    }

    /// Classify the next frame, or `None` once the source is exhausted.
    pub fn next_overlay(&mut self) -> Result<Option<FrameOverlay>, LiveError> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let mut gestures = Vec::with_capacity(frame.hands.len());
        for hand in &frame.hands {
            let features = hand.to_features();
            // Tracker glitches only drop the hand, not the session.
            if let Some(position) = features.iter().position(|v| !v.is_finite()) {
                warn!(frame_index, position, "Skipping hand with non-finite landmark");
                continue;
            }
            let results = self
                .service
                .classify_features(RawFeatures::Row(features))?;
            gestures.extend(results);
        }

        debug!(frame_index, hands = gestures.len(), "Frame classified");
        Ok(Some(FrameOverlay {
            frame_index,
            gestures,
        }))
    }

    /// Drain the source, handing each overlay to `sink`. Returns the number
    /// of frames processed. A sink error stops the session.
    pub fn run<F>(mut self, mut sink: F) -> Result<u64, LiveError>
    where
        F: FnMut(&FrameOverlay) -> std::io::Result<()>,
    {
        while let Some(overlay) = self.next_overlay()? {
            sink(&overlay).map_err(LiveError::Output)?;
        }
        Ok(self.frame_index)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Message {
    Command { command: Command },
    Frame(Frame),
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Command {
    Quit,
}

/// Newline-delimited JSON landmark frames, e.g. piped from a hand tracker.
///
/// Each line is `{"hands": [[{"x":..,"y":..,"z":..}, ...]]}` or
/// `{"command": "quit"}`. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let message: Message =
                serde_json::from_str(text).map_err(|source| SourceError::Decode {
                    line: self.line,
                    source,
                })?;
            return Ok(match message {
                Message::Command {
                    command: Command::Quit,
                } => None,
                Message::Frame(frame) => Some(frame),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ndarray::Array2;

    use gesture_models::{HandLandmark, LANDMARK_COUNT};

    use super::*;
    use crate::classifier::MockClassifier;
    use crate::error::ClassifierError;
    use crate::labels::LabelSet;

    fn service(mock: MockClassifier) -> Arc<InferenceService> {
        let labels = LabelSet::new(["open_palm", "fist", "peace"]).unwrap();
        Arc::new(InferenceService::new(Arc::new(mock), labels).unwrap())
    }

    /// Predicts "peace" when the wrist x is negative, "fist" otherwise.
    fn wrist_classifier() -> MockClassifier {
        let mut mock = MockClassifier::new();
        mock.expect_input_dim().return_const(63usize);
        mock.expect_classify().returning(|batch| {
            let mut out = Array2::zeros((batch.len(), 3));
            for i in 0..batch.len() {
                let class = if batch.row(i)[0] < 0.0 { 2 } else { 1 };
                out[[i, class]] = 0.9;
            }
            Ok(out)
        });
        mock
    }

    fn hand_json(wrist_x: f32) -> String {
        let mut points = vec![HandLandmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        points[0].x = wrist_x;
        serde_json::to_string(&points).unwrap()
    }

    #[test]
    fn test_json_lines_source() {
        let input = format!(
            "{{\"hands\": [{}]}}\n\n{{\"hands\": []}}\n{{\"command\": \"quit\"}}\n{{\"hands\": []}}\n",
            hand_json(0.1)
        );
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert_eq!(source.next_frame().unwrap().unwrap().hands.len(), 1);
        assert_eq!(source.next_frame().unwrap().unwrap().hands.len(), 0);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_json_lines_decode_error_reports_line() {
        let mut source = JsonLinesSource::new(Cursor::new("{\"hands\": []}\nnot json\n"));
        source.next_frame().unwrap();
        let err = source.next_frame().unwrap_err();
        assert!(matches!(err, SourceError::Decode { line: 2, .. }));
    }

    #[test]
    fn test_session_overlays() {
        let input = format!(
            "{{\"hands\": [{}, {}]}}\n{{}}\n",
            hand_json(0.2),
            hand_json(-0.2)
        );
        let session = LiveSession::new(
            JsonLinesSource::new(Cursor::new(input)),
            service(wrist_classifier()),
        );

        let mut overlays = Vec::new();
        let frames = session
            .run(|o| {
                overlays.push(o.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(frames, 2);
        assert_eq!(overlays[0].frame_index, 0);
        assert_eq!(overlays[0].lines(), vec!["Gesture: fist", "Gesture: peace"]);
        assert!(overlays[1].gestures.is_empty());
    }

    #[test]
    fn test_non_finite_hand_is_skipped() {
        struct OneFrame(Option<Frame>);
        impl LandmarkSource for OneFrame {
            fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
                Ok(self.0.take())
            }
        }

        let mut points = [HandLandmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        points[3].z = f32::NAN;
        let frame = Frame {
            hands: vec![HandLandmarks::new(points)],
        };

        let mut mock = MockClassifier::new();
        mock.expect_input_dim().return_const(63usize);
        mock.expect_classify().never();

        let mut session = LiveSession::new(OneFrame(Some(frame)), service(mock));
        let overlay = session.next_overlay().unwrap().unwrap();
        assert!(overlay.gestures.is_empty());
        assert!(session.next_overlay().unwrap().is_none());
    }

    #[test]
    fn test_sink_failure_stops_session() {
        let input = format!(
            "{{\"hands\": [{}]}}\n{{\"hands\": []}}\n",
            hand_json(0.2)
        );
        let session = LiveSession::new(
            JsonLinesSource::new(Cursor::new(input)),
            service(wrist_classifier()),
        );

        let mut calls = 0;
        let err = session
            .run(|_| {
                calls += 1;
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            })
            .unwrap_err();
        assert!(matches!(err, LiveError::Output(_)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_model_failure_stops_session() {
        let mut mock = MockClassifier::new();
        mock.expect_input_dim().return_const(63usize);
        mock.expect_classify()
            .returning(|_| Err(ClassifierError::backend("backend fault")));

        let input = format!("{{\"hands\": [{}]}}\n", hand_json(0.0));
        let mut session =
            LiveSession::new(JsonLinesSource::new(Cursor::new(input)), service(mock));
        assert!(matches!(
            session.next_overlay(),
            Err(LiveError::Inference(InferenceError::ModelFailure(_)))
        ));
    }
}
