#![forbid(unsafe_code)]

//! Renderer boundary.
//!
//! [`ChartRenderer`] is the output half of the page: widgets hand it finished
//! descriptions addressed to a container. Concrete implementations:
//! - [`RecordingRenderer`]: keeps every frame in memory (tests, headless hosts).
//! - [`JsonLinesRenderer`]: writes one JSON object per frame to a writer.

use std::convert::Infallible;
use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::chart::{ChartSpec, ChartUpdate};

/// Charting backend capability.
pub trait ChartRenderer {
    /// Backend-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Replace whatever the container shows with a full chart.
    fn draw(&mut self, container: &str, spec: &ChartSpec) -> Result<(), Self::Error>;

    /// Animate an already drawn chart to new series values.
    fn animate(&mut self, container: &str, update: &ChartUpdate) -> Result<(), Self::Error>;

    /// Show a static text message instead of a chart.
    fn show_message(&mut self, container: &str, text: &str) -> Result<(), Self::Error>;
}

/// One renderer call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Frame {
    Draw { container: String, spec: ChartSpec },
    Animate { container: String, update: ChartUpdate },
    Message { container: String, text: String },
}

impl Frame {
    #[must_use]
    pub fn container(&self) -> &str {
        match self {
            Self::Draw { container, .. }
            | Self::Animate { container, .. }
            | Self::Message { container, .. } => container,
        }
    }
}

/// In-memory renderer that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Vec<Frame>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frames addressed to one container.
    pub fn frames_for<'a>(&'a self, container: &'a str) -> impl Iterator<Item = &'a Frame> + 'a {
        self.frames.iter().filter(move |f| f.container() == container)
    }

    /// Most recent frame addressed to a container.
    #[must_use]
    pub fn last_for(&self, container: &str) -> Option<&Frame> {
        self.frames.iter().rev().find(|f| f.container() == container)
    }

    /// Drain recorded frames.
    pub fn take(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }
}

impl ChartRenderer for RecordingRenderer {
    type Error = Infallible;

    fn draw(&mut self, container: &str, spec: &ChartSpec) -> Result<(), Self::Error> {
        self.frames.push(Frame::Draw {
            container: container.to_string(),
            spec: spec.clone(),
        });
        Ok(())
    }

    fn animate(&mut self, container: &str, update: &ChartUpdate) -> Result<(), Self::Error> {
        self.frames.push(Frame::Animate {
            container: container.to_string(),
            update: update.clone(),
        });
        Ok(())
    }

    fn show_message(&mut self, container: &str, text: &str) -> Result<(), Self::Error> {
        self.frames.push(Frame::Message {
            container: container.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Errors writing frames as JSON lines.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes each frame as one JSON line.
#[derive(Debug)]
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    pretty: bool,
    written: usize,
}

impl<W: Write> JsonLinesRenderer<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            pretty: false,
            written: 0,
        }
    }

    /// Indent frames (no longer one per line).
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Number of frames written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, frame: &Frame) -> Result<(), RenderError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, frame)?;
        } else {
            serde_json::to_writer(&mut self.out, frame)?;
        }
        self.out.write_all(b"\n")?;
        self.written += 1;
        tracing::trace!(
            target: "aidsec.render",
            container = frame.container(),
            written = self.written,
            "frame written"
        );
        Ok(())
    }
}

impl<W: Write> ChartRenderer for JsonLinesRenderer<W> {
    type Error = RenderError;

    fn draw(&mut self, container: &str, spec: &ChartSpec) -> Result<(), Self::Error> {
        self.emit(&Frame::Draw {
            container: container.to_string(),
            spec: spec.clone(),
        })
    }

    fn animate(&mut self, container: &str, update: &ChartUpdate) -> Result<(), Self::Error> {
        self.emit(&Frame::Animate {
            container: container.to_string(),
            update: update.clone(),
        })
    }

    fn show_message(&mut self, container: &str, text: &str) -> Result<(), Self::Error> {
        self.emit(&Frame::Message {
            container: container.to_string(),
            text: text.to_string(),
        })
    }
}
