#![forbid(unsafe_code)]

//! JSONL transcripts of a scenario and their checksums.
//!
//! Each recorded frame becomes one JSON object per line:
//!
//! ```json
//! {"event":"frame","frame":0,"label":"start","state":"active","index":0,"total":3,"placement":"bottom","tooltip":[12.0,132.0,300.0,150.0],"lost":false}
//! {"event":"hints","frame":1,"label":"show","visible":["save"],"open":[]}
//! ```
//!
//! Two runs of the same script must produce byte-identical transcripts; the
//! checksum is a cheap way to assert that.

use serde_json::{Value, json};

use waymark_core::Rect;
use waymark_runtime::{HintSnapshot, TourSnapshot};

const CHECKSUM_PREFIX: &str = "blake3:";

/// Compute the checksum of transcript text.
#[must_use]
pub fn compute_text_checksum(text: &str) -> String {
    format!("{CHECKSUM_PREFIX}{}", blake3::hash(text.as_bytes()).to_hex())
}

fn rect_json(rect: Rect) -> Value {
    json!([rect.x, rect.y, rect.width, rect.height])
}

/// Line-oriented scenario log.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tour frame.
    pub fn tour(&mut self, label: &str, snap: &TourSnapshot) {
        let geometry = snap.geometry.as_ref();
        let value = json!({
            "event": "frame",
            "frame": self.lines.len(),
            "label": label,
            "state": snap.state.as_str(),
            "index": snap.index,
            "total": snap.total,
            "step": snap.step.as_ref().map(|s| s.id.as_str().to_owned()),
            "placement": geometry.map(|g| g.placement.as_str()),
            "tooltip": geometry.map(|g| rect_json(g.tooltip)),
            "cutout": geometry.and_then(|g| g.cutout).map(rect_json),
            "lost": snap.target_lost,
            "error": snap.last_error.as_ref().map(|e| e.error_type()),
        });
        self.push(value);
    }

    /// Record a hint frame.
    pub fn hints(&mut self, label: &str, snap: &HintSnapshot) {
        let ids = |set: &std::collections::BTreeSet<waymark_core::TargetId>| -> Vec<String> {
            set.iter().map(|id| id.as_str().to_owned()).collect()
        };
        let value = json!({
            "event": "hints",
            "frame": self.lines.len(),
            "label": label,
            "visible": ids(&snap.visible),
            "open": ids(&snap.open),
            "indicators": snap
                .hints
                .iter()
                .map(|h| h.indicator.map(|p| json!([p.x, p.y])))
                .collect::<Vec<_>>(),
        });
        self.push(value);
    }

    /// Record a free-form note, e.g. the outcome of a call.
    pub fn note(&mut self, label: &str, detail: impl std::fmt::Debug) {
        let value = json!({
            "event": "note",
            "frame": self.lines.len(),
            "label": label,
            "detail": format!("{detail:?}"),
        });
        self.push(value);
    }

    fn push(&mut self, value: Value) {
        let line = value.to_string();
        tracing::trace!(target: "waymark.harness", line = %line, "transcript");
        self.lines.push(line);
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Full JSONL text, newline-terminated.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn checksum(&self) -> String {
        compute_text_checksum(&self.to_jsonl())
    }
}
