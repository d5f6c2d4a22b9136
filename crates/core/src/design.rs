//! The authoritative design-document model.
//!
//! [`DesignData`] is the canonical JSON structure persisted per template:
//! a canvas size, an ordered list of pages (each holding design elements),
//! and a set of audio layers. Field names are camelCase on the wire to
//! match the browser editor.
//!
//! Elements and pages carry a `#[serde(flatten)]` extras map so that
//! editor-side properties the server does not interpret (effects, fonts,
//! plugin data) survive a round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// The design document stored per template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignData {
    #[serde(default)]
    pub canvas: Canvas,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub audio_layers: Vec<AudioLayer>,
}

impl DesignData {
    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    pub fn page_mut(&mut self, page_id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == page_id)
    }

    pub fn audio_layer_mut(&mut self, layer_id: &str) -> Option<&mut AudioLayer> {
        self.audio_layers.iter_mut().find(|l| l.id == layer_id)
    }
}

/// A single page (scene) of the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    /// Page duration in seconds.
    #[serde(default = "default_page_duration")]
    pub duration: f64,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub elements: Vec<DesignElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    pub fn element(&self, element_id: &str) -> Option<&DesignElement> {
        self.elements.iter().find(|e| e.id == element_id)
    }

    pub fn element_mut(&mut self, element_id: &str) -> Option<&mut DesignElement> {
        self.elements.iter_mut().find(|e| e.id == element_id)
    }
}

pub fn default_page_duration() -> f64 {
    5.0
}

pub fn default_background() -> String {
    "#ffffff".to_string()
}

/// A positioned element on a page (shape, text, image, video, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    pub id: String,
    /// Element kind: `rect`, `text`, `image`, `video`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An audio layer holding a sequence of clips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioLayer {
    pub id: String,
    #[serde(default)]
    pub clips: Vec<AudioClip>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AudioLayer {
    pub fn clip_mut(&mut self, clip_id: &str) -> Option<&mut AudioClip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }
}

/// A single audio clip within a layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClip {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Offset from the start of the layer, in seconds.
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

/// Generate a fresh element id (`el_<uuid>`).
pub fn new_element_id() -> String {
    format!("el_{}", Uuid::new_v4().simple())
}

/// Generate a fresh page id (`page_<uuid>`).
pub fn new_page_id() -> String {
    format!("page_{}", Uuid::new_v4().simple())
}

/// Generate a fresh audio clip id (`clip_<uuid>`).
pub fn new_clip_id() -> String {
    format!("clip_{}", Uuid::new_v4().simple())
}
