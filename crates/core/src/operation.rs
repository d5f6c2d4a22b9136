//! The operation data contract.
//!
//! An [`Operation`] is a typed, targeted, timestamped description of one
//! atomic mutation to a design document. On the wire it is the flat shape
//! the editor sends:
//!
//! ```json
//! { "id": "op_123", "type": "move_element",
//!   "target": { "pageId": "page_1", "elementId": "el_1" },
//!   "payload": { "x": 150.0 }, "timestamp": 1737020000000 }
//! ```
//!
//! Internally the `type`/`target`/`payload` triple is decoded into the
//! closed [`OperationKind`] enum, whose variants carry per-type payload
//! schemas. Malformed payloads and missing target ids are rejected at
//! decode time, before any operation reaches the executor, and an unknown
//! `type` is unrepresentable (serde rejects it naming the offending
//! value). Adding an operation type is a compile error everywhere the
//! enum is matched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::design::{AudioClip, DesignElement, Page, default_background, default_page_duration};

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// The 15 recognized operation types, exactly as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    AddElement,
    UpdateElement,
    DeleteElement,
    MoveElement,
    ResizeElement,
    RotateElement,
    UpdateElementProps,
    AddPage,
    UpdatePage,
    DeletePage,
    ReorderPages,
    UpdateCanvas,
    AddAudioClip,
    UpdateAudioClip,
    DeleteAudioClip,
}

impl OperationType {
    /// Wire string for display, logging, and coalesce keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddElement => "add_element",
            Self::UpdateElement => "update_element",
            Self::DeleteElement => "delete_element",
            Self::MoveElement => "move_element",
            Self::ResizeElement => "resize_element",
            Self::RotateElement => "rotate_element",
            Self::UpdateElementProps => "update_element_props",
            Self::AddPage => "add_page",
            Self::UpdatePage => "update_page",
            Self::DeletePage => "delete_page",
            Self::ReorderPages => "reorder_pages",
            Self::UpdateCanvas => "update_canvas",
            Self::AddAudioClip => "add_audio_clip",
            Self::UpdateAudioClip => "update_audio_clip",
            Self::DeleteAudioClip => "delete_audio_clip",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `target` object of a wire operation. Which fields are required
/// depends on the operation type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_layer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<String>,
}

/// The operation exactly as serialized on the wire, before payload typing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub id: String,
    #[serde(rename = "type")]
    pub op_type: OperationType,
    #[serde(default)]
    pub target: OperationTarget,
    #[serde(default)]
    pub payload: Value,
    pub timestamp: i64,
}

/// Failure to turn a [`RawOperation`] into a typed [`Operation`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    #[error("operation '{op_type}' requires target.{field}")]
    MissingTarget {
        op_type: OperationType,
        field: &'static str,
    },

    #[error("invalid payload for operation '{op_type}': {message}")]
    Payload {
        op_type: OperationType,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Typed payloads
// ---------------------------------------------------------------------------

/// Payload of `add_element`: a full element, id optional (generated when
/// absent), geometry defaulting to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
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

impl ElementPayload {
    /// Materialize the element, generating an id when the payload omits one.
    pub fn into_element(self) -> DesignElement {
        DesignElement {
            id: self.id.unwrap_or_else(crate::design::new_element_id),
            kind: self.kind,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            fill: self.fill,
            text: self.text,
            src: self.src,
            animation: self.animation,
            extra: self.extra,
        }
    }
}

impl From<DesignElement> for ElementPayload {
    fn from(el: DesignElement) -> Self {
        Self {
            id: Some(el.id),
            kind: el.kind,
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            rotation: el.rotation,
            fill: el.fill,
            text: el.text,
            src: el.src,
            animation: el.animation,
            extra: el.extra,
        }
    }
}

/// Partial element update: every field optional, absent fields keep the
/// element's current value (shallow merge). Unknown properties merge into
/// the element's extras map key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
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

impl ElementPatch {
    /// Shallow-merge this patch onto an element.
    pub fn apply(&self, el: &mut DesignElement) {
        if let Some(x) = self.x {
            el.x = x;
        }
        if let Some(y) = self.y {
            el.y = y;
        }
        if let Some(width) = self.width {
            el.width = width;
        }
        if let Some(height) = self.height {
            el.height = height;
        }
        if let Some(rotation) = self.rotation {
            el.rotation = rotation;
        }
        if let Some(fill) = &self.fill {
            el.fill = Some(fill.clone());
        }
        if let Some(text) = &self.text {
            el.text = Some(text.clone());
        }
        if let Some(src) = &self.src {
            el.src = Some(src.clone());
        }
        if let Some(animation) = &self.animation {
            el.animation = Some(animation.clone());
        }
        for (key, value) in &self.extra {
            el.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Payload of `add_page`: everything optional, defaults applied on build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PagePayload {
    /// Materialize the page with id/duration/background/elements defaults.
    pub fn into_page(self) -> Page {
        Page {
            id: self.id.unwrap_or_else(crate::design::new_page_id),
            duration: self.duration.unwrap_or_else(default_page_duration),
            background: self.background.unwrap_or_else(default_background),
            elements: self
                .elements
                .unwrap_or_default()
                .into_iter()
                .map(ElementPayload::into_element)
                .collect(),
            animation: self.animation,
            extra: self.extra,
        }
    }
}

impl From<Page> for PagePayload {
    fn from(page: Page) -> Self {
        Self {
            id: Some(page.id),
            duration: Some(page.duration),
            background: Some(page.background),
            elements: Some(page.elements.into_iter().map(ElementPayload::from).collect()),
            animation: page.animation,
            extra: page.extra,
        }
    }
}

/// Partial page update (shallow merge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PagePatch {
    pub fn apply(&self, page: &mut Page) {
        if let Some(duration) = self.duration {
            page.duration = duration;
        }
        if let Some(background) = &self.background {
            page.background = background.clone();
        }
        if let Some(animation) = &self.animation {
            page.animation = Some(animation.clone());
        }
        for (key, value) in &self.extra {
            page.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Payload of `add_audio_clip`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClipPayload {
    pub fn into_clip(self) -> AudioClip {
        AudioClip {
            id: self.id.unwrap_or_else(crate::design::new_clip_id),
            src: self.src,
            start: self.start,
            duration: self.duration,
            volume: self.volume,
            extra: self.extra,
        }
    }
}

impl From<AudioClip> for ClipPayload {
    fn from(clip: AudioClip) -> Self {
        Self {
            id: Some(clip.id),
            src: clip.src,
            start: clip.start,
            duration: clip.duration,
            volume: clip.volume,
            extra: clip.extra,
        }
    }
}

/// Partial audio-clip update (shallow merge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClipPatch {
    pub fn apply(&self, clip: &mut AudioClip) {
        if let Some(src) = &self.src {
            clip.src = Some(src.clone());
        }
        if let Some(start) = self.start {
            clip.start = start;
        }
        if let Some(duration) = self.duration {
            clip.duration = duration;
        }
        if let Some(volume) = self.volume {
            clip.volume = Some(volume);
        }
        for (key, value) in &self.extra {
            clip.extra.insert(key.clone(), value.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Typed operation
// ---------------------------------------------------------------------------

/// The typed mutation, one variant per wire operation type.
///
/// The executor matches this enum exhaustively; a new variant is a compile
/// error in every consumer until handled.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    AddElement {
        page_id: String,
        element: ElementPayload,
    },
    UpdateElement {
        page_id: String,
        element_id: String,
        patch: ElementPatch,
    },
    DeleteElement {
        page_id: String,
        element_id: String,
    },
    MoveElement {
        page_id: String,
        element_id: String,
        x: Option<f64>,
        y: Option<f64>,
    },
    ResizeElement {
        page_id: String,
        element_id: String,
        width: Option<f64>,
        height: Option<f64>,
    },
    RotateElement {
        page_id: String,
        element_id: String,
        rotation: Option<f64>,
    },
    UpdateElementProps {
        page_id: String,
        element_id: String,
        patch: ElementPatch,
    },
    AddPage {
        page: PagePayload,
    },
    UpdatePage {
        page_id: String,
        patch: PagePatch,
    },
    DeletePage {
        page_id: String,
    },
    /// Rebuilds the page list in the given order. A page whose id is
    /// absent from `page_ids` is dropped from the document; callers are
    /// expected to pass the full id set (the executor logs dropped ids).
    ReorderPages {
        page_ids: Vec<String>,
    },
    UpdateCanvas {
        width: Option<f64>,
        height: Option<f64>,
    },
    AddAudioClip {
        layer_id: String,
        clip: ClipPayload,
    },
    UpdateAudioClip {
        layer_id: String,
        clip_id: String,
        patch: ClipPatch,
    },
    DeleteAudioClip {
        layer_id: String,
        clip_id: String,
    },
}

impl OperationKind {
    pub fn op_type(&self) -> OperationType {
        match self {
            Self::AddElement { .. } => OperationType::AddElement,
            Self::UpdateElement { .. } => OperationType::UpdateElement,
            Self::DeleteElement { .. } => OperationType::DeleteElement,
            Self::MoveElement { .. } => OperationType::MoveElement,
            Self::ResizeElement { .. } => OperationType::ResizeElement,
            Self::RotateElement { .. } => OperationType::RotateElement,
            Self::UpdateElementProps { .. } => OperationType::UpdateElementProps,
            Self::AddPage { .. } => OperationType::AddPage,
            Self::UpdatePage { .. } => OperationType::UpdatePage,
            Self::DeletePage { .. } => OperationType::DeletePage,
            Self::ReorderPages { .. } => OperationType::ReorderPages,
            Self::UpdateCanvas { .. } => OperationType::UpdateCanvas,
            Self::AddAudioClip { .. } => OperationType::AddAudioClip,
            Self::UpdateAudioClip { .. } => OperationType::UpdateAudioClip,
            Self::DeleteAudioClip { .. } => OperationType::DeleteAudioClip,
        }
    }

    /// Coalescable operations carry absolute values, so within a batching
    /// window only the newest one per target needs to survive. Everything
    /// else (`add_*`, `delete_*`, structural ops) is a discrete event that
    /// must be individually replayed.
    pub fn is_coalescable(&self) -> bool {
        matches!(
            self,
            Self::MoveElement { .. }
                | Self::ResizeElement { .. }
                | Self::RotateElement { .. }
                | Self::UpdateElement { .. }
                | Self::UpdateAudioClip { .. }
        )
    }

    /// The target ids, in wire order, as used in coalesce keys.
    pub fn target_ids(&self) -> Vec<&str> {
        match self {
            Self::AddElement { page_id, .. } => vec![page_id],
            Self::UpdateElement {
                page_id,
                element_id,
                ..
            }
            | Self::DeleteElement {
                page_id,
                element_id,
            }
            | Self::MoveElement {
                page_id,
                element_id,
                ..
            }
            | Self::ResizeElement {
                page_id,
                element_id,
                ..
            }
            | Self::RotateElement {
                page_id,
                element_id,
                ..
            }
            | Self::UpdateElementProps {
                page_id,
                element_id,
                ..
            } => vec![page_id, element_id],
            Self::AddPage { .. } => vec![],
            Self::UpdatePage { page_id, .. } | Self::DeletePage { page_id } => vec![page_id],
            Self::ReorderPages { .. } => vec![],
            Self::UpdateCanvas { .. } => vec![],
            Self::AddAudioClip { layer_id, .. } => vec![layer_id],
            Self::UpdateAudioClip {
                layer_id, clip_id, ..
            }
            | Self::DeleteAudioClip { layer_id, clip_id } => vec![layer_id, clip_id],
        }
    }
}

/// A typed, targeted, timestamped mutation descriptor.
///
/// `id` is the idempotency key, unique per batch. Serialization goes
/// through [`RawOperation`] so the wire shape stays exactly
/// `{id, type, target, payload, timestamp}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawOperation")]
pub struct Operation {
    pub id: String,
    pub timestamp: i64,
    pub kind: OperationKind,
}

impl Operation {
    /// Build an operation with a generated id and the current time.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            id: format!("op_{}", Uuid::new_v4().simple()),
            timestamp: chrono::Utc::now().timestamp_millis(),
            kind,
        }
    }

    pub fn op_type(&self) -> OperationType {
        self.kind.op_type()
    }

    /// Grouping key for client-side coalescing: `type + target ids` for
    /// coalescable operations, extended with the operation id otherwise so
    /// discrete events never merge. In-memory only, never persisted.
    pub fn coalesce_key(&self) -> String {
        let mut key = self.kind.op_type().as_str().to_string();
        for id in self.kind.target_ids() {
            key.push(':');
            key.push_str(id);
        }
        if !self.kind.is_coalescable() {
            key.push(':');
            key.push_str(&self.id);
        }
        key
    }
}

// ---------------------------------------------------------------------------
// Wire conversion
// ---------------------------------------------------------------------------

fn require(
    field_value: Option<String>,
    op_type: OperationType,
    field: &'static str,
) -> Result<String, DecodeError> {
    field_value.ok_or(DecodeError::MissingTarget { op_type, field })
}

/// Decode a payload value, treating `null`/absent as an empty object.
fn payload<T: DeserializeOwned + Default>(
    value: Value,
    op_type: OperationType,
) -> Result<T, DecodeError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| DecodeError::Payload {
        op_type,
        message: e.to_string(),
    })
}

impl TryFrom<RawOperation> for Operation {
    type Error = DecodeError;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let RawOperation {
            id,
            op_type,
            target,
            payload: body,
            timestamp,
        } = raw;

        let kind = match op_type {
            OperationType::AddElement => OperationKind::AddElement {
                page_id: require(target.page_id, op_type, "pageId")?,
                element: payload(body, op_type)?,
            },
            OperationType::UpdateElement => OperationKind::UpdateElement {
                page_id: require(target.page_id, op_type, "pageId")?,
                element_id: require(target.element_id, op_type, "elementId")?,
                patch: payload(body, op_type)?,
            },
            OperationType::DeleteElement => OperationKind::DeleteElement {
                page_id: require(target.page_id, op_type, "pageId")?,
                element_id: require(target.element_id, op_type, "elementId")?,
            },
            OperationType::MoveElement => {
                let patch: ElementPatch = payload(body, op_type)?;
                OperationKind::MoveElement {
                    page_id: require(target.page_id, op_type, "pageId")?,
                    element_id: require(target.element_id, op_type, "elementId")?,
                    x: patch.x,
                    y: patch.y,
                }
            }
            OperationType::ResizeElement => {
                let patch: ElementPatch = payload(body, op_type)?;
                OperationKind::ResizeElement {
                    page_id: require(target.page_id, op_type, "pageId")?,
                    element_id: require(target.element_id, op_type, "elementId")?,
                    width: patch.width,
                    height: patch.height,
                }
            }
            OperationType::RotateElement => {
                let patch: ElementPatch = payload(body, op_type)?;
                OperationKind::RotateElement {
                    page_id: require(target.page_id, op_type, "pageId")?,
                    element_id: require(target.element_id, op_type, "elementId")?,
                    rotation: patch.rotation,
                }
            }
            OperationType::UpdateElementProps => OperationKind::UpdateElementProps {
                page_id: require(target.page_id, op_type, "pageId")?,
                element_id: require(target.element_id, op_type, "elementId")?,
                patch: payload(body, op_type)?,
            },
            OperationType::AddPage => OperationKind::AddPage {
                page: payload(body, op_type)?,
            },
            OperationType::UpdatePage => OperationKind::UpdatePage {
                page_id: require(target.page_id, op_type, "pageId")?,
                patch: payload(body, op_type)?,
            },
            OperationType::DeletePage => OperationKind::DeletePage {
                page_id: require(target.page_id, op_type, "pageId")?,
            },
            OperationType::ReorderPages => {
                #[derive(Default, Deserialize)]
                #[serde(rename_all = "camelCase")]
                struct ReorderPayload {
                    #[serde(default)]
                    page_ids: Vec<String>,
                }
                let body: ReorderPayload = payload(body, op_type)?;
                OperationKind::ReorderPages {
                    page_ids: body.page_ids,
                }
            }
            OperationType::UpdateCanvas => {
                #[derive(Default, Deserialize)]
                #[serde(rename_all = "camelCase")]
                struct CanvasPayload {
                    width: Option<f64>,
                    height: Option<f64>,
                }
                let body: CanvasPayload = payload(body, op_type)?;
                OperationKind::UpdateCanvas {
                    width: body.width,
                    height: body.height,
                }
            }
            OperationType::AddAudioClip => OperationKind::AddAudioClip {
                layer_id: require(target.audio_layer_id, op_type, "audioLayerId")?,
                clip: payload(body, op_type)?,
            },
            OperationType::UpdateAudioClip => OperationKind::UpdateAudioClip {
                layer_id: require(target.audio_layer_id, op_type, "audioLayerId")?,
                clip_id: require(target.clip_id, op_type, "clipId")?,
                patch: payload(body, op_type)?,
            },
            OperationType::DeleteAudioClip => OperationKind::DeleteAudioClip {
                layer_id: require(target.audio_layer_id, op_type, "audioLayerId")?,
                clip_id: require(target.clip_id, op_type, "clipId")?,
            },
        };

        Ok(Operation {
            id,
            timestamp,
            kind,
        })
    }
}

impl TryFrom<&Operation> for RawOperation {
    type Error = serde_json::Error;

    fn try_from(op: &Operation) -> Result<Self, Self::Error> {
        let mut target = OperationTarget::default();
        let body = match &op.kind {
            OperationKind::AddElement { page_id, element } => {
                target.page_id = Some(page_id.clone());
                serde_json::to_value(element)?
            }
            OperationKind::UpdateElement {
                page_id,
                element_id,
                patch,
            }
            | OperationKind::UpdateElementProps {
                page_id,
                element_id,
                patch,
            } => {
                target.page_id = Some(page_id.clone());
                target.element_id = Some(element_id.clone());
                serde_json::to_value(patch)?
            }
            OperationKind::DeleteElement {
                page_id,
                element_id,
            } => {
                target.page_id = Some(page_id.clone());
                target.element_id = Some(element_id.clone());
                Value::Object(Map::new())
            }
            OperationKind::MoveElement {
                page_id,
                element_id,
                x,
                y,
            } => {
                target.page_id = Some(page_id.clone());
                target.element_id = Some(element_id.clone());
                serde_json::to_value(ElementPatch {
                    x: *x,
                    y: *y,
                    ..Default::default()
                })?
            }
            OperationKind::ResizeElement {
                page_id,
                element_id,
                width,
                height,
            } => {
                target.page_id = Some(page_id.clone());
                target.element_id = Some(element_id.clone());
                serde_json::to_value(ElementPatch {
                    width: *width,
                    height: *height,
                    ..Default::default()
                })?
            }
            OperationKind::RotateElement {
                page_id,
                element_id,
                rotation,
            } => {
                target.page_id = Some(page_id.clone());
                target.element_id = Some(element_id.clone());
                serde_json::to_value(ElementPatch {
                    rotation: *rotation,
                    ..Default::default()
                })?
            }
            OperationKind::AddPage { page } => serde_json::to_value(page)?,
            OperationKind::UpdatePage { page_id, patch } => {
                target.page_id = Some(page_id.clone());
                serde_json::to_value(patch)?
            }
            OperationKind::DeletePage { page_id } => {
                target.page_id = Some(page_id.clone());
                Value::Object(Map::new())
            }
            OperationKind::ReorderPages { page_ids } => {
                serde_json::json!({ "pageIds": page_ids })
            }
            OperationKind::UpdateCanvas { width, height } => {
                let mut body = Map::new();
                if let Some(width) = width {
                    body.insert("width".into(), serde_json::json!(width));
                }
                if let Some(height) = height {
                    body.insert("height".into(), serde_json::json!(height));
                }
                Value::Object(body)
            }
            OperationKind::AddAudioClip { layer_id, clip } => {
                target.audio_layer_id = Some(layer_id.clone());
                serde_json::to_value(clip)?
            }
            OperationKind::UpdateAudioClip {
                layer_id,
                clip_id,
                patch,
            } => {
                target.audio_layer_id = Some(layer_id.clone());
                target.clip_id = Some(clip_id.clone());
                serde_json::to_value(patch)?
            }
            OperationKind::DeleteAudioClip { layer_id, clip_id } => {
                target.audio_layer_id = Some(layer_id.clone());
                target.clip_id = Some(clip_id.clone());
                Value::Object(Map::new())
            }
        };

        Ok(RawOperation {
            id: op.id.clone(),
            op_type: op.kind.op_type(),
            target,
            payload: body,
            timestamp: op.timestamp,
        })
    }
}

impl Serialize for Operation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let raw = RawOperation::try_from(self).map_err(serde::ser::Error::custom)?;
        raw.serialize(serializer)
    }
}
