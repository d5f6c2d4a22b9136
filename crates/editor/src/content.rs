//! Local editor content state.
//!
//! [`EditorContent`] is the slice of the design document a client edits
//! locally (pages plus audio layers). It is an explicit value threaded
//! through pure command functions; commands return a new content value
//! rather than mutating shared state.

use slate_core::design::{AudioLayer, DesignData, DesignElement, Page};

/// The content state commands execute against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorContent {
    pub pages: Vec<Page>,
    pub audio_layers: Vec<AudioLayer>,
}

impl EditorContent {
    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    pub fn element(&self, page_id: &str, element_id: &str) -> Option<&DesignElement> {
        self.page(page_id).and_then(|p| p.element(element_id))
    }

    pub fn audio_layer(&self, layer_id: &str) -> Option<&AudioLayer> {
        self.audio_layers.iter().find(|l| l.id == layer_id)
    }
}

impl From<DesignData> for EditorContent {
    fn from(design: DesignData) -> Self {
        Self {
            pages: design.pages,
            audio_layers: design.audio_layers,
        }
    }
}
