//! Element commands: add, move, resize, rotate, update, delete.
//!
//! Constructors that target an existing element take the current content
//! and return `None` when the target is missing; the captured pre-state
//! makes `undo` self-contained.

use slate_core::design::{DesignElement, Page};
use slate_core::operation::{ElementPatch, ElementPayload, Operation, OperationKind};

use crate::command::{CommandMetadata, EditorCommand};
use crate::content::EditorContent;

/// Clone `content` and mutate one page in place.
fn with_page(content: &EditorContent, page_id: &str, f: impl FnOnce(&mut Page)) -> EditorContent {
    let mut next = content.clone();
    if let Some(page) = next.pages.iter_mut().find(|p| p.id == page_id) {
        f(page);
    }
    next
}

fn with_element(
    content: &EditorContent,
    page_id: &str,
    element_id: &str,
    f: impl FnOnce(&mut DesignElement),
) -> EditorContent {
    with_page(content, page_id, |page| {
        if let Some(el) = page.element_mut(element_id) {
            f(el);
        }
    })
}

// ---------------------------------------------------------------------------
// AddElement
// ---------------------------------------------------------------------------

pub struct AddElementCommand {
    meta: CommandMetadata,
    page_id: String,
    element: DesignElement,
}

impl AddElementCommand {
    pub fn new(page_id: impl Into<String>, payload: ElementPayload) -> Self {
        let page_id = page_id.into();
        // Materialize up front so the id is stable across execute, undo,
        // and the generated operation.
        let element = payload.into_element();
        let meta = CommandMetadata::new("add_element", format!("Add {}", element.kind))
            .with_affected([page_id.clone(), element.id.clone()]);
        Self {
            meta,
            page_id,
            element,
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element.id
    }
}

impl EditorCommand for AddElementCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let element = self.element.clone();
        with_page(content, &self.page_id, |page| page.elements.push(element))
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let id = self.element.id.clone();
        with_page(content, &self.page_id, |page| {
            page.elements.retain(|e| e.id != id)
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::AddElement {
            page_id: self.page_id.clone(),
            element: ElementPayload::from(self.element.clone()),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// MoveElement
// ---------------------------------------------------------------------------

pub struct MoveElementCommand {
    meta: CommandMetadata,
    page_id: String,
    element_id: String,
    x: f64,
    y: f64,
    prev: (f64, f64),
}

impl MoveElementCommand {
    pub fn new(
        content: &EditorContent,
        page_id: impl Into<String>,
        element_id: impl Into<String>,
        x: f64,
        y: f64,
    ) -> Option<Self> {
        let page_id = page_id.into();
        let element_id = element_id.into();
        let el = content.element(&page_id, &element_id)?;
        let meta = CommandMetadata::new("move_element", "Move element")
            .with_affected([page_id.clone(), element_id.clone()]);
        Some(Self {
            meta,
            page_id,
            element_id,
            x,
            y,
            prev: (el.x, el.y),
        })
    }
}

impl EditorCommand for MoveElementCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let (x, y) = (self.x, self.y);
        with_element(content, &self.page_id, &self.element_id, |el| {
            el.x = x;
            el.y = y;
        })
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let (x, y) = self.prev;
        with_element(content, &self.page_id, &self.element_id, |el| {
            el.x = x;
            el.y = y;
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::MoveElement {
            page_id: self.page_id.clone(),
            element_id: self.element_id.clone(),
            x: Some(self.x),
            y: Some(self.y),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// ResizeElement
// ---------------------------------------------------------------------------

pub struct ResizeElementCommand {
    meta: CommandMetadata,
    page_id: String,
    element_id: String,
    width: f64,
    height: f64,
    prev: (f64, f64),
}

impl ResizeElementCommand {
    pub fn new(
        content: &EditorContent,
        page_id: impl Into<String>,
        element_id: impl Into<String>,
        width: f64,
        height: f64,
    ) -> Option<Self> {
        let page_id = page_id.into();
        let element_id = element_id.into();
        let el = content.element(&page_id, &element_id)?;
        let meta = CommandMetadata::new("resize_element", "Resize element")
            .with_affected([page_id.clone(), element_id.clone()]);
        Some(Self {
            meta,
            page_id,
            element_id,
            width,
            height,
            prev: (el.width, el.height),
        })
    }
}

impl EditorCommand for ResizeElementCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let (width, height) = (self.width, self.height);
        with_element(content, &self.page_id, &self.element_id, |el| {
            el.width = width;
            el.height = height;
        })
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let (width, height) = self.prev;
        with_element(content, &self.page_id, &self.element_id, |el| {
            el.width = width;
            el.height = height;
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::ResizeElement {
            page_id: self.page_id.clone(),
            element_id: self.element_id.clone(),
            width: Some(self.width),
            height: Some(self.height),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// RotateElement
// ---------------------------------------------------------------------------

pub struct RotateElementCommand {
    meta: CommandMetadata,
    page_id: String,
    element_id: String,
    rotation: f64,
    prev: f64,
}

impl RotateElementCommand {
    pub fn new(
        content: &EditorContent,
        page_id: impl Into<String>,
        element_id: impl Into<String>,
        rotation: f64,
    ) -> Option<Self> {
        let page_id = page_id.into();
        let element_id = element_id.into();
        let el = content.element(&page_id, &element_id)?;
        let meta = CommandMetadata::new("rotate_element", "Rotate element")
            .with_affected([page_id.clone(), element_id.clone()]);
        Some(Self {
            meta,
            page_id,
            element_id,
            rotation,
            prev: el.rotation,
        })
    }
}

impl EditorCommand for RotateElementCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let rotation = self.rotation;
        with_element(content, &self.page_id, &self.element_id, |el| {
            el.rotation = rotation;
        })
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let rotation = self.prev;
        with_element(content, &self.page_id, &self.element_id, |el| {
            el.rotation = rotation;
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::RotateElement {
            page_id: self.page_id.clone(),
            element_id: self.element_id.clone(),
            rotation: Some(self.rotation),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// UpdateElement
// ---------------------------------------------------------------------------

pub struct UpdateElementCommand {
    meta: CommandMetadata,
    page_id: String,
    element_id: String,
    patch: ElementPatch,
    /// Full snapshot; a patch can touch arbitrary properties, so undo
    /// restores the whole element.
    before: DesignElement,
}

impl UpdateElementCommand {
    pub fn new(
        content: &EditorContent,
        page_id: impl Into<String>,
        element_id: impl Into<String>,
        patch: ElementPatch,
    ) -> Option<Self> {
        let page_id = page_id.into();
        let element_id = element_id.into();
        let before = content.element(&page_id, &element_id)?.clone();
        let meta = CommandMetadata::new("update_element", "Update element")
            .with_affected([page_id.clone(), element_id.clone()]);
        Some(Self {
            meta,
            page_id,
            element_id,
            patch,
            before,
        })
    }
}

impl EditorCommand for UpdateElementCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let patch = self.patch.clone();
        with_element(content, &self.page_id, &self.element_id, |el| {
            patch.apply(el)
        })
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let before = self.before.clone();
        with_element(content, &self.page_id, &self.element_id, |el| {
            *el = before;
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::UpdateElement {
            page_id: self.page_id.clone(),
            element_id: self.element_id.clone(),
            patch: self.patch.clone(),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// DeleteElement
// ---------------------------------------------------------------------------

pub struct DeleteElementCommand {
    meta: CommandMetadata,
    page_id: String,
    element_id: String,
    /// Position and snapshot for undo re-insertion.
    removed: (usize, DesignElement),
}

impl DeleteElementCommand {
    pub fn new(
        content: &EditorContent,
        page_id: impl Into<String>,
        element_id: impl Into<String>,
    ) -> Option<Self> {
        let page_id = page_id.into();
        let element_id = element_id.into();
        let page = content.page(&page_id)?;
        let index = page.elements.iter().position(|e| e.id == element_id)?;
        let snapshot = page.elements[index].clone();
        let meta = CommandMetadata::new("delete_element", "Delete element")
            .with_affected([page_id.clone(), element_id.clone()]);
        Some(Self {
            meta,
            page_id,
            element_id,
            removed: (index, snapshot),
        })
    }
}

impl EditorCommand for DeleteElementCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let id = self.element_id.clone();
        with_page(content, &self.page_id, |page| {
            page.elements.retain(|e| e.id != id)
        })
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let (index, element) = self.removed.clone();
        with_page(content, &self.page_id, |page| {
            let at = index.min(page.elements.len());
            page.elements.insert(at, element);
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::DeleteElement {
            page_id: self.page_id.clone(),
            element_id: self.element_id.clone(),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}
