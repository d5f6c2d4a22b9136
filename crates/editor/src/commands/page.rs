//! Page commands: add, duplicate, delete, reorder.

use slate_core::design::{new_element_id, new_page_id, Page};
use slate_core::operation::{Operation, OperationKind, PagePayload};

use crate::command::{CommandMetadata, EditorCommand};
use crate::content::EditorContent;

// ---------------------------------------------------------------------------
// AddPage
// ---------------------------------------------------------------------------

pub struct AddPageCommand {
    meta: CommandMetadata,
    page: Page,
}

impl AddPageCommand {
    pub fn new(payload: PagePayload) -> Self {
        let page = payload.into_page();
        let meta =
            CommandMetadata::new("add_page", "Add page").with_affected([page.id.clone()]);
        Self { meta, page }
    }

    pub fn page_id(&self) -> &str {
        &self.page.id
    }
}

impl EditorCommand for AddPageCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let mut next = content.clone();
        next.pages.push(self.page.clone());
        next
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let mut next = content.clone();
        next.pages.retain(|p| p.id != self.page.id);
        next
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::AddPage {
            page: PagePayload::from(self.page.clone()),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// DuplicatePage
// ---------------------------------------------------------------------------

pub struct DuplicatePageCommand {
    meta: CommandMetadata,
    /// The copy, with fresh page and element ids, built at construction.
    page: Page,
    insert_at: usize,
}

impl DuplicatePageCommand {
    pub fn new(content: &EditorContent, source_page_id: &str) -> Option<Self> {
        let index = content.pages.iter().position(|p| p.id == source_page_id)?;
        let mut page = content.pages[index].clone();
        page.id = new_page_id();
        for el in &mut page.elements {
            el.id = new_element_id();
        }
        let meta = CommandMetadata::new("duplicate_page", "Duplicate page")
            .with_affected([source_page_id.to_string(), page.id.clone()]);
        Some(Self {
            meta,
            page,
            insert_at: index + 1,
        })
    }

    pub fn page_id(&self) -> &str {
        &self.page.id
    }
}

impl EditorCommand for DuplicatePageCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let mut next = content.clone();
        let at = self.insert_at.min(next.pages.len());
        next.pages.insert(at, self.page.clone());
        next
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let mut next = content.clone();
        next.pages.retain(|p| p.id != self.page.id);
        next
    }

    fn operations(&self) -> Vec<Operation> {
        // The server appends; the local insert position is cosmetic until
        // the next reorder.
        vec![Operation::new(OperationKind::AddPage {
            page: PagePayload::from(self.page.clone()),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// DeletePage
// ---------------------------------------------------------------------------

pub struct DeletePageCommand {
    meta: CommandMetadata,
    page_id: String,
    removed: (usize, Page),
}

impl DeletePageCommand {
    pub fn new(content: &EditorContent, page_id: impl Into<String>) -> Option<Self> {
        let page_id = page_id.into();
        let index = content.pages.iter().position(|p| p.id == page_id)?;
        let snapshot = content.pages[index].clone();
        let meta = CommandMetadata::new("delete_page", "Delete page")
            .with_affected([page_id.clone()]);
        Some(Self {
            meta,
            page_id,
            removed: (index, snapshot),
        })
    }
}

impl EditorCommand for DeletePageCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let mut next = content.clone();
        next.pages.retain(|p| p.id != self.page_id);
        next
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let (index, page) = self.removed.clone();
        let mut next = content.clone();
        let at = index.min(next.pages.len());
        next.pages.insert(at, page);
        next
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::DeletePage {
            page_id: self.page_id.clone(),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// ReorderPages
// ---------------------------------------------------------------------------

pub struct ReorderPagesCommand {
    meta: CommandMetadata,
    page_ids: Vec<String>,
    /// Full snapshot: reorder drops pages omitted from `page_ids`, so a
    /// positional undo is not enough.
    prev_pages: Vec<Page>,
}

impl ReorderPagesCommand {
    pub fn new(content: &EditorContent, page_ids: Vec<String>) -> Self {
        let meta = CommandMetadata::new("reorder_pages", "Reorder pages")
            .with_affected(page_ids.iter().cloned());
        Self {
            meta,
            page_ids,
            prev_pages: content.pages.clone(),
        }
    }
}

impl EditorCommand for ReorderPagesCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        // Mirror the server semantics: rebuild in the given order, pages
        // omitted from page_ids are dropped.
        let mut next = content.clone();
        let mut pages = std::mem::take(&mut next.pages);
        for id in &self.page_ids {
            if let Some(pos) = pages.iter().position(|p| p.id == *id) {
                next.pages.push(pages.remove(pos));
            }
        }
        next
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let mut next = content.clone();
        next.pages = self.prev_pages.clone();
        next
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::ReorderPages {
            page_ids: self.page_ids.clone(),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::design::DesignElement;

    fn page(id: &str) -> Page {
        Page {
            id: id.into(),
            duration: 5.0,
            background: "#ffffff".into(),
            elements: vec![DesignElement {
                id: format!("{id}_el"),
                kind: "rect".into(),
                ..Default::default()
            }],
            animation: None,
            extra: Default::default(),
        }
    }

    fn content() -> EditorContent {
        EditorContent {
            pages: vec![page("p1"), page("p2"), page("p3")],
            audio_layers: vec![],
        }
    }

    #[test]
    fn duplicate_inserts_after_source_with_fresh_ids() {
        let start = content();
        let mut cmd = DuplicatePageCommand::new(&start, "p2").unwrap();
        let next = cmd.execute(&start);

        assert_eq!(next.pages.len(), 4);
        assert_eq!(next.pages[2].id, cmd.page_id());
        assert_ne!(next.pages[2].id, "p2");
        assert_ne!(next.pages[2].elements[0].id, "p2_el");
        assert_eq!(cmd.undo(&next), start);
    }

    #[test]
    fn reorder_undo_restores_dropped_pages() {
        let start = content();
        let mut cmd =
            ReorderPagesCommand::new(&start, vec!["p2".to_string(), "p1".to_string()]);
        let next = cmd.execute(&start);

        let order: Vec<&str> = next.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["p2", "p1"]);

        let undone = cmd.undo(&next);
        assert_eq!(undone, start);
    }

    #[test]
    fn delete_page_round_trip() {
        let start = content();
        let mut cmd = DeletePageCommand::new(&start, "p2").unwrap();
        let next = cmd.execute(&start);
        assert!(next.page("p2").is_none());
        assert_eq!(cmd.undo(&next), start);
    }
}
