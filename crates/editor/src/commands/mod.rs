//! Concrete editor commands, one per user-visible mutation.

mod audio;
mod element;
mod page;

pub use audio::{AddAudioClipCommand, UpdateAudioClipCommand};
pub use element::{
    AddElementCommand, DeleteElementCommand, MoveElementCommand, ResizeElementCommand,
    RotateElementCommand, UpdateElementCommand,
};
pub use page::{AddPageCommand, DeletePageCommand, DuplicatePageCommand, ReorderPagesCommand};
