//! Audio clip commands.

use slate_core::design::{AudioClip, AudioLayer};
use slate_core::operation::{ClipPatch, ClipPayload, Operation, OperationKind};

use crate::command::{CommandMetadata, EditorCommand};
use crate::content::EditorContent;

fn with_layer(
    content: &EditorContent,
    layer_id: &str,
    f: impl FnOnce(&mut AudioLayer),
) -> EditorContent {
    let mut next = content.clone();
    if let Some(layer) = next.audio_layers.iter_mut().find(|l| l.id == layer_id) {
        f(layer);
    }
    next
}

// ---------------------------------------------------------------------------
// AddAudioClip
// ---------------------------------------------------------------------------

pub struct AddAudioClipCommand {
    meta: CommandMetadata,
    layer_id: String,
    clip: AudioClip,
}

impl AddAudioClipCommand {
    pub fn new(layer_id: impl Into<String>, payload: ClipPayload) -> Self {
        let layer_id = layer_id.into();
        let clip = payload.into_clip();
        let meta = CommandMetadata::new("add_audio_clip", "Add audio clip")
            .with_affected([layer_id.clone(), clip.id.clone()]);
        Self {
            meta,
            layer_id,
            clip,
        }
    }

    pub fn clip_id(&self) -> &str {
        &self.clip.id
    }
}

impl EditorCommand for AddAudioClipCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let clip = self.clip.clone();
        with_layer(content, &self.layer_id, |layer| layer.clips.push(clip))
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let id = self.clip.id.clone();
        with_layer(content, &self.layer_id, |layer| {
            layer.clips.retain(|c| c.id != id)
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::AddAudioClip {
            layer_id: self.layer_id.clone(),
            clip: ClipPayload::from(self.clip.clone()),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

// ---------------------------------------------------------------------------
// UpdateAudioClip
// ---------------------------------------------------------------------------

pub struct UpdateAudioClipCommand {
    meta: CommandMetadata,
    layer_id: String,
    clip_id: String,
    patch: ClipPatch,
    before: AudioClip,
}

impl UpdateAudioClipCommand {
    pub fn new(
        content: &EditorContent,
        layer_id: impl Into<String>,
        clip_id: impl Into<String>,
        patch: ClipPatch,
    ) -> Option<Self> {
        let layer_id = layer_id.into();
        let clip_id = clip_id.into();
        let before = content
            .audio_layer(&layer_id)?
            .clips
            .iter()
            .find(|c| c.id == clip_id)?
            .clone();
        let meta = CommandMetadata::new("update_audio_clip", "Update audio clip")
            .with_affected([layer_id.clone(), clip_id.clone()]);
        Some(Self {
            meta,
            layer_id,
            clip_id,
            patch,
            before,
        })
    }
}

impl EditorCommand for UpdateAudioClipCommand {
    fn execute(&mut self, content: &EditorContent) -> EditorContent {
        let patch = self.patch.clone();
        let clip_id = self.clip_id.clone();
        with_layer(content, &self.layer_id, |layer| {
            if let Some(clip) = layer.clip_mut(&clip_id) {
                patch.apply(clip);
            }
        })
    }

    fn undo(&self, content: &EditorContent) -> EditorContent {
        let before = self.before.clone();
        let clip_id = self.clip_id.clone();
        with_layer(content, &self.layer_id, |layer| {
            if let Some(clip) = layer.clip_mut(&clip_id) {
                *clip = before;
            }
        })
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::new(OperationKind::UpdateAudioClip {
            layer_id: self.layer_id.clone(),
            clip_id: self.clip_id.clone(),
            patch: self.patch.clone(),
        })]
    }

    fn metadata(&self) -> CommandMetadata {
        self.meta.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> EditorContent {
        EditorContent {
            pages: vec![],
            audio_layers: vec![AudioLayer {
                id: "a1".into(),
                clips: vec![AudioClip {
                    id: "c1".into(),
                    start: 0.0,
                    duration: 4.0,
                    volume: Some(1.0),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn add_clip_round_trip() {
        let start = content();
        let mut cmd = AddAudioClipCommand::new(
            "a1",
            ClipPayload {
                start: 4.0,
                duration: 2.0,
                ..Default::default()
            },
        );
        let next = cmd.execute(&start);
        assert_eq!(next.audio_layer("a1").unwrap().clips.len(), 2);
        assert_eq!(cmd.undo(&next), start);
    }

    #[test]
    fn update_clip_round_trip() {
        let start = content();
        let mut cmd = UpdateAudioClipCommand::new(
            &start,
            "a1",
            "c1",
            ClipPatch {
                volume: Some(0.5),
                ..Default::default()
            },
        )
        .unwrap();
        let next = cmd.execute(&start);
        assert_eq!(
            next.audio_layer("a1").unwrap().clips[0].volume,
            Some(0.5)
        );
        assert_eq!(cmd.undo(&next), start);
    }

    #[test]
    fn update_requires_existing_clip() {
        let start = content();
        assert!(UpdateAudioClipCommand::new(&start, "a1", "ghost", ClipPatch::default()).is_none());
    }
}
