//! The operation executor: a pure reducer applying operations to a design
//! document.
//!
//! [`apply_operations`] clones the document once and applies the batch
//! sequentially against the clone. The first failing operation aborts the
//! whole batch and the caller keeps its original document, so persistence
//! is all-or-nothing without an explicit rollback step.
//!
//! [`apply`] is deterministic: for a fixed document and operation it always
//! produces the same result (no hidden state; generated ids come from the
//! decoded payload, not from here).

use crate::design::DesignData;
use crate::operation::{Operation, OperationKind};

/// A single operation failed to apply. Any variant aborts the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("page not found: {page_id}")]
    PageNotFound { page_id: String },

    #[error("element not found: {element_id} on page {page_id}")]
    ElementNotFound { page_id: String, element_id: String },

    #[error("audio layer not found: {layer_id}")]
    AudioLayerNotFound { layer_id: String },

    #[error("audio clip not found: {clip_id} on layer {layer_id}")]
    AudioClipNotFound { layer_id: String, clip_id: String },
}

/// Apply a batch of operations to a copy of `design`.
///
/// Returns the resulting document, or the first operation failure. The
/// input document is never mutated.
pub fn apply_operations(
    design: &DesignData,
    operations: &[Operation],
) -> Result<DesignData, OperationError> {
    let mut next = design.clone();
    for op in operations {
        apply(&mut next, op)?;
    }
    Ok(next)
}

/// Apply one operation in place.
pub fn apply(design: &mut DesignData, op: &Operation) -> Result<(), OperationError> {
    match &op.kind {
        // --- Element ops ---
        OperationKind::AddElement { page_id, element } => {
            let page = design
                .page_mut(page_id)
                .ok_or_else(|| OperationError::PageNotFound {
                    page_id: page_id.clone(),
                })?;
            page.elements.push(element.clone().into_element());
            Ok(())
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
            let el = resolve_element(design, page_id, element_id)?;
            patch.apply(el);
            Ok(())
        }
        OperationKind::DeleteElement {
            page_id,
            element_id,
        } => {
            let page = design
                .page_mut(page_id)
                .ok_or_else(|| OperationError::PageNotFound {
                    page_id: page_id.clone(),
                })?;
            if page.element(element_id).is_none() {
                return Err(OperationError::ElementNotFound {
                    page_id: page_id.clone(),
                    element_id: element_id.clone(),
                });
            }
            page.elements.retain(|e| e.id != *element_id);
            Ok(())
        }
        OperationKind::MoveElement {
            page_id,
            element_id,
            x,
            y,
        } => {
            let el = resolve_element(design, page_id, element_id)?;
            el.x = x.unwrap_or(el.x);
            el.y = y.unwrap_or(el.y);
            Ok(())
        }
        OperationKind::ResizeElement {
            page_id,
            element_id,
            width,
            height,
        } => {
            let el = resolve_element(design, page_id, element_id)?;
            el.width = width.unwrap_or(el.width);
            el.height = height.unwrap_or(el.height);
            Ok(())
        }
        OperationKind::RotateElement {
            page_id,
            element_id,
            rotation,
        } => {
            let el = resolve_element(design, page_id, element_id)?;
            el.rotation = rotation.unwrap_or(el.rotation);
            Ok(())
        }

        // --- Page ops ---
        OperationKind::AddPage { page } => {
            design.pages.push(page.clone().into_page());
            Ok(())
        }
        OperationKind::UpdatePage { page_id, patch } => {
            let page = design
                .page_mut(page_id)
                .ok_or_else(|| OperationError::PageNotFound {
                    page_id: page_id.clone(),
                })?;
            patch.apply(page);
            Ok(())
        }
        OperationKind::DeletePage { page_id } => {
            if design.page(page_id).is_none() {
                return Err(OperationError::PageNotFound {
                    page_id: page_id.clone(),
                });
            }
            design.pages.retain(|p| p.id != *page_id);
            Ok(())
        }
        OperationKind::ReorderPages { page_ids } => {
            let mut pages = std::mem::take(&mut design.pages);
            let mut reordered = Vec::with_capacity(page_ids.len());
            for id in page_ids {
                if let Some(pos) = pages.iter().position(|p| p.id == *id) {
                    reordered.push(pages.remove(pos));
                }
            }
            // Pages omitted from page_ids are dropped from the document.
            // Callers must send the full id set; this is kept observable
            // rather than silently ignored.
            if !pages.is_empty() {
                let dropped: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
                tracing::warn!(op_id = %op.id, ?dropped, "reorder_pages dropped pages omitted from pageIds");
            }
            design.pages = reordered;
            Ok(())
        }

        // --- Canvas op ---
        OperationKind::UpdateCanvas { width, height } => {
            design.canvas.width = width.unwrap_or(design.canvas.width);
            design.canvas.height = height.unwrap_or(design.canvas.height);
            Ok(())
        }

        // --- Audio ops ---
        OperationKind::AddAudioClip { layer_id, clip } => {
            let layer =
                design
                    .audio_layer_mut(layer_id)
                    .ok_or_else(|| OperationError::AudioLayerNotFound {
                        layer_id: layer_id.clone(),
                    })?;
            layer.clips.push(clip.clone().into_clip());
            Ok(())
        }
        OperationKind::UpdateAudioClip {
            layer_id,
            clip_id,
            patch,
        } => {
            let layer =
                design
                    .audio_layer_mut(layer_id)
                    .ok_or_else(|| OperationError::AudioLayerNotFound {
                        layer_id: layer_id.clone(),
                    })?;
            let clip = layer
                .clip_mut(clip_id)
                .ok_or_else(|| OperationError::AudioClipNotFound {
                    layer_id: layer_id.clone(),
                    clip_id: clip_id.clone(),
                })?;
            patch.apply(clip);
            Ok(())
        }
        OperationKind::DeleteAudioClip { layer_id, clip_id } => {
            let layer =
                design
                    .audio_layer_mut(layer_id)
                    .ok_or_else(|| OperationError::AudioLayerNotFound {
                        layer_id: layer_id.clone(),
                    })?;
            if layer.clip_mut(clip_id).is_none() {
                return Err(OperationError::AudioClipNotFound {
                    layer_id: layer_id.clone(),
                    clip_id: clip_id.clone(),
                });
            }
            layer.clips.retain(|c| c.id != *clip_id);
            Ok(())
        }
    }
}

fn resolve_element<'a>(
    design: &'a mut DesignData,
    page_id: &str,
    element_id: &str,
) -> Result<&'a mut crate::design::DesignElement, OperationError> {
    let page = design
        .page_mut(page_id)
        .ok_or_else(|| OperationError::PageNotFound {
            page_id: page_id.to_string(),
        })?;
    page.element_mut(element_id)
        .ok_or_else(|| OperationError::ElementNotFound {
            page_id: page_id.to_string(),
            element_id: element_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{AudioClip, AudioLayer, DesignElement, Page};
    use crate::operation::{
        ClipPatch, ClipPayload, ElementPatch, ElementPayload, PagePatch, PagePayload,
    };
    use assert_matches::assert_matches;

    fn element(id: &str) -> DesignElement {
        DesignElement {
            id: id.to_string(),
            kind: "rect".to_string(),
            x: 100.0,
            y: 200.0,
            width: 50.0,
            height: 60.0,
            rotation: 0.0,
            ..Default::default()
        }
    }

    fn page(id: &str, elements: Vec<DesignElement>) -> Page {
        Page {
            id: id.to_string(),
            duration: 5.0,
            background: "#ffffff".to_string(),
            elements,
            animation: None,
            extra: Default::default(),
        }
    }

    fn design() -> DesignData {
        DesignData {
            canvas: Default::default(),
            pages: vec![page("p1", vec![element("e1")])],
            audio_layers: vec![AudioLayer {
                id: "a1".to_string(),
                clips: vec![AudioClip {
                    id: "c1".to_string(),
                    start: 0.0,
                    duration: 3.0,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    fn op(kind: OperationKind) -> Operation {
        Operation {
            id: "op_test".to_string(),
            timestamp: 0,
            kind,
        }
    }

    #[test]
    fn apply_is_deterministic_and_leaves_input_untouched() {
        let doc = design();
        let operation = op(OperationKind::MoveElement {
            page_id: "p1".into(),
            element_id: "e1".into(),
            x: Some(10.0),
            y: Some(20.0),
        });

        let first = apply_operations(&doc, std::slice::from_ref(&operation)).unwrap();
        let second = apply_operations(&doc, std::slice::from_ref(&operation)).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.pages[0].elements[0].x, 100.0);
    }

    #[test]
    fn move_with_partial_payload_only_changes_given_axis() {
        let doc = design();
        let next = apply_operations(
            &doc,
            &[op(OperationKind::MoveElement {
                page_id: "p1".into(),
                element_id: "e1".into(),
                x: Some(10.0),
                y: None,
            })],
        )
        .unwrap();

        let el = next.page("p1").unwrap().element("e1").unwrap();
        assert_eq!(el.x, 10.0);
        assert_eq!(el.y, 200.0);
    }

    #[test]
    fn resize_and_rotate_are_partial_merges_too() {
        let doc = design();
        let next = apply_operations(
            &doc,
            &[
                op(OperationKind::ResizeElement {
                    page_id: "p1".into(),
                    element_id: "e1".into(),
                    width: Some(80.0),
                    height: None,
                }),
                op(OperationKind::RotateElement {
                    page_id: "p1".into(),
                    element_id: "e1".into(),
                    rotation: Some(45.0),
                }),
            ],
        )
        .unwrap();

        let el = next.page("p1").unwrap().element("e1").unwrap();
        assert_eq!(el.width, 80.0);
        assert_eq!(el.height, 60.0);
        assert_eq!(el.rotation, 45.0);
    }

    #[test]
    fn update_element_shallow_merges_known_and_extra_fields() {
        let doc = design();
        let mut patch = ElementPatch {
            fill: Some("#ff0000".to_string()),
            ..Default::default()
        };
        patch
            .extra
            .insert("opacity".to_string(), serde_json::json!(0.5));

        let next = apply_operations(
            &doc,
            &[op(OperationKind::UpdateElement {
                page_id: "p1".into(),
                element_id: "e1".into(),
                patch,
            })],
        )
        .unwrap();

        let el = next.page("p1").unwrap().element("e1").unwrap();
        assert_eq!(el.fill.as_deref(), Some("#ff0000"));
        assert_eq!(el.extra.get("opacity"), Some(&serde_json::json!(0.5)));
        assert_eq!(el.x, 100.0);
    }

    #[test]
    fn add_element_generates_id_when_payload_omits_one() {
        let doc = design();
        let next = apply_operations(
            &doc,
            &[op(OperationKind::AddElement {
                page_id: "p1".into(),
                element: ElementPayload {
                    kind: "rect".to_string(),
                    x: 10.0,
                    y: 10.0,
                    width: 50.0,
                    height: 50.0,
                    ..Default::default()
                },
            })],
        )
        .unwrap();

        let page = next.page("p1").unwrap();
        assert_eq!(page.elements.len(), 2);
        assert!(page.elements[1].id.starts_with("el_"));
    }

    #[test]
    fn delete_element_requires_existing_target() {
        let doc = design();
        let err = apply_operations(
            &doc,
            &[op(OperationKind::DeleteElement {
                page_id: "p1".into(),
                element_id: "ghost".into(),
            })],
        )
        .unwrap_err();
        assert_matches!(err, OperationError::ElementNotFound { .. });
    }

    #[test]
    fn mid_batch_failure_aborts_everything() {
        let doc = design();
        let batch = vec![
            op(OperationKind::MoveElement {
                page_id: "p1".into(),
                element_id: "e1".into(),
                x: Some(1.0),
                y: None,
            }),
            op(OperationKind::MoveElement {
                page_id: "p1".into(),
                element_id: "missing".into(),
                x: Some(2.0),
                y: None,
            }),
            op(OperationKind::MoveElement {
                page_id: "p1".into(),
                element_id: "e1".into(),
                x: Some(3.0),
                y: None,
            }),
        ];

        let err = apply_operations(&doc, &batch).unwrap_err();
        assert_matches!(err, OperationError::ElementNotFound { .. });
        // Caller still holds the pre-batch document.
        assert_eq!(doc.pages[0].elements[0].x, 100.0);
    }

    #[test]
    fn add_page_applies_defaults() {
        let doc = design();
        let next = apply_operations(
            &doc,
            &[op(OperationKind::AddPage {
                page: PagePayload::default(),
            })],
        )
        .unwrap();

        assert_eq!(next.pages.len(), 2);
        let added = &next.pages[1];
        assert!(added.id.starts_with("page_"));
        assert_eq!(added.duration, 5.0);
        assert_eq!(added.background, "#ffffff");
        assert!(added.elements.is_empty());
    }

    #[test]
    fn update_page_shallow_merges() {
        let doc = design();
        let next = apply_operations(
            &doc,
            &[op(OperationKind::UpdatePage {
                page_id: "p1".into(),
                patch: PagePatch {
                    duration: Some(8.0),
                    ..Default::default()
                },
            })],
        )
        .unwrap();
        let page = next.page("p1").unwrap();
        assert_eq!(page.duration, 8.0);
        assert_eq!(page.background, "#ffffff");
    }

    #[test]
    fn reorder_pages_drops_omitted_ids() {
        let mut doc = design();
        doc.pages.push(page("p2", vec![]));
        doc.pages.push(page("p3", vec![]));

        let next = apply_operations(
            &doc,
            &[op(OperationKind::ReorderPages {
                page_ids: vec!["p2".to_string(), "p1".to_string()],
            })],
        )
        .unwrap();

        let order: Vec<&str> = next.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["p2", "p1"]);
        assert!(next.page("p3").is_none());
    }

    #[test]
    fn reorder_pages_skips_unknown_ids() {
        let mut doc = design();
        doc.pages.push(page("p2", vec![]));

        let next = apply_operations(
            &doc,
            &[op(OperationKind::ReorderPages {
                page_ids: vec!["p2".to_string(), "nope".to_string(), "p1".to_string()],
            })],
        )
        .unwrap();

        let order: Vec<&str> = next.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["p2", "p1"]);
    }

    #[test]
    fn update_canvas_merges_dimensions() {
        let doc = design();
        let next = apply_operations(
            &doc,
            &[op(OperationKind::UpdateCanvas {
                width: Some(1080.0),
                height: None,
            })],
        )
        .unwrap();
        assert_eq!(next.canvas.width, 1080.0);
        assert_eq!(next.canvas.height, 1080.0);
    }

    #[test]
    fn audio_clip_lifecycle() {
        let doc = design();
        let next = apply_operations(
            &doc,
            &[
                op(OperationKind::AddAudioClip {
                    layer_id: "a1".into(),
                    clip: ClipPayload {
                        start: 3.0,
                        duration: 2.0,
                        ..Default::default()
                    },
                }),
                op(OperationKind::UpdateAudioClip {
                    layer_id: "a1".into(),
                    clip_id: "c1".into(),
                    patch: ClipPatch {
                        volume: Some(0.4),
                        ..Default::default()
                    },
                }),
                op(OperationKind::DeleteAudioClip {
                    layer_id: "a1".into(),
                    clip_id: "c1".into(),
                }),
            ],
        )
        .unwrap();

        let layer = &next.audio_layers[0];
        assert_eq!(layer.clips.len(), 1);
        assert!(layer.clips[0].id.starts_with("clip_"));
    }

    #[test]
    fn audio_ops_fail_on_missing_layer_or_clip() {
        let doc = design();
        assert_matches!(
            apply_operations(
                &doc,
                &[op(OperationKind::AddAudioClip {
                    layer_id: "ghost".into(),
                    clip: ClipPayload::default(),
                })],
            )
            .unwrap_err(),
            OperationError::AudioLayerNotFound { .. }
        );
        assert_matches!(
            apply_operations(
                &doc,
                &[op(OperationKind::UpdateAudioClip {
                    layer_id: "a1".into(),
                    clip_id: "ghost".into(),
                    patch: ClipPatch::default(),
                })],
            )
            .unwrap_err(),
            OperationError::AudioClipNotFound { .. }
        );
    }
}
