use std::ops::Range;

use quadra::{DrawCommand, ShapeKind, TextureId};

/// A run of consecutive commands drawn with one pipeline and one texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub kind: ShapeKind,
    pub texture: Option<TextureId>,
    /// Instance range in submission order.
    pub instances: Range<u32>,
}

/// Group consecutive commands sharing shape kind and texture.
///
/// Only neighbours are merged, so drawing the batches in order reproduces the
/// submission order exactly.
pub fn batch_commands(commands: &[DrawCommand]) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    for (i, cmd) in commands.iter().enumerate() {
        let index = i as u32;
        let kind = cmd.shape.kind();
        match batches.last_mut() {
            Some(last) if last.kind == kind && last.texture == cmd.texture => {
                last.instances.end = index + 1;
            }
            _ => batches.push(Batch {
                kind,
                texture: cmd.texture,
                instances: index..index + 1,
            }),
        }
    }
    batches
}

/// First texture referenced by `batches` that `is_live` rejects.
pub fn first_missing_texture(
    batches: &[Batch],
    is_live: impl Fn(TextureId) -> bool,
) -> Option<TextureId> {
    batches
        .iter()
        .filter_map(|batch| batch.texture)
        .find(|&id| !is_live(id))
}
