use std::fmt;

use mapedit_author::{Editor, EditorState};
use mapedit_common::{Dimensions, Vector2D};
use mapedit_kernel::Positioned;

/// Read-only views of an editor session for debugging.
pub struct EditorInspector;

impl EditorInspector {
    /// Snapshot of the session: lifecycle state, player and camera positions, and
    /// the chunk grid once the map is loaded.
    pub fn summary(editor: &Editor) -> EditorSummary {
        let splitter = editor.map_drawer().splitter();
        EditorSummary {
            state: editor.state(),
            player: editor.player().position(),
            camera: editor.viewport().position(),
            chunk_size: splitter.map(|s| s.chunk_size()),
            chunk_count: splitter.map_or(0, |s| s.grid().len()),
            cached_images: editor.map_drawer().images().image_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorSummary {
    pub state: EditorState,
    pub player: Vector2D,
    pub camera: Vector2D,
    /// `None` until the map is loaded.
    pub chunk_size: Option<Dimensions>,
    pub chunk_count: usize,
    pub cached_images: usize,
}

impl fmt::Display for EditorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Editor: state={:?} player=({:.1}, {:.1}) camera=({:.1}, {:.1})",
            self.state, self.player.x, self.player.y, self.camera.x, self.camera.y
        )?;
        match self.chunk_size {
            Some(size) => write!(
                f,
                " chunks={} of {}x{}",
                self.chunk_count, size.width, size.height
            )?,
            None => write!(f, " chunks=unloaded")?,
        }
        write!(f, " images={}", self.cached_images)
    }
}
