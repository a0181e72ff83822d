//! Chunking: picks a chunk size for a pre-rendered map surface and cuts the
//! surface into a world-sized grid of chunk images.
//!
//! # Invariants
//! - Every chunk in a grid has the same size; edge chunks are padded with
//!   transparent pixels.
//! - `chunk_id = column * rows + row`, for every region of every pass.
//! - Converted chunks are invisible until `finish_loading_chunks` commits them.

mod chunk_size;
mod splitter;

pub use chunk_size::{ChunkSize, ChunkSizeSpec, calculate_chunk_size, divisors};
pub use splitter::{ChunkError, ChunkGrid, ChunkSplitter, SplitOptions, SurfaceRegion};

pub fn crate_info() -> &'static str {
    "mapedit-stream v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stream"));
    }
}
