use std::collections::BTreeMap;

use image::{RgbaImage, imageops};
use mapedit_common::{ChunkPreference, Dimensions, GeometryError};

use crate::chunk_size::{ChunkSize, ChunkSizeSpec, calculate_chunk_size};

/// Errors from splitting a surface into chunks.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(
        "chunk size {}x{} does not match the grid's {}x{}",
        .requested.width,
        .requested.height,
        .expected.width,
        .expected.height
    )]
    ChunkSizeMismatch {
        expected: ChunkSize,
        requested: ChunkSize,
    },
    #[error("region {region:?} does not fit a {width}x{height} surface")]
    RegionOutsideSurface {
        region: SurfaceRegion,
        width: u32,
        height: u32,
    },
    #[error("region {region:?} extends past the {width}x{height} world")]
    RegionOutsideWorld {
        region: SurfaceRegion,
        width: u32,
        height: u32,
    },
}

/// The world rectangle held by a surface: world `(x, y)` is drawn at surface
/// `(x - origin_x, y - origin_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRegion {
    pub origin_x: u32,
    pub origin_y: u32,
    pub width: u32,
    pub height: u32,
}

impl SurfaceRegion {
    pub fn new(origin_x: u32, origin_y: u32, width: u32, height: u32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// The whole of a world drawn at the surface origin.
    pub fn whole(world: Dimensions) -> Self {
        Self::new(0, 0, world.width, world.height)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    pub chunk_size: ChunkSizeSpec,
    pub preference: ChunkPreference,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            chunk_size: ChunkSizeSpec::Calculated,
            preference: ChunkPreference::Big,
        }
    }
}

/// World-sized grid of equally sized chunk images, stored column-major.
#[derive(Debug, Clone)]
pub struct ChunkGrid {
    world: Dimensions,
    chunk_size: ChunkSize,
    columns: u32,
    rows: u32,
    chunks: Vec<Option<RgbaImage>>,
}

impl ChunkGrid {
    /// An empty grid covering `world` in chunks of `chunk_size`.
    pub fn new(world: Dimensions, chunk_size: ChunkSize) -> Result<Self, GeometryError> {
        let world = world.ensure_positive("world")?;
        let chunk_size = chunk_size.ensure_positive("chunk size")?;
        let columns = world.width.div_ceil(chunk_size.width);
        let rows = world.height.div_ceil(chunk_size.height);
        let len = columns as usize * rows as usize;
        Ok(Self {
            world,
            chunk_size,
            columns,
            rows,
            chunks: vec![None; len],
        })
    }

    pub fn world(&self) -> Dimensions {
        self.world
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of slots, loaded or not.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Cells holding a committed chunk.
    pub fn loaded_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    pub fn id(&self, column: u32, row: u32) -> usize {
        column as usize * self.rows as usize + row as usize
    }

    /// `(column, row)` of a chunk id.
    pub fn cell(&self, id: usize) -> (u32, u32) {
        let rows = self.rows as usize;
        ((id / rows) as u32, (id % rows) as u32)
    }

    /// World position of a chunk's top-left pixel.
    pub fn origin(&self, id: usize) -> (u32, u32) {
        let (column, row) = self.cell(id);
        (column * self.chunk_size.width, row * self.chunk_size.height)
    }

    /// The committed chunk with this id, if any.
    pub fn get(&self, id: usize) -> Option<&RgbaImage> {
        self.chunks.get(id).and_then(Option::as_ref)
    }

    /// Loaded chunks in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RgbaImage)> {
        self.chunks
            .iter()
            .enumerate()
            .filter_map(|(id, chunk)| chunk.as_ref().map(|c| (id, c)))
    }
}

/// Cuts pre-rendered surfaces into a [`ChunkGrid`].
///
/// Conversion is synchronous but staged: chunks become visible in the grid
/// only after [`ChunkSplitter::finish_loading_chunks`].
#[derive(Debug)]
pub struct ChunkSplitter {
    preference: ChunkPreference,
    grid: ChunkGrid,
    loading: BTreeMap<usize, RgbaImage>,
}

impl ChunkSplitter {
    /// Build a grid for `world` and split the first region into it. A
    /// calculated chunk size is derived from the region's dimensions.
    pub fn new(
        world: Dimensions,
        surface: &RgbaImage,
        region: SurfaceRegion,
        options: SplitOptions,
    ) -> Result<Self, ChunkError> {
        let chunk_size = resolve_chunk_size(options, region)?;
        let mut splitter = Self {
            preference: options.preference,
            grid: ChunkGrid::new(world, chunk_size)?,
            loading: BTreeMap::new(),
        };
        splitter.split_chunks(surface, region)?;
        Ok(splitter)
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.grid.chunk_size
    }

    pub fn preference(&self) -> ChunkPreference {
        self.preference
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Chunks converted but not yet committed.
    pub fn loading_count(&self) -> usize {
        self.loading.len()
    }

    /// Split another region into the same grid. `None` keeps the current
    /// chunk size; a different size is rejected.
    pub fn add_chunks(
        &mut self,
        surface: &RgbaImage,
        region: SurfaceRegion,
        options: Option<SplitOptions>,
    ) -> Result<usize, ChunkError> {
        if let Some(options) = options {
            let requested = resolve_chunk_size(options, region)?;
            if requested != self.grid.chunk_size {
                return Err(ChunkError::ChunkSizeMismatch {
                    expected: self.grid.chunk_size,
                    requested,
                });
            }
            self.preference = options.preference;
        }
        self.split_chunks(surface, region)
    }

    /// Cut every chunk overlapping `region` out of `surface` and stage it at
    /// its global id. A chunk straddling two regions is composited from both.
    pub fn split_chunks(
        &mut self,
        surface: &RgbaImage,
        region: SurfaceRegion,
    ) -> Result<usize, ChunkError> {
        let _span = tracing::info_span!(
            "split_chunks",
            x = region.origin_x,
            y = region.origin_y,
            width = region.width,
            height = region.height
        )
        .entered();
        self.check_region(surface, region)?;

        let ChunkSize {
            width: cw,
            height: ch,
        } = self.grid.chunk_size;
        let region_x_end = region.origin_x + region.width;
        let region_y_end = region.origin_y + region.height;
        let first_column = region.origin_x / cw;
        let last_column = (region_x_end - 1) / cw;
        let first_row = region.origin_y / ch;
        let last_row = (region_y_end - 1) / ch;

        let mut staged = 0;
        for column in first_column..=last_column {
            let chunk_x = column * cw;
            let x0 = chunk_x.max(region.origin_x);
            let x1 = chunk_x.saturating_add(cw).min(region_x_end);
            for row in first_row..=last_row {
                let chunk_y = row * ch;
                let y0 = chunk_y.max(region.origin_y);
                let y1 = chunk_y.saturating_add(ch).min(region_y_end);

                let id = self.grid.id(column, row);
                let mut chunk = self
                    .loading
                    .remove(&id)
                    .or_else(|| self.grid.get(id).cloned())
                    .unwrap_or_else(|| RgbaImage::new(cw, ch));
                let piece = imageops::crop_imm(
                    surface,
                    x0 - region.origin_x,
                    y0 - region.origin_y,
                    x1 - x0,
                    y1 - y0,
                )
                .to_image();
                imageops::replace(
                    &mut chunk,
                    &piece,
                    i64::from(x0 - chunk_x),
                    i64::from(y0 - chunk_y),
                );
                self.loading.insert(id, chunk);
                staged += 1;
            }
        }
        tracing::debug!(staged, loading = self.loading.len(), "chunks staged");
        Ok(staged)
    }

    /// Commit staged chunks to the grid. Returns how many were committed.
    pub fn finish_loading_chunks(&mut self) -> usize {
        let staged = std::mem::take(&mut self.loading);
        let committed = staged.len();
        for (id, chunk) in staged {
            if let Some(slot) = self.grid.chunks.get_mut(id) {
                *slot = Some(chunk);
            }
        }
        tracing::debug!(committed, loaded = self.grid.loaded_count(), "chunks committed");
        committed
    }

    fn check_region(&self, surface: &RgbaImage, region: SurfaceRegion) -> Result<(), ChunkError> {
        region.dimensions().ensure_positive("region")?;
        if region.width > surface.width() || region.height > surface.height() {
            return Err(ChunkError::RegionOutsideSurface {
                region,
                width: surface.width(),
                height: surface.height(),
            });
        }
        let world = self.grid.world;
        let x_end = u64::from(region.origin_x) + u64::from(region.width);
        let y_end = u64::from(region.origin_y) + u64::from(region.height);
        if x_end > u64::from(world.width) || y_end > u64::from(world.height) {
            return Err(ChunkError::RegionOutsideWorld {
                region,
                width: world.width,
                height: world.height,
            });
        }
        Ok(())
    }
}

fn resolve_chunk_size(options: SplitOptions, region: SurfaceRegion) -> Result<ChunkSize, GeometryError> {
    match options.chunk_size {
        ChunkSizeSpec::Fixed(size) => size.ensure_positive("chunk size"),
        ChunkSizeSpec::Calculated => calculate_chunk_size(region.dimensions(), options.preference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn pattern(world: Dimensions) -> RgbaImage {
        RgbaImage::from_fn(world.width, world.height, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    fn fixed(width: u32, height: u32) -> SplitOptions {
        SplitOptions {
            chunk_size: ChunkSizeSpec::Fixed(ChunkSize::new(width, height)),
            preference: ChunkPreference::Big,
        }
    }

    /// Reassemble the grid and compare with `expected`; padding must be
    /// transparent.
    fn assert_stitches_to(grid: &ChunkGrid, expected: &RgbaImage) {
        assert_eq!(grid.loaded_count(), grid.len());
        for (id, chunk) in grid.iter() {
            assert_eq!(chunk.dimensions(), (grid.chunk_size().width, grid.chunk_size().height));
            let (ox, oy) = grid.origin(id);
            for (x, y, pixel) in chunk.enumerate_pixels() {
                let (wx, wy) = (ox + x, oy + y);
                if wx < expected.width() && wy < expected.height() {
                    assert_eq!(pixel, expected.get_pixel(wx, wy), "chunk {id} at ({wx}, {wy})");
                } else {
                    assert_eq!(pixel.0[3], 0, "padding in chunk {id} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn chunk_count_is_ceil_by_ceil() {
        let world = Dimensions::new(10, 7);
        let surface = pattern(world);
        let mut s = ChunkSplitter::new(world, &surface, SurfaceRegion::whole(world), fixed(4, 3)).unwrap();
        assert_eq!(s.grid().columns(), 3);
        assert_eq!(s.grid().rows(), 3);
        assert_eq!(s.loading_count(), 9);
        assert_eq!(s.finish_loading_chunks(), 9);
        assert_eq!(s.grid().loaded_count(), 9);
    }

    #[test]
    fn chunks_are_invisible_until_committed() {
        let world = Dimensions::new(8, 8);
        let surface = pattern(world);
        let mut s = ChunkSplitter::new(world, &surface, SurfaceRegion::whole(world), fixed(4, 4)).unwrap();
        assert_eq!(s.grid().loaded_count(), 0);
        assert!(s.grid().get(0).is_none());
        s.finish_loading_chunks();
        assert!(s.grid().get(0).is_some());
        assert_eq!(s.loading_count(), 0);
    }

    #[test]
    fn single_pass_reconstructs_surface_with_padding() {
        let world = Dimensions::new(10, 7);
        let surface = pattern(world);
        let mut s = ChunkSplitter::new(world, &surface, SurfaceRegion::whole(world), fixed(4, 3)).unwrap();
        s.finish_loading_chunks();
        assert_stitches_to(s.grid(), &surface);
    }

    #[test]
    fn ids_are_column_major() {
        let world = Dimensions::new(10, 7);
        let grid = ChunkGrid::new(world, ChunkSize::new(4, 3)).unwrap();
        assert_eq!(grid.id(0, 2), 2);
        assert_eq!(grid.id(1, 0), 3);
        assert_eq!(grid.cell(7), (2, 1));
        assert_eq!(grid.origin(7), (8, 3));
    }

    #[test]
    fn two_passes_along_x_fill_one_grid() {
        let world = Dimensions::new(10, 7);
        let full = pattern(world);
        // Scratch surface sized for the first, larger pass.
        let mut scratch = RgbaImage::new(6, 7);

        imageops::replace(&mut scratch, &imageops::crop_imm(&full, 0, 0, 6, 7).to_image(), 0, 0);
        let mut s = ChunkSplitter::new(world, &scratch, SurfaceRegion::new(0, 0, 6, 7), fixed(4, 3)).unwrap();
        s.finish_loading_chunks();

        scratch = RgbaImage::new(6, 7);
        imageops::replace(&mut scratch, &imageops::crop_imm(&full, 6, 0, 4, 7).to_image(), 0, 0);
        s.add_chunks(&scratch, SurfaceRegion::new(6, 0, 4, 7), None).unwrap();
        s.finish_loading_chunks();

        assert_stitches_to(s.grid(), &full);
    }

    #[test]
    fn four_quadrants_fill_one_grid() {
        let world = Dimensions::new(9, 9);
        let full = pattern(world);
        let quadrants = [(0, 0, 5, 5), (0, 5, 5, 4), (5, 0, 4, 5), (5, 5, 4, 4)];
        let cut = |(x, y, w, h): (u32, u32, u32, u32)| {
            (imageops::crop_imm(&full, x, y, w, h).to_image(), SurfaceRegion::new(x, y, w, h))
        };

        let (surface, region) = cut(quadrants[0]);
        let mut s = ChunkSplitter::new(world, &surface, region, fixed(3, 3)).unwrap();
        s.finish_loading_chunks();
        for quadrant in &quadrants[1..] {
            let (surface, region) = cut(*quadrant);
            s.add_chunks(&surface, region, None).unwrap();
            s.finish_loading_chunks();
        }
        assert_stitches_to(s.grid(), &full);
    }

    #[test]
    fn calculated_size_uses_region_dimensions() {
        let world = Dimensions::new(100, 80);
        let surface = pattern(world);
        let s = ChunkSplitter::new(world, &surface, SurfaceRegion::whole(world), SplitOptions::default()).unwrap();
        assert_eq!(s.chunk_size(), ChunkSize::new(25, 20));
        assert_eq!(s.grid().len(), 16);
    }

    #[test]
    fn mismatched_chunk_size_is_rejected() {
        let world = Dimensions::new(8, 8);
        let surface = pattern(world);
        let mut s = ChunkSplitter::new(world, &surface, SurfaceRegion::whole(world), fixed(4, 4)).unwrap();
        let err = s
            .add_chunks(&surface, SurfaceRegion::whole(world), Some(fixed(2, 2)))
            .unwrap_err();
        assert!(matches!(err, ChunkError::ChunkSizeMismatch { .. }));
        assert!(s.add_chunks(&surface, SurfaceRegion::whole(world), Some(fixed(4, 4))).is_ok());
    }

    #[test]
    fn region_must_fit_surface_and_world() {
        let world = Dimensions::new(8, 8);
        let surface = pattern(Dimensions::new(4, 4));
        let err = ChunkSplitter::new(world, &surface, SurfaceRegion::whole(world), fixed(4, 4)).unwrap_err();
        assert!(matches!(err, ChunkError::RegionOutsideSurface { .. }));

        let mut s = ChunkSplitter::new(world, &surface, SurfaceRegion::new(0, 0, 4, 4), fixed(4, 4)).unwrap();
        let err = s.add_chunks(&surface, SurfaceRegion::new(6, 0, 4, 4), None).unwrap_err();
        assert!(matches!(err, ChunkError::RegionOutsideWorld { .. }));
    }
}
