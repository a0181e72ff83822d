use std::cell::Cell;

use image::{Rgba, RgbaImage, imageops};
use mapedit_assets::{ImageDrawer, ImageError, Placement, TileMetadata};
use mapedit_common::{Dimensions, EngineConfig, GeometryError, MapConfig, Vector2D};
use mapedit_stream::{ChunkError, ChunkSizeSpec, ChunkSplitter, SplitOptions, SurfaceRegion};
use tracing::Instrument;

use crate::surface::clear_surface;
use crate::viewport::Viewport;

/// Errors that abort a map pre-render. Every variant leaves the drawer
/// uninitialized, so `init` may be retried.
#[derive(Debug, thiserror::Error)]
pub enum MapDrawError {
    #[error("invalid map geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("map initialization failed: no tile image for tile type `{0}`")]
    UnknownTileType(String),
    #[error("map initialization failed: {0}")]
    Image(#[from] ImageError),
    #[error("map initialization failed: {0}")]
    Chunk(#[from] ChunkError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapDrawerState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Pre-renders the map's background tiles into a chunk grid once, then
/// composites the visible chunks every frame.
#[derive(Debug)]
pub struct MapDrawer {
    map: MapConfig,
    tiles: TileMetadata,
    images: ImageDrawer,
    config: EngineConfig,
    state: Cell<MapDrawerState>,
    splitter: Option<ChunkSplitter>,
}

impl MapDrawer {
    pub fn new(
        map: MapConfig,
        tiles: TileMetadata,
        images: ImageDrawer,
        config: EngineConfig,
    ) -> Self {
        Self {
            map,
            tiles,
            images,
            config,
            state: Cell::new(MapDrawerState::Uninitialized),
            splitter: None,
        }
    }

    pub fn state(&self) -> MapDrawerState {
        self.state.get()
    }

    pub fn is_ready(&self) -> bool {
        self.state.get() == MapDrawerState::Ready
    }

    pub fn map(&self) -> &MapConfig {
        &self.map
    }

    pub fn images(&self) -> &ImageDrawer {
        &self.images
    }

    /// The committed chunk grid, once ready.
    pub fn splitter(&self) -> Option<&ChunkSplitter> {
        self.splitter.as_ref().filter(|_| self.is_ready())
    }

    /// Render the whole world into chunks. A no-op once ready; on failure the
    /// drawer returns to uninitialized.
    pub async fn init(&mut self) -> Result<(), MapDrawError> {
        if self.is_ready() {
            return Ok(());
        }
        self.splitter = None;
        self.state.set(MapDrawerState::Initializing);
        let guard = InitGuard(&self.state);
        let span = tracing::info_span!("map_init", tile_type = %self.map.tile_type);
        let rendered = self.render_world().instrument(span).await;
        std::mem::forget(guard);
        match rendered {
            Ok(splitter) => {
                tracing::info!(
                    chunks = splitter.grid().len(),
                    chunk_width = splitter.chunk_size().width,
                    chunk_height = splitter.chunk_size().height,
                    "map ready"
                );
                self.splitter = Some(splitter);
                self.state.set(MapDrawerState::Ready);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "map initialization failed");
                self.state.set(MapDrawerState::Uninitialized);
                Err(err)
            }
        }
    }

    async fn render_world(&self) -> Result<ChunkSplitter, MapDrawError> {
        let world = self.map.world_dimensions()?;
        let tile_size = self.config.tile_size;
        if tile_size == 0 {
            return Err(GeometryError::NonPositive {
                what: "tile size",
                value: 0.0,
            }
            .into());
        }
        let tile_path = self
            .tiles
            .path_for(&self.map.tile_type)
            .ok_or_else(|| MapDrawError::UnknownTileType(self.map.tile_type.clone()))?
            .to_owned();

        let passes = plan_passes(world, self.config.max_surface_dimension)?;
        let Some((first, rest)) = passes.split_first() else {
            return Err(GeometryError::NonPositive {
                what: "world",
                value: 0.0,
            }
            .into());
        };

        let mut scratch = RgbaImage::new(first.width, first.height);
        let drawn = self.draw_pass(&tile_path, tile_size, *first, &mut scratch).await?;
        let options = SplitOptions {
            chunk_size: ChunkSizeSpec::Calculated,
            preference: self.config.chunk_preference,
        };
        let mut splitter = ChunkSplitter::new(world, &scratch, *first, options)?;
        splitter.finish_loading_chunks();
        tracing::debug!(pass = 0, tiles = drawn, "pass rendered");

        for (index, region) in rest.iter().enumerate() {
            clear_surface(&mut scratch, Rgba([0, 0, 0, 0]));
            let drawn = self.draw_pass(&tile_path, tile_size, *region, &mut scratch).await?;
            splitter.add_chunks(&scratch, *region, None)?;
            splitter.finish_loading_chunks();
            tracing::debug!(pass = index + 1, tiles = drawn, "pass rendered");
        }
        Ok(splitter)
    }

    /// Draw every tile overlapping `region` onto `surface`. Tiles stay on the
    /// world tile grid whatever the region origin.
    async fn draw_pass(
        &self,
        tile_path: &str,
        tile_size: u32,
        region: SurfaceRegion,
        surface: &mut RgbaImage,
    ) -> Result<usize, ImageError> {
        let step = tile_size as usize;
        let x_end = region.origin_x + region.width;
        let y_end = region.origin_y + region.height;
        let x_start = region.origin_x / tile_size * tile_size;
        let y_start = region.origin_y / tile_size * tile_size;

        let mut drawn = 0;
        for x in (x_start..x_end).step_by(step) {
            for y in (y_start..y_end).step_by(step) {
                let at = Vector2D::new(
                    f64::from(x) - f64::from(region.origin_x),
                    f64::from(y) - f64::from(region.origin_y),
                );
                self.images
                    .draw_image(tile_path, Placement::At(at), surface)
                    .await?;
                drawn += 1;
            }
        }
        Ok(drawn)
    }

    /// Composite the chunks around `tracked` onto `frame`.
    ///
    /// Two rectangles count as visible, each padded by two chunks on every
    /// side: half the viewport around `tracked`, and the area the camera
    /// currently shows, which trails `tracked` while easing. A chunk is drawn
    /// when its origin lies inside either. Returns the number of chunks
    /// drawn, zero before the drawer is ready.
    pub fn draw_tiles(
        &self,
        tracked: Vector2D,
        viewport_dimensions: Dimensions,
        viewport: &Viewport,
        frame: &mut RgbaImage,
    ) -> usize {
        let Some(splitter) = self.splitter() else {
            return 0;
        };
        let grid = splitter.grid();
        let size = grid.chunk_size();
        let (chunk_w, chunk_h) = (f64::from(size.width), f64::from(size.height));
        let view = Vector2D::new(
            f64::from(viewport_dimensions.width),
            f64::from(viewport_dimensions.height),
        );
        let chunk_margin = Vector2D::new(chunk_w * 2.0, chunk_h * 2.0);
        let around_tracked = CanvasRect::new(
            viewport.to_canvas(tracked - view / 2.0 - chunk_margin),
            viewport.to_canvas(tracked + view / 2.0 + chunk_margin),
        );
        let on_screen = CanvasRect::new(-chunk_margin, view + chunk_margin);
        let start = viewport.to_canvas(Vector2D::ZERO).floor();

        let mut drawn = 0;
        let mut chunk_id = 0;
        for column in 0..grid.columns() {
            let x = start.x + f64::from(column) * chunk_w;
            for row in 0..grid.rows() {
                let id = chunk_id;
                chunk_id += 1;
                let Some(chunk) = grid.get(id) else {
                    continue;
                };
                let y = start.y + f64::from(row) * chunk_h;
                if around_tracked.contains(x, y) || on_screen.contains(x, y) {
                    imageops::overlay(frame, chunk, x as i64, y as i64);
                    drawn += 1;
                }
            }
        }
        tracing::trace!(drawn, "chunks drawn");
        drawn
    }
}

/// Puts the drawer back to uninitialized if an `init` future is dropped
/// before the pre-render finishes.
struct InitGuard<'a>(&'a Cell<MapDrawerState>);

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        tracing::debug!("map initialization abandoned");
        self.0.set(MapDrawerState::Uninitialized);
    }
}

/// Inclusive rectangle in surface coordinates, with floored corners.
#[derive(Debug, Clone, Copy)]
struct CanvasRect {
    start: Vector2D,
    end: Vector2D,
}

impl CanvasRect {
    fn new(start: Vector2D, end: Vector2D) -> Self {
        Self {
            start: start.floor(),
            end: end.floor(),
        }
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        self.start.x <= x && x <= self.end.x && self.start.y <= y && y <= self.end.y
    }
}

/// Surface regions for the pre-render, column-major. A side longer than
/// `ceiling` is split into `ceil(side / 2)` and the remainder.
pub fn plan_passes(world: Dimensions, ceiling: u32) -> Result<Vec<SurfaceRegion>, GeometryError> {
    let world = world.ensure_positive("world")?;
    if ceiling == 0 {
        return Err(GeometryError::NonPositive {
            what: "surface ceiling",
            value: 0.0,
        });
    }
    let too_large = || GeometryError::TooLarge {
        width: world.width,
        height: world.height,
        ceiling,
    };
    let columns = split_axis(world.width, ceiling).ok_or_else(too_large)?;
    let rows = split_axis(world.height, ceiling).ok_or_else(too_large)?;

    let mut passes = Vec::with_capacity(columns.len() * rows.len());
    for &(x, width) in &columns {
        for &(y, height) in &rows {
            passes.push(SurfaceRegion::new(x, y, width, height));
        }
    }
    tracing::debug!(
        passes = passes.len(),
        world_width = world.width,
        world_height = world.height,
        "pre-render planned"
    );
    Ok(passes)
}

fn split_axis(side: u32, ceiling: u32) -> Option<Vec<(u32, u32)>> {
    if side <= ceiling {
        return Some(vec![(0, side)]);
    }
    let first = side.div_ceil(2);
    if first > ceiling {
        return None;
    }
    Some(vec![(0, first), (first, side - first)])
}
