use std::rc::Rc;

use image::{Rgba, RgbaImage};
use mapedit_assets::{ImageDrawer, ResourceError, ResourceResolver, TileMetadata, load_json};
use mapedit_common::{Bounds, Dimensions, EngineConfig, GeometryError, MapConfig, Timestamp, Vector2D};
use mapedit_input::{InputManager, InputState, KeyBindings, RawInputEvent};
use mapedit_kernel::{Player, Positioned};
use mapedit_render::{MapDrawError, MapDrawer, Viewport, clear_surface};

/// Lifecycle of an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    NotStarted,
    /// Started; the next frame sets the timing baseline.
    Starting,
    Running,
    Suspended,
    HadError,
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("invalid editor geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("failed to load editor resources: {0}")]
    Resource(#[from] ResourceError),
    #[error("map load failed: {0}")]
    Load(#[from] MapDrawError),
    #[error("map is not loaded")]
    NotLoaded,
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: EditorState,
    },
}

/// What one call to [`Editor::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Milliseconds integrated this frame.
    pub delta_time: f64,
    pub chunks_drawn: usize,
}

/// One editing session over a single map.
#[derive(Debug)]
pub struct Editor {
    input: InputManager,
    player: Player,
    viewport: Viewport,
    map_drawer: MapDrawer,
    viewport_dimensions: Dimensions,
    state: EditorState,
    last_update_time: Timestamp,
    reset_baseline: bool,
}

impl Editor {
    /// Build an editor without loading the map. The player spawns at the
    /// world centre.
    pub fn new(
        map: MapConfig,
        key_bindings: KeyBindings,
        tiles: TileMetadata,
        resolver: Rc<dyn ResourceResolver>,
        viewport_dimensions: Dimensions,
        config: EngineConfig,
    ) -> Result<Self, EditorError> {
        let world = map.world_dimensions()?;
        let viewport_dimensions = viewport_dimensions.ensure_positive("viewport")?;
        let bounds = Bounds::world(world);
        let centre = Vector2D::new(f64::from(world.width) / 2.0, f64::from(world.height) / 2.0);
        let player = Player::new(centre, config.player_speed, bounds, 0.0);
        let viewport = Viewport::new(viewport_dimensions, bounds, config.viewport_stickiness);
        let images = ImageDrawer::new(config.images.clone(), resolver);
        let map_drawer = MapDrawer::new(map, tiles, images, config);

        Ok(Self {
            input: InputManager::new(key_bindings),
            player,
            viewport,
            map_drawer,
            viewport_dimensions,
            state: EditorState::NotStarted,
            last_update_time: 0.0,
            reset_baseline: true,
        })
    }

    /// Fetch the tile metadata through `resolver`, build the editor and load
    /// its map.
    pub async fn create(
        map: MapConfig,
        key_bindings: KeyBindings,
        resolver: Rc<dyn ResourceResolver>,
        viewport_dimensions: Dimensions,
        config: EngineConfig,
    ) -> Result<Self, EditorError> {
        let tiles: TileMetadata = load_json(resolver.as_ref(), &config.tiles_meta_file).await?;
        let mut editor = Self::new(
            map,
            key_bindings,
            tiles,
            resolver,
            viewport_dimensions,
            config,
        )?;
        editor.load().await?;
        Ok(editor)
    }

    /// Pre-render the map. On failure the editor enters `HadError` and may
    /// be loaded again.
    pub async fn load(&mut self) -> Result<(), EditorError> {
        if !matches!(self.state, EditorState::NotStarted | EditorState::HadError) {
            return Err(self.invalid("load"));
        }
        match self.map_drawer.init().await {
            Ok(()) => {
                self.viewport.center_on(&self.player);
                self.set_state(EditorState::NotStarted);
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "editor load failed");
                self.set_state(EditorState::HadError);
                Err(err.into())
            }
        }
    }

    /// Begin driving frames. Requires a loaded map.
    pub fn start(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::NotStarted if self.map_drawer.is_ready() => {}
            EditorState::NotStarted => return Err(EditorError::NotLoaded),
            _ => return Err(self.invalid("start")),
        }
        self.attach_input();
        self.reset_baseline = true;
        self.set_state(EditorState::Starting);
        Ok(())
    }

    /// Stop driving frames. The loaded map is kept, so `start` may follow.
    pub fn stop(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::HadError => Err(self.invalid("stop")),
            EditorState::NotStarted => Ok(()),
            _ => {
                self.set_state(EditorState::NotStarted);
                Ok(())
            }
        }
    }

    /// Stop integrating time and release input to whatever overlays the
    /// editor.
    pub fn pause(&mut self) -> Result<(), EditorError> {
        if !matches!(self.state, EditorState::Starting | EditorState::Running) {
            return Err(self.invalid("pause"));
        }
        self.input.stop_tracking();
        self.set_state(EditorState::Suspended);
        Ok(())
    }

    /// Resume after [`Editor::pause`]. The paused interval is not integrated.
    pub fn unpause(&mut self) -> Result<(), EditorError> {
        if self.state != EditorState::Suspended {
            return Err(self.invalid("unpause"));
        }
        self.attach_input();
        self.reset_baseline = true;
        self.set_state(EditorState::Running);
        Ok(())
    }

    /// Feed a host input event. A resulting direction change takes effect on
    /// the player immediately.
    pub fn handle_input(&mut self, event: RawInputEvent) -> Option<InputState> {
        let state = self.input.handle_event(event)?;
        self.player.update_on_input(&state.direction);
        Some(state)
    }

    /// Advance one frame to `now` and draw it onto `frame`.
    pub fn update(&mut self, now: Timestamp, frame: &mut RgbaImage) -> FrameReport {
        if !matches!(self.state, EditorState::Starting | EditorState::Running) {
            return FrameReport::default();
        }
        if self.reset_baseline {
            self.reset_baseline = false;
            self.last_update_time = now;
            self.player.reset_clock(now);
            if self.state == EditorState::Starting {
                self.set_state(EditorState::Running);
            }
        }
        let delta_time = (now - self.last_update_time).max(0.0);
        self.last_update_time = now;

        self.player.update(now);
        self.viewport.update_tracking_position(&self.player);
        self.viewport.update(delta_time);

        clear_surface(frame, Rgba([0, 0, 0, 0]));
        let chunks_drawn = self.map_drawer.draw_tiles(
            self.player.position(),
            self.viewport_dimensions,
            &self.viewport,
            frame,
        );
        FrameReport {
            delta_time,
            chunks_drawn,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_dimensions(&self) -> Dimensions {
        self.viewport_dimensions
    }

    /// The map drawer, for inspecting the chunk grid and image cache.
    pub fn map_drawer(&self) -> &MapDrawer {
        &self.map_drawer
    }

    fn attach_input(&mut self) {
        if let Some(state) = self.input.start_tracking() {
            self.player.update_on_input(&state.direction);
        }
    }

    fn set_state(&mut self, state: EditorState) {
        if self.state != state {
            tracing::info!(from = ?self.state, to = ?state, "editor state");
            self.state = state;
        }
    }

    fn invalid(&self, action: &'static str) -> EditorError {
        EditorError::InvalidTransition {
            action,
            state: self.state,
        }
    }
}
