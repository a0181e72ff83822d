use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use image::{RgbaImage, imageops};
use mapedit_common::{ImageDrawerConfig, Vector2D};
use serde::Deserialize;

use crate::resolver::{ResourceResolver, load_json};

/// Errors from loading or drawing an image.
///
/// `Clone` because one pending load is shared between every waiter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageError {
    #[error("image `{key}` not found: {reason}")]
    NotFound { key: String, reason: String },
    #[error("image `{key}` could not be decoded: {reason}")]
    Decode { key: String, reason: String },
}

/// A load that may still be in flight. Clones resolve to the same image.
pub type PendingImage = Shared<LocalBoxFuture<'static, Result<Rc<RgbaImage>, ImageError>>>;

/// Where to put an image on the target surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Top-left corner at this surface position.
    At(Vector2D),
    /// Centred on the surface origin.
    Centered,
}

#[derive(Debug, Clone, Default)]
pub struct LoadImageOptions {
    /// Extra names the image can be drawn by.
    pub aliases: Vec<String>,
    /// Also fetch `<img_meta_dir>/<path>.meta.json` for more aliases.
    pub load_meta: bool,
    pub img_dir: Option<String>,
    pub img_meta_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageMeta {
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Default)]
struct ImageCache {
    /// Keyed by resource path, so one file name under two directories
    /// stays two images.
    images: HashMap<String, Rc<RgbaImage>>,
    /// alias -> resource path
    aliases: HashMap<String, String>,
    pending: HashMap<String, PendingImage>,
}

/// Loads images through a resolver, caches them by path and draws them onto
/// RGBA surfaces.
#[derive(Clone)]
pub struct ImageDrawer {
    config: ImageDrawerConfig,
    resolver: Rc<dyn ResourceResolver>,
    cache: Rc<RefCell<ImageCache>>,
}

impl std::fmt::Debug for ImageDrawer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("ImageDrawer")
            .field("config", &self.config)
            .field("images", &cache.images.len())
            .field("aliases", &cache.aliases.len())
            .field("pending", &cache.pending.len())
            .finish()
    }
}

impl ImageDrawer {
    pub fn new(config: ImageDrawerConfig, resolver: Rc<dyn ResourceResolver>) -> Self {
        Self {
            config,
            resolver,
            cache: Rc::new(RefCell::new(ImageCache::default())),
        }
    }

    pub fn config(&self) -> &ImageDrawerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Rc<dyn ResourceResolver> {
        &self.resolver
    }

    /// Images decoded and cached so far.
    pub fn image_count(&self) -> usize {
        self.cache.borrow().images.len()
    }

    /// Loads started but not yet settled.
    pub fn pending_count(&self) -> usize {
        self.cache.borrow().pending.len()
    }

    /// Resource path for a path or alias. An alias maps to the file its
    /// image was loaded from; anything else is taken relative to the default
    /// image directory.
    pub fn resolve(&self, key: &str) -> String {
        let cache = self.cache.borrow();
        match cache.aliases.get(key) {
            Some(path) => path.clone(),
            None => format!("{}/{key}", self.config.img_dir),
        }
    }

    /// The cached image for a path or alias, if loaded.
    pub fn cached(&self, key: &str) -> Option<Rc<RgbaImage>> {
        let path = self.resolve(key);
        self.cache.borrow().images.get(&path).cloned()
    }

    /// Start (or join) loading the image at `path`, relative to the image
    /// directory. The returned future does nothing until polled.
    pub fn load_image(&self, path: &str, options: LoadImageOptions) -> PendingImage {
        let img_dir = options.img_dir.as_deref().unwrap_or(&self.config.img_dir);
        let img_path = format!("{img_dir}/{path}");

        let mut cache = self.cache.borrow_mut();
        if let Some(image) = cache.images.get(&img_path) {
            return futures::future::ready(Ok(Rc::clone(image)))
                .boxed_local()
                .shared();
        }
        if let Some(pending) = cache.pending.get(&img_path) {
            return pending.clone();
        }

        let meta_dir = options
            .img_meta_dir
            .as_deref()
            .unwrap_or(&self.config.img_meta_dir);
        let meta_path = options
            .load_meta
            .then(|| format!("{meta_dir}/{path}.meta.json"));

        let resolver = Rc::clone(&self.resolver);
        let weak = Rc::downgrade(&self.cache);
        let key = path.to_owned();
        let cache_key = img_path.clone();
        let mut aliases = options.aliases;

        let load = async move {
            let result = fetch(resolver.as_ref(), &key, &img_path, meta_path.as_deref()).await;
            let result = result.map(|(image, meta_aliases)| {
                aliases.extend(meta_aliases);
                (Rc::new(image), aliases)
            });
            settle(&weak, &img_path, &result);
            result.map(|(image, _)| image)
        }
        .boxed_local()
        .shared();

        tracing::debug!(path = %cache_key, "image load started");
        cache.pending.insert(cache_key, load.clone());
        load
    }

    /// Draw by path or alias, loading the image first if needed.
    pub async fn draw_image(
        &self,
        key: &str,
        placement: Placement,
        target: &mut RgbaImage,
    ) -> Result<(), ImageError> {
        let image = match self.cached(key) {
            Some(image) => image,
            None => {
                self.load_image(key, LoadImageOptions::default())
                    .await
                    .map_err(|err| match err {
                        ImageError::NotFound { .. } => err,
                        other => ImageError::NotFound {
                            key: key.to_owned(),
                            reason: other.to_string(),
                        },
                    })?
            }
        };
        blit(&image, placement, target);
        Ok(())
    }

    /// Draw only if the image is already cached. Returns whether it drew.
    pub fn draw_cached(&self, key: &str, placement: Placement, target: &mut RgbaImage) -> bool {
        let Some(image) = self.cached(key) else {
            return false;
        };
        blit(&image, placement, target);
        true
    }
}

async fn fetch(
    resolver: &dyn ResourceResolver,
    key: &str,
    img_path: &str,
    meta_path: Option<&str>,
) -> Result<(RgbaImage, Vec<String>), ImageError> {
    let bytes = resolver
        .load(img_path)
        .await
        .map_err(|err| ImageError::NotFound {
            key: key.to_owned(),
            reason: err.to_string(),
        })?;
    let decoded = image::load_from_memory(&bytes).map_err(|err| ImageError::Decode {
        key: key.to_owned(),
        reason: err.to_string(),
    })?;

    let mut aliases = Vec::new();
    if let Some(meta_path) = meta_path {
        match load_json::<ImageMeta>(resolver, meta_path).await {
            Ok(meta) => aliases = meta.aliases,
            Err(err) => tracing::warn!(image = key, %err, "failed to load image metadata"),
        }
    }
    Ok((decoded.to_rgba8(), aliases))
}

/// Record a finished load, unless the drawer has been dropped meanwhile.
fn settle(
    cache: &Weak<RefCell<ImageCache>>,
    key: &str,
    result: &Result<(Rc<RgbaImage>, Vec<String>), ImageError>,
) {
    let Some(cache) = cache.upgrade() else {
        tracing::debug!(path = key, "image load finished after drawer was dropped");
        return;
    };
    let mut cache = cache.borrow_mut();
    cache.pending.remove(key);
    match result {
        Ok((image, aliases)) => {
            cache.images.insert(key.to_owned(), Rc::clone(image));
            for alias in aliases {
                cache.aliases.insert(alias.clone(), key.to_owned());
            }
            tracing::debug!(path = key, aliases = aliases.len(), "image cached");
        }
        Err(err) => tracing::warn!(path = key, %err, "image load failed"),
    }
}

fn blit(image: &RgbaImage, placement: Placement, target: &mut RgbaImage) {
    let origin = match placement {
        Placement::At(position) => position,
        Placement::Centered => Vector2D::new(
            -f64::from(image.width()) / 2.0,
            -f64::from(image.height()) / 2.0,
        ),
    };
    imageops::overlay(target, image, origin.x.floor() as i64, origin.y.floor() as i64);
}
