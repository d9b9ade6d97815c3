//! Bitmap loading for picture graphics.

use crate::error::RenderError;
use slint::{Rgba8Pixel, SharedPixelBuffer};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

type Loaded = Result<SharedPixelBuffer<Rgba8Pixel>, String>;

/// Decoded bitmaps keyed by the file name as written in the pool.
///
/// Failures are cached as well, so a missing file costs one lookup per
/// cache lifetime rather than one per frame.
#[derive(Default)]
pub struct PictureCache {
    entries: RefCell<HashMap<String, Loaded>>,
}

impl PictureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `file`, trying it as given and then relative to each of
    /// `search_paths` in order.
    pub fn load<'p, I>(&self, file: &str, search_paths: I) -> Result<SharedPixelBuffer<Rgba8Pixel>, RenderError>
    where
        I: IntoIterator<Item = &'p str>,
    {
        if let Some(cached) = self.entries.borrow().get(file) {
            return cached.clone().map_err(|reason| RenderError::Resource {
                path: file.to_owned(),
                reason,
            });
        }
        let loaded = Self::decode(file, search_paths);
        self.entries.borrow_mut().insert(file.to_owned(), loaded.clone());
        loaded.map_err(|reason| RenderError::Resource {
            path: file.to_owned(),
            reason,
        })
    }

    /// Pixel size of `file`, or `None` when it cannot be loaded.
    pub fn dimensions<'p, I>(&self, file: &str, search_paths: I) -> Option<(u32, u32)>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let buffer = self.load(file, search_paths).ok()?;
        (buffer.width() > 0 && buffer.height() > 0).then(|| (buffer.width(), buffer.height()))
    }

    fn candidates<'p, I>(file: &str, search_paths: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let mut out = vec![PathBuf::from(file)];
        if Path::new(file).is_relative() {
            out.extend(
                search_paths
                    .into_iter()
                    .filter(|dir| !dir.is_empty())
                    .map(|dir| Path::new(dir).join(file)),
            );
        }
        out
    }

    fn decode<'p, I>(file: &str, search_paths: I) -> Loaded
    where
        I: IntoIterator<Item = &'p str>,
    {
        let Some(path) = Self::candidates(file, search_paths).into_iter().find(|p| p.is_file()) else {
            return Err("file not found".to_owned());
        };
        debug!(path = %path.display(), "loading bitmap");
        let image = image::open(&path).map_err(|e| e.to_string())?.into_rgba8();
        Ok(SharedPixelBuffer::clone_from_slice(
            image.as_raw(),
            image.width(),
            image.height(),
        ))
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget everything, e.g. after the bitmap paths changed.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
