//! Active series and their colors.

use std::collections::HashMap;

use log::{debug, warn};

use crate::render::Color;

/// Per-series bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesMeta {
    color: Color,
    count: usize,
}

impl SeriesMeta {
    /// Color assigned when the series appeared.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Number of buffered samples that contain the series.
    pub fn reference_count(&self) -> usize {
        self.count
    }
}

/// Registry of active series keys.
///
/// A key is present exactly while at least one buffered sample references
/// it. Colors come from the palette in first-seen order and wrap around; a
/// key that leaves and comes back is colored as a new key.
#[derive(Debug, Clone)]
pub struct SeriesRegistry {
    palette: Vec<Color>,
    next_color: usize,
    order: Vec<String>,
    meta: HashMap<String, SeriesMeta>,
}

impl SeriesRegistry {
    /// Create an empty registry drawing from `palette`.
    pub fn new(palette: Vec<Color>) -> Self {
        Self {
            palette,
            next_color: 0,
            order: Vec::new(),
            meta: HashMap::new(),
        }
    }

    /// Add one reference to `key`, registering it if new.
    pub fn acquire(&mut self, key: &str) {
        if let Some(meta) = self.meta.get_mut(key) {
            meta.count += 1;
            return;
        }
        let color = self
            .palette
            .get(self.next_color)
            .copied()
            .unwrap_or(Color::BLACK);
        if !self.palette.is_empty() {
            self.next_color = (self.next_color + 1) % self.palette.len();
        }
        debug!("series `{key}` registered with color {color}");
        self.order.push(key.to_string());
        self.meta.insert(key.to_string(), SeriesMeta { color, count: 1 });
    }

    /// Drop one reference to `key`, removing it when none are left.
    ///
    /// Returns true when the key was removed.
    pub fn release(&mut self, key: &str) -> bool {
        let Some(meta) = self.meta.get_mut(key) else {
            warn!("release of unknown series `{key}`");
            return false;
        };
        meta.count -= 1;
        if meta.count > 0 {
            return false;
        }
        self.meta.remove(key);
        self.order.retain(|existing| existing != key);
        debug!("series `{key}` left the window");
        true
    }

    /// Forget every series and restart the color cycle.
    pub fn clear(&mut self) {
        self.order.clear();
        self.meta.clear();
        self.next_color = 0;
    }

    /// Replace the palette used for series registered from now on.
    pub fn set_palette(&mut self, palette: Vec<Color>) {
        self.palette = palette;
        self.next_color = 0;
    }

    /// Metadata for an active key.
    pub fn get(&self, key: &str) -> Option<&SeriesMeta> {
        self.meta.get(key)
    }

    /// Check whether a key is active.
    pub fn contains(&self, key: &str) -> bool {
        self.meta.contains_key(key)
    }

    /// Active keys in registration order.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// Active keys with their metadata, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SeriesMeta)> {
        self.order
            .iter()
            .filter_map(|key| self.meta.get(key).map(|meta| (key.as_str(), meta)))
    }

    /// Number of active series.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether no series is active.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
