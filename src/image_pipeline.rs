use iced::widget::image::Handle;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

const PLACEHOLDER_SIZE: u32 = 400;
const PLACEHOLDER_BACKGROUND: [u8; 3] = [0xF3, 0xF4, 0xF6];
const PLACEHOLDER_MARK: [u8; 3] = [0x9C, 0xA3, 0xAF];

static PLACEHOLDER: LazyLock<Handle> = LazyLock::new(|| {
    Handle::from_rgba(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        placeholder_pixels(PLACEHOLDER_SIZE),
    )
});

// Failed loads are stored as the placeholder so each failure is logged once.
#[derive(Debug, Default)]
pub struct SliceCache {
    images: HashMap<String, Handle>,
    in_flight: HashSet<String>,
    failed: HashSet<String>,
}

impl SliceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as requested. Returns `false` if it is already cached or
    /// in flight, in which case no fetch should be issued.
    pub fn request(&mut self, path: &str) -> bool {
        if self.images.contains_key(path) || self.in_flight.contains(path) {
            return false;
        }
        self.in_flight.insert(path.to_string());
        true
    }

    pub fn complete(&mut self, path: String, result: Result<Vec<u8>, String>) {
        self.in_flight.remove(&path);
        let handle = match result {
            Ok(bytes) => {
                self.failed.remove(&path);
                Handle::from_bytes(bytes)
            }
            Err(err) => {
                log::error!("Failed to load image {path}: {err}");
                self.failed.insert(path.clone());
                placeholder()
            }
        };
        self.images.insert(path, handle);
    }

    pub fn get(&self, path: &str) -> Option<&Handle> {
        self.images.get(path)
    }

    pub fn is_loading(&self, path: &str) -> bool {
        self.in_flight.contains(path)
    }

    pub fn is_placeholder(&self, path: &str) -> bool {
        self.failed.contains(path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Light grey square with a diagonal cross. Every call shares one buffer.
pub fn placeholder() -> Handle {
    PLACEHOLDER.clone()
}

fn placeholder_pixels(size: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on_diagonal = x.abs_diff(y) <= 1 || (x + y).abs_diff(size - 1) <= 1;
            let [r, g, b] = if on_diagonal {
                PLACEHOLDER_MARK
            } else {
                PLACEHOLDER_BACKGROUND
            };
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }
    rgba
}
