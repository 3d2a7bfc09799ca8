use crossbeam::channel::{unbounded, Receiver, Sender};
use seqalign_common::FontConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

/// Monospaced font metrics used to convert a surface width into characters
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    pub family: String,
    pub size: f32,
    /// Glyph advance as a fraction of `size`
    pub advance_ratio: f32,
}

impl FontMetrics {
    pub fn from_config(font: &FontConfig) -> Self {
        Self {
            family: font.family.clone(),
            size: font.size,
            advance_ratio: font.advance_ratio,
        }
    }

    /// One character per terminal column
    pub fn terminal_cell() -> Self {
        Self {
            family: "terminal".to_string(),
            size: 1.0,
            advance_ratio: 1.0,
        }
    }

    /// Horizontal space taken by one character
    pub fn advance(&self) -> f32 {
        self.size * self.advance_ratio
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::from_config(&FontConfig::default())
    }
}

/// Measured size of the rendering surface, in the unit of the font advance
/// (pixels for a graphical surface, columns for a terminal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_cells(columns: u16, rows: u16) -> Self {
        Self::new(f32::from(columns), f32::from(rows))
    }
}

/// How many characters fit across the surface. Falls back to `fallback`
/// while the surface is unmeasured or the measurement is unusable.
pub fn measure_chunk_width(
    surface: Option<SurfaceSize>,
    metrics: &FontMetrics,
    fallback: usize,
) -> usize {
    let fallback = fallback.max(1);
    let advance = metrics.advance();
    match surface {
        Some(size)
            if size.width.is_finite()
                && size.width > 0.0
                && advance.is_finite()
                && advance > 0.0 =>
        {
            let fitting = (size.width / advance).floor();
            if fitting >= 1.0 {
                fitting as usize
            } else {
                1
            }
        }
        _ => fallback,
    }
}

type Registry = Mutex<HashMap<u64, Sender<SurfaceSize>>>;

/// Source of surface resize notifications. Subscribers receive every size
/// published after they subscribe, plus the most recent one at subscription.
pub struct LayoutBus {
    registry: Arc<Registry>,
    next_id: AtomicU64,
    last: Mutex<Option<SurfaceSize>>,
}

impl LayoutBus {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            last: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> LayoutSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = unbounded();

        if let Some(size) = self.last_size() {
            let _ = sender.send(size);
        }
        if let Ok(mut registry) = self.registry.lock() {
            registry.insert(id, sender);
        }
        debug!(id, "Layout subscriber registered");

        LayoutSubscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Broadcast a new surface size; returns the number of subscribers reached
    pub fn publish(&self, size: SurfaceSize) -> usize {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(size);
        }

        let Ok(mut registry) = self.registry.lock() else {
            return 0;
        };
        registry.retain(|_, sender| sender.send(size).is_ok());
        registry.len()
    }

    pub fn last_size(&self) -> Option<SurfaceSize> {
        self.last.lock().ok().and_then(|last| *last)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().map(|registry| registry.len()).unwrap_or(0)
    }
}

impl Default for LayoutBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Live registration on a [`LayoutBus`]; unregisters itself when dropped
pub struct LayoutSubscription {
    id: u64,
    receiver: Receiver<SurfaceSize>,
    registry: Weak<Registry>,
}

impl LayoutSubscription {
    /// Drain pending notifications and return the newest one
    pub fn latest(&self) -> Option<SurfaceSize> {
        self.receiver.try_iter().last()
    }

    pub fn disconnect(self) {
        drop(self);
    }
}

impl Drop for LayoutSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.lock() {
                registry.remove(&self.id);
            }
        }
        debug!(id = self.id, "Layout subscriber released");
    }
}
