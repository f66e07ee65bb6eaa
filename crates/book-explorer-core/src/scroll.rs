//! Viewport scroll tracking and the "near the bottom" trigger.
//!
//! A [`Viewport`] holds the current [`ScrollPosition`] and notifies every
//! registered observer whenever the position changes. [`BottomProximity`]
//! is the trigger condition used to request the next page.

/// Default distance from the bottom, in terminal rows, that counts as "near".
pub const DEFAULT_SCROLL_THRESHOLD: usize = 5;

/// Snapshot of the viewport against the rendered document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    pub viewport_height: usize,
    pub scroll_y: usize,
    pub document_height: usize,
}

impl ScrollPosition {
    /// The lowest visible unit of the document.
    pub fn visible_bottom(&self) -> usize {
        self.viewport_height.saturating_add(self.scroll_y)
    }
}

/// Fires when the visible bottom is within `threshold` of the document end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BottomProximity {
    threshold: usize,
}

impl Default for BottomProximity {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD)
    }
}

impl BottomProximity {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_near_bottom(&self, pos: &ScrollPosition) -> bool {
        pos.visible_bottom() >= pos.document_height.saturating_sub(self.threshold)
    }
}

/// Handle returned by [`Viewport::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&ScrollPosition) + Send>;

/// A scrollable viewport with registered position observers.
pub struct Viewport {
    position: ScrollPosition,
    observers: Vec<(ObserverId, Observer)>,
    next_id: u64,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("position", &self.position)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Viewport {
    pub fn new(viewport_height: usize) -> Self {
        Self {
            position: ScrollPosition {
                viewport_height,
                scroll_y: 0,
                document_height: 0,
            },
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn position(&self) -> ScrollPosition {
        self.position
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&ScrollPosition) + Send + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the observer was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Record a new document height (content was rendered or cleared).
    ///
    /// Does not notify; layout changes are not scroll events.
    pub fn set_document_height(&mut self, document_height: usize) {
        self.position.document_height = document_height;
        let max_scroll = document_height.saturating_sub(self.position.viewport_height);
        self.position.scroll_y = self.position.scroll_y.min(max_scroll);
    }

    /// Scroll down by `delta` units (clamped to the document) and notify.
    pub fn scroll_by(&mut self, delta: usize) {
        let max_scroll = self
            .position
            .document_height
            .saturating_sub(self.position.viewport_height);
        self.position.scroll_y = self.position.scroll_y.saturating_add(delta).min(max_scroll);
        self.notify();
    }

    /// Jump to the end of the document and notify.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_by(self.position.document_height);
    }

    /// Back to the top, without notifying.
    pub fn scroll_to_top(&mut self) {
        self.position.scroll_y = 0;
    }

    fn notify(&mut self) {
        let position = self.position;
        for (_, observer) in &mut self.observers {
            observer(&position);
        }
    }
}
