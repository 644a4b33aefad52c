use core_types::{HeadingId, Millis};
use html::Id;
use std::sync::mpsc::{Receiver, Sender, channel};

/// One heading crossing into or out of the activation band.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEvent {
    pub heading: HeadingId,
    pub is_intersecting: bool,
    /// Fraction of the heading inside the band, 0.0..=1.0.
    pub ratio: f32,
    pub at: Millis,
}

/// Crossings detected in a single observation step, in detection order.
pub type VisibilityBatch = Vec<VisibilityEvent>;

#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    Scroll { scroll_y: f32, at: Millis },
    Resize { height: f32, at: Millis },
    Click { target: Id, at: Millis },
    PointerEnter { target: Id, at: Millis },
    PointerLeave { target: Id, at: Millis },
    KeyDown { key: char, alt: bool, at: Millis },
    /// Advances the page clock without any other input.
    Tick { at: Millis },
    Visibility(VisibilityBatch),
}

impl PageEvent {
    pub fn at(&self) -> Option<Millis> {
        match self {
            PageEvent::Scroll { at, .. }
            | PageEvent::Resize { at, .. }
            | PageEvent::Click { at, .. }
            | PageEvent::PointerEnter { at, .. }
            | PageEvent::PointerLeave { at, .. }
            | PageEvent::KeyDown { at, .. }
            | PageEvent::Tick { at } => Some(*at),
            PageEvent::Visibility(batch) => batch.iter().map(|e| e.at).max(),
        }
    }
}

/// Effects the page asks of its host environment.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
    ScrollIntoView { target: Id, smooth: bool },
    ScrollTo { top: f32, smooth: bool },
    /// Records `#fragment` in session history without scrolling.
    PushHistory { fragment: String },
    Focus { target: Id },
    Navigate { url: String },
}

pub struct Bus {
    pub evt_tx: Sender<PageEvent>,
    pub evt_rx: Receiver<PageEvent>,
    pub cmd_tx: Sender<HostCommand>,
    pub cmd_rx: Receiver<HostCommand>,
}

impl Bus {
    pub fn new() -> Self {
        let (evt_tx, evt_rx) = channel();
        let (cmd_tx, cmd_rx) = channel();
        Self {
            evt_tx,
            evt_rx,
            cmd_tx,
            cmd_rx,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards visibility batches onto the page event queue.
#[derive(Clone)]
pub struct VisibilitySink {
    tx: Sender<PageEvent>,
}

impl VisibilitySink {
    pub fn new(tx: Sender<PageEvent>) -> Self {
        Self { tx }
    }

    /// Returns false once the receiving side is gone.
    pub fn send(&self, batch: VisibilityBatch) -> bool {
        self.tx.send(PageEvent::Visibility(batch)).is_ok()
    }
}
