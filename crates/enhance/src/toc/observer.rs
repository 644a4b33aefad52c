//! Viewport intersection tracking for headings.
//!
//! The observer never polls. The page host calls [`VisibilityObserver::update`] whenever the
//! viewport moves or resizes, and the observer posts one batch describing every heading that
//! crossed the activation band since the previous step.
use crate::config::ActivationBand;
use crate::error::ObserveError;
use bus::{VisibilityEvent, VisibilitySink};
use core_types::{HeadingId, Millis, Rect, Viewport};

#[derive(Clone, Debug, PartialEq)]
pub struct ObserverTarget {
    pub heading: HeadingId,
    pub rect: Rect,
}

#[derive(Clone, Debug)]
struct Watched {
    target: ObserverTarget,
    ratio: f32,
    /// `None` until the first update has reported this target.
    intersecting: Option<bool>,
}

pub struct VisibilityObserver {
    watched: Vec<Watched>,
    band: ActivationBand,
    threshold: f32,
    sink: Option<VisibilitySink>,
}

impl ActivationBand {
    /// Top and bottom of the band in page coordinates.
    pub fn bounds(&self, viewport: Viewport) -> (f32, f32) {
        let top = viewport.scroll_y + viewport.height * self.top_margin;
        let bottom = viewport.scroll_y + viewport.height * (1.0 - self.bottom_margin);
        (top, bottom)
    }

    /// Visible fraction of `rect` inside the band.
    pub fn ratio(&self, rect: Rect, viewport: Viewport) -> f32 {
        let (top, bottom) = self.bounds(viewport);
        if rect.height <= 0.0 {
            return if rect.top >= top && rect.top < bottom {
                1.0
            } else {
                0.0
            };
        }
        let overlap = rect.bottom().min(bottom) - rect.top.max(top);
        (overlap.max(0.0) / rect.height).clamp(0.0, 1.0)
    }
}

impl VisibilityObserver {
    /// Starts watching `targets`, which must be in document order.
    pub fn observe(
        targets: Vec<ObserverTarget>,
        band: ActivationBand,
        threshold: f32,
        sink: VisibilitySink,
    ) -> Result<Self, ObserveError> {
        if targets.is_empty() {
            return Err(ObserveError::NoTargets);
        }
        let watched = targets
            .into_iter()
            .map(|target| Watched {
                target,
                ratio: 0.0,
                intersecting: None,
            })
            .collect();
        Ok(Self {
            watched,
            band,
            threshold,
            sink: Some(sink),
        })
    }

    /// Recomputes intersections for `viewport` and posts the crossings as one batch. Returns
    /// the number of events posted.
    pub fn update(&mut self, viewport: Viewport, at: Millis) -> usize {
        let Some(sink) = &self.sink else {
            return 0;
        };

        let mut batch = Vec::new();
        for w in &mut self.watched {
            let ratio = self.band.ratio(w.target.rect, viewport);
            let intersecting = ratio > 0.0 && ratio >= self.threshold;
            w.ratio = ratio;
            if w.intersecting != Some(intersecting) {
                w.intersecting = Some(intersecting);
                batch.push(VisibilityEvent {
                    heading: w.target.heading.clone(),
                    is_intersecting: intersecting,
                    ratio,
                    at,
                });
            }
        }

        let sent = batch.len();
        if sent == 0 {
            return 0;
        }
        log::trace!(target: "enhance.observer", "posting {sent} crossings at {at}ms");
        if !sink.send(batch) {
            log::debug!(target: "enhance.observer", "event queue closed; disconnecting");
            self.sink = None;
            return 0;
        }
        sent
    }

    /// Last computed ratio for `heading`.
    pub fn ratio(&self, heading: &HeadingId) -> Option<f32> {
        self.watched
            .iter()
            .find(|w| &w.target.heading == heading)
            .map(|w| w.ratio)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Stops posting batches. Later updates are no-ops.
    pub fn disconnect(&mut self) {
        self.sink = None;
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }
}
