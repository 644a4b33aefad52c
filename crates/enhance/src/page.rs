//! The page host: owns the document, the event queue and every enhancement's state.
//!
//! Events are drained strictly in posting order on the calling thread. Visibility batches the
//! observer produces while a scroll is being handled are queued behind that scroll, so they
//! are applied on a later turn of [`Page::run_until_idle`].
use crate::config::EnhanceConfig;
use crate::error::{ObserveError, Result};
use crate::mutators::back_to_top::BackToTop;
use crate::mutators::copy_feedback::CopyFeedback;
use crate::mutators::{self, MutationReport, shortcuts, smooth_scroll};
use crate::toc::{
    ActiveSectionSync, ClassHighlighter, HeadingRegistry, HighlightSwap, NavigationIndex,
    VisibilityObserver, observer_targets,
};
use bus::{Bus, HostCommand, PageEvent, VisibilitySink};
use core_types::{HeadingId, Millis, Rect, Viewport};
use html::{Id, Node};
use layout::{BlockLayout, LayoutMetrics, layout_document};
use std::sync::mpsc::Sender;

/// What the embedding environment provides.
#[derive(Clone, Debug)]
pub struct HostInfo {
    /// Host name the page is served from; decides which links are external.
    pub page_host: Option<String>,
    /// Whether viewport intersection observation is available.
    pub supports_intersection: bool,
    pub viewport: Viewport,
    pub metrics: LayoutMetrics,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            page_host: None,
            supports_intersection: true,
            viewport: Viewport::default(),
            metrics: LayoutMetrics::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReadyReport {
    pub mutations: MutationReport,
    pub headings: usize,
    pub nav_entries: usize,
    /// Why highlighting is off, if it is.
    pub observer_error: Option<ObserveError>,
    pub tracking: bool,
}

pub struct Page {
    dom: Node,
    config: EnhanceConfig,
    host: HostInfo,
    bus: Bus,
    viewport: Viewport,
    now: Millis,
    report: Option<ReadyReport>,
    layout: BlockLayout,
    sync: Option<ActiveSectionSync>,
    observer: Option<VisibilityObserver>,
    copy: CopyFeedback,
    back_to_top: BackToTop,
    swaps: Vec<HighlightSwap>,
}

impl Page {
    pub fn parse(html: &str, config: EnhanceConfig, host: HostInfo) -> Result<Self> {
        config.validate()?;
        let dom = html::parse_document(html);
        Ok(Self {
            dom,
            copy: CopyFeedback::new(&config.copy_feedback),
            back_to_top: BackToTop::new(&config.back_to_top),
            viewport: host.viewport,
            config,
            host,
            bus: Bus::new(),
            now: 0,
            report: None,
            layout: BlockLayout::default(),
            sync: None,
            observer: None,
            swaps: Vec::new(),
        })
    }

    /// Runs the load-time enhancements and starts section tracking, then drains the initial
    /// visibility notification. Calling it again returns the first report unchanged.
    pub fn ready(&mut self) -> ReadyReport {
        if let Some(report) = &self.report {
            log::debug!(target: "enhance.page", "page already enhanced");
            return report.clone();
        }
        log_banner();

        let page_host = self.host.page_host.as_deref();
        let mut mutations = mutators::apply_static(&mut self.dom, &self.config, page_host);
        mutations.copy_buttons = self.copy.count_buttons(&self.dom);
        mutations.back_to_top = self.back_to_top.install(&mut self.dom);
        // Measured after mutation so inserted nodes have geometry.
        self.layout = layout_document(&self.dom, &self.host.metrics);

        let mut report = ReadyReport {
            mutations,
            headings: 0,
            nav_entries: 0,
            observer_error: None,
            tracking: false,
        };
        if self.config.toc.enabled {
            self.start_tracking(&mut report);
        }
        log::info!(
            target: "enhance.page",
            "enhanced page: {} headings, {} nav entries, tracking={}",
            report.headings,
            report.nav_entries,
            report.tracking
        );
        self.report = Some(report.clone());
        self.run_until_idle();
        report
    }

    fn start_tracking(&mut self, report: &mut ReadyReport) {
        let registry = HeadingRegistry::collect(&self.dom, &self.config);
        let index = NavigationIndex::build(&self.dom, &self.config);
        report.headings = registry.len();
        report.nav_entries = index.len();

        let observer = if self.host.supports_intersection {
            VisibilityObserver::observe(
                observer_targets(&registry, &self.layout),
                self.config.toc.band,
                self.config.toc.threshold,
                VisibilitySink::new(self.bus.evt_tx.clone()),
            )
        } else {
            Err(ObserveError::Unsupported)
        };
        let mut observer = match observer {
            Ok(observer) => observer,
            Err(err) => {
                log::debug!(target: "enhance.toc", "highlighting disabled: {err}");
                report.observer_error = Some(err);
                return;
            }
        };

        let mut sync = ActiveSectionSync::new(registry, index);
        let mut highlighter = ClassHighlighter::new(&mut self.dom, &self.config.toc.active_class);
        report.tracking = sync.start(&mut highlighter);
        if !report.tracking {
            return;
        }
        observer.update(self.viewport, self.now);
        self.observer = Some(observer);
        self.sync = Some(sync);
    }

    /// Queues an event for the next [`Page::run_until_idle`].
    pub fn post(&self, event: PageEvent) {
        // The page owns the receiver, so sending cannot fail while `self` is alive.
        let _ = self.bus.evt_tx.send(event);
    }

    /// Sender for producers living outside the page.
    pub fn event_sender(&self) -> Sender<PageEvent> {
        self.bus.evt_tx.clone()
    }

    /// Dispatches queued events, including ones queued while dispatching, until the queue is
    /// empty. Returns the number of events handled.
    pub fn run_until_idle(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.bus.evt_rx.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    fn dispatch(&mut self, event: PageEvent) {
        if let Some(at) = event.at() {
            self.advance_clock(at);
        }
        if self.report.is_none() {
            log::debug!(target: "enhance.page", "dropping {event:?} before ready");
            return;
        }

        let mut commands = Vec::new();
        match event {
            PageEvent::Scroll { scroll_y, at } => {
                self.viewport.scroll_y = scroll_y;
                self.back_to_top.on_scroll(&mut self.dom, scroll_y);
                if let Some(observer) = &mut self.observer {
                    observer.update(self.viewport, at);
                }
            }
            PageEvent::Resize { height, at } => {
                self.viewport.height = height;
                if let Some(observer) = &mut self.observer {
                    observer.update(self.viewport, at);
                }
            }
            PageEvent::Click { target, at } => {
                if self.config.copy_feedback.enabled {
                    self.copy.on_click(&mut self.dom, target, at);
                }
                let prevented = smooth_scroll::on_click(
                    &self.dom,
                    target,
                    &self.config.smooth_scroll,
                    &mut commands,
                );
                self.back_to_top.on_click(&self.dom, target, &mut commands);
                if prevented {
                    log::debug!(target: "enhance.page", "in-page navigation handled");
                }
            }
            PageEvent::PointerEnter { target, .. } => {
                self.back_to_top.on_pointer_enter(&mut self.dom, target);
            }
            PageEvent::PointerLeave { target, .. } => {
                self.back_to_top.on_pointer_leave(&mut self.dom, target);
            }
            PageEvent::KeyDown { key, alt, .. } => {
                shortcuts::on_key_down(&self.dom, key, alt, &self.config.shortcuts, &mut commands);
            }
            PageEvent::Tick { .. } => {}
            PageEvent::Visibility(batch) => {
                let Some(sync) = &mut self.sync else {
                    log::debug!(target: "enhance.toc", "visibility batch without tracking");
                    return;
                };
                let mut highlighter =
                    ClassHighlighter::new(&mut self.dom, &self.config.toc.active_class);
                if let Some(swap) = sync.apply_batch(&batch, &mut highlighter) {
                    self.swaps.push(swap);
                }
            }
        }

        for command in commands {
            let _ = self.bus.cmd_tx.send(command);
        }
    }

    fn advance_clock(&mut self, at: Millis) {
        self.now = self.now.max(at);
        let restored = self.copy.fire_due(&mut self.dom, self.now);
        if restored > 0 {
            log::trace!(target: "enhance.page", "{restored} timers fired at {}ms", self.now);
        }
    }

    /// Host commands emitted since the last call, in emission order.
    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        self.bus.cmd_rx.try_iter().collect()
    }

    /// Scroll offset a host settles at after executing `command`, if it scrolls.
    pub fn scroll_target(&self, command: &HostCommand) -> Option<f32> {
        let top = match command {
            HostCommand::ScrollIntoView { target, .. } => self.layout.rect(*target)?.top,
            HostCommand::ScrollTo { top, .. } => *top,
            _ => return None,
        };
        let max = (self.layout.content_height() - self.viewport.height).max(0.0);
        Some(top.clamp(0.0, max))
    }

    pub fn to_html(&self) -> String {
        html::to_html(&self.dom)
    }

    pub fn active_section(&self) -> Option<&HeadingId> {
        self.sync.as_ref().and_then(|s| s.active())
    }

    pub fn swaps(&self) -> &[HighlightSwap] {
        &self.swaps
    }

    pub fn dom(&self) -> &Node {
        &self.dom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn rect(&self, id: Id) -> Option<Rect> {
        self.layout.rect(id)
    }

    pub fn sync(&self) -> Option<&ActiveSectionSync> {
        self.sync.as_ref()
    }

    pub fn next_timer_deadline(&self) -> Option<Millis> {
        self.copy.next_deadline()
    }
}

fn log_banner() {
    log::info!(target: "enhance.page", "pagekit {}", env!("CARGO_PKG_VERSION"));
    log::info!(target: "enhance.page", "page enhancements for MkDocs Material sites");
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><body>
        <nav><a class="md-nav__link" href="#one">One</a><a class="md-nav__link" href="#two">Two</a></nav>
        <div class="md-content__inner">
          <h2 id="one">One</h2><p>first</p>
          <h2 id="two">Two</h2><p>second</p>
        </div></body></html>"##;

    fn page(host: HostInfo) -> Page {
        Page::parse(PAGE, EnhanceConfig::default(), host).unwrap()
    }

    #[test]
    fn events_before_ready_are_dropped() {
        let mut p = page(HostInfo::default());
        p.post(PageEvent::KeyDown {
            key: 'h',
            alt: true,
            at: 5,
        });
        assert_eq!(p.run_until_idle(), 1);
        assert!(p.take_commands().is_empty());
        assert_eq!(p.now(), 5);
    }

    #[test]
    fn ready_is_idempotent() {
        let mut p = page(HostInfo::default());
        let first = p.ready();
        let html = p.to_html();
        assert_eq!(p.ready(), first);
        assert_eq!(p.to_html(), html);
    }

    #[test]
    fn unsupported_host_degrades_to_no_highlighting() {
        let mut p = page(HostInfo {
            supports_intersection: false,
            ..HostInfo::default()
        });
        let report = p.ready();
        assert_eq!(report.observer_error, Some(ObserveError::Unsupported));
        assert!(!report.tracking);
        assert_eq!(p.active_section(), None);
        assert!(report.mutations.back_to_top.is_some());
    }

    #[test]
    fn commands_drain_in_order() {
        let mut p = page(HostInfo::default());
        p.ready();
        p.post(PageEvent::KeyDown {
            key: 'h',
            alt: true,
            at: 1,
        });
        p.post(PageEvent::KeyDown {
            key: 'h',
            alt: true,
            at: 2,
        });
        p.run_until_idle();
        assert_eq!(p.take_commands().len(), 2);
        assert!(p.take_commands().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EnhanceConfig::default();
        config.reading_time.words_per_minute = 0;
        assert!(Page::parse(PAGE, config, HostInfo::default()).is_err());
    }
}
