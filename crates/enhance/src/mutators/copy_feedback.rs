use super::{matching_ids, parse_selector};
use crate::config::CopyFeedbackConfig;
use crate::timers::{TimerId, TimerQueue};
use core_types::Millis;
use html::select::{closest, select_within};
use html::traverse::find_node_by_id_mut;
use html::{Id, Node, Selector};
use std::collections::HashMap;

struct Pending {
    timer: TimerId,
    /// Inline color before the first click; `None` when it had none.
    original: Option<String>,
}

/// Tints a copy button's icon on click and restores it after a delay.
pub struct CopyFeedback {
    config: CopyFeedbackConfig,
    button: Option<Selector>,
    icon: Option<Selector>,
    pending: HashMap<Id, Pending>,
    timers: TimerQueue<Id>,
}

impl CopyFeedback {
    pub fn new(config: &CopyFeedbackConfig) -> Self {
        let enabled = config.enabled;
        Self {
            config: config.clone(),
            button: enabled.then(|| parse_selector(&config.button_selector)).flatten(),
            icon: parse_selector("svg"),
            pending: HashMap::new(),
            timers: TimerQueue::new(),
        }
    }

    /// Number of copy buttons on the page.
    pub fn count_buttons(&self, dom: &Node) -> usize {
        self.button
            .as_ref()
            .map_or(0, |selector| matching_ids(dom, selector).len())
    }

    /// Handles a click on `target`. Returns true when it landed on a copy button with an
    /// icon.
    pub fn on_click(&mut self, dom: &mut Node, target: Id, now: Millis) -> bool {
        let (Some(button), Some(icon)) = (&self.button, &self.icon) else {
            return false;
        };
        let Some(button) = closest(dom, target, button) else {
            return false;
        };
        let Some(icon) = select_within(button, icon).first().map(|n| n.id()) else {
            return false;
        };
        let Some(node) = find_node_by_id_mut(dom, icon) else {
            return false;
        };

        let original = match self.pending.remove(&icon) {
            Some(prev) => {
                self.timers.cancel(prev.timer);
                prev.original
            }
            None => node.style_value("color").map(str::to_string),
        };
        node.set_style("color", &self.config.color);
        let timer = self
            .timers
            .schedule(now.saturating_add(self.config.revert_after_ms), icon);
        self.pending.insert(icon, Pending { timer, original });
        log::debug!(target: "enhance.copy", "copy feedback on {icon:?}");
        true
    }

    /// Restores icons whose feedback period ended at or before `now`. Returns how many were
    /// restored.
    pub fn fire_due(&mut self, dom: &mut Node, now: Millis) -> usize {
        let due = self.timers.due(now);
        for icon in &due {
            let Some(Pending { original, .. }) = self.pending.remove(icon) else {
                continue;
            };
            let Some(node) = find_node_by_id_mut(dom, *icon) else {
                continue;
            };
            match original {
                Some(color) => node.set_style("color", &color),
                None => node.remove_style("color"),
            }
        }
        due.len()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::{parse_document, query_first};

    const PAGE: &str = r#"<pre><button class="md-clipboard"><svg style="color: red"><path></path></svg></button><code>x</code></pre>
        <button class="md-clipboard"><svg><path></path></svg></button>"#;

    fn icon_color(dom: &Node, nth: usize) -> Option<String> {
        html::query_all(dom, "svg")[nth]
            .style_value("color")
            .map(str::to_string)
    }

    #[test]
    fn click_tints_then_reverts() {
        let mut dom = parse_document(PAGE);
        let mut copy = CopyFeedback::new(&CopyFeedbackConfig::default());
        assert_eq!(copy.count_buttons(&dom), 2);
        let path = query_first(&dom, "path").unwrap().id();

        assert!(copy.on_click(&mut dom, path, 100));
        assert_eq!(icon_color(&dom, 0).as_deref(), Some("#10b981"));
        assert_eq!(copy.fire_due(&mut dom, 1099), 0);
        assert_eq!(copy.fire_due(&mut dom, 1100), 1);
        assert_eq!(icon_color(&dom, 0).as_deref(), Some("red"));
    }

    #[test]
    fn absent_color_is_removed_on_revert() {
        let mut dom = parse_document(PAGE);
        let mut copy = CopyFeedback::new(&CopyFeedbackConfig::default());
        let second = html::query_all(&dom, "button")[1].id();
        copy.on_click(&mut dom, second, 0);
        copy.fire_due(&mut dom, 1000);
        assert_eq!(icon_color(&dom, 1), None);
        assert_eq!(
            html::to_html(html::query_all(&dom, "button")[1]),
            r#"<button class="md-clipboard"><svg><path></path></svg></button>"#
        );
    }

    #[test]
    fn second_click_keeps_the_original_color() {
        let mut dom = parse_document(PAGE);
        let mut copy = CopyFeedback::new(&CopyFeedbackConfig::default());
        let button = query_first(&dom, "button").unwrap().id();
        copy.on_click(&mut dom, button, 0);
        copy.on_click(&mut dom, button, 500);
        assert_eq!(copy.fire_due(&mut dom, 1000), 0);
        assert_eq!(icon_color(&dom, 0).as_deref(), Some("#10b981"));
        assert_eq!(copy.fire_due(&mut dom, 1500), 1);
        assert_eq!(icon_color(&dom, 0).as_deref(), Some("red"));
    }

    #[test]
    fn clicks_elsewhere_are_ignored() {
        let mut dom = parse_document(PAGE);
        let mut copy = CopyFeedback::new(&CopyFeedbackConfig::default());
        let code = query_first(&dom, "code").unwrap().id();
        assert!(!copy.on_click(&mut dom, code, 0));
        assert_eq!(copy.next_deadline(), None);
    }

    #[test]
    fn disabled_feedback_does_nothing() {
        let mut dom = parse_document(PAGE);
        let config = CopyFeedbackConfig {
            enabled: false,
            ..CopyFeedbackConfig::default()
        };
        let mut copy = CopyFeedback::new(&config);
        let button = query_first(&dom, "button").unwrap().id();
        assert!(!copy.on_click(&mut dom, button, 0));
        assert_eq!(copy.count_buttons(&dom), 0);
    }
}
