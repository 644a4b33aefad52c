use super::{is_inside, parse_selector};
use crate::config::BackToTopConfig;
use bus::HostCommand;
use html::select::select_first;
use html::traverse::{append_child, find_node_by_id_mut};
use html::{Id, Node};

const BUTTON_CLASS: &str = "back-to-top";

const RESTING_OPACITY: &str = "0.7";

/// Floating "back to top" button that fades in once the reader has scrolled down.
pub struct BackToTop {
    config: BackToTopConfig,
    button: Option<Id>,
}

impl BackToTop {
    pub fn new(config: &BackToTopConfig) -> Self {
        Self {
            config: config.clone(),
            button: None,
        }
    }

    /// Appends the button to `body` (or the document root) unless one already exists.
    /// Returns the button's id.
    pub fn install(&mut self, dom: &mut Node) -> Option<Id> {
        if !self.config.enabled {
            return None;
        }
        let existing = parse_selector(&format!("button.{BUTTON_CLASS}"))
            .and_then(|selector| select_first(dom, &selector).map(|n| n.id()));
        if let Some(id) = existing {
            self.button = Some(id);
            return self.button;
        }

        let parent = parse_selector("body")
            .and_then(|selector| select_first(dom, &selector).map(|n| n.id()))
            .unwrap_or(dom.id());
        let button = Node::element("button")
            .with_attr("class", BUTTON_CLASS)
            .with_style("position", "fixed")
            .with_style("bottom", "2rem")
            .with_style("right", "2rem")
            .with_style("width", "3rem")
            .with_style("height", "3rem")
            .with_style("border-radius", "50%")
            .with_style("background", "var(--md-primary-fg-color)")
            .with_style("color", "white")
            .with_style("border", "none")
            .with_style("cursor", "pointer")
            .with_style("opacity", "0")
            .with_style("transition", "opacity 0.3s, transform 0.2s")
            .with_style("z-index", "1000")
            .with_style("font-size", "1.5rem")
            .with_style("display", "flex")
            .with_style("align-items", "center")
            .with_style("justify-content", "center")
            .with_child(Node::text("↑"));
        self.button = append_child(dom, parent, button);
        self.button
    }

    pub fn button(&self) -> Option<Id> {
        self.button
    }

    pub fn on_scroll(&self, dom: &mut Node, scroll_y: f32) {
        let opacity = if scroll_y > self.config.show_after_px {
            RESTING_OPACITY
        } else {
            "0"
        };
        self.set_style(dom, "opacity", opacity);
    }

    pub fn on_pointer_enter(&self, dom: &mut Node, target: Id) {
        if self.button == Some(target) {
            self.set_style(dom, "opacity", "1");
            self.set_style(dom, "transform", "scale(1.1)");
        }
    }

    pub fn on_pointer_leave(&self, dom: &mut Node, target: Id) {
        if self.button == Some(target) {
            self.set_style(dom, "opacity", RESTING_OPACITY);
            self.set_style(dom, "transform", "scale(1)");
        }
    }

    /// Returns true when the click landed on the button.
    pub fn on_click(&self, dom: &Node, target: Id, commands: &mut Vec<HostCommand>) -> bool {
        let Some(button) = self.button else {
            return false;
        };
        if !is_inside(dom, target, button) {
            return false;
        }
        commands.push(HostCommand::ScrollTo {
            top: 0.0,
            smooth: true,
        });
        true
    }

    fn set_style(&self, dom: &mut Node, key: &str, value: &str) {
        let Some(id) = self.button else {
            return;
        };
        if let Some(node) = find_node_by_id_mut(dom, id) {
            node.set_style(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::{parse_document, query_all, traverse::find_node_by_id};

    fn opacity(dom: &Node, button: Id) -> Option<String> {
        find_node_by_id(dom, button)
            .and_then(|n| n.style_value("opacity"))
            .map(str::to_string)
    }

    #[test]
    fn button_is_appended_to_body_hidden() {
        let mut dom = parse_document("<html><body><p>x</p></body></html>");
        let mut btt = BackToTop::new(&BackToTopConfig::default());
        let button = btt.install(&mut dom).unwrap();
        let body = html::query_first(&dom, "body").unwrap();
        assert_eq!(body.children().last().unwrap().id(), button);
        assert_eq!(opacity(&dom, button).as_deref(), Some("0"));
        assert_eq!(html::dom_utils::text_content(body.children().last().unwrap()), "↑");
    }

    #[test]
    fn install_is_idempotent() {
        let mut dom = parse_document("<body></body>");
        let config = BackToTopConfig::default();
        let first = BackToTop::new(&config).install(&mut dom);
        let second = BackToTop::new(&config).install(&mut dom);
        assert_eq!(first, second);
        assert_eq!(query_all(&dom, "button").len(), 1);
    }

    #[test]
    fn scroll_threshold_toggles_visibility() {
        let mut dom = parse_document("<body></body>");
        let mut btt = BackToTop::new(&BackToTopConfig::default());
        let button = btt.install(&mut dom).unwrap();
        btt.on_scroll(&mut dom, 300.0);
        assert_eq!(opacity(&dom, button).as_deref(), Some("0"));
        btt.on_scroll(&mut dom, 301.0);
        assert_eq!(opacity(&dom, button).as_deref(), Some("0.7"));
        btt.on_scroll(&mut dom, 0.0);
        assert_eq!(opacity(&dom, button).as_deref(), Some("0"));
    }

    #[test]
    fn hover_scales_and_restores() {
        let mut dom = parse_document("<body></body>");
        let mut btt = BackToTop::new(&BackToTopConfig::default());
        let button = btt.install(&mut dom).unwrap();
        btt.on_pointer_enter(&mut dom, button);
        let node = find_node_by_id(&dom, button).unwrap();
        assert_eq!(node.style_value("opacity"), Some("1"));
        assert_eq!(node.style_value("transform"), Some("scale(1.1)"));
        btt.on_pointer_leave(&mut dom, button);
        let node = find_node_by_id(&dom, button).unwrap();
        assert_eq!(node.style_value("opacity"), Some("0.7"));
        assert_eq!(node.style_value("transform"), Some("scale(1)"));
    }

    #[test]
    fn click_scrolls_to_top() {
        let mut dom = parse_document("<body><p>x</p></body>");
        let mut btt = BackToTop::new(&BackToTopConfig::default());
        let button = btt.install(&mut dom).unwrap();
        let p = html::query_first(&dom, "p").unwrap().id();
        let mut commands = Vec::new();
        assert!(!btt.on_click(&dom, p, &mut commands));
        assert!(btt.on_click(&dom, button, &mut commands));
        assert_eq!(commands, [HostCommand::ScrollTo { top: 0.0, smooth: true }]);
    }

    #[test]
    fn disabled_button_is_not_installed() {
        let mut dom = parse_document("<body></body>");
        let config = BackToTopConfig {
            enabled: false,
            ..BackToTopConfig::default()
        };
        assert_eq!(BackToTop::new(&config).install(&mut dom), None);
        assert!(query_all(&dom, "button").is_empty());
    }
}
