pub type NodeId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub NodeId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document {
        id: Id,
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        id: Id,
        name: String,
        attributes: Vec<(String, Option<String>)>,
        /// Inline declarations, serialized back into the `style` attribute.
        style: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text {
        id: Id,
        text: String,
    },
    Comment {
        id: Id,
        text: String,
    },
}

impl Node {
    /// Detached element with no id; ids are assigned when it is attached.
    pub fn element(name: &str) -> Self {
        Node::Element {
            id: Id(0),
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
            style: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        Node::Text {
            id: Id(0),
            text: text.to_string(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_style(mut self, key: &str, value: &str) -> Self {
        self.set_style(key, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    pub fn id(&self) -> Id {
        match self {
            Node::Document { id, .. } => *id,
            Node::Element { id, .. } => *id,
            Node::Text { id, .. } => *id,
            Node::Comment { id, .. } => *id,
        }
    }

    pub fn set_id(&mut self, new_id: Id) {
        match self {
            Node::Document { id, .. } => *id = new_id,
            Node::Element { id, .. } => *id = new_id,
            Node::Text { id, .. } => *id = new_id,
            Node::Comment { id, .. } => *id = new_id,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } => Some(children),
            Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Lowercase tag name for elements.
    pub fn element_name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element(&self, tag: &str) -> bool {
        self.element_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        let Node::Element { attributes, .. } = self else {
            return;
        };
        match attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, v)) => *v = Some(value.to_string()),
            None => attributes.push((key.to_ascii_lowercase(), Some(value.to_string()))),
        }
    }

    /// Whether the whitespace-separated `key` attribute contains `token`.
    pub fn attr_has_token(&self, key: &str, token: &str) -> bool {
        self.attr(key)
            .is_some_and(|v| v.split_ascii_whitespace().any(|t| t == token))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr_has_token("class", class)
    }

    /// Adds `class` to the class list. Returns false when already present.
    pub fn add_class(&mut self, class: &str) -> bool {
        if !matches!(self, Node::Element { .. }) || self.has_class(class) {
            return false;
        }
        let next = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr("class", &next);
        true
    }

    /// Removes every occurrence of `class`. Returns false when it was absent.
    pub fn remove_class(&mut self, class: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let next = self
            .attr("class")
            .unwrap_or("")
            .split_ascii_whitespace()
            .filter(|t| *t != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", &next);
        true
    }

    pub fn style_value(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { style, .. } => style
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_style(&mut self, key: &str, value: &str) {
        let Node::Element { style, .. } = self else {
            return;
        };
        match style.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, v)) => *v = value.to_string(),
            None => style.push((key.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn remove_style(&mut self, key: &str) {
        if let Node::Element { style, .. } = self {
            style.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_list_round_trips_through_the_class_attribute() {
        let mut a = Node::element("a").with_attr("class", "md-nav__link");
        assert!(a.add_class("md-nav__link--active"));
        assert!(!a.add_class("md-nav__link--active"));
        assert_eq!(a.attr("class"), Some("md-nav__link md-nav__link--active"));
        assert!(a.remove_class("md-nav__link--active"));
        assert_eq!(a.attr("class"), Some("md-nav__link"));
        assert!(!a.remove_class("md-nav__link--active"));
    }

    #[test]
    fn valueless_attributes_read_as_empty() {
        let input = Node::Element {
            id: Id(0),
            name: "input".to_string(),
            attributes: vec![("disabled".to_string(), None)],
            style: Vec::new(),
            children: Vec::new(),
        };
        assert_eq!(input.attr("disabled"), Some(""));
        assert_eq!(input.attr("value"), None);
    }

    #[test]
    fn style_updates_replace_existing_declarations() {
        let mut span = Node::element("span").with_style("opacity", "0");
        span.set_style("OPACITY", "0.7");
        assert_eq!(span.style_value("opacity"), Some("0.7"));
        span.remove_style("opacity");
        assert_eq!(span.style_value("opacity"), None);
    }
}
