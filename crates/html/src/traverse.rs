use crate::{Id, Node};

/// Gives every node still carrying `Id(0)` a fresh id, in preorder, above the largest id
/// already present. Existing ids are never changed.
pub fn assign_missing_ids(root: &mut Node) {
    fn max_id(node: &Node) -> u32 {
        node.children()
            .iter()
            .map(max_id)
            .fold(node.id().0, u32::max)
    }

    fn walk(node: &mut Node, next: &mut u32) {
        if node.id() == Id(0) {
            node.set_id(Id(*next));
            *next = next.wrapping_add(1);
        }
        if let Some(children) = node.children_mut() {
            for c in children {
                walk(c, next);
            }
        }
    }

    let mut next = max_id(root) + 1;
    walk(root, &mut next);
}

pub fn find_node_by_id(node: &Node, id: Id) -> Option<&Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|c| find_node_by_id(c, id))
}

pub fn find_node_by_id_mut(node: &mut Node, id: Id) -> Option<&mut Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_node_by_id_mut(c, id))
}

/// Preorder walk over every node.
pub fn walk<'a>(node: &'a Node, f: &mut impl FnMut(&'a Node)) {
    f(node);
    for c in node.children() {
        walk(c, f);
    }
}

/// Nodes from `root` down to and including `id`.
pub fn path_to(root: &Node, id: Id) -> Option<Vec<&Node>> {
    fn walk<'a>(node: &'a Node, id: Id, path: &mut Vec<&'a Node>) -> bool {
        path.push(node);
        if node.id() == id || node.children().iter().any(|c| walk(c, id, path)) {
            return true;
        }
        path.pop();
        false
    }

    let mut path = Vec::new();
    walk(root, id, &mut path).then_some(path)
}

/// Returns the parent of `id` and the child index of `id` within it.
pub fn find_parent(root: &Node, id: Id) -> Option<(&Node, usize)> {
    for (index, c) in root.children().iter().enumerate() {
        if c.id() == id {
            return Some((root, index));
        }
        if let Some(found) = find_parent(c, id) {
            return Some(found);
        }
    }
    None
}

/// Next sibling of `id` that is an element, if any.
pub fn next_element_sibling(root: &Node, id: Id) -> Option<&Node> {
    let (parent, index) = find_parent(root, id)?;
    parent.children()[index + 1..]
        .iter()
        .find(|c| matches!(c, Node::Element { .. }))
}

pub fn previous_element_sibling(root: &Node, id: Id) -> Option<&Node> {
    let (parent, index) = find_parent(root, id)?;
    parent.children()[..index]
        .iter()
        .rev()
        .find(|c| matches!(c, Node::Element { .. }))
}

/// Inserts `child` under `parent` at `index` (clamped to the end) and assigns ids to the new
/// subtree. Returns the id of the inserted node, or `None` when `parent` cannot hold children.
pub fn insert_child(root: &mut Node, parent: Id, index: usize, child: Node) -> Option<Id> {
    let children = find_node_by_id_mut(root, parent)?.children_mut()?;
    let at = index.min(children.len());
    children.insert(at, child);
    assign_missing_ids(root);
    let parent = find_node_by_id(root, parent)?;
    Some(parent.children()[at].id())
}

pub fn append_child(root: &mut Node, parent: Id, child: Node) -> Option<Id> {
    insert_child(root, parent, usize::MAX, child)
}

/// Inserts `node` as the previous sibling of `reference`.
pub fn insert_before(root: &mut Node, reference: Id, node: Node) -> Option<Id> {
    let (parent, index) = find_parent(root, reference).map(|(p, i)| (p.id(), i))?;
    insert_child(root, parent, index, node)
}

pub fn is_non_rendering_element(node: &Node) -> bool {
    match node {
        Node::Element { name, .. } => {
            matches!(
                name.as_str(),
                "head" | "style" | "script" | "title" | "meta" | "link" | "template"
            )
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_dom, tokenize};

    #[test]
    fn inserted_nodes_get_ids_above_existing_ones() {
        let mut dom = build_dom(&tokenize("<body><p>a</p><p>b</p></body>"));
        let body = dom.children()[0].id();
        let new_id = append_child(&mut dom, body, Node::element("button")).unwrap();
        assert_eq!(new_id, Id(7));
        assert!(find_node_by_id(&dom, new_id).unwrap().is_element("button"));
    }

    #[test]
    fn insert_before_places_node_as_previous_sibling() {
        let mut dom = build_dom(&tokenize("<pre><code>x</code></pre>"));
        let pre = dom.children()[0].id();
        let code = dom.children()[0].children()[0].id();
        let label = insert_before(&mut dom, code, Node::element("div")).unwrap();
        let (parent, index) = find_parent(&dom, label).unwrap();
        assert_eq!(parent.id(), pre);
        assert_eq!(index, 0);
        assert!(next_element_sibling(&dom, label).unwrap().is_element("code"));
    }

    #[test]
    fn next_element_sibling_skips_text() {
        let dom = build_dom(&tokenize("<div><h1>T</h1> text <p>x</p></div>"));
        let h1 = dom.children()[0].children()[0].id();
        assert!(next_element_sibling(&dom, h1).unwrap().is_element("p"));
    }

    #[test]
    fn path_runs_from_root_to_target() {
        let dom = build_dom(&tokenize("<nav><ul><li><a>x</a></li></ul></nav><p></p>"));
        let a = crate::query_first(&dom, "a").unwrap().id();
        let names: Vec<_> = path_to(&dom, a)
            .unwrap()
            .iter()
            .filter_map(|n| n.element_name())
            .collect();
        assert_eq!(names, ["nav", "ul", "li", "a"]);
        assert!(path_to(&dom, Id(999)).is_none());
    }

    #[test]
    fn previous_element_sibling_skips_text() {
        let dom = build_dom(&tokenize("<div><span>a</span> text <p>x</p></div>"));
        let p = crate::query_first(&dom, "p").unwrap().id();
        assert!(previous_element_sibling(&dom, p).unwrap().is_element("span"));
    }

    #[test]
    fn text_nodes_cannot_receive_children() {
        let mut dom = build_dom(&tokenize("<p>a</p>"));
        let text = dom.children()[0].children()[0].id();
        assert_eq!(append_child(&mut dom, text, Node::element("span")), None);
    }
}
