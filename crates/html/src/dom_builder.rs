use crate::traverse::assign_missing_ids;
use crate::types::{Id, Node, Token};

/// Builds a document tree from tokens and assigns node ids in document order.
///
/// Recovery is deliberately simple: an end tag closes the nearest open element with the same
/// name (and everything opened after it); end tags with no open match are dropped; elements
/// still open at the end of input are closed implicitly.
pub fn build_dom(tokens: &[Token]) -> Node {
    let mut doctype = None;
    // open[0] collects document children; every later entry is an open element.
    let mut open: Vec<Node> = vec![Node::Document {
        id: Id(0),
        doctype: None,
        children: Vec::new(),
    }];

    for token in tokens {
        match token {
            Token::Doctype(value) => {
                if doctype.is_none() {
                    doctype = Some(value.clone());
                }
            }
            Token::Comment(text) => append(
                &mut open,
                Node::Comment {
                    id: Id(0),
                    text: text.clone(),
                },
            ),
            Token::Text(text) => append(&mut open, Node::text(text)),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let element = make_element(name, attributes);
                if *self_closing {
                    append(&mut open, element);
                } else {
                    open.push(element);
                }
            }
            Token::EndTag(name) => {
                let Some(depth) = open
                    .iter()
                    .rposition(|node| node.is_element(name))
                else {
                    log::trace!(target: "html.builder", "dropping unmatched </{name}>");
                    continue;
                };
                while open.len() > depth {
                    close_top(&mut open);
                }
            }
        }
    }

    while open.len() > 1 {
        close_top(&mut open);
    }

    let mut root = open.pop().unwrap_or(Node::Document {
        id: Id(0),
        doctype: None,
        children: Vec::new(),
    });
    if let Node::Document { doctype: dt, .. } = &mut root {
        *dt = doctype;
    }
    assign_missing_ids(&mut root);
    root
}

fn append(open: &mut [Node], node: Node) {
    if let Some(children) = open.last_mut().and_then(Node::children_mut) {
        children.push(node);
    }
}

fn close_top(open: &mut Vec<Node>) {
    if let Some(done) = open.pop() {
        append(open, done);
    }
}

fn make_element(name: &str, attributes: &[(String, Option<String>)]) -> Node {
    let mut attrs = Vec::with_capacity(attributes.len());
    let mut style = Vec::new();
    for (key, value) in attributes {
        if key == "style" {
            style = parse_inline_style(value.as_deref().unwrap_or(""));
        } else {
            attrs.push((key.clone(), value.clone()));
        }
    }
    Node::Element {
        id: Id(0),
        name: name.to_string(),
        attributes: attrs,
        style,
        children: Vec::new(),
    }
}

/// Splits `a: b; c: d` into declarations. Values containing `;` inside
/// parentheses or quotes are not supported.
pub fn parse_inline_style(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            (!key.is_empty() && !value.is_empty())
                .then(|| (key.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}
