//! Minimal CSS selector matching over the DOM tree.
//!
//! Supported grammar:
//! - selector lists: `a, b`
//! - combinators: descendant (whitespace) and child (`>`)
//! - compounds: `tag`, `*`, `#id`, `.class`, `[attr]`, `[attr=v]`, `[attr^=v]`, `[attr$=v]`,
//!   `[attr*=v]`, `[attr~=v]` with quoted or bare values.
//!
//! Pseudo-classes and other combinators are rejected at parse time.
use crate::traverse::path_to;
use crate::{Id, Node};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector `{selector}`: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Contains,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One complex selector: the subject compound plus its ancestor constraints, nearest first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let err = |reason| SelectorError {
            selector: source.to_string(),
            reason,
        };
        let mut alternatives = Vec::new();
        for part in source.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(err("empty selector"));
            }
            alternatives.push(parse_complex(part).map_err(err)?);
        }
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node` matches, given its ancestors ordered from the root down to its parent.
    pub fn matches(&self, node: &Node, ancestors: &[&Node]) -> bool {
        self.alternatives
            .iter()
            .any(|complex| matches_complex(complex, node, ancestors))
    }
}

fn parse_complex(input: &str) -> Result<Complex, &'static str> {
    let bytes = input.as_bytes();
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut i = 0;
    let mut pending: Option<Combinator> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            if !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            i += 1;
            continue;
        }
        if b == b'>' {
            if compounds.is_empty() {
                return Err("combinator without left-hand side");
            }
            pending = Some(Combinator::Child);
            i += 1;
            continue;
        }
        if !compounds.is_empty() {
            combinators.push(pending.take().ok_or("missing combinator")?);
        }
        let (compound, next) = parse_compound(input, i)?;
        compounds.push(compound);
        i = next;
        pending = None;
    }

    if pending == Some(Combinator::Child) {
        return Err("dangling combinator");
    }
    let subject = compounds.pop().ok_or("empty selector")?;
    let ancestors = combinators
        .into_iter()
        .rev()
        .zip(compounds.into_iter().rev())
        .collect();
    Ok(Complex { subject, ancestors })
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn read_ident(input: &str, start: usize) -> (&str, usize) {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    (&input[start..end], end)
}

fn parse_compound(input: &str, mut i: usize) -> Result<(Compound, usize), &'static str> {
    let bytes = input.as_bytes();
    let mut compound = Compound::default();
    let start = i;

    if bytes[i] == b'*' {
        i += 1;
    } else if is_ident_byte(bytes[i]) {
        let (tag, next) = read_ident(input, i);
        compound.tag = Some(tag.to_ascii_lowercase());
        i = next;
    }

    while i < bytes.len() {
        match bytes[i] {
            b'#' | b'.' => {
                let (name, next) = read_ident(input, i + 1);
                if name.is_empty() {
                    return Err("empty id or class");
                }
                if bytes[i] == b'#' {
                    compound.ids.push(name.to_string());
                } else {
                    compound.classes.push(name.to_string());
                }
                i = next;
            }
            b'[' => {
                let close = input[i..].find(']').ok_or("unterminated attribute selector")?;
                compound.attrs.push(parse_attr(&input[i + 1..i + close])?);
                i += close + 1;
            }
            b':' => return Err("pseudo-classes are not supported"),
            b if b.is_ascii_whitespace() || b == b'>' => break,
            _ => return Err("unexpected character"),
        }
    }

    if i == start {
        return Err("unexpected character");
    }
    Ok((compound, i))
}

fn parse_attr(body: &str) -> Result<AttrTest, &'static str> {
    let Some(eq) = body.find('=') else {
        let name = body.trim();
        if name.is_empty() {
            return Err("empty attribute name");
        }
        return Ok(AttrTest {
            name: name.to_ascii_lowercase(),
            op: AttrOp::Exists,
            value: String::new(),
        });
    };
    let (lhs, rhs) = (&body[..eq], &body[eq + 1..]);
    let (name, op) = match lhs.as_bytes().last() {
        Some(b'^') => (&lhs[..lhs.len() - 1], AttrOp::Prefix),
        Some(b'$') => (&lhs[..lhs.len() - 1], AttrOp::Suffix),
        Some(b'*') => (&lhs[..lhs.len() - 1], AttrOp::Contains),
        Some(b'~') => (&lhs[..lhs.len() - 1], AttrOp::Word),
        _ => (lhs, AttrOp::Equals),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err("empty attribute name");
    }
    let rhs = rhs.trim();
    let value = rhs
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| rhs.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(rhs);
    Ok(AttrTest {
        name: name.to_ascii_lowercase(),
        op,
        value: value.to_string(),
    })
}

fn matches_compound(compound: &Compound, node: &Node) -> bool {
    let Some(name) = node.element_name() else {
        return false;
    };
    if compound.tag.as_deref().is_some_and(|tag| tag != name) {
        return false;
    }
    if !compound.ids.iter().all(|id| node.attr("id") == Some(id.as_str())) {
        return false;
    }
    if !compound.classes.iter().all(|class| node.has_class(class)) {
        return false;
    }
    compound.attrs.iter().all(|test| {
        let Some(actual) = node.attr(&test.name) else {
            return false;
        };
        match test.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == test.value,
            AttrOp::Prefix => !test.value.is_empty() && actual.starts_with(&test.value),
            AttrOp::Suffix => !test.value.is_empty() && actual.ends_with(&test.value),
            AttrOp::Contains => !test.value.is_empty() && actual.contains(&test.value),
            AttrOp::Word => actual.split_ascii_whitespace().any(|w| w == test.value),
        }
    })
}

fn matches_complex(complex: &Complex, node: &Node, ancestors: &[&Node]) -> bool {
    matches_compound(&complex.subject, node) && matches_ancestors(&complex.ancestors, ancestors)
}

fn matches_ancestors(parts: &[(Combinator, Compound)], ancestors: &[&Node]) -> bool {
    let Some(((combinator, compound), rest)) = parts.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => match ancestors.split_last() {
            Some((parent, above)) => {
                matches_compound(compound, parent) && matches_ancestors(rest, above)
            }
            None => false,
        },
        Combinator::Descendant => (0..ancestors.len()).rev().any(|i| {
            matches_compound(compound, ancestors[i]) && matches_ancestors(rest, &ancestors[..i])
        }),
    }
}

/// All elements under `root` (inclusive) matching `selector`, in document order.
pub fn select_all<'a>(root: &'a Node, selector: &Selector) -> Vec<&'a Node> {
    fn walk<'a>(
        node: &'a Node,
        selector: &Selector,
        ancestors: &mut Vec<&'a Node>,
        out: &mut Vec<&'a Node>,
    ) {
        if selector.matches(node, ancestors) {
            out.push(node);
        }
        ancestors.push(node);
        for c in node.children() {
            walk(c, selector, ancestors, out);
        }
        ancestors.pop();
    }

    let mut out = Vec::new();
    walk(root, selector, &mut Vec::new(), &mut out);
    out
}

pub fn select_first<'a>(root: &'a Node, selector: &Selector) -> Option<&'a Node> {
    fn walk<'a>(
        node: &'a Node,
        selector: &Selector,
        ancestors: &mut Vec<&'a Node>,
    ) -> Option<&'a Node> {
        if selector.matches(node, ancestors) {
            return Some(node);
        }
        ancestors.push(node);
        let found = node
            .children()
            .iter()
            .find_map(|c| walk(c, selector, ancestors));
        ancestors.pop();
        found
    }

    walk(root, selector, &mut Vec::new())
}

/// Like `select_all`, but only descendants of `scope` are candidates, and ancestors above
/// `scope` are not consulted.
pub fn select_within<'a>(scope: &'a Node, selector: &Selector) -> Vec<&'a Node> {
    let mut out = select_all(scope, selector);
    out.retain(|n| n.id() != scope.id());
    out
}

/// Nearest inclusive ancestor of `target` matching `selector`, like the DOM's `closest()`.
pub fn closest<'a>(root: &'a Node, target: Id, selector: &Selector) -> Option<&'a Node> {
    let path = path_to(root, target)?;
    (0..path.len())
        .rev()
        .find(|&i| selector.matches(path[i], &path[..i]))
        .map(|i| path[i])
}

/// Parses and runs a selector in one step. Invalid selectors match nothing.
pub fn query_all<'a>(root: &'a Node, selector: &str) -> Vec<&'a Node> {
    match Selector::parse(selector) {
        Ok(selector) => select_all(root, &selector),
        Err(err) => {
            log::debug!(target: "html.select", "{err}");
            Vec::new()
        }
    }
}

pub fn query_first<'a>(root: &'a Node, selector: &str) -> Option<&'a Node> {
    match Selector::parse(selector) {
        Ok(selector) => select_first(root, &selector),
        Err(err) => {
            log::debug!(target: "html.select", "{err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_dom, tokenize};

    const PAGE: &str = r##"
        <div class="md-header__title"><span>Docs</span></div>
        <nav class="md-nav">
          <a class="md-nav__link" href="#intro">Intro</a>
          <a class="md-nav__link md-nav__link--active" href="#setup">Setup</a>
        </nav>
        <article class="md-content__inner">
          <h2 id="intro">Intro</h2>
          <h3>No id</h3>
          <pre><code class="language-rust">fn main() {}</code></pre>
          <a href="https://example.org/x">ext</a>
        </article>
    "##;

    fn names(nodes: &[&Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| match n.attr("id").or(n.attr("href")) {
                Some(v) => format!("{}:{v}", n.element_name().unwrap_or("")),
                None => n.element_name().unwrap_or("").to_string(),
            })
            .collect()
    }

    #[test]
    fn class_and_attribute_selectors() {
        let dom = build_dom(&tokenize(PAGE));
        assert_eq!(
            names(&query_all(&dom, ".md-nav__link")),
            ["a:#intro", "a:#setup"]
        );
        assert_eq!(names(&query_all(&dom, r#"a[href^="http"]"#)), ["a:https://example.org/x"]);
        assert_eq!(names(&query_all(&dom, "a[href='#setup']")), ["a:#setup"]);
        assert_eq!(names(&query_all(&dom, "h2[id], h3[id]")), ["h2:intro"]);
    }

    #[test]
    fn descendant_and_child_combinators() {
        let dom = build_dom(&tokenize(PAGE));
        assert_eq!(names(&query_all(&dom, "pre code")), ["code"]);
        assert_eq!(names(&query_all(&dom, "article > pre > code")), ["code"]);
        assert!(query_all(&dom, "nav > code").is_empty());
        assert_eq!(names(&query_all(&dom, ".md-content__inner a")), ["a:https://example.org/x"]);
    }

    #[test]
    fn compound_class_requires_every_class() {
        let dom = build_dom(&tokenize(PAGE));
        assert_eq!(
            names(&query_all(&dom, "a.md-nav__link.md-nav__link--active")),
            ["a:#setup"]
        );
    }

    #[test]
    fn select_within_excludes_the_scope() {
        let dom = build_dom(&tokenize(PAGE));
        let article = query_first(&dom, "article").unwrap();
        let sel = Selector::parse("*").unwrap();
        assert!(select_within(article, &sel).iter().all(|n| n.id() != article.id()));
    }

    #[test]
    fn closest_walks_up_from_the_target() {
        let dom = build_dom(&tokenize(
            r#"<button class="md-clipboard"><svg><path></path></svg></button>"#,
        ));
        let path = query_first(&dom, "path").unwrap().id();
        let sel = Selector::parse(".md-clipboard").unwrap();
        let found = closest(&dom, path, &sel).unwrap();
        assert!(found.is_element("button"));
        let svg = Selector::parse("svg").unwrap();
        assert!(closest(&dom, found.id(), &svg).is_none());
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for bad in ["", "a,", "a:hover", "a >", "[=x]", ".", "a ~ b"] {
            assert!(Selector::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn errors_name_the_selector_and_reason() {
        let err = Selector::parse("a:hover").unwrap_err();
        assert_eq!(err.reason, "pseudo-classes are not supported");
        assert_eq!(
            err.to_string(),
            "invalid selector `a:hover`: pseudo-classes are not supported"
        );
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn invalid_queries_match_nothing() {
        let dom = build_dom(&tokenize(PAGE));
        assert!(query_all(&dom, "a:hover").is_empty());
        assert!(query_first(&dom, "a:hover").is_none());
    }
}
