use crate::config::EnhanceConfig;
use core_types::{DocPos, HeadingId};
use html::dom_utils::heading_level;
use html::select::select_first;
use html::traverse::walk;
use html::{Id, Node, Selector};
use std::collections::HashMap;

/// A heading eligible for tracking.
#[derive(Clone, Debug, PartialEq)]
pub struct Heading {
    pub id: HeadingId,
    pub pos: DocPos,
    pub level: u8,
    pub node: Id,
}

/// Tracked headings in document order. Immutable once collected.
#[derive(Clone, Debug, Default)]
pub struct HeadingRegistry {
    headings: Vec<Heading>,
    by_id: HashMap<HeadingId, DocPos>,
}

impl HeadingRegistry {
    /// Collects headings of the configured levels that carry a non-empty `id`, scoped to the
    /// content region. A missing region yields an empty registry.
    pub fn collect(dom: &Node, config: &EnhanceConfig) -> Self {
        let region = Selector::parse(&config.content_selector)
            .ok()
            .and_then(|selector| select_first(dom, &selector));
        let Some(region) = region else {
            log::debug!(
                target: "enhance.toc",
                "no content region matches {:?}; heading tracking disabled",
                config.content_selector
            );
            return Self::default();
        };

        let mut registry = Self::default();
        walk(region, &mut |node| {
            let Some(level) = heading_level(node) else {
                return;
            };
            if !config.toc.heading_levels.contains(&level) {
                return;
            }
            // Ids are matched verbatim; only blank ones are rejected.
            match node.attr("id") {
                Some(id) if !id.trim().is_empty() => {
                    registry.push(HeadingId::new(id), level, node.id())
                }
                _ => {}
            }
        });
        log::debug!(target: "enhance.toc", "registered {} headings", registry.len());
        registry
    }

    /// Registry of level-2 headings with synthetic node ids, for driving the synchronizer
    /// without a document.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut registry = Self::default();
        for (i, id) in ids.into_iter().enumerate() {
            registry.push(HeadingId::new(id), 2, Id(i as u32 + 1));
        }
        registry
    }

    fn push(&mut self, id: HeadingId, level: u8, node: Id) {
        if self.by_id.contains_key(&id) {
            log::debug!(target: "enhance.toc", "duplicate heading id {id:?}; keeping the first");
            return;
        }
        let pos = self.headings.len();
        self.by_id.insert(id.clone(), pos);
        self.headings.push(Heading {
            id,
            pos,
            level,
            node,
        });
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    pub fn position(&self, id: &HeadingId) -> Option<DocPos> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, id: &HeadingId) -> Option<&Heading> {
        self.position(id).map(|pos| &self.headings[pos])
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }
}
