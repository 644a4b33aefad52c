pub mod dom_utils;
pub mod select;
pub mod serialize;
pub mod traverse;

mod dom_builder;
mod entities;
mod tokenizer;
mod types;

/// Tokenizes and builds a document in one step.
pub fn parse_document(input: &str) -> Node {
    build_dom(&tokenize(input))
}

pub use crate::dom_builder::{build_dom, parse_inline_style};
pub use crate::select::{Selector, SelectorError, closest, query_all, query_first};
pub use crate::serialize::to_html;
pub use crate::tokenizer::{Tokenizer, tokenize};
pub use crate::types::{Id, Node, NodeId, Token};

