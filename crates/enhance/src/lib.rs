//! Load-time enhancements for generated documentation pages.
//!
//! A [`Page`] parses the rendered HTML, runs the one-shot mutators on ready, and then keeps
//! the table of contents in step with the reader's scroll position.
pub mod config;
pub mod error;
pub mod mutators;
pub mod page;
pub mod timers;
pub mod toc;

pub use config::{ActivationBand, EnhanceConfig};
pub use error::{EnhanceError, ObserveError, Result};
pub use page::{HostInfo, Page, ReadyReport};
