//! Folio data model
//!
//! Articles own an ordered collection of content blocks. This crate holds the
//! shared vocabulary used by the sequencing and layout crates.
//!
//! # Core Concepts
//!
//! - [`Block`]: one unit of article content with a kind and a position
//! - [`OrderKey`]: the numeric key defining a block's position among its siblings
//! - [`BlockContent`]: kind-specific payload (text, image, gallery)
//! - [`GalleryImage`]: transient per-render view of one gallery image
//!
//! # Example
//!
//! ```rust
//! use folio_model::{ArticleId, Block, BlockContent, OrderKey};
//!
//! let article = ArticleId::new();
//! let block = Block::new(article, BlockContent::text("hello"), OrderKey::ZERO);
//! assert_eq!(block.order, OrderKey::ZERO);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod block;
mod error;
mod gallery;
mod ids;

pub use block::{Block, BlockContent, BlockKind};
pub use error::ModelError;
pub use gallery::GalleryImage;
pub use ids::{ArticleId, BlockId, ImageId, ImageUrl, OrderKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
