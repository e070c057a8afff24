//! Folio Core - article editing and presentation
//!
//! Composes block sequencing and masonry layout into the two surfaces of the
//! site:
//! - [`ArticleEditor`]: add, insert, edit and delete blocks, uploading images
//!   through a [`BlobStore`] first
//! - [`ArticleView`]: ordered rendered blocks, with a fresh
//!   [`MasonryLayoutEngine`](folio_masonry::MasonryLayoutEngine) per gallery
//! - [`report`]: scripted sequencing and layout runs used by the `folio`
//!   command line
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), FolioError> {
//! let config = FolioConfig::new();
//! let editor = ArticleEditor::in_memory(&config);
//! let article = ArticleId::new();
//!
//! editor
//!     .add_block(article, BlockDraft::text("Hello"), Placement::End)
//!     .await?;
//!
//! let view = ArticleView::new(config.masonry);
//! let rendered = view.render(&editor.blocks(article).await?);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod blob;
pub mod config;
pub mod draft;
pub mod editor;
pub mod error;
pub mod report;
pub mod view;

pub use blob::{upload_path, BlobError, BlobStore, InMemoryBlobStore};
pub use config::{ConfigError, FolioConfig, StorageConfig};
pub use draft::{BlockDraft, ImageFile, ImageSource};
pub use editor::{ArticleEditor, Placement};
pub use error::FolioError;
pub use report::{LayoutReport, LayoutRequest, SequenceReport, SequenceScript};
pub use view::{ArticleView, RenderedBlock};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Folio Core
    pub use crate::{
        ArticleEditor, ArticleView, BlockDraft, FolioConfig, FolioError, ImageFile, ImageSource,
        Placement, RenderedBlock,
    };
    pub use folio_model::{ArticleId, Block, BlockContent, BlockId, BlockKind, OrderKey};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
