//! Article presentation
//!
//! Turns stored blocks into what the page renders, in ascending order. Every
//! gallery gets its own [`MasonryLayoutEngine`], created fresh per render.

use folio_masonry::{MasonryConfig, MasonryLayoutEngine};
use folio_model::{Block, BlockContent, BlockId, BlockKind, ImageUrl};

/// One block ready to render
///
/// A `None` image renders as a placeholder.
#[derive(Debug)]
pub enum RenderedBlock {
    /// Full-width text
    Text {
        /// Source block
        id: BlockId,
        /// Text body
        text: String,
    },
    /// Text beside an image
    TextImage {
        /// Source block
        id: BlockId,
        /// Text body
        text: String,
        /// Image, or placeholder
        image: Option<ImageUrl>,
    },
    /// Centered image
    Image {
        /// Source block
        id: BlockId,
        /// Image, or placeholder
        image: Option<ImageUrl>,
    },
    /// Masonry gallery
    Gallery {
        /// Source block
        id: BlockId,
        /// Layout state for this gallery
        layout: MasonryLayoutEngine,
    },
}

impl RenderedBlock {
    /// Source block ID
    #[must_use]
    pub fn id(&self) -> BlockId {
        match self {
            Self::Text { id, .. }
            | Self::TextImage { id, .. }
            | Self::Image { id, .. }
            | Self::Gallery { id, .. } => *id,
        }
    }

    /// Kind of the source block
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text { .. } => BlockKind::Text,
            Self::TextImage { .. } => BlockKind::TextImage,
            Self::Image { .. } => BlockKind::Image,
            Self::Gallery { .. } => BlockKind::Patterned,
        }
    }

    /// Check if an image slot has nothing to show
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            Self::TextImage { image: None, .. } | Self::Image { image: None, .. }
        )
    }
}

/// Read-side renderer for an article
#[derive(Debug, Clone, Default)]
pub struct ArticleView {
    masonry: MasonryConfig,
}

impl ArticleView {
    /// Create view with gallery layout configuration
    #[inline]
    #[must_use]
    pub fn new(masonry: MasonryConfig) -> Self {
        Self { masonry }
    }

    /// Render blocks in ascending order
    #[must_use]
    pub fn render(&self, blocks: &[Block]) -> Vec<RenderedBlock> {
        let mut ordered: Vec<&Block> = blocks.iter().collect();
        ordered.sort_by_key(|b| b.order);

        ordered
            .into_iter()
            .map(|block| self.render_block(block))
            .collect()
    }

    fn render_block(&self, block: &Block) -> RenderedBlock {
        let id = block.id;
        match &block.content {
            BlockContent::Text { text } => RenderedBlock::Text {
                id,
                text: text.clone(),
            },
            BlockContent::TextImage { text, image_url } => RenderedBlock::TextImage {
                id,
                text: text.clone(),
                image: image_url.clone(),
            },
            BlockContent::Image { image_url } => RenderedBlock::Image {
                id,
                image: image_url.clone(),
            },
            BlockContent::Patterned { .. } => RenderedBlock::Gallery {
                id,
                layout: MasonryLayoutEngine::new(self.masonry, block.gallery_images()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{ArticleId, OrderKey};

    #[test]
    fn renders_in_ascending_order() {
        let article = ArticleId::new();
        let blocks = vec![
            Block::new(article, BlockContent::text("second"), OrderKey::new(7)),
            Block::new(
                article,
                BlockContent::Image { image_url: None },
                OrderKey::new(9),
            ),
            Block::new(article, BlockContent::text("first"), OrderKey::new(2)),
        ];

        let rendered = ArticleView::default().render(&blocks);
        let ids: Vec<BlockId> = rendered.iter().map(RenderedBlock::id).collect();
        assert_eq!(ids, vec![blocks[2].id, blocks[0].id, blocks[1].id]);
        assert!(rendered[2].is_placeholder());
        assert!(!rendered[0].is_placeholder());
    }

    #[test]
    fn gallery_gets_fresh_engine_with_block_scoped_ids() {
        let article = ArticleId::new();
        let block = Block::new(
            article,
            BlockContent::patterned(vec!["a.png".into(), "b.png".into(), "c.png".into()]),
            OrderKey::ZERO,
        );

        let rendered = ArticleView::default().render(std::slice::from_ref(&block));
        let RenderedBlock::Gallery { layout, .. } = &rendered[0] else {
            panic!("expected gallery");
        };
        assert_eq!(layout.images().len(), 3);
        assert_eq!(layout.images()[1].id.as_str(), format!("{}-1", block.id));
        assert_eq!(layout.commits(), 0);
        assert!(layout.spans().is_empty());
    }
}
