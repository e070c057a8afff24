//! Scripted runs behind the `folio` command line
//!
//! Each run builds its own in-memory state, so a report depends only on its
//! inputs and the configuration.

use crate::config::FolioConfig;
use crate::draft::BlockDraft;
use crate::editor::{ArticleEditor, Placement};
use crate::error::{FolioError, Result};
use folio_masonry::{settle, GridSurface, MasonryConfig, MasonryLayoutEngine};
use folio_model::{ArticleId, Block, BlockContent, BlockKind, GalleryImage, ImageUrl, OrderKey};
use serde::Serialize;
use std::fmt;

/// Notification rounds allowed before a layout run gives up
pub const MAX_SETTLE_ROUNDS: usize = 64;

/// Block operations replayed on a fresh article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceScript {
    /// Text blocks appended first
    pub blocks: usize,
    /// Kind of every inserted block
    pub insert_kind: BlockKind,
    /// Insert one block after each of these orders, in turn
    pub insert_after: Vec<OrderKey>,
    /// Then delete the block at each of these orders, in turn
    pub delete: Vec<OrderKey>,
}

impl Default for SequenceScript {
    fn default() -> Self {
        Self::new(3)
    }
}

impl SequenceScript {
    /// Script appending `blocks` text blocks and nothing else
    #[inline]
    #[must_use]
    pub fn new(blocks: usize) -> Self {
        Self {
            blocks,
            insert_kind: BlockKind::Text,
            insert_after: Vec::new(),
            delete: Vec::new(),
        }
    }

    /// With kind of inserted blocks
    #[inline]
    #[must_use]
    pub fn with_insert_kind(mut self, kind: BlockKind) -> Self {
        self.insert_kind = kind;
        self
    }

    /// With one more insert
    #[inline]
    #[must_use]
    pub fn with_insert_after(mut self, order: OrderKey) -> Self {
        self.insert_after.push(order);
        self
    }

    /// With one more delete
    #[inline]
    #[must_use]
    pub fn with_delete(mut self, order: OrderKey) -> Self {
        self.delete.push(order);
        self
    }
}

/// Complete draft of `kind`, with hosted sample images where one is needed
#[must_use]
pub fn sample_draft(kind: BlockKind, label: &str, n: usize) -> BlockDraft {
    let image = ImageUrl::new(format!("sample-{n}.png"));
    match kind {
        BlockKind::Text => BlockDraft::text(label),
        BlockKind::TextImage => BlockDraft::text_image(label, image),
        BlockKind::Image => BlockDraft::image(image),
        BlockKind::Patterned => BlockDraft::patterned(vec![image.into()]),
    }
}

/// Article state after a [`SequenceScript`]
#[derive(Debug, Clone, Serialize)]
pub struct SequenceReport {
    /// Article the script ran on
    pub article: ArticleId,
    /// Blocks in render order
    pub blocks: Vec<Block>,
}

impl SequenceReport {
    /// Orders of the remaining blocks
    #[must_use]
    pub fn orders(&self) -> Vec<i64> {
        self.blocks.iter().map(|b| b.order.value()).collect()
    }
}

impl fmt::Display for SequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Article {}", self.article)?;
        for block in &self.blocks {
            let label = match &block.content {
                BlockContent::Text { text } | BlockContent::TextImage { text, .. } => text.as_str(),
                BlockContent::Image { .. } | BlockContent::Patterned { .. } => "",
            };
            writeln!(f, "  {:>4}  {:<10}  {}", block.order, block.kind(), label)?;
        }
        Ok(())
    }
}

/// Replay `script` on a fresh in-memory article
///
/// # Errors
/// - `FolioError::Sequence` if an insert names a missing anchor
/// - `FolioError::NoBlockAtOrder` if a delete names a missing order
pub async fn run_sequence(config: &FolioConfig, script: &SequenceScript) -> Result<SequenceReport> {
    let editor = ArticleEditor::in_memory(config);
    let article = ArticleId::new();

    for i in 0..script.blocks {
        editor
            .add_block(article, BlockDraft::text(format!("block {i}")), Placement::End)
            .await?;
    }

    for (n, after) in script.insert_after.iter().enumerate() {
        let draft = sample_draft(script.insert_kind, &format!("inserted after {after}"), n);
        editor
            .add_block(article, draft, Placement::After(*after))
            .await?;
    }

    for order in &script.delete {
        let blocks = editor.blocks(article).await?;
        let target = blocks
            .iter()
            .find(|b| b.order == *order)
            .ok_or(FolioError::NoBlockAtOrder(*order))?;
        editor.delete_block(target.id).await?;
    }

    tracing::debug!(
        "Replayed {} inserts and {} deletes on article {}",
        script.insert_after.len(),
        script.delete.len(),
        article
    );
    Ok(SequenceReport {
        article,
        blocks: editor.blocks(article).await?,
    })
}

/// Gallery to lay out
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    /// Width / height ratio per image, in gallery order
    pub ratios: Vec<f32>,
    /// Viewport width in px
    pub viewport_px: f32,
    /// Gallery container width in px
    pub container_px: f32,
    /// Indices of images that fail to load
    pub failed: Vec<usize>,
}

impl LayoutRequest {
    /// Request at a 1024px viewport with a 900px container
    #[inline]
    #[must_use]
    pub fn new(ratios: Vec<f32>) -> Self {
        Self {
            ratios,
            viewport_px: 1024.0,
            container_px: 900.0,
            failed: Vec::new(),
        }
    }

    /// With viewport and container widths
    #[inline]
    #[must_use]
    pub fn with_size(mut self, viewport_px: f32, container_px: f32) -> Self {
        self.viewport_px = viewport_px;
        self.container_px = container_px;
        self
    }

    /// With one more image failing to load
    #[inline]
    #[must_use]
    pub fn with_failed(mut self, index: usize) -> Self {
        self.failed.push(index);
        self
    }
}

/// Settled layout of a [`LayoutRequest`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    /// CSS column template
    pub template: String,
    /// Resolved column count
    pub columns: usize,
    /// Width of each column in px
    pub column_width: f32,
    /// Requested ratios
    pub ratios: Vec<f32>,
    /// Row span per image, in gallery order
    pub spans: Vec<u32>,
    /// Span maps committed while settling
    pub commits: u64,
    /// Whether the observer loop went quiet
    pub converged: bool,
    /// Notification rounds processed
    pub rounds: usize,
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template: {}", self.template)?;
        writeln!(f, "Columns: {} x {:.1}px", self.columns, self.column_width)?;
        for (i, (ratio, span)) in self.ratios.iter().zip(&self.spans).enumerate() {
            writeln!(f, "  {:<8} ratio {:>5.2}  span {}", format!("img-{i}"), ratio, span)?;
        }
        writeln!(f, "Commits: {} (converged: {})", self.commits, self.converged)
    }
}

/// Load every image of `request` on a grid and settle the layout
#[must_use]
pub fn run_layout(config: &MasonryConfig, request: &LayoutRequest) -> LayoutReport {
    let images: Vec<GalleryImage> = request
        .ratios
        .iter()
        .enumerate()
        .map(|(i, ratio)| {
            GalleryImage::new(format!("img-{i}"), ImageUrl::new(format!("img-{i}")))
                .with_aspect_ratio(*ratio)
        })
        .collect();

    let mut engine = MasonryLayoutEngine::new(*config, images.clone());
    let mut surface = GridSurface::new(*config, request.viewport_px, request.container_px, &images);
    engine.observe(&mut surface);

    let mut triggers = Vec::with_capacity(images.len());
    for (i, (image, ratio)) in images.iter().zip(&request.ratios).enumerate() {
        let trigger = if request.failed.contains(&i) {
            surface.fail(&image.id)
        } else {
            surface.load(&image.id, *ratio)
        };
        triggers.extend(trigger);
    }

    let settled = settle(&mut engine, &mut surface, triggers, MAX_SETTLE_ROUNDS);
    if !settled.converged {
        tracing::warn!("Layout still changing after {} rounds", settled.rounds);
    }

    LayoutReport {
        template: engine.template().to_string(),
        columns: surface.columns(),
        column_width: surface.column_width(),
        ratios: request.ratios.clone(),
        spans: images.iter().map(|image| engine.span(&image.id)).collect(),
        commits: settled.commits,
        converged: settled.converged,
        rounds: settled.rounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_sequence::SequenceError;

    #[tokio::test]
    async fn default_script_appends_three() {
        let report = run_sequence(&FolioConfig::default(), &SequenceScript::default())
            .await
            .unwrap();
        assert_eq!(report.orders(), vec![0, 1, 2]);
        assert!(report.to_string().contains("block 2"));
    }

    #[tokio::test]
    async fn inserts_then_deletes() {
        let script = SequenceScript::new(3)
            .with_insert_kind(BlockKind::Image)
            .with_insert_after(OrderKey::ZERO)
            .with_delete(OrderKey::new(2));

        let report = run_sequence(&FolioConfig::default(), &script).await.unwrap();

        // "block 1" was shifted to 2, then deleted
        assert_eq!(report.orders(), vec![0, 1, 3]);
        let kinds: Vec<BlockKind> = report.blocks.iter().map(Block::kind).collect();
        assert_eq!(kinds, vec![BlockKind::Text, BlockKind::Image, BlockKind::Text]);
    }

    #[tokio::test]
    async fn missing_orders_are_reported() {
        let config = FolioConfig::default();

        let err = run_sequence(&config, &SequenceScript::new(2).with_delete(OrderKey::new(9)))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::NoBlockAtOrder(order) if order == OrderKey::new(9)));

        let err = run_sequence(
            &config,
            &SequenceScript::new(0).with_insert_after(OrderKey::ZERO),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            FolioError::Sequence(SequenceError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn every_kind_has_a_complete_sample() {
        for kind in BlockKind::ALL {
            let draft = sample_draft(kind, "label", 0);
            assert_eq!(draft.kind(), kind);
            assert!(draft.validate().is_ok(), "{kind} sample is incomplete");
        }
    }

    #[test]
    fn layout_of_three_images() {
        let request = LayoutRequest::new(vec![1.0, 0.5, 2.0]).with_size(1024.0, 612.0);
        let report = run_layout(&MasonryConfig::default(), &request);

        assert_eq!(report.columns, 3);
        assert_eq!(report.spans, vec![11, 21, 6]);
        assert_eq!(report.commits, 1);
        assert!(report.converged);
        assert!(report.to_string().contains("span 21"));
    }

    #[test]
    fn failed_image_keeps_default_span() {
        let request = LayoutRequest::new(vec![1.0, 0.5, 2.0])
            .with_size(1024.0, 612.0)
            .with_failed(1);
        let report = run_layout(&MasonryConfig::default(), &request);

        assert_eq!(report.spans, vec![11, 1, 6]);
        assert!(report.converged);
    }
}
