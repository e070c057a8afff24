use folio_masonry::{
    settle, ColumnTemplate, ElementKey, ElementPart, GridSurface, LayoutTrigger, MasonryConfig,
    MasonryLayoutEngine, ResizeObserver, SpanMap,
};
use folio_model::{GalleryImage, ImageId};
use folio_test_utils::{gallery, RecordingObserver};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn loaded(
    images: &[GalleryImage],
    viewport: f32,
    container: f32,
) -> (MasonryLayoutEngine, GridSurface, Vec<LayoutTrigger>) {
    let config = MasonryConfig::default();
    let engine = MasonryLayoutEngine::new(config, images.to_vec());
    let mut surface = GridSurface::new(config, viewport, container, images);
    engine.observe(&mut surface);
    let triggers = surface.load_known(images);
    (engine, surface, triggers)
}

fn spans(entries: &[(&str, u32)]) -> SpanMap {
    let mut map = SpanMap::new();
    for (id, span) in entries {
        map.insert(ImageId::from(*id), *span);
    }
    map
}

#[test]
fn settles_with_a_single_commit() {
    let images = gallery(&[1.0, 0.5, 2.0]);
    // 3 columns of 196px
    let (mut engine, mut surface, triggers) = loaded(&images, 1024.0, 612.0);
    assert_eq!(surface.columns(), 3);
    assert_eq!(surface.column_width(), 196.0);

    let settled = settle(&mut engine, &mut surface, triggers, 16);

    assert!(settled.converged);
    assert_eq!(settled.commits, 1);
    assert_eq!(
        engine.spans(),
        &spans(&[("img-0", 11), ("img-1", 21), ("img-2", 6)])
    );
    for image in &images {
        assert_eq!(surface.rendered_span(&image.id), Some(engine.span(&image.id)));
    }
}

#[test]
fn observed_wrappers_still_converge() {
    let images = gallery(&[1.0, 0.5, 2.0]);
    let (mut engine, mut surface, triggers) = loaded(&images, 1024.0, 612.0);
    // Watching the wrappers feeds every applied span back in as a resize
    for image in &images {
        surface.observe(ElementKey::wrapper(image.id.clone()));
    }

    let settled = settle(&mut engine, &mut surface, triggers, 16);

    assert!(settled.converged);
    assert_eq!(settled.commits, 1);
    assert!(settled.rounds >= 1);
}

#[test]
fn converged_layout_ignores_repeated_callbacks() {
    let images = gallery(&[1.5, 0.75]);
    let (mut engine, mut surface, triggers) = loaded(&images, 1024.0, 612.0);
    settle(&mut engine, &mut surface, triggers, 16);
    let commits = engine.commits();

    for _ in 0..50 {
        assert!(!engine.handle(LayoutTrigger::Resized, &surface));
    }
    assert_eq!(engine.commits(), commits);
}

#[test]
fn unloaded_image_keeps_default_span() {
    let mut images = gallery(&[1.0, 1.0, 2.0]);
    images[1].aspect_ratio = None;
    let (mut engine, mut surface, triggers) = loaded(&images, 1024.0, 612.0);
    assert_eq!(triggers.len(), 2);

    let settled = settle(&mut engine, &mut surface, triggers, 16);

    assert!(settled.converged);
    assert_eq!(engine.span(&images[1].id), 1);
    assert_eq!(engine.spans().computed(&images[1].id), None);
    assert_eq!(engine.span(&images[0].id), 11);
    assert_eq!(engine.span(&images[2].id), 6);
}

#[test]
fn failed_image_keeps_span_and_others_compute() {
    let images = gallery(&[1.0, 0.5, 2.0]);
    let (mut engine, mut surface, _) = loaded(&images, 1024.0, 612.0);

    let mut triggers = Vec::new();
    triggers.extend(surface.load(&images[0].id, 1.0));
    triggers.extend(surface.fail(&images[1].id));
    triggers.extend(surface.load(&images[2].id, 2.0));
    let settled = settle(&mut engine, &mut surface, triggers, 16);

    assert!(settled.converged);
    assert_eq!(engine.span(&images[1].id), 1);
    assert_eq!(engine.span(&images[0].id), 11);
}

#[test]
fn resize_recomputes_spans() {
    let images = gallery(&[1.0, 0.5, 2.0]);
    let (mut engine, mut surface, triggers) = loaded(&images, 1024.0, 612.0);
    settle(&mut engine, &mut surface, triggers, 16);

    // One track fits, two are kept: 144px columns
    let trigger = surface.resize(1024.0, 300.0);
    assert_eq!(surface.columns(), 2);
    let settled = settle(&mut engine, &mut surface, [trigger], 16);

    assert!(settled.converged);
    assert_eq!(settled.commits, 1);
    assert_eq!(
        engine.spans(),
        &spans(&[("img-0", 8), ("img-1", 15), ("img-2", 5)])
    );
}

#[test]
fn image_set_change_starts_over() {
    let images = gallery(&[1.0, 0.5, 2.0]);
    let (mut engine, mut surface, triggers) = loaded(&images, 1024.0, 612.0);
    settle(&mut engine, &mut surface, triggers, 16);

    let commits = engine.commits();

    // Unmeasured replacement renders at the default span before and after
    let replacement = vec![GalleryImage::new("fresh", images[0].url.clone())];
    assert!(!engine.handle(LayoutTrigger::ImagesChanged(replacement), &surface));
    assert!(engine.spans().is_empty());
    assert_eq!(engine.span(&ImageId::from("fresh")), 1);
    assert_eq!(engine.span(&images[0].id), 1);
    assert_eq!(engine.commits(), commits);
}

#[test]
fn narrow_viewport_keeps_multiple_columns() {
    let config = MasonryConfig::default();
    let images = gallery(&[1.0; 5]);

    for (viewport, container) in [(320.0, 288.0), (375.0, 343.0), (200.0, 150.0)] {
        let surface = GridSurface::new(config, viewport, container, &images);
        assert!(
            surface.columns() > 1,
            "{} columns at {}px",
            surface.columns(),
            viewport
        );
    }
}

#[test]
fn two_images_sit_side_by_side() {
    let config = MasonryConfig::default();
    let images = gallery(&[1.0, 1.0]);
    let surface = GridSurface::new(config, 1920.0, 1400.0, &images);

    assert_eq!(surface.template(), ColumnTemplate::Fixed { columns: 2 });
    assert_eq!(surface.template().to_string(), "repeat(2, minmax(0, 1fr))");
    assert_eq!(surface.columns(), 2);
}

#[test]
fn engine_observes_content_only() {
    let engine = MasonryLayoutEngine::new(MasonryConfig::default(), gallery(&[1.0, 2.0, 3.0]));
    let mut observer = RecordingObserver::default();
    engine.observe(&mut observer);
    engine.observe(&mut observer);

    assert_eq!(observer.disconnects, 2);
    assert_eq!(observer.observed.len(), 3);
    assert!(observer
        .observed
        .iter()
        .all(|element| element.part == ElementPart::Content));
}

proptest! {
    #[test]
    fn settled_layout_is_a_fixed_point(
        ratios in prop::collection::vec(0.2f32..5.0, 1..12),
        viewport in 320.0f32..1920.0,
        container in 200.0f32..1400.0,
    ) {
        let images = gallery(&ratios);
        let (mut engine, mut surface, triggers) = loaded(&images, viewport, container);

        let settled = settle(&mut engine, &mut surface, triggers, 32);
        prop_assert!(settled.converged);
        prop_assert!(settled.commits <= 1);

        let commits = engine.commits();
        prop_assert!(!engine.recompute(&surface));
        prop_assert_eq!(engine.commits(), commits);
        for image in &images {
            prop_assert!(engine.span(&image.id) >= 1);
        }
    }
}
