//! Level 4: Locate and Paint Tests
//!
//! Tests that hit-testing and painting agree: a point locates the node whose
//! pixels are drawn there, through links, overlaps and zoom.

mod common;

use common::harness::Pool;
use slint::Rgba8Pixel;
use vt_pool_view::{locate, DiagnosticKind, RenderOptions};

const RED: Rgba8Pixel = Rgba8Pixel { r: 0xFF, g: 0, b: 0, a: 0xFF };
const BLUE: Rgba8Pixel = Rgba8Pixel { r: 0, g: 0, b: 0xFF, a: 0xFF };
const WHITE: Rgba8Pixel = Rgba8Pixel { r: 0xFF, g: 0xFF, b: 0xFF, a: 0xFF };

fn filled_rect<'a>(name: &'a str, x: &'a str, y: &'a str, colour: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("pos_x", x),
        ("pos_y", y),
        ("width", "40"),
        ("height", "30"),
        ("fill_type", "fillcolour"),
        ("fill_colour", colour),
        ("line_width", "0"),
    ]
}

// ============================================================================
// Agreement
// ============================================================================

#[test]
fn test_locate_matches_painted_pixels() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(dm, "rectangle", &filled_rect("box", "20", "20", "12"));

    let start = pool.path("dm");
    let box_path = pool.descend(&start, 0);
    let (raster, outcome) = pool.paint(&start, 200, 200, &RenderOptions::default());
    assert!(outcome.report.is_clean());

    for y in (0..200).step_by(5) {
        for x in (0..200).step_by(5) {
            let hit = pool.locate(&start, x as f32 + 0.5, y as f32 + 0.5);
            let on_box = hit.as_ref() == Some(&box_path);
            assert_eq!(on_box, raster.pixel(x, y) == Some(RED), "at ({x}, {y})");
            assert!(hit.is_some());
        }
    }
}

#[test]
fn test_locate_outside_start_is_none() {
    let mut pool = Pool::new();
    pool.object("datamask", "dm", &[]);
    assert!(pool.locate(&pool.path("dm"), 250.0, 10.0).is_none());
    assert!(pool.locate(&pool.path("dm"), -1.0, 10.0).is_none());
}

#[test]
fn test_later_sibling_is_on_top() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(dm, "rectangle", &filled_rect("under", "10", "10", "12"));
    pool.add(dm, "rectangle", &filled_rect("over", "30", "20", "9"));

    let start = pool.path("dm");
    let (raster, _) = pool.paint(&start, 200, 200, &RenderOptions::default());
    assert_eq!(raster.pixel(35, 25), Some(BLUE));
    assert_eq!(raster.pixel(15, 15), Some(RED));
    assert_eq!(pool.locate(&start, 35.0, 25.0), Some(pool.descend(&start, 1)));
    assert_eq!(pool.locate(&start, 15.0, 15.0), Some(pool.descend(&start, 0)));
}

#[test]
fn test_deepest_node_wins() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    let group = pool.add(
        dm,
        "container",
        &[("name", "group"), ("pos_x", "50"), ("pos_y", "50"), ("width", "100"), ("height", "100")],
    );
    pool.add(group, "rectangle", &filled_rect("inner", "10", "10", "12"));

    let start = pool.path("dm");
    let group_path = pool.descend(&start, 0);
    let inner_path = pool.descend(&group_path, 0);
    assert_eq!(pool.locate(&start, 65.0, 65.0), Some(inner_path));
    assert_eq!(pool.locate(&start, 140.0, 140.0), Some(group_path));

    let (raster, _) = pool.paint(&start, 200, 200, &RenderOptions::default());
    assert_eq!(raster.pixel(65, 65), Some(RED));
}

// ============================================================================
// Links
// ============================================================================

#[test]
fn test_each_link_instance_is_located_separately() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.object("rectangle", "shared", &filled_rect("ignored", "0", "0", "12")[1..]);
    pool.link(dm, "shared", &[("pos_x", "10"), ("pos_y", "10")]);
    pool.link(dm, "shared", &[("pos_x", "100"), ("pos_y", "100")]);

    let start = pool.path("dm");
    let first = pool.locate(&start, 15.0, 15.0).unwrap();
    let second = pool.locate(&start, 105.0, 105.0).unwrap();
    assert_eq!(first, pool.descend(&start, 0));
    assert_eq!(second, pool.descend(&start, 1));
    assert_ne!(first, second);

    let (raster, _) = pool.paint(&start, 200, 200, &RenderOptions::default());
    assert_eq!(raster.pixel(15, 15), Some(RED));
    assert_eq!(raster.pixel(105, 105), Some(RED));
    assert_eq!(raster.pixel(80, 80), Some(WHITE));
}

#[test]
fn test_broken_link_draws_and_matches_nothing() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.link(dm, "missing", &[("pos_x", "10"), ("pos_y", "10")]);

    let start = pool.path("dm");
    assert_eq!(pool.locate(&start, 15.0, 15.0), Some(start.clone()));

    let (raster, outcome) = pool.paint(&start, 200, 200, &RenderOptions::default());
    assert_eq!(raster.pixel(15, 15), Some(WHITE));
    assert_eq!(outcome.report.count(DiagnosticKind::BrokenLink), 1);
    assert_eq!(outcome.report.final_depth, 0);
}

// ============================================================================
// Zoom and clipping
// ============================================================================

#[test]
fn test_zoomed_locate_and_paint_agree() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(dm, "rectangle", &filled_rect("box", "20", "20", "12"));

    let options = RenderOptions::default().with_zoom(2.0);
    let start = pool.path("dm");
    let box_path = pool.descend(&start, 0);
    let (raster, _) = pool.paint(&start, 400, 400, &options);

    let hit = locate(
        &pool.doc,
        &pool.tree,
        &options,
        &pool.pictures,
        &start,
        None,
        100.0,
        80.0,
    );
    assert_eq!(hit, Some(box_path));
    assert_eq!(raster.pixel(100, 80), Some(RED));

    let miss = locate(
        &pool.doc,
        &pool.tree,
        &options,
        &pool.pictures,
        &start,
        None,
        30.0,
        30.0,
    );
    assert_eq!(miss, Some(start));
    assert_eq!(raster.pixel(30, 30), Some(WHITE));
}

#[test]
fn test_clipped_part_is_neither_drawn_nor_found() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    let group = pool.add(
        dm,
        "container",
        &[("name", "group"), ("width", "30"), ("height", "30")],
    );
    pool.add(group, "rectangle", &filled_rect("wide", "0", "0", "12"));

    let start = pool.path("dm");
    let group_path = pool.descend(&start, 0);
    let (raster, _) = pool.paint(&start, 200, 200, &RenderOptions::default());

    assert_eq!(raster.pixel(10, 10), Some(RED));
    assert_eq!(raster.pixel(35, 10), Some(WHITE));
    assert_ne!(pool.locate(&start, 35.0, 10.0), Some(pool.descend(&group_path, 0)));
    assert_eq!(pool.locate(&start, 35.0, 10.0), Some(start));
}

#[test]
fn test_mask_background_fills_frame() {
    let mut pool = Pool::new();
    pool.object("datamask", "dm", &[("background_colour", "red")]);

    let (raster, outcome) = pool.paint(&pool.path("dm"), 220, 220, &RenderOptions::default());
    assert!(outcome.report.is_clean());
    assert_eq!(raster.pixel(0, 0), Some(RED));
    assert_eq!(raster.pixel(199, 199), Some(RED));
    assert_ne!(raster.pixel(205, 205), Some(RED));
}
