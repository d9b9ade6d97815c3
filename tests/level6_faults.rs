//! Level 6: Fault Containment Tests
//!
//! Tests that malformed attributes, missing bitmaps and a malformed root are
//! reported as diagnostics while the rest of the pool is still drawn.

mod common;

use common::harness::Pool;
use common::RecordingVisitor;
use slint::Rgba8Pixel;
use std::path::Path;
use std::time::Instant;
use vt_pool_view::{DiagnosticKind, Rect, RenderOptions};

const RED: Rgba8Pixel = Rgba8Pixel { r: 0xFF, g: 0, b: 0, a: 0xFF };
const BLUE: Rgba8Pixel = Rgba8Pixel { r: 0, g: 0, b: 0xFF, a: 0xFF };
const WHITE: Rgba8Pixel = Rgba8Pixel { r: 0xFF, g: 0xFF, b: 0xFF, a: 0xFF };
const SILVER: Rgba8Pixel = Rgba8Pixel { r: 0xCC, g: 0xCC, b: 0xCC, a: 0xFF };

fn write_blue_png(dir: &Path, name: &str, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 255, 255]));
    img.save(dir.join(name)).unwrap();
}

fn red_square<'a>(name: &'a str, x: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("pos_x", x),
        ("width", "20"),
        ("height", "20"),
        ("fill_type", "fillcolour"),
        ("fill_colour", "12"),
        ("line_width", "0"),
    ]
}

// ============================================================================
// Attribute faults
// ============================================================================

#[test]
fn test_bad_colour_is_reported_and_sibling_drawn() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    let mut bad = red_square("bad", "0");
    bad.push(("line_colour", "chartreuse"));
    pool.add(dm, "rectangle", &bad);
    pool.add(dm, "rectangle", &red_square("good", "50"));

    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    let report = &outcome.report;
    assert_eq!(report.count(DiagnosticKind::AttributeParse), 1);
    assert_eq!(report.diagnostics[0].object, "rectangle \"bad\"");
    assert!(report.diagnostics[0].message.contains("line_colour"));
    assert_eq!(raster.pixel(55, 5), Some(RED));
    assert_eq!(report.final_depth, 0);
}

#[test]
fn test_bad_number_value_in_output_field() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(dm, "outputnumber", &[("name", "n"), ("value", "lots"), ("width", "40"), ("height", "10")]);

    let (_, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    assert_eq!(outcome.report.count(DiagnosticKind::AttributeParse), 1);
    assert!(outcome.report.diagnostics[0].message.contains("lots"));
}

#[test]
fn test_bad_input_list_value() {
    let mut pool = Pool::new();
    let list = pool.object("inputlist", "list", &[("value", "first")]);
    pool.add(list, "rectangle", &[("name", "r0")]);

    let (_, outcome) = pool.paint(&pool.path("list"), 200, 200, &RenderOptions::default());
    assert_eq!(outcome.report.count(DiagnosticKind::AttributeParse), 1);
    assert_eq!(outcome.report.visits, 1);
}

#[test]
fn test_oversized_field_length_is_reported() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(
        dm,
        "outputnumber",
        &[
            ("name", "padded"),
            ("value", "5"),
            ("options", "leadingzeros"),
            ("length", "1e20"),
            ("width", "40"),
            ("height", "10"),
        ],
    );
    pool.add(
        dm,
        "outputnumber",
        &[("name", "precise"), ("value", "5"), ("number_of_decimals", "100000")],
    );
    pool.add(dm, "rectangle", &red_square("after", "50"));

    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    let report = &outcome.report;
    assert_eq!(report.count(DiagnosticKind::AttributeParse), 2);
    assert_eq!(report.diagnostics[0].object, "outputnumber \"padded\"");
    assert!(report.diagnostics[0].message.contains("length"));
    assert!(report.diagnostics[1].message.contains("number_of_decimals"));
    assert_eq!(raster.pixel(55, 5), Some(RED));
}

#[test]
fn test_oversized_line_width_is_reported() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(
        dm,
        "line",
        &[("name", "fat"), ("width", "10"), ("height", "10"), ("line_width", "100000")],
    );
    pool.add(dm, "rectangle", &red_square("after", "50"));

    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    assert_eq!(outcome.report.count(DiagnosticKind::AttributeParse), 1);
    assert_eq!(outcome.report.diagnostics[0].object, "line \"fat\"");
    assert_eq!(raster.pixel(55, 5), Some(RED));
}

#[test]
fn test_widest_line_over_far_geometry_stays_fast() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(
        dm,
        "line",
        &[
            ("name", "long"),
            ("pos_x", "-1000000"),
            ("width", "2000000"),
            ("height", "10"),
            ("line_width", "255"),
            ("line_colour", "12"),
        ],
    );

    let start = Instant::now();
    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    let elapsed = start.elapsed();

    assert!(outcome.report.is_clean());
    assert_eq!(raster.pixel(100, 5), Some(RED));
    assert_eq!(raster.pixel(100, 15), Some(WHITE));
    assert!(elapsed.as_secs() < 5, "painting one wide line took {elapsed:?}");
}

#[test]
fn test_bad_root_context_falls_back_to_defaults() {
    let mut pool = Pool::new();
    let root = pool.root();
    pool.set(root, "dimension", "huge");
    pool.object("datamask", "dm", &[("background_colour", "12")]);

    let (raster, outcome) = pool.paint(&pool.path("dm"), 220, 220, &RenderOptions::default());
    assert_eq!(outcome.report.count(DiagnosticKind::AttributeParse), 1);
    assert_eq!(outcome.report.diagnostics[0].object, "objectpool");
    assert_eq!(raster.pixel(199, 199), Some(RED));
    assert_ne!(raster.pixel(201, 201), Some(RED));
}

// ============================================================================
// Pictures
// ============================================================================

#[test]
fn test_missing_picture_gets_placeholder() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(dm, "picturegraphic", &[("name", "pic"), ("file", "nope.png"), ("width", "20")]);
    pool.add(dm, "rectangle", &red_square("after", "50"));

    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    let report = &outcome.report;
    assert_eq!(report.count(DiagnosticKind::Resource), 1);
    assert_eq!(report.diagnostics[0].object, "picturegraphic \"pic\"");
    assert!(report.diagnostics[0].message.contains("nope.png"));
    assert_eq!(raster.pixel(2, 10), Some(SILVER));
    assert_eq!(raster.pixel(55, 5), Some(RED));
}

#[test]
fn test_picture_without_file_gets_placeholder() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(dm, "picturegraphic", &[("name", "pic"), ("width", "20")]);

    let (_, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    assert_eq!(outcome.report.count(DiagnosticKind::Resource), 1);
}

#[test]
fn test_picture_loaded_from_bitmap_path() {
    let dir = tempfile::tempdir().unwrap();
    write_blue_png(dir.path(), "blue.png", 8, 8);

    let mut pool = Pool::new();
    let root = pool.root();
    pool.set(root, "std_bitmap_path", dir.path().to_str().unwrap());
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(
        dm,
        "picturegraphic",
        &[("name", "pic"), ("file", "blue.png"), ("width", "8"), ("pos_x", "10"), ("pos_y", "10")],
    );

    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    assert!(outcome.report.is_clean());
    assert_eq!(raster.pixel(12, 12), Some(BLUE));
    assert_eq!(raster.pixel(17, 17), Some(BLUE));
    assert_eq!(raster.pixel(18, 18), Some(WHITE));
}

#[test]
fn test_picture_height_follows_bitmap_aspect() {
    let dir = tempfile::tempdir().unwrap();
    write_blue_png(dir.path(), "wide.png", 40, 10);

    let mut pool = Pool::new();
    let root = pool.root();
    pool.set(root, "std_bitmap_path", dir.path().to_str().unwrap());
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(dm, "picturegraphic", &[("name", "pic"), ("file", "wide.png"), ("width", "80")]);
    let start = pool.path("dm");
    let pic = pool.descend(&start, 0);

    let (raster, outcome) = pool.paint(&start, 200, 200, &RenderOptions::default());
    assert!(outcome.report.is_clean());
    assert_eq!(raster.pixel(70, 15), Some(BLUE));
    assert_eq!(raster.pixel(70, 25), Some(WHITE));

    assert_eq!(pool.locate(&start, 70.0, 15.0), Some(pic.clone()));
    assert_eq!(pool.locate(&start, 70.0, 25.0), Some(start.clone()));

    let mut visitor = RecordingVisitor::new();
    let overlay = pool.run(&start, &RenderOptions::default(), Some(pic), &mut visitor).overlay;
    assert_eq!(overlay.selection.unwrap().bounds(), Rect::new(0.0, 0.0, 80.0, 20.0));
}

#[test]
fn test_transparent_colour_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_blue_png(dir.path(), "blue.png", 8, 8);

    let mut pool = Pool::new();
    let root = pool.root();
    pool.set(root, "fix_bitmap_path", dir.path().to_str().unwrap());
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(
        dm,
        "picturegraphic",
        &[
            ("name", "pic"),
            ("file", "blue.png"),
            ("width", "8"),
            ("options", "transparent"),
            ("transparency_colour", "blue"),
        ],
    );

    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    assert!(outcome.report.is_clean());
    assert_eq!(raster.pixel(3, 3), Some(WHITE));
}

#[test]
fn test_flashing_picture_hidden_while_flash_on() {
    let mut pool = Pool::new();
    let dm = pool.object("datamask", "dm", &[]);
    pool.add(
        dm,
        "picturegraphic",
        &[("name", "pic"), ("file", "nope.png"), ("width", "20"), ("options", "flashing")],
    );

    let flash_on = RenderOptions::default().with_flash(true);
    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &flash_on);
    assert!(outcome.report.is_clean());
    assert_eq!(raster.pixel(2, 10), Some(WHITE));

    let (raster, outcome) = pool.paint(&pool.path("dm"), 200, 200, &RenderOptions::default());
    assert_eq!(outcome.report.count(DiagnosticKind::Resource), 1);
    assert_eq!(raster.pixel(2, 10), Some(SILVER));
}

// ============================================================================
// Cycles while painting
// ============================================================================

#[test]
fn test_painting_a_cycle_terminates() {
    let mut pool = Pool::new();
    let a = pool.object("container", "a", &[("width", "50"), ("height", "50")]);
    pool.link(a, "a", &[("pos_x", "1"), ("pos_y", "1")]);

    let (_, outcome) = pool.paint(&pool.path("a"), 100, 100, &RenderOptions::default());
    assert_eq!(outcome.report.count(DiagnosticKind::DepthLimitExceeded), 1);
    assert_eq!(outcome.report.visits, 20);
    assert_eq!(outcome.report.final_depth, 0);
}
