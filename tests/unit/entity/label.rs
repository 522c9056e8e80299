use super::*;
use crate::foundation::core::{Canvas, Fps};
use crate::render::surface::FrameRGBA;
use crate::scene::registry::{EntityId, Registry};
use crate::text::TextShaper;
use crate::text::ParleyShaper;
use crate::transform::coords::CoordinateSpace;

const WHITE: Rgba8 = Rgba8::from_rgb_hex(0xFCFEFF);

/// Shapes every string as a 200 px wide run without glyphs.
#[derive(Default)]
struct FixedWidthShaper {
    calls: usize,
}

impl TextShaper for FixedWidthShaper {
    fn shape(&mut self, _text: &str, size_px: f32) -> MathreelResult<ShapedText> {
        self.calls += 1;
        Ok(ShapedText {
            metrics: TextMetrics {
                advance_width: 200.0,
                ascent: 80.0,
                descent: 20.0,
                line_height: 120.0,
            },
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(Vec::new()), 0),
            font_size: size_px,
            glyphs: Vec::new(),
        })
    }
}

fn run_frames(l: &mut Label, registry: &mut Registry, shaper: &mut FixedWidthShaper, n: usize) {
    let canvas = Canvas::new(32, 32).unwrap();
    let mut surface = FrameSurface::new(canvas, Rgba8::TRANSPARENT).unwrap();
    for _ in 0..n {
        surface.begin_frame();
        let mut cx = RenderCx {
            id: EntityId(5),
            registry: &mut *registry,
            space: CoordinateSpace::new(canvas),
            fps: Fps::new(60, 1).unwrap(),
            sample_step: 1.0,
            shaper: Some(&mut *shaper),
            typesetter: None,
        };
        l.render(&mut surface, &mut cx).unwrap();
    }
}

fn mean_coverage(l: &Label) -> f64 {
    (0..200).map(|x| l.coverage_at(f64::from(x) + 0.5, 200.0)).sum::<f64>() / 200.0
}

#[test]
fn hello_entrance_wipes_left_to_right() {
    let mut registry = Registry::default();
    let mut shaper = FixedWidthShaper::default();
    let mut l = Label::new("Hello", WHITE, Point::ZERO).smooth(false);
    l.animate(Duration::from_millis(250));

    assert_eq!(mean_coverage(&l), 0.0);

    // 15 frames have no exact midpoint; a one second copy hits 0.5 after 30 frames.
    let mut half = l.clone();
    half.animate(Duration::from_secs(1));
    run_frames(&mut half, &mut registry, &mut shaper, 30);
    assert!((half.entrance().progress() - 0.5).abs() < 1e-12);
    assert!((mean_coverage(&half) - 0.5).abs() < 0.01);
    assert_eq!(half.coverage_at(10.0, 200.0), 1.0);
    assert_eq!(half.coverage_at(190.0, 200.0), 0.0);
    assert!(half.coverage_at(60.0, 200.0) > half.coverage_at(140.0, 200.0));

    run_frames(&mut l, &mut registry, &mut shaper, 15);
    assert!(l.entrance().is_complete());
    assert_eq!(mean_coverage(&l), 1.0);
}

#[test]
fn smooth_delete_wipes_from_the_left() {
    let mut registry = Registry::default();
    let mut shaper = FixedWidthShaper::default();
    let mut l = Label::new("Hello", WHITE, Point::ZERO).smooth(false);
    l.animate_delete(Duration::from_secs(1));
    run_frames(&mut l, &mut registry, &mut shaper, 30);
    assert_eq!(l.coverage_at(10.0, 200.0), 0.0);
    assert_eq!(l.coverage_at(190.0, 200.0), 1.0);
}

#[test]
fn flat_delete_fades_uniformly() {
    let mut registry = Registry::default();
    let mut shaper = FixedWidthShaper::default();
    let mut l = Label::new("Hello", WHITE, Point::ZERO)
        .smooth(false)
        .smooth_delete(false);
    l.animate_delete(Duration::from_secs(1));
    run_frames(&mut l, &mut registry, &mut shaper, 30);
    assert!((l.coverage_at(10.0, 200.0) - 0.5).abs() < 1e-9);
    assert!((l.coverage_at(190.0, 200.0) - 0.5).abs() < 1e-9);
}

#[test]
fn settled_label_uses_solid_paint() {
    let l = Label::new("Hi", WHITE, Point::ZERO);
    assert_eq!(l.text_paint(200.0), TextPaint::Solid(WHITE));

    let mut entering = l.clone();
    entering.animate(Duration::from_secs(1));
    match entering.text_paint(200.0) {
        TextPaint::HorizontalRamp { color, alpha } => {
            assert_eq!(color, WHITE);
            assert_eq!(alpha.len(), 201);
            assert!(alpha.iter().all(|&a| a == 0));
        }
        other => panic!("expected a ramp, got {other:?}"),
    }
}

#[test]
fn centering_shift_uses_advance_and_line_box() {
    let m = TextMetrics {
        advance_width: 200.0,
        ascent: 80.0,
        descent: 20.0,
        line_height: 120.0,
    };
    assert_eq!(centering_shift(&m), Vec2::new(-100.0, 10.0));
}

#[test]
fn shapes_once_and_unregisters_after_deletion() {
    let mut registry = Registry::default();
    let mut shaper = FixedWidthShaper::default();
    registry.register(EntityId(5));
    registry.flush();

    let mut l = Label::new("Bye", WHITE, Point::ZERO);
    l.animate_delete(Duration::from_millis(100));
    run_frames(&mut l, &mut registry, &mut shaper, 6);
    assert!(l.deletion().is_complete());
    registry.flush();
    assert!(!registry.is_member(EntityId(5)));

    // Completed deletion skips drawing, so no further shaping.
    run_frames(&mut l, &mut registry, &mut shaper, 3);
    assert_eq!(shaper.calls, 1);
}

#[test]
fn missing_shaper_is_a_layout_error() {
    let mut registry = Registry::default();
    let canvas = Canvas::new(16, 16).unwrap();
    let mut surface = FrameSurface::new(canvas, Rgba8::TRANSPARENT).unwrap();
    let mut cx = RenderCx {
        id: EntityId(1),
        registry: &mut registry,
        space: CoordinateSpace::new(canvas),
        fps: Fps::DEFAULT,
        sample_step: 1.0,
        shaper: None,
        typesetter: None,
    };
    surface.begin_frame();
    let err = Label::new("x", WHITE, Point::ZERO)
        .render(&mut surface, &mut cx)
        .unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::MathreelError::Layout(_)
    ));
}

#[test]
fn set_text_drops_the_shaped_cache() {
    let mut registry = Registry::default();
    let mut shaper = FixedWidthShaper::default();
    let mut l = Label::new("a", WHITE, Point::ZERO);
    run_frames(&mut l, &mut registry, &mut shaper, 2);
    assert_eq!(shaper.calls, 1);

    l.set_text("b");
    l.set_position(Point::new(3.0, 4.0));
    l.set_color(Rgba8::from_rgb_hex(0xDF0E49));
    run_frames(&mut l, &mut registry, &mut shaper, 2);
    assert_eq!(shaper.calls, 2);
    assert_eq!(l.text(), "b");
    assert_eq!(l.position(), Point::new(3.0, 4.0));
}

fn system_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

/// Highest alpha in device columns `x0..x1`.
fn ink(frame: &FrameRGBA, x0: u32, x1: u32) -> u8 {
    (x0..x1.min(frame.width))
        .flat_map(|x| (0..frame.height).filter_map(move |y| frame.pixel(x, y)))
        .map(|p| p[3])
        .max()
        .unwrap_or(0)
}

#[test]
fn half_entered_hello_shows_only_its_left_part() {
    let Some(bytes) = system_font() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let mut shaper = ParleyShaper::from_bytes(bytes).unwrap();
    let width = shaper.shape("Hello", 40.0).unwrap().metrics.advance_width;

    let canvas = Canvas::new(160, 80).unwrap();
    let mut surface = FrameSurface::new(canvas, Rgba8::TRANSPARENT).unwrap();
    let mut registry = Registry::default();
    let mut render = |l: &mut Label| {
        surface.begin_frame();
        let mut cx = RenderCx {
            id: EntityId(5),
            registry: &mut registry,
            space: CoordinateSpace::new(canvas),
            fps: Fps::new(60, 1).unwrap(),
            sample_step: 1.0,
            shaper: Some(&mut shaper),
            typesetter: None,
        };
        l.render(&mut surface, &mut cx).unwrap();
        surface.finish()
    };

    let mut entering = Label::new("Hello", WHITE, Point::ZERO)
        .with_font_size(40.0)
        .smooth(false);
    entering.animate(Duration::from_secs(1));
    for _ in 0..30 {
        render(&mut entering);
    }
    assert!((entering.entrance().progress() - 0.5).abs() < 1e-12);
    let half = render(&mut entering);
    let full = render(&mut Label::new("Hello", WHITE, Point::ZERO).with_font_size(40.0));

    // Centered on device x 80; the wipe's soft edge is one font size wide.
    let left = 80.0 - width / 2.0;
    let left_half = (left.ceil() as u32, (left + width / 2.0) as u32);
    let hidden_from = (left + (width + 40.0) / 2.0).ceil() as u32 + 2;

    assert!(ink(&half, left_half.0, left_half.1) > 0);
    assert_eq!(ink(&half, hidden_from, canvas.width), 0);
    assert!(ink(&full, hidden_from, canvas.width) > 0);
}
