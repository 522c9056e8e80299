use super::*;
use crate::foundation::core::Fps;
use crate::scene::registry::{EntityId, Registry};

const BLUE: Rgba8 = Rgba8::from_rgb_hex(0x2C9FD5);
const RED: Rgba8 = Rgba8::from_rgb_hex(0xDF0E49);
const GREEN: Rgba8 = Rgba8::from_rgb_hex(0x0ECE8D);

fn canvas() -> Canvas {
    Canvas::new(1920, 1080).unwrap()
}

fn space() -> CoordinateSpace {
    CoordinateSpace::new(canvas())
}

fn cx(registry: &mut Registry) -> RenderCx<'_> {
    RenderCx {
        id: EntityId(7),
        registry,
        space: space(),
        fps: Fps::new(60, 1).unwrap(),
        sample_step: 1.0,
        shaper: None,
        typesetter: None,
    }
}

fn near(a: Rgba8, b: Rgba8) -> bool {
    let d = |x: u8, y: u8| (i16::from(x) - i16::from(y)).abs() <= 2;
    d(a.r, b.r) && d(a.g, b.g) && d(a.b, b.b)
}

fn run_frames(g: &mut FunctionGraph, registry: &mut Registry, n: usize) {
    let mut surface = FrameSurface::new(Canvas::new(64, 32).unwrap(), Rgba8::TRANSPARENT).unwrap();
    for _ in 0..n {
        surface.begin_frame();
        g.render(&mut surface, &mut cx(registry)).unwrap();
    }
}

#[test]
fn evaluate_applies_scale_to_input_and_output() {
    let g = FunctionGraph::mono(|x| x * x, RED, 3.0).with_scale(100);
    assert_eq!(g.evaluate(200.0), 400.0);
    assert_eq!(FunctionGraph::mono(|x| x, RED, 1.0).with_scale(0).scale(), 1);
}

#[test]
fn settled_graph_covers_whole_domain() {
    let g = FunctionGraph::mono(|x| x, RED, 1.0).with_domain(-10, 10);
    let segs = g.segments(&space(), 1.0);
    assert_eq!(segs.len(), 20);
    assert_eq!(segs[0].from, Point::new(-10.0, -10.0));
    assert_eq!(segs[19].to, Point::new(10.0, 10.0));
    assert!(segs.iter().all(|s| s.color == RED));
}

#[test]
fn entrance_reveals_left_to_right() {
    let mut registry = Registry::default();
    let mut g = FunctionGraph::mono(|x| x, RED, 1.0)
        .with_domain(0, 100)
        .smooth(false);
    g.animate(Duration::from_secs(1));
    assert!(g.segments(&space(), 1.0).is_empty());

    run_frames(&mut g, &mut registry, 30);
    let segs = g.segments(&space(), 1.0);
    assert_eq!(segs.len(), 50);

    run_frames(&mut g, &mut registry, 30);
    assert_eq!(g.entrance().progress(), 1.0);
    assert_eq!(g.segments(&space(), 1.0).len(), 100);
}

#[test]
fn deletion_shrinks_from_the_start_and_unregisters() {
    let mut registry = Registry::default();
    registry.register(EntityId(7));
    registry.flush();

    let mut g = FunctionGraph::mono(|x| x, RED, 1.0)
        .with_domain(0, 100)
        .smooth(false);
    g.animate_delete(Duration::from_millis(500));
    run_frames(&mut g, &mut registry, 15);
    let segs = g.segments(&space(), 1.0);
    assert_eq!(segs.len(), 50);
    assert_eq!(segs[0].from.x, 50.0);
    assert!(registry.is_member(EntityId(7)));

    run_frames(&mut g, &mut registry, 15);
    assert!(g.segments(&space(), 1.0).is_empty());
    assert!(registry.is_member(EntityId(7)));
    registry.flush();
    assert!(!registry.is_member(EntityId(7)));
}

#[test]
fn animate_after_deletion_makes_graph_visible_again() {
    let mut registry = Registry::default();
    let mut g = FunctionGraph::mono(|x| x, RED, 1.0).with_domain(0, 10);
    g.animate_delete(Duration::ZERO);
    run_frames(&mut g, &mut registry, 1);
    assert!(g.segments(&space(), 1.0).is_empty());
    g.animate(Duration::ZERO);
    run_frames(&mut g, &mut registry, 1);
    assert_eq!(g.segments(&space(), 1.0).len(), 10);
}

#[test]
fn morph_completion_adopts_every_field() {
    let mut registry = Registry::default();
    let mut g = FunctionGraph::mono(|x| x, RED, 3.0).with_domain(-10, 10);
    let target = FunctionGraph::mono(|x| 2.0 * x + 1.0, GREEN, 5.0)
        .with_domain(-4, 6)
        .with_scale(3)
        .smooth(false)
        .with_clip(Rect::new(-100.0, -100.0, 100.0, 100.0));
    g.morph(Duration::from_millis(100), target);
    assert!(g.morph_target().is_some());

    run_frames(&mut g, &mut registry, 6);
    assert!(g.morph_target().is_none());
    assert_eq!(g.morph_progress().progress(), 1.0);
    assert_eq!(g.domain(), (-4, 6));
    assert_eq!(g.paint(), &PaintSource::Solid(GREEN));
    assert_eq!(g.stroke_width(), 5.0);
    assert_eq!(g.scale(), 3);
    assert_eq!(g.ease(), Ease::Linear);
    assert_eq!(g.evaluate(3.0), 2.0 * 3.0 + 3.0);
}

#[test]
fn zero_duration_morph_completes_on_next_frame() {
    let mut registry = Registry::default();
    let mut g = FunctionGraph::mono(|x| x, RED, 1.0);
    g.morph(Duration::ZERO, FunctionGraph::mono(|_| 0.0, BLUE, 1.0));
    assert_eq!(g.morph_progress().progress(), 0.0);
    run_frames(&mut g, &mut registry, 1);
    assert!(g.morph_target().is_none());
    assert_eq!(g.evaluate(12.0), 0.0);
}

#[test]
fn solid_to_height_gradient_morph_colors() {
    let mut registry = Registry::default();
    let mut g = FunctionGraph::mono(|x| x / 2.0, BLUE, 3.0).with_scale(100);
    let target = FunctionGraph::height_coded(|x| x / 2.0, [(-1, BLUE), (1, RED)], 3.0)
        .unwrap()
        .with_scale(100);
    g.morph(Duration::from_millis(1000), target);

    // Progress 0: everything is still the source blue.
    for seg in g.segments(&space(), 1.0) {
        assert!(near(seg.color, BLUE), "{seg:?}");
    }

    run_frames(&mut g, &mut registry, 60);
    assert!(g.morph_target().is_none());
    let segs = g.segments(&space(), 1.0);
    let color_at = |x: f64| {
        segs.iter()
            .find(|s| s.from.x == x)
            .map(|s| s.color)
            .unwrap()
    };
    // y = x / 2: above y = 100 is red, below y = -100 is blue.
    assert_eq!(color_at(300.0), RED);
    assert_eq!(color_at(-300.0), BLUE);
    let mid = color_at(0.0);
    assert!(mid != RED && mid != BLUE);
}

#[test]
fn mid_morph_blends_heights() {
    let mut registry = Registry::default();
    let mut g = FunctionGraph::mono(|_| 0.0, RED, 1.0)
        .with_domain(0, 4)
        .smooth(false);
    g.morph(
        Duration::from_secs(1),
        FunctionGraph::mono(|_| 10.0, RED, 1.0).with_domain(0, 4),
    );
    run_frames(&mut g, &mut registry, 30);
    let segs = g.segments(&space(), 1.0);
    assert!((segs[0].from.y - 5.0).abs() < 1e-9);
}

#[test]
fn asymptotes_and_nan_do_not_abort_rendering() {
    let mut registry = Registry::default();
    let mut g = FunctionGraph::mono(|x| 1.0 / x, GREEN, 3.0)
        .with_domain(-5, 5)
        .with_scale(1);
    let mut h = FunctionGraph::mono(|x: f64| x.sqrt(), GREEN, 3.0).with_domain(-5, 5);
    run_frames(&mut g, &mut registry, 2);
    run_frames(&mut h, &mut registry, 2);
    assert_eq!(g.segments(&space(), 1.0).len(), 10);
}

#[test]
fn clip_limits_drawn_geometry() {
    let mut registry = Registry::default();
    let mut surface = FrameSurface::new(Canvas::new(40, 40).unwrap(), Rgba8::TRANSPARENT).unwrap();
    let mut g = FunctionGraph::mono(|_| 0.0, RED, 2.0)
        .with_domain(-20, 20)
        .with_clip(Rect::new(0.0, -5.0, 20.0, 5.0));
    surface.begin_frame();
    let mut c = RenderCx {
        space: CoordinateSpace::new(surface.canvas()),
        ..cx(&mut registry)
    };
    g.render(&mut surface, &mut c).unwrap();
    let frame = surface.finish();
    assert_eq!(frame.pixel(30, 20).map(|p| p[3]), Some(255));
    assert_eq!(frame.pixel(10, 20).map(|p| p[3]), Some(0));
}

#[test]
fn builders_replace_function_paint_and_width() {
    let g = FunctionGraph::mono(|x| x, RED, 1.0)
        .with_domain(0, 4)
        .with_function(|_| 2.0)
        .with_paint(BLUE)
        .with_stroke_width(6.0);
    assert_eq!(g.stroke_width(), 6.0);
    assert_eq!(g.paint(), &PaintSource::Solid(BLUE));
    let segs = g.segments(&space(), 1.0);
    assert!(segs.iter().all(|s| s.from.y == 2.0 && s.color == BLUE));
}

#[test]
fn huge_domain_only_samples_near_the_canvas() {
    let small = CoordinateSpace::new(Canvas::new(64, 32).unwrap());
    let g = FunctionGraph::mono(|x| x, RED, 2.0).with_domain(-1_000_000_000_000, 1_000_000_000_000);
    let segs = g.segments(&small, 1.0);
    // 64 visible columns plus a step and a stroke width of margin on each side.
    assert!(segs.len() <= 64 + 2 * 3 + 2, "{} segments", segs.len());
    assert!(segs[0].from.x <= small.left());
    assert!(segs[segs.len() - 1].to.x >= small.right());
    assert!(segs.windows(2).all(|w| w[0].to.x == w[1].from.x));

    let extreme = FunctionGraph::mono(|x| x, RED, 2.0).with_domain(i64::MIN / 4, i64::MAX / 4);
    assert!(extreme.segments(&small, 1.0).len() <= 64 + 2 * 3 + 2);
}

#[test]
fn domain_inside_the_canvas_is_sampled_in_full() {
    let small = CoordinateSpace::new(Canvas::new(64, 32).unwrap());
    let g = FunctionGraph::mono(|x| x, RED, 2.0).with_domain(-40, 10);
    let segs = g.segments(&small, 1.0);
    // Left of -32 - 3 is dropped; everything up to the domain stop is kept.
    assert_eq!(segs[0].from.x, -35.0);
    assert_eq!(segs[segs.len() - 1].to.x, 10.0);
}
