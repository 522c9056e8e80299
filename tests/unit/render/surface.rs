use super::*;

const BG: Rgba8 = Rgba8::from_rgb_hex(0x0E1A24);
const RED: Rgba8 = Rgba8::from_rgb_hex(0xDF0E49);

fn surface() -> FrameSurface {
    FrameSurface::new(Canvas::new(64, 32).unwrap(), BG).unwrap()
}

#[test]
fn begin_frame_clears_to_background() {
    let mut s = surface();
    s.begin_frame();
    let frame = s.finish();
    assert_eq!(frame.data.len(), 64 * 32 * 4);
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(0, 0), Some(BG.to_array()));
    assert_eq!(frame.pixel(63, 31), Some(BG.to_array()));
    assert_eq!(frame.pixel(64, 0), None);
}

#[test]
fn stroke_line_covers_its_pixels_only() {
    let mut s = surface();
    s.begin_frame();
    s.stroke_line(Point::new(0.0, 16.0), Point::new(64.0, 16.0), 2.0, RED);
    let frame = s.finish();
    assert_eq!(frame.pixel(10, 16), Some(RED.to_array()));
    assert_eq!(frame.pixel(10, 15), Some(RED.to_array()));
    assert_eq!(frame.pixel(10, 5), Some(BG.to_array()));
}

#[test]
fn non_finite_lines_do_not_panic() {
    let mut s = surface();
    s.begin_frame();
    s.stroke_line(Point::new(f64::NAN, 0.0), Point::new(5.0, 5.0), 2.0, RED);
    s.stroke_line(Point::new(32.0, 16.0), Point::new(32.0, f64::INFINITY), 2.0, RED);
    s.stroke_line(Point::new(-1e300, 16.0), Point::new(1e300, 16.0), 2.0, RED);
    let frame = s.finish();
    assert_eq!(frame.pixel(32, 28), Some(RED.to_array()));
    assert_eq!(frame.pixel(5, 16), Some(RED.to_array()));
}

#[test]
fn fill_mask_tints_coverage() {
    let mut s = surface();
    s.begin_frame();
    let white = Rgba8::new(255, 255, 255, 255);
    s.fill_mask(Point::new(4.0, 4.0), 2, 2, &[255; 4], white, 1.0)
        .unwrap();
    let frame = s.finish();
    assert_eq!(frame.pixel(4, 4), Some(white.to_array()));
    assert_eq!(frame.pixel(5, 5), Some(white.to_array()));
    assert_eq!(frame.pixel(7, 7), Some(BG.to_array()));
}

#[test]
fn fill_mask_rejects_bad_coverage_length() {
    let mut s = surface();
    s.begin_frame();
    let err = s
        .fill_mask(Point::ORIGIN, 2, 2, &[255; 3], RED, 1.0)
        .unwrap_err();
    assert!(matches!(err, MathreelError::Render(_)));
}

#[test]
fn resize_changes_frame_dimensions() {
    let mut s = surface();
    s.resize(Canvas::new(16, 8).unwrap()).unwrap();
    s.begin_frame();
    let frame = s.finish();
    assert_eq!((frame.width, frame.height), (16, 8));
}
