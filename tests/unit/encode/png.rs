use super::*;
use crate::foundation::core::Fps;

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mathreel_png_{name}_{}", std::process::id()))
}

#[test]
fn unpremultiply_restores_straight_color() {
    assert_eq!(unpremultiply(&[128, 0, 0, 128]), vec![255, 0, 0, 128]);
    assert_eq!(unpremultiply(&[9, 9, 9, 0]), vec![0, 0, 0, 0]);
    assert_eq!(unpremultiply(&[1, 2, 3, 255]), vec![1, 2, 3, 255]);
}

#[test]
fn writes_one_file_per_frame() {
    let dir = scratch_dir("seq");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(SinkConfig {
        width: 2,
        height: 1,
        fps: Fps::DEFAULT,
    })
    .unwrap();
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 0, 0, 128, 128],
        premultiplied: true,
    };
    sink.push_frame(FrameIndex(3), &frame).unwrap();
    sink.push_frame(FrameIndex(4), &frame).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.written().len(), 2);
    assert!(sink.written()[0].ends_with("frame_000003.png"));
    let img = image::open(&sink.written()[1]).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 128]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = PngSequenceSink::new(scratch_dir("unstarted"));
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}
