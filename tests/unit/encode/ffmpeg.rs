use super::*;
use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
    }
}

fn value_after<'a>(args: &'a [OsString], flag: &str) -> Option<&'a OsString> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
}

fn frame(data: Vec<u8>, premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: (data.len() / 4) as u32,
        data,
        premultiplied,
    }
}

#[test]
fn args_carry_encoder_settings() {
    let settings = EncoderSettings {
        codec: "libx265".to_string(),
        crf: 28,
        preset: "slow".to_string(),
        ..EncoderSettings::default()
    };
    let args = settings.args(&cfg(640, 360), Path::new("out/v.mp4"), true);
    assert_eq!(args[0], "-y");
    assert_eq!(value_after(&args, "-c:v").unwrap(), "libx265");
    assert_eq!(value_after(&args, "-crf").unwrap(), "28");
    assert_eq!(value_after(&args, "-preset").unwrap(), "slow");
    assert_eq!(value_after(&args, "-s").unwrap(), "640x360");
    assert_eq!(value_after(&args, "-framerate").unwrap(), "30/1");
    assert!(value_after(&args, "-vf").is_none());
    assert_eq!(args.last().unwrap(), Path::new("out/v.mp4").as_os_str());
}

#[test]
fn odd_canvas_is_padded_and_no_overwrite_uses_n() {
    let args = EncoderSettings::default().args(&cfg(641, 360), Path::new("v.mp4"), false);
    assert_eq!(args[0], "-n");
    assert_eq!(
        value_after(&args, "-vf").unwrap(),
        "pad=ceil(iw/2)*2:ceil(ih/2)*2"
    );
}

#[test]
fn settings_validation() {
    assert!(EncoderSettings::default().validate().is_ok());
    let bad_crf = EncoderSettings {
        crf: 60,
        ..EncoderSettings::default()
    };
    assert!(bad_crf.validate().is_err());
    let no_codec = EncoderSettings {
        codec: " ".to_string(),
        ..EncoderSettings::default()
    };
    assert!(no_codec.validate().is_err());
}

#[test]
fn flatten_composites_over_background() {
    let bg = Rgba8::new(10, 20, 30, 255);
    let mut out = Vec::new();
    // transparent, opaque, half red (premultiplied)
    let f = frame(vec![0, 0, 0, 0, 1, 2, 3, 255, 128, 0, 0, 128], true);
    flatten_onto(&mut out, &f, bg).unwrap();
    assert_eq!(
        out,
        vec![10, 20, 30, 255, 1, 2, 3, 255, 128 + 5, 10, 15, 255]
    );
}

#[test]
fn flatten_premultiplies_straight_frames() {
    let mut out = Vec::new();
    let f = frame(vec![255, 0, 0, 128], false);
    flatten_onto(&mut out, &f, Rgba8::new(0, 0, 0, 255)).unwrap();
    assert_eq!(out, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_short_buffers() {
    let mut out = Vec::new();
    let f = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(flatten_onto(&mut out, &f, Rgba8::TRANSPARENT).is_err());
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new("unused.mp4", EncoderSettings::default(), Rgba8::TRANSPARENT);
    assert!(sink.push_frame(FrameIndex(0), &frame(vec![0; 4], true)).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let path = std::env::temp_dir().join(format!("mathreel_keep_{}.mp4", std::process::id()));
    std::fs::write(&path, b"keep").unwrap();
    let mut sink =
        FfmpegSink::new(&path, EncoderSettings::default(), Rgba8::TRANSPARENT).overwrite(false);
    let err = sink.begin(cfg(2, 2)).unwrap_err();
    assert!(matches!(err, MathreelError::Validation(_)));
    assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn from_config_uses_config_background_and_encoder() {
    let cfg = crate::VideoConfig {
        background: Rgba8::new(1, 2, 3, 255),
        ..crate::VideoConfig::default()
    };
    let sink = FfmpegSink::from_config("v.mp4", &cfg);
    assert_eq!(sink.background, Rgba8::new(1, 2, 3, 255));
    assert_eq!(sink.settings, cfg.encoder);
    assert_eq!(sink.out_path(), Path::new("v.mp4"));
}
