use super::*;

fn render_args(argv: &[&str]) -> RenderArgs {
    match Cli::try_parse_from(argv).unwrap().cmd {
        Command::Render(args) => args,
        other => panic!("expected render, got {other:?}"),
    }
}

#[test]
fn render_replaces_output_unless_told_not_to() {
    let args = render_args(&["mathreel", "render", "--out", "v.mp4"]);
    assert!(!args.no_overwrite);
    let args = render_args(&["mathreel", "render", "--out", "v.mp4", "--no-overwrite"]);
    assert!(args.no_overwrite);
    assert_eq!(args.out, PathBuf::from("v.mp4"));
}

#[test]
fn config_flag_is_global() {
    let cli = Cli::try_parse_from(["mathreel", "frames", "--out-dir", "f", "--config", "c.json"])
        .unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("c.json")));
}
