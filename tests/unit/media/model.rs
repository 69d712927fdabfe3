use super::*;
use crate::foundation::core::{Duration, Region};

fn font_in(dir: &Path) -> PathBuf {
    let font = dir.join("font.ttf");
    std::fs::write(&font, b"not really a font").unwrap();
    font
}

fn region(start: u64, end: u64) -> TaggedRegion {
    TaggedRegion::new(Region::new(Duration::from_secs(start), Duration::from_secs(end)))
}

#[test]
fn check_input_rejects_missing_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    assert!(check_input(Path::new("")).is_err());
    assert!(check_input(dir.path()).is_err());
    assert!(check_input(&dir.path().join("missing.mkv")).unwrap_err().is_not_found());
    assert!(check_input(&font_in(dir.path())).is_ok());
}

#[test]
fn check_output_rejects_existing_paths() {
    let dir = tempfile::tempdir().unwrap();
    let font = font_in(dir.path());
    assert!(check_output(&font).unwrap_err().is_already_exists());
    assert!(check_output(&dir.path().join("fresh.mkv")).is_ok());
}

#[test]
fn source_requires_regions_and_valid_tracks() {
    let dir = tempfile::tempdir().unwrap();
    let media = font_in(dir.path());

    let mut s = Source::new("k1", vec![region(0, 10)]);
    s.video = Some(Track::new(&media, 0));
    assert!(s.validate().is_ok());

    s.audio = Some(Track {
        path: media.clone(),
        track: 1,
        filter: Some(String::new()),
    });
    assert!(s.validate().is_err());
    s.audio = None;

    s.regions.push(region(5, 5));
    assert!(s.validate().is_err());

    s.regions.clear();
    assert!(s.validate().is_err());
}

#[test]
fn source_json_round_trips() {
    let mut s = Source::new(
        "shows/ep01.mkv",
        vec![region(0, 30).with_tags(["intro"]), region(30, 600)],
    );
    s.video = Some(Track::new("/media/ep01.mkv", 0));
    s.subtitle = Some(Track {
        path: PathBuf::from("/media/ep01.ass"),
        track: 0,
        filter: Some("setpts=PTS".to_string()),
    });

    let json = serde_json::to_string(&s).unwrap();
    let back: Source = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}

#[test]
fn format_rejects_zero_fields_and_unknown_codecs() {
    let dir = tempfile::tempdir().unwrap();
    let mut f = Format::default();
    f.stamp.font = font_in(dir.path());
    assert!(f.validate().is_ok());
    assert_eq!(f.extension(), "mkv");

    let mut zero = f.clone();
    zero.gop_size = 0;
    assert!(zero.validate().is_err());

    let mut json = serde_json::to_value(&f).unwrap();
    json["video_codec"] = serde_json::json!("MPEG2");
    assert!(serde_json::from_value::<Format>(json).is_err());
}

#[test]
fn format_checks_output_extension() {
    let dir = tempfile::tempdir().unwrap();
    let f = Format::default();
    assert!(f.check_video_output(&dir.path().join("a.mkv")).is_ok());
    assert!(f.check_video_output(&dir.path().join("a.mp4")).is_err());
}
