use super::*;

const PROBE_JSON: &str = r#"{
    "programs": [],
    "streams": [
        {"codec_type": "video"},
        {"codec_type": "audio"},
        {"codec_type": "audio"},
        {"codec_type": "subtitle"}
    ],
    "format": {"duration": "1421.504000"}
}"#;

#[test]
fn probe_json_counts_streams_and_parses_duration() {
    let info = ProbeInfo::from_json(PROBE_JSON.as_bytes()).unwrap();
    assert_eq!(info.video_tracks, 1);
    assert_eq!(info.audio_tracks, 2);
    assert_eq!(info.subtitle_tracks, 1);
    assert_eq!(info.duration, Duration::from_micros(1_421_504_000));
}

#[test]
fn probe_json_without_duration_is_rejected() {
    let err = ProbeInfo::from_json(br#"{"streams": [{"codec_type": "video"}]}"#).unwrap_err();
    assert!(matches!(err, MashupError::Validation(_)));
}

#[test]
fn source_uses_last_track_of_each_kind() {
    let info = ProbeInfo::from_json(PROBE_JSON.as_bytes()).unwrap();
    let media = Path::new("/media/ep01.mkv");
    let s = info.to_source("ep01", media).unwrap();

    assert_eq!(s.key, "ep01");
    assert_eq!(s.video.as_ref().unwrap().track, 0);
    assert_eq!(s.audio.as_ref().unwrap().track, 1);
    assert_eq!(s.subtitle.as_ref().unwrap().path, media);
    assert_eq!(s.regions.len(), 1);
    assert_eq!(s.regions[0].duration(), info.duration);
    assert!(s.regions[0].tags.is_empty());
}

#[test]
fn source_without_audio_has_no_audio_track() {
    let info = ProbeInfo {
        video_tracks: 1,
        duration: Duration::from_secs(5),
        ..ProbeInfo::default()
    };
    let s = info.to_source("k", Path::new("/m.mkv")).unwrap();
    assert!(s.audio.is_none());
    assert!(s.subtitle.is_none());
}

#[test]
fn m3u_entries_skip_comments_and_detect_plain_files() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("list.m3u");
    std::fs::write(&list, "#EXTM3U\n#EXTINF:-1,first\n/media/a.mkv\n\n/media/b.mkv\n").unwrap();
    let entries = m3u_entries(&list).unwrap().unwrap();
    assert_eq!(
        entries,
        vec![PathBuf::from("/media/a.mkv"), PathBuf::from("/media/b.mkv")]
    );

    let plain = dir.path().join("video.mkv");
    std::fs::write(&plain, [0x1a, 0x45, 0xdf, 0xa3, 0xff, 0xfe]).unwrap();
    assert!(m3u_entries(&plain).unwrap().is_none());
}

#[test]
fn empty_playlist_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("empty.m3u");
    std::fs::write(&list, "#EXTM3U\n# nothing here\n").unwrap();
    assert!(matches!(
        source_from_media(&list),
        Err(MashupError::Validation(_))
    ));
}
