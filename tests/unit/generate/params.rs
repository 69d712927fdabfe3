use super::*;

fn sample_json() -> serde_json::Value {
    serde_json::json!({
        "target": "10m",
        "alignment": "100ms",
        "max_concat": 8,
        "required_tags": ["action"],
        "disallowed_tags": ["credits"],
        "segments": [
            {"blend": {"template": "mosaic-scroll", "tickets": 1}},
            {"stack": {"duration": {"min": "0.2s", "max": "0.5s"}, "count": 4, "tickets": 50}},
            {"clip": {"duration": {"min": "0.2s", "max": "0.5s"}, "tickets": 50}}
        ]
    })
}

#[test]
fn decodes_and_validates() {
    let params: GeneratorParameters = serde_json::from_value(sample_json()).unwrap();
    params.validate().unwrap();
    assert_eq!(params.target, Duration::from_secs(600));
    assert_eq!(params.alignment, Duration::from_millis(100));
    assert!(!params.inline_sources);
    assert_eq!(params.segments.len(), 3);
    assert_eq!(
        params.segments[1],
        SegmentTemplate::Stack {
            duration: DurationRange::new(Duration::from_millis(200), Duration::from_millis(500)),
            count: 4,
            tickets: 50,
        }
    );
    let filter = params.tag_filter();
    assert!(filter.required.contains("action"));
    assert!(filter.disallowed.contains("credits"));
}

#[test]
fn json_round_trips() {
    let params: GeneratorParameters = serde_json::from_value(sample_json()).unwrap();
    let text = serde_json::to_string(&params).unwrap();
    let back: GeneratorParameters = serde_json::from_str(&text).unwrap();
    assert_eq!(back, params);
}

#[test]
fn unknown_segment_kind_fails_decoding() {
    let mut v = sample_json();
    v["segments"] = serde_json::json!([{"montage": {"tickets": 1}}]);
    assert!(serde_json::from_value::<GeneratorParameters>(v).is_err());
}

fn invalid(edit: impl FnOnce(&mut serde_json::Value)) -> MashupError {
    let mut v = sample_json();
    edit(&mut v);
    let params: GeneratorParameters = serde_json::from_value(v).unwrap();
    params.validate().unwrap_err()
}

#[test]
fn rejects_bad_parameters() {
    let cases: Vec<(&str, Box<dyn FnOnce(&mut serde_json::Value)>)> = vec![
        ("zero target", Box::new(|v| v["target"] = "0s".into())),
        ("zero alignment", Box::new(|v| v["alignment"] = "0s".into())),
        ("fanout", Box::new(|v| v["max_concat"] = 1.into())),
        ("no segments", Box::new(|v| v["segments"] = serde_json::json!([]))),
        (
            "no tickets",
            Box::new(|v| {
                v["segments"] = serde_json::json!([
                    {"clip": {"duration": {"min": "1s", "max": "2s"}, "tickets": 0}}
                ])
            }),
        ),
        (
            "inverted range",
            Box::new(|v| {
                v["segments"][2]["clip"]["duration"] = serde_json::json!({"min": "3s", "max": "2s"})
            }),
        ),
        (
            "non-square stack",
            Box::new(|v| v["segments"][1]["stack"]["count"] = 6.into()),
        ),
        (
            "stack wider than fanout",
            Box::new(|v| {
                v["max_concat"] = 4.into();
                v["segments"][1]["stack"]["count"] = 9.into();
            }),
        ),
        (
            "unknown blend",
            Box::new(|v| v["segments"][0]["blend"]["template"] = "nope".into()),
        ),
        (
            "conflicting tags",
            Box::new(|v| v["disallowed_tags"] = serde_json::json!(["action"])),
        ),
    ];
    for (what, edit) in cases {
        let err = invalid(edit);
        assert!(matches!(err, MashupError::Config(_)), "{what}: {err}");
    }
}

#[test]
fn custom_blend_templates_are_accepted() {
    let mut v = sample_json();
    v["blend_templates"] = serde_json::json!({
        "duo": {
            "slots": [{"name": "a", "duration": "2s"}, {"name": "b", "duration": "2s"}],
            "duration": "2s"
        }
    });
    v["segments"][0]["blend"]["template"] = "duo".into();
    let params: GeneratorParameters = serde_json::from_value(v).unwrap();
    params.validate().unwrap();
    assert_eq!(
        params.blend_catalog().unwrap().get("duo").unwrap().duration,
        Duration::from_secs(2)
    );
}
