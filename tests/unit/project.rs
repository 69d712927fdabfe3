use super::*;
use crate::{plan::PlanOp, testing};

#[test]
fn open_creates_plan_and_render_directories() {
    let dir = tempfile::tempdir().unwrap();
    let project = testing::project(dir.path(), "p");
    assert!(project.root().join(PLAN_DIR).is_dir());
    assert!(project.root().join(RENDER_DIR).is_dir());
    assert_eq!(project.format().extension(), "mkv");

    let name = PlanName::parse("abc").unwrap();
    assert_eq!(
        project.render_path(&name),
        project.root().join("render").join("abc.mkv")
    );
}

#[test]
fn open_rejects_missing_or_invalid_projects() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Project::open(dir.path().join("nope")).unwrap_err().is_not_found());

    let file = dir.path().join("file");
    std::fs::write(&file, "").unwrap();
    assert!(matches!(
        Project::open(&file),
        Err(MashupError::Validation(_))
    ));

    let empty = dir.path().join("empty");
    std::fs::create_dir(&empty).unwrap();
    assert!(Project::open(&empty).unwrap_err().is_not_found());

    let zero = dir.path().join("zero");
    std::fs::create_dir(&zero).unwrap();
    let mut format = testing::format(dir.path());
    format.frame_rate = 0;
    std::fs::write(zero.join(FORMAT_FILE), serde_json::to_vec(&format).unwrap()).unwrap();
    assert!(matches!(
        Project::open(&zero),
        Err(MashupError::Validation(_))
    ));
}

#[test]
fn unknown_codec_fails_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("p");
    std::fs::create_dir(&root).unwrap();
    let mut doc = serde_json::to_value(testing::format(dir.path())).unwrap();
    doc["video_codec"] = "MPEG2".into();
    std::fs::write(root.join(FORMAT_FILE), doc.to_string()).unwrap();
    assert!(matches!(Project::open(&root), Err(MashupError::Serde(_))));
}

#[test]
fn publish_replaces_relative_links() {
    let dir = tempfile::tempdir().unwrap();
    let project = testing::project(dir.path(), "p");
    let first = PlanName::parse("first").unwrap();
    let second = PlanName::parse("second").unwrap();
    for n in [&first, &second] {
        project
            .plans()
            .create(&Plan::new(n.clone(), PlanOp::Concat(vec![first.clone()])))
            .unwrap();
    }

    project.publish(&first).unwrap();
    assert_eq!(project.root_plan().unwrap().name, first);

    project.publish(&second).unwrap();
    assert_eq!(project.root_plan().unwrap().name, second);
    assert_eq!(
        std::fs::read_link(project.root().join(ROOT_PLAN_LINK)).unwrap(),
        Path::new("plan").join("second.json")
    );
    assert_eq!(
        std::fs::read_link(project.output_link()).unwrap(),
        Path::new("render").join("second.mkv")
    );
    assert!(!project.root().join(".plan.json.tmp").exists());
}

#[test]
fn missing_publication_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let project = testing::project(dir.path(), "p");
    assert!(project.root_plan().unwrap_err().is_not_found());
    assert!(project.generator_params().unwrap_err().is_not_found());
}

#[test]
fn generator_params_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    let project = testing::project(dir.path(), "p");
    std::fs::write(
        project.root().join(GENERATOR_FILE),
        r#"{"target": "1m", "alignment": "1s", "max_concat": 1, "segments": []}"#,
    )
    .unwrap();
    assert!(matches!(
        project.generator_params(),
        Err(MashupError::Config(_))
    ));
}
