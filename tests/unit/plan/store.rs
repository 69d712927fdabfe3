use super::*;
use crate::plan::model::PlanOp;

fn concat(n: &str) -> Plan {
    Plan::new(
        PlanName::parse(n).unwrap(),
        PlanOp::Concat(vec![PlanName::parse("x").unwrap()]),
    )
}

#[test]
fn create_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlanStore::create_dir(dir.path().join("plan")).unwrap();
    let plan = concat("p1");
    store.create(&plan).unwrap();
    assert!(store.exists(&plan.name));
    assert_eq!(store.load(&plan.name).unwrap(), plan);
    assert_eq!(store.path(&plan.name), dir.path().join("plan").join("p1.json"));
}

#[test]
fn create_collision_is_already_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlanStore::new(dir.path());
    store.create(&concat("p1")).unwrap();
    assert!(store.create(&concat("p1")).unwrap_err().is_already_exists());
}

#[test]
fn load_missing_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlanStore::new(dir.path());
    let err = store.load(&PlanName::parse("ghost").unwrap()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn load_always_rereads_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlanStore::new(dir.path());
    let plan = concat("p1");
    store.create(&plan).unwrap();
    let _ = store.load(&plan.name).unwrap();

    let replaced = Plan::new(
        plan.name.clone(),
        PlanOp::Concat(vec![PlanName::parse("y").unwrap()]),
    );
    std::fs::write(
        store.path(&plan.name),
        serde_json::to_vec(&replaced).unwrap(),
    )
    .unwrap();
    assert_eq!(store.load(&plan.name).unwrap(), replaced);
}

#[test]
fn load_rejects_mismatched_name() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlanStore::new(dir.path());
    std::fs::write(
        dir.path().join("a.json"),
        serde_json::to_vec(&concat("b")).unwrap(),
    )
    .unwrap();
    assert!(matches!(
        store.load(&PlanName::parse("a").unwrap()),
        Err(MashupError::Validation(_))
    ));
}
