use rand::{SeedableRng as _, rngs::StdRng};

use super::*;
use crate::foundation::core::{Duration, Region, TaggedRegion};

fn source(key: &str) -> Source {
    Source::new(
        key,
        vec![
            TaggedRegion::new(Region::new(Duration::ZERO, Duration::from_secs(10)))
                .with_tags(["action"]),
        ],
    )
}

fn catalog() -> (tempfile::TempDir, Catalog) {
    let dir = tempfile::tempdir().unwrap();
    let cat = Catalog::new(dir.path().join("catalog"), "SHA-512").unwrap();
    (dir, cat)
}

#[test]
fn create_then_lookup_returns_the_same_source() {
    let (_dir, cat) = catalog();
    let s = source("k1");
    cat.create(&s).unwrap();
    assert_eq!(cat.lookup("k1").unwrap(), s);
}

#[test]
fn duplicate_create_is_already_exists_and_keeps_the_original() {
    let (_dir, cat) = catalog();
    cat.create(&source("k1")).unwrap();

    let mut changed = source("k1");
    changed.regions[0].tags.clear();
    let err = cat.create(&changed).unwrap_err();
    assert!(err.is_already_exists(), "{err}");

    assert_eq!(cat.lookup("k1").unwrap(), source("k1"));
    let keys = cat.keys(&mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(keys, vec!["k1".to_string()]);
}

#[test]
fn lookup_of_unknown_key_is_not_found() {
    let (_dir, cat) = catalog();
    assert!(cat.lookup("nope").unwrap_err().is_not_found());
}

#[test]
fn keys_are_complete_and_shuffled() {
    let (_dir, cat) = catalog();
    let expected: Vec<String> = (0..32).map(|i| format!("key-{i:02}")).collect();
    for k in &expected {
        cat.create(&source(k)).unwrap();
    }

    let mut rng = StdRng::seed_from_u64(7);
    let a = cat.keys(&mut rng).unwrap();
    let b = cat.keys(&mut rng).unwrap();

    let mut sorted = a.clone();
    sorted.sort();
    assert_eq!(sorted, expected);
    assert_ne!(a, expected, "32 keys should not come back in insertion order");
    assert_ne!(a, b, "each call reshuffles");
}

#[test]
fn empty_catalog_has_no_keys() {
    let (_dir, cat) = catalog();
    assert!(cat.keys(&mut StdRng::seed_from_u64(1)).unwrap().is_empty());
}

#[test]
fn unsupported_algorithm_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Catalog::new(dir.path(), "CRC32"),
        Err(MashupError::Config(_))
    ));
}
