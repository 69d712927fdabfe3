use super::*;

#[test]
fn builtins_are_valid() {
    for (name, t) in builtin_templates() {
        t.validate(&name).unwrap();
    }
    let catalog = BlendCatalog::default();
    let mosaic = catalog.get("mosaic-scroll").unwrap();
    assert_eq!(mosaic.slots.len(), 16);
    assert_eq!(mosaic.duration, Duration::from_secs(10));
    assert_eq!(catalog.get("triptych").unwrap().slots.len(), 3);
}

#[test]
fn unknown_template_is_a_config_error() {
    let err = BlendCatalog::default().get("nope").unwrap_err();
    assert!(matches!(err, MashupError::Config(_)));
}

#[test]
fn overrides_add_and_replace() {
    let mut extra = BTreeMap::new();
    extra.insert(
        "triptych".to_string(),
        BlendTemplate::uniform("p", 2, Duration::from_secs(1), Duration::from_secs(1)),
    );
    extra.insert(
        "duo".to_string(),
        BlendTemplate::uniform("p", 2, Duration::from_secs(2), Duration::from_secs(2)),
    );
    let catalog = BlendCatalog::with_overrides(&extra).unwrap();
    assert_eq!(catalog.get("triptych").unwrap().slots.len(), 2);
    assert!(catalog.get("duo").is_ok());
    assert!(catalog.names().any(|n| n == "mosaic-scroll"));
}

#[test]
fn invalid_templates_are_rejected() {
    let empty = BlendTemplate {
        slots: vec![],
        duration: Duration::from_secs(1),
    };
    assert!(empty.validate("e").is_err());

    let mut dup = BlendTemplate::uniform("s", 2, Duration::from_secs(1), Duration::from_secs(1));
    dup.slots[1].name = dup.slots[0].name.clone();
    assert!(dup.validate("d").is_err());

    let zero = BlendTemplate::uniform("s", 2, Duration::ZERO, Duration::from_secs(1));
    assert!(zero.validate("z").is_err());

    let extra: BTreeMap<_, _> = [("bad".to_string(), zero)].into_iter().collect();
    assert!(BlendCatalog::with_overrides(&extra).is_err());
}
