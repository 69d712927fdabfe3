use super::*;
use crate::foundation::core::Region;

fn tags(t: &[&str]) -> BTreeSet<String> {
    t.iter().map(|s| s.to_string()).collect()
}

#[test]
fn empty_filter_passes_everything() {
    let f = TagFilter::default();
    assert!(f.allows(&tags(&[])));
    assert!(f.allows(&tags(&["a", "b"])));
}

#[test]
fn required_tags_must_all_be_present() {
    let f = TagFilter::new(["a", "b"], Vec::<String>::new());
    assert!(f.allows(&tags(&["a", "b", "c"])));
    assert!(!f.allows(&tags(&["a"])));
    assert!(!f.allows(&tags(&[])));
}

#[test]
fn disallowed_tags_must_all_be_absent() {
    let f = TagFilter::new(Vec::<String>::new(), ["x"]);
    assert!(f.allows(&tags(&["a"])));
    assert!(!f.allows(&tags(&["a", "x"])));
}

#[test]
fn combined_constraints() {
    let f = TagFilter::new(["a"], ["x"]);
    assert!(f.allows(&tags(&["a"])));
    assert!(!f.allows(&tags(&["a", "x"])));
    assert!(!f.allows(&tags(&["b"])));
}

#[test]
fn conflicting_tag_is_a_config_error() {
    let f = TagFilter::new(["a"], ["a"]);
    assert!(matches!(f.validate(), Err(MashupError::Config(_))));
}

#[test]
fn usable_needs_one_alignment_of_material() {
    let f = TagFilter::default();
    let short = TaggedRegion::new(Region::new(Duration::ZERO, Duration::from_millis(900)));
    let long = TaggedRegion::new(Region::new(Duration::ZERO, Duration::from_secs(1)));
    let invalid = TaggedRegion::new(Region::new(Duration::from_secs(3), Duration::from_secs(1)));
    let alignment = Duration::from_secs(1);
    assert!(!f.usable(&short, alignment));
    assert!(f.usable(&long, alignment));
    assert!(!f.usable(&invalid, alignment));
}
