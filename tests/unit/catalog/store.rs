use super::*;

#[test]
fn algorithm_names_parse_loosely() {
    assert_eq!(
        "SHA-512".parse::<DigestAlgorithm>().unwrap(),
        DigestAlgorithm::Sha512
    );
    assert_eq!(
        "sha256".parse::<DigestAlgorithm>().unwrap(),
        DigestAlgorithm::Sha256
    );
    assert!(matches!(
        "md5".parse::<DigestAlgorithm>(),
        Err(MashupError::Config(_))
    ));
}

#[test]
fn sha256_digest_matches_known_vector() {
    assert_eq!(
        DigestAlgorithm::Sha256.hex_digest(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(DigestAlgorithm::Sha512.hex_digest(b"abc").len(), 128);
}

#[test]
fn lookup_mode_does_not_create_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let store = DigestBuckets::new(dir.path(), DigestAlgorithm::Sha256);

    assert_eq!(store.locate(b"k1", false).unwrap(), None);
    let created = store.locate(b"k1", true).unwrap().unwrap();
    assert!(created.is_dir());
    assert!(created.starts_with(dir.path()));
    assert_eq!(store.locate(b"k1", false).unwrap(), Some(created));
}

#[test]
fn distinct_keys_get_distinct_buckets() {
    let store = DigestBuckets::new("/catalog", DigestAlgorithm::Sha512);
    assert_ne!(store.bucket_path(b"a"), store.bucket_path(b"b"));
    assert_eq!(store.bucket_path(b"a"), store.bucket_path(b"a"));
}
