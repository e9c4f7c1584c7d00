// tests/tag_test.rs
use srt::domain::Tag;
use srt::SrtError;

#[test]
fn test_round_trip() {
    for text in [
        "v4.4.144",
        "v4.4.144-rt134",
        "v4.4.144-cip13-rt134-rc1",
        "v5.10.0-rt0",
        "v4.19.255-rt113-rebase1",
    ] {
        assert_eq!(Tag::parse(text).unwrap().to_string(), text);
    }
}

#[test]
fn test_plain_release() {
    let tag = Tag::parse("v4.4.144").unwrap();
    assert!(matches!(tag.base(), Err(SrtError::TagBase(_))));
    assert_eq!(tag.rebase_form(), "v4.4.144-rebase");
    assert_eq!(tag.last_component_name(), None);
    assert!(!tag.is_release_candidate());
}

#[test]
fn test_rt_base() {
    assert_eq!(Tag::parse("v4.4.144-rt134").unwrap().base().unwrap(), "v4.4.144");
}

#[test]
fn test_cip_release_candidate() {
    let tag = Tag::parse("v4.4.144-cip13-rt134-rc1").unwrap();
    assert_eq!(tag.component("rt").unwrap(), 134);
    assert_eq!(tag.component("cip").unwrap(), 13);
    assert_eq!(tag.component("rc").unwrap(), 1);
    assert_eq!(tag.base().unwrap(), "v4.4.144-cip13");
    assert!(tag.is_release_candidate());
    assert_eq!(tag.last_component_name(), Some("rc"));
    assert_eq!(tag.predecessor_of("rc"), Some("rt"));
    assert_eq!(tag.predecessor_of("rt"), Some("cip"));
    assert_eq!(tag.predecessor_of("cip"), None);
}

#[test]
fn test_cip_final_release() {
    assert!(!Tag::parse("v4.4.144-cip13-rt134")
        .unwrap()
        .is_release_candidate());
}

#[test]
fn test_malformed_tags() {
    for text in ["4.4.144", "v4.4.144-RT134", "v4.4", "v4.4.144-rt", "v4.4.144-134", ""] {
        assert!(
            matches!(Tag::parse(text), Err(SrtError::TagParse(_))),
            "{} should not parse",
            text
        );
    }
}

#[test]
fn test_parse_error_names_segment() {
    let err = Tag::parse("v4.4.144-RT134").unwrap_err();
    assert!(err.to_string().contains("RT134"));
}

#[test]
fn test_missing_component_is_attribute_error() {
    let tag = Tag::parse("v4.4.144-rt134").unwrap();
    assert!(matches!(tag.component("rc"), Err(SrtError::TagAttr(_))));
    assert_eq!(tag.component("major").unwrap(), 4);
    assert_eq!(tag.component("patch").unwrap(), 144);
}

#[test]
fn test_zero_component_is_present() {
    let tag = Tag::parse("v4.4.144-rt134-rc0").unwrap();
    assert!(tag.is_release_candidate());
    assert_eq!(tag.component("rc").unwrap(), 0);
    assert_eq!(tag.get("rc"), Some(0));
}

#[test]
fn test_equality_by_canonical_form() {
    let a = Tag::parse("v4.4.144-rt134").unwrap();
    let b: Tag = "v4.4.144-rt134".parse().unwrap();
    assert_eq!(a, b);
    assert_ne!(a, Tag::parse("v4.4.144-rt135").unwrap());
}

#[test]
fn test_components_wider_than_32_bits() {
    let tag = Tag::parse("v4.4.144-rt4294967296").unwrap();
    assert_eq!(tag.component("rt").unwrap(), 4_294_967_296);
    assert_eq!(tag.to_string(), "v4.4.144-rt4294967296");
}
