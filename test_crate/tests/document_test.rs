use std::collections::HashMap;
use std::fs::File;

use indexmap::IndexMap;
use javaprops::{loads, PropertiesFile};
use test_crate::{fixture_bytes, fixture_latin1, fixture_path};

fn keys(doc: &PropertiesFile) -> Vec<&str> {
    doc.keys().collect()
}

#[test]
pub fn untouched_file_round_trips() {
    let doc = PropertiesFile::load(File::open(fixture_path("sample.properties")).unwrap()).unwrap();
    assert_eq!(doc.len(), 9);
    assert_eq!(doc.get("dup"), Some("second"));
    assert_eq!(doc.dumps("="), fixture_latin1("sample.properties"));

    let mut out = Vec::new();
    doc.dump(&mut out, "=").unwrap();
    assert_eq!(out, fixture_bytes("sample.properties"));
}

#[test]
pub fn duplicate_keys_collapse_to_first_position() {
    let mut doc = PropertiesFile::loads("k=1\nother=x\nk=2\nk=3\n").unwrap();
    assert_eq!(doc.get("k"), Some("3"));
    assert_eq!(doc.lines().filter(|l| l.key() == Some("k")).count(), 3);

    doc.set("k", "4");
    assert_eq!(doc.get("k"), Some("4"));
    assert_eq!(doc.lines().filter(|l| l.key() == Some("k")).count(), 1);
    assert_eq!(doc.dumps("="), "k=4\nother=x\n");
}

#[test]
pub fn set_keeps_surrounding_formatting() {
    let mut doc = PropertiesFile::loads("#top\na = 1\n\n! b\nb : 2\n").unwrap();
    doc.set("a", "one");
    assert_eq!(doc.dumps("="), "#top\na=one\n\n! b\nb : 2\n");
    assert_eq!(doc.dumps(": "), "#top\na: one\n\n! b\nb : 2\n");
}

#[test]
pub fn new_keys_are_appended() {
    let mut doc = PropertiesFile::loads("a=1").unwrap();
    doc.set("b", "2");
    doc.set("c d", " 3");
    assert_eq!(doc.dumps("="), "a=1\nb=2\nc\\ d=\\ 3\n");
    assert_eq!(keys(&doc), ["a", "b", "c d"]);
}

#[test]
pub fn append_after_crlf_keeps_source() {
    let mut doc = PropertiesFile::loads("a=1\r\n").unwrap();
    doc.set("b", "2");
    assert_eq!(doc.dumps("="), "a=1\r\nb=2\n");
}

#[test]
pub fn append_after_dangling_continuation() {
    let mut doc = PropertiesFile::loads("a=1\\").unwrap();
    assert_eq!(doc.get("a"), Some("1"));
    doc.set("b", "2");
    assert_eq!(doc.dumps("="), "a=1\nb=2\n");

    let reparsed = loads(&doc.dumps("=")).unwrap();
    assert_eq!(reparsed["a"], "1");
    assert_eq!(reparsed["b"], "2");
}

#[test]
pub fn append_after_comment_keeps_backslash() {
    let mut doc = PropertiesFile::loads("# ends with \\").unwrap();
    doc.set("k", "v");
    assert_eq!(doc.dumps("="), "# ends with \\\nk=v\n");
}

#[test]
pub fn remove_drops_every_occurrence() {
    let mut doc = PropertiesFile::loads("# c\nk=1\nx=2\nk=3\n").unwrap();
    assert_eq!(doc.remove("k"), Some("3".to_string()));
    assert_eq!(doc.remove("k"), None);
    assert!(!doc.contains_key("k"));
    assert_eq!(doc.get("k"), None);
    assert_eq!(doc.dumps("="), "# c\nx=2\n");

    doc.set("k", "4");
    assert_eq!(doc.dumps("="), "# c\nx=2\nk=4\n");
}

#[test]
pub fn iteration_order() {
    let doc = PropertiesFile::loads("b=1\na=2\nc=3\nb=4\n").unwrap();
    assert_eq!(keys(&doc), ["b", "a", "c"]);
    assert_eq!(doc.keys().rev().collect::<Vec<_>>(), ["c", "a", "b"]);
    assert_eq!(
        doc.iter().collect::<Vec<_>>(),
        [("b", "4"), ("a", "2"), ("c", "3")]
    );
    assert_eq!(doc.len(), 3);
}

#[test]
pub fn empty_document() {
    let mut doc = PropertiesFile::new();
    assert!(doc.is_empty());
    assert_eq!(doc.dumps("="), "");

    doc.set("k", "v");
    assert_eq!(doc.dumps("="), "k=v\n");
}

#[test]
pub fn equality_ignores_superseded_duplicates() {
    let a = PropertiesFile::loads("# c\nk=1\nk=2\n").unwrap();
    let b = PropertiesFile::loads("# c\nk = 2\n").unwrap();
    assert_eq!(a, b);

    let different_comment = PropertiesFile::loads("#c\nk=2\n").unwrap();
    assert_ne!(b, different_comment);

    let different_order = PropertiesFile::loads("x=1\ny=2\n").unwrap();
    let reordered = PropertiesFile::loads("y=2\nx=1\n").unwrap();
    assert_ne!(different_order, reordered);
}

#[test]
pub fn equality_with_plain_maps() {
    let doc = PropertiesFile::loads("# c\nb=1\na=2\nb=3\n").unwrap();

    let mut map = IndexMap::new();
    map.insert("a".to_string(), "2".to_string());
    map.insert("b".to_string(), "3".to_string());
    assert_eq!(doc, map);

    let hashed: HashMap<String, String> = map.into_iter().collect();
    assert_eq!(doc, hashed);
}

#[test]
pub fn copies_are_independent() {
    let original = PropertiesFile::loads("a=1\nb=2\n").unwrap();
    let mut copy = original.clone();
    copy.set("a", "changed");
    copy.remove("b");

    assert_eq!(original.get("a"), Some("1"));
    assert_eq!(original.get("b"), Some("2"));
    assert_eq!(original.dumps("="), "a=1\nb=2\n");
    assert_eq!(copy.dumps("="), "a=changed\n");
}

#[test]
pub fn built_from_pairs() {
    let doc: PropertiesFile = vec![("x", "1"), ("y", "2"), ("x", "3")].into_iter().collect();
    assert_eq!(doc.dumps("="), "x=3\ny=2\n");

    let mut doc = doc;
    doc.extend([("z".to_string(), "4".to_string())]);
    assert_eq!(doc.get("z"), Some("4"));
}

#[test]
pub fn loads_latin1_bytes() {
    let doc = PropertiesFile::loads_bytes(b"# \xa9 2024\nname=Jos\xe9\n").unwrap();
    assert_eq!(doc.get("name"), Some("José"));

    let mut out = Vec::new();
    doc.dump(&mut out, "=").unwrap();
    assert_eq!(out, b"# \xa9 2024\nname=Jos\xe9\n");
}

#[test]
pub fn invalid_escape_fails_load() {
    assert!(PropertiesFile::loads("a=\\u12x\n").is_err());
}
