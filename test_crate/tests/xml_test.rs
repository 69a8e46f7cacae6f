use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use javaprops::{dump_xml, dumps_xml, load_xml, loads_xml, loads_xml_with, Error, XmlDumpOptions};
use test_crate::fixture_path;

#[test]
pub fn sample_file() {
    let file = BufReader::new(File::open(fixture_path("sample.xml")).unwrap());
    let data = load_xml(file).expect("Failed to parse file");

    let pairs: Vec<(&str, &str)> = data.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        pairs,
        [
            ("host", "db.remote"),
            ("query", "a < b && c"),
            ("empty", ""),
            ("blank", ""),
            ("cdata", "<raw>"),
        ]
    );
}

#[test]
pub fn wrong_root() {
    let err = loads_xml("<props><entry key=\"a\">b</entry></props>").unwrap_err();
    match err {
        Error::NotPropertiesRoot { tag } => assert_eq!(tag, "props"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
pub fn missing_key() {
    let err = loads_xml("<properties><entry>b</entry></properties>").unwrap_err();
    assert!(matches!(err, Error::MissingEntryKey));

    let err = loads_xml("<properties><entry/></properties>").unwrap_err();
    assert!(matches!(err, Error::MissingEntryKey));
}

#[test]
pub fn malformed_xml() {
    assert!(matches!(
        loads_xml("<properties><entry key=\"a\">b</properties>"),
        Err(Error::Xml(_))
    ));
    assert!(matches!(loads_xml(""), Err(Error::Xml(_))));
}

#[test]
pub fn empty_root() {
    assert!(loads_xml("<properties/>").unwrap().is_empty());
    assert!(loads_xml("<properties></properties>").unwrap().is_empty());
}

#[test]
pub fn only_direct_entries_count() {
    let data = loads_xml(
        "<properties><group><entry key=\"nested\">x</entry></group><entry key=\"top\">y</entry></properties>",
    )
    .unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data["top"], "y");
}

#[test]
pub fn entry_text_stops_at_child() {
    let data = loads_xml("<properties><entry key=\"k\">before<b>inner</b>after</entry></properties>")
        .unwrap();
    assert_eq!(data["k"], "before");
}

#[test]
pub fn whitespace_is_kept() {
    let data = loads_xml("<properties>\n  <entry key=\"k\">  spaced  </entry>\n</properties>").unwrap();
    assert_eq!(data["k"], "  spaced  ");
}

#[test]
pub fn sorted_combine() {
    let data: BTreeMap<String, String> =
        loads_xml_with("<properties><entry key=\"b\">2</entry><entry key=\"a\">1</entry></properties>")
            .unwrap();
    assert_eq!(data.keys().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
pub fn dumps_layout() {
    let text = dumps_xml(
        vec![("key", "value"), ("a\"b", "x < y & z")],
        &XmlDumpOptions::default().comment("Some <comment>"),
    );
    assert_eq!(
        text,
        "<!DOCTYPE properties SYSTEM \"http://java.sun.com/dtd/properties.dtd\">\n\
         <properties>\n\
         <comment>Some &lt;comment&gt;</comment>\n\
         <entry key=\"key\">value</entry>\n\
         <entry key='a\"b'>x &lt; y &amp; z</entry>\n\
         </properties>\n"
    );
}

#[test]
pub fn dumps_sorted() {
    let text = dumps_xml(
        vec![("b", "2"), ("a", "1")],
        &XmlDumpOptions::default().sort_keys(true),
    );
    let a = text.find("key=\"a\"").unwrap();
    let b = text.find("key=\"b\"").unwrap();
    assert!(a < b);
    assert!(!text.contains("<comment>"));
}

#[test]
pub fn dump_declares_encoding() {
    let mut out = Vec::new();
    dump_xml(vec![("k", "é€")], &mut out, &XmlDumpOptions::default()).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n<!DOCTYPE"));
    assert!(text.contains("<entry key=\"k\">é€</entry>"));
}

#[test]
pub fn dump_replaces_unencodable_characters() {
    let mut out = Vec::new();
    let options = XmlDumpOptions::default().encoding("ISO-8859-1");
    dump_xml(vec![("k€", "é€")], &mut out, &options).unwrap();

    let expected_entry: &[u8] = b"<entry key=\"k&#8364;\">\xe9&#8364;</entry>";
    assert!(out.windows(expected_entry.len()).any(|w| w == expected_entry));

    let mut ascii = Vec::new();
    dump_xml(vec![("k", "é")], &mut ascii, &XmlDumpOptions::default().encoding("US-ASCII")).unwrap();
    assert!(ascii.is_ascii());
    let text = String::from_utf8(ascii).unwrap();
    assert!(text.contains("<entry key=\"k\">&#233;</entry>"));
}

#[test]
pub fn dump_rejects_unknown_encoding() {
    let mut out = Vec::new();
    let err = dump_xml(vec![("k", "v")], &mut out, &XmlDumpOptions::default().encoding("UTF-16"))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedEncoding(name) if name == "UTF-16"));
    assert!(out.is_empty());
}

#[test]
pub fn dumped_documents_load_back() {
    let pairs = vec![
        ("plain", "value"),
        ("quotes \"'", "<tag attr='x'>"),
        ("lines", "a\nb\tc"),
        ("unicode", "\u{1F600}"),
    ];
    let text = dumps_xml(pairs.clone(), &XmlDumpOptions::default().comment("c"));
    let data = loads_xml(&text).unwrap();
    let loaded: Vec<(&str, &str)> = data.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(loaded, pairs);
}

#[test]
pub fn every_encoding_loads_back() {
    let pairs = vec![("clé", "café"), ("euro", "€ 5"), ("emoji", "\u{1F600}")];
    for encoding in ["UTF-8", "ISO-8859-1", "US-ASCII"] {
        let mut out = Vec::new();
        dump_xml(pairs.clone(), &mut out, &XmlDumpOptions::default().encoding(encoding)).unwrap();

        let data = load_xml(out.as_slice()).unwrap_or_else(|e| panic!("{encoding}: {e}"));
        let loaded: Vec<(&str, &str)> = data.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(loaded, pairs, "{encoding}");
    }
}

#[test]
pub fn latin1_document_from_bytes() {
    let bytes: &[u8] = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
        <properties><entry key=\"caf\xe9\">cr\xe8me<![CDATA[ br\xfbl\xe9e]]></entry></properties>";
    let data = load_xml(bytes).unwrap();
    assert_eq!(data["café"], "crème brûlée");
}

#[test]
pub fn decoded_text_ignores_declared_encoding() {
    let data = loads_xml(
        "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><properties><entry key=\"k\">é</entry></properties>",
    )
    .unwrap();
    assert_eq!(data["k"], "é");
}
