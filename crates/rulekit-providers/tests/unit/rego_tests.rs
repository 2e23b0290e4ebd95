//! Tests for Rego anchor scanning and metadata rewriting

use rulekit_providers::{Error, RegoRuleText};

const RULE1: &str = "package rules.p1.p2\n\n__rego__metadoc__ := {\"title\": \"x\"}\n\nallow {\n  true\n}\n";

fn parse(text: &str) -> RegoRuleText {
    RegoRuleText::parse("rule.rego", text.to_string()).expect("rule should parse")
}

#[test]
fn test_locates_package_and_metadoc() {
    let rule = parse(RULE1);

    let package = rule.package_decl();
    assert_eq!(&RULE1[package.start..package.end], "package rules.p1.p2");
    assert_eq!(rule.package_name(), "rules.p1.p2");

    let metadoc = rule.metadoc().expect("metadoc should be found");
    assert_eq!(
        &RULE1[metadoc.start..metadoc.end],
        "__rego__metadoc__ := {\"title\": \"x\"}"
    );
    assert_eq!(rule.metadoc_keys().collect::<Vec<_>>(), vec!["title"]);
    assert_eq!(rule.metadoc_value("title"), Some("\"x\""));
}

#[test]
fn test_rewrite_injects_sid_and_severity_ahead_of_existing_keys() {
    let rule = parse(RULE1);
    let rendered = rule.render(&[("sid", "c-opl-test-rule"), ("severity", "High")]);

    assert_eq!(
        rendered,
        "package rules.p1.p2\n\n\
         __rego__metadoc__ := {\n  sid: \"c-opl-test-rule\",\n  severity: \"High\",\n  title: \"x\"\n}\n\n\
         allow {\n  true\n}\n"
    );
}

#[test]
fn test_rewrite_is_idempotent() {
    let overrides = [("sid", "c-opl-test-rule"), ("severity", "High")];
    let first = parse(RULE1).render(&overrides);
    let second = parse(RULE1).render(&overrides);
    assert_eq!(first, second);

    let again = parse(&first).render(&overrides);
    assert_eq!(again, first);
}

#[test]
fn test_override_replaces_existing_value() {
    let rule = parse(RULE1);
    let rendered = rule.render(&[("title", "New \"title\"")]);
    assert!(rendered.contains("__rego__metadoc__ := {\n  title: \"New \\\"title\\\"\"\n}"));
}

#[test]
fn test_inserts_metadoc_after_package_when_absent() {
    let text = "package rules.none\n\ndeny[msg] {\n  msg := \"no\"\n}\n";
    let rendered = parse(text).render(&[("sid", "c-opl-none")]);

    assert_eq!(
        rendered,
        "package rules.none\n\n__rego__metadoc__ := {\n  sid: \"c-opl-none\"\n}\n\ndeny[msg] {\n  msg := \"no\"\n}\n"
    );
    let reread = parse(&rendered);
    assert!(reread.metadoc().is_some());
    assert_eq!(reread.metadoc_keys().collect::<Vec<_>>(), vec!["sid"]);
}

#[test]
fn test_inserts_metadoc_into_package_only_file() {
    let rendered = parse("package lonely").render(&[("sid", "c-opl-lonely")]);
    assert_eq!(
        rendered,
        "package lonely\n\n__rego__metadoc__ := {\n  sid: \"c-opl-lonely\"\n}\n"
    );
}

#[test]
fn test_empty_overrides_keep_bytes_outside_metadoc() {
    let text = "# header\npackage a.b\n\nimport data.lib\n\n__rego__metadoc__ := {\n  \"title\": \"t\",\n}\n\nallow { lib.ok }\n";
    let rule = parse(text);
    let metadoc = rule.metadoc().unwrap();
    let rendered = rule.render(&[]);

    assert!(rendered.starts_with(&text[..metadoc.start]));
    assert!(rendered.ends_with(&text[metadoc.end..]));
    assert!(rendered.contains("import data.lib"));
}

#[test]
fn test_nested_values_and_comments() {
    let text = "package a\n\n__rego__metadoc__ := {\n  \"id\": \"FG_R001\", # legacy\n  \"custom\": {\"controls\": {\"CIS\": [\"1.1\", \"1.2\"]}},\n}\n";
    let rule = parse(text);

    assert_eq!(rule.metadoc_keys().collect::<Vec<_>>(), vec!["id", "custom"]);
    let rendered = rule.render(&[("sid", "c-opl-a")]);
    assert!(rendered.contains(
        "  sid: \"c-opl-a\",\n  id: \"FG_R001\",\n  custom: {\"controls\": {\"CIS\": [\"1.1\", \"1.2\"]}}\n}"
    ));
}

#[test]
fn test_quotes_keys_that_are_not_identifiers() {
    let rendered = parse("package a\n").render(&[("custom-id", "42")]);
    assert!(rendered.contains("  \"custom-id\": \"42\"\n"));
}

#[test]
fn test_crlf_package_line() {
    let text = "package windows.rule\r\n\r\nallow { true }\r\n";
    let rule = parse(text);
    let package = rule.package_decl();
    assert_eq!(&text[package.start..package.end], "package windows.rule");
}

#[test]
fn test_crlf_file_keeps_crlf_line_endings() {
    let text = "package windows.rule\r\n\r\nallow { true }\r\n";
    let rendered = parse(text).render(&[("sid", "c-opl-windows"), ("severity", "Low")]);

    assert_eq!(
        rendered,
        "package windows.rule\r\n\r\n\
         __rego__metadoc__ := {\r\n  sid: \"c-opl-windows\",\r\n  severity: \"Low\"\r\n}\r\n\r\n\
         allow { true }\r\n"
    );
    assert!(!rendered.replace("\r\n", "").contains('\n'));
}

#[test]
fn test_control_characters_in_values_are_escaped() {
    let rendered = parse("package a\n").render(&[("description", "col1\tcol2\r\nnext\u{1}")]);

    assert!(rendered.contains("  description: \"col1\\tcol2\\r\\nnext\\u0001\"\n"));
    assert!(!rendered.contains('\t'));
    assert!(!rendered.contains('\r'));

    let reread = parse(&rendered);
    assert_eq!(
        reread.metadoc_value("description"),
        Some("\"col1\\tcol2\\r\\nnext\\u0001\"")
    );
}

#[test]
fn test_missing_package_is_parse_error() {
    let result = RegoRuleText::parse("bad.rego", "allow { true }\n".to_string());
    assert!(matches!(result, Err(Error::Parse { .. })));
}

#[test]
fn test_unbalanced_metadoc_is_parse_error() {
    let text = "package a\n\n__rego__metadoc__ := {\n  \"title\": [\"x\"\n}\n";
    let result = RegoRuleText::parse("bad.rego", text.to_string());
    match result {
        Err(Error::Parse { message, .. }) => assert!(message.contains("unbalanced")),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_write_file_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("policy.rego");
    std::fs::write(&source, RULE1).unwrap();

    let rule = RegoRuleText::read(&source).unwrap();
    let destination = dir.path().join("out.rego");
    rule.write_file(&destination, &[("sid", "c-opl-x")]).unwrap();

    let reread = RegoRuleText::read(&destination).unwrap();
    assert_eq!(reread.metadoc_value("sid"), Some("\"c-opl-x\""));
    assert_eq!(reread.metadoc_value("title"), Some("\"x\""));
}

#[test]
fn test_read_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = RegoRuleText::read(&dir.path().join("missing.rego"));
    assert!(matches!(result, Err(Error::IoSimple { .. })));
}
