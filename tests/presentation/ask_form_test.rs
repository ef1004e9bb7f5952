use mycoder::presentation::handlers::{parse_flag, parse_pinned};

#[test]
fn given_checkbox_values_when_parsing_flags_then_unknown_keeps_default() {
    assert!(parse_flag("1", false));
    assert!(parse_flag("TRUE", false));
    assert!(parse_flag("on", false));
    assert!(!parse_flag("0", true));
    assert!(!parse_flag("false", true));
    assert!(parse_flag("", true));
    assert!(!parse_flag("maybe", false));
}

#[test]
fn given_pinned_json_when_parsing_then_ids_or_nothing() {
    assert_eq!(parse_pinned(r#"["a","b"]"#), vec!["a", "b"]);
    assert!(parse_pinned("").is_empty());
    assert!(parse_pinned("not json").is_empty());
}
