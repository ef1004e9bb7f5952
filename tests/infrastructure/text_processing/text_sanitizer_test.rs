use mycoder::infrastructure::text_processing::sanitize_extracted_text;

#[test]
fn given_hyphenated_line_break_when_sanitizing_then_word_rejoined() {
    assert_eq!(sanitize_extracted_text("imple-\nmentation"), "implementation");
}

#[test]
fn given_runs_of_blank_lines_when_sanitizing_then_single_paragraph_break() {
    assert_eq!(
        sanitize_extracted_text("first\n\n\n\nsecond\nthird"),
        "first\n\nsecond\nthird"
    );
}

#[test]
fn given_internal_whitespace_and_controls_when_sanitizing_then_collapsed_and_removed() {
    assert_eq!(
        sanitize_extracted_text("  a \t  b\u{0007}c  "),
        "a bc"
    );
}

#[test]
fn given_compatibility_characters_when_sanitizing_then_nfkc_applied() {
    assert_eq!(sanitize_extracted_text("ﬁle"), "file");
}

#[test]
fn given_only_whitespace_when_sanitizing_then_empty() {
    assert_eq!(sanitize_extracted_text(" \n\t\n "), "");
}
