use std::sync::Arc;

use vocastory_cli::render::{render_html, render_text};
use vocastory_cli::session::Preview;
use vocastory_core::models::draft::StoryDraft;

fn preview(content: &str, vocabulary: &str) -> Preview {
    Preview::new(Arc::new(StoryDraft {
        key_word: "[*]".to_string(),
        title: "Fruit <day>".to_string(),
        content: content.to_string(),
        vocabulary: vocabulary.to_string(),
    }))
    .unwrap()
}

#[test]
fn text_preview_marks_terms_and_lists_meanings() {
    let text = render_text(&preview(
        "I ate an [*] and a [*].",
        "apple | quả táo\nbanana | quả chuối",
    ))
    .unwrap();

    assert!(text.starts_with("Fruit <day>"));
    assert!(text.contains("I ate an [apple] and a [banana]."));
    assert!(text.contains("1. apple | quả táo"));
    assert!(text.contains("2. banana | quả chuối"));
}

#[test]
fn html_preview_annotates_terms_and_escapes() {
    let html = render_html(&preview("<b>[*]</b>", "apple | táo & lê")).unwrap();

    assert!(html.contains(r#"<span class="term" title="táo &amp; lê">apple</span>"#));
    assert!(html.contains("&lt;b&gt;"));
    assert!(html.contains("Fruit &lt;day&gt;"));
    assert!(html.contains("white-space: pre-line"));
}
