//! Preview rendering.
//!
//! Terms are highlighted in place. The text form marks them with brackets
//! and lists meanings underneath; the HTML form puts each meaning in the
//! term's hover title.

use serde::Serialize;
use tera::{Context, Tera};

use vocastory_core::models::vocabulary::VocabularyEntry;
use vocastory_core::segment::{self, Segment};

use crate::error::SessionError;
use crate::session::Preview;

const TEXT_TEMPLATE: &str = "preview.txt";
const HTML_TEMPLATE: &str = "preview.html";

#[derive(Serialize)]
struct PreviewContext<'a> {
    title: &'a str,
    segments: &'a [Segment],
    entries: Vec<&'a VocabularyEntry>,
}

fn templates() -> Result<Tera, SessionError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (TEXT_TEMPLATE, include_str!("../templates/preview.txt.tera")),
        (HTML_TEMPLATE, include_str!("../templates/preview.html.tera")),
    ])?;
    Ok(tera)
}

fn render(template_name: &str, preview: &Preview) -> Result<String, SessionError> {
    let value = serde_json::to_value(PreviewContext {
        title: &preview.draft().title,
        segments: preview.segments(),
        entries: segment::terms(preview.segments()).collect(),
    })?;
    let context = Context::from_value(value)?;
    Ok(templates()?.render(template_name, &context)?)
}

/// Plain-text preview for a terminal.
pub fn render_text(preview: &Preview) -> Result<String, SessionError> {
    render(TEXT_TEMPLATE, preview)
}

/// Standalone HTML page. Content and meanings are escaped.
pub fn render_html(preview: &Preview) -> Result<String, SessionError> {
    render(HTML_TEMPLATE, preview)
}
