//! Markup loader.
//!
//! Builds document nodes from a well-formed XHTML-style fragment, the way a
//! server-rendered chat stream hands its rows to the page.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use twyg_core::logging::targets;
use twyg_core::{Document, NodeId};

use crate::error::{Result, TwygError};

/// Parse `markup` and append the elements it describes under `parent`.
///
/// Returns the top-level elements in document order. Comments, processing
/// instructions and doctype declarations are skipped. Top-level text is
/// appended to `parent`. Malformed markup leaves the document untouched.
///
/// # Example
///
/// ```
/// use twyg::parse_markup;
/// use twyg_core::Document;
///
/// let mut doc = Document::new();
/// let root = doc.root();
/// let rows = parse_markup(&mut doc, root, r#"<div class="chat-row">hi</div><div class="chat-row"/>"#).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert!(doc.has_class(rows[0], "chat-row"));
/// assert_eq!(doc.text(rows[0]).unwrap(), "hi");
/// ```
pub fn parse_markup(document: &mut Document, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
    // validates `parent` before anything is created
    document.children(parent)?;

    let mut fragment = Fragment::default();
    if let Err(error) = fragment.build(document, markup) {
        for node in fragment.top_level {
            document.remove(node)?;
        }
        tracing::debug!(target: targets::MARKUP, ?parent, %error, "markup rejected");
        return Err(error);
    }

    for &node in &fragment.top_level {
        document.append_child(parent, node)?;
    }
    if !fragment.text.is_empty() {
        document.append_text(parent, &fragment.text)?;
    }
    tracing::debug!(target: targets::MARKUP, ?parent, count = fragment.top_level.len(), "markup loaded");
    Ok(fragment.top_level)
}

/// A fragment built detached from the document.
#[derive(Default)]
struct Fragment {
    top_level: Vec<NodeId>,
    /// Text found outside any element.
    text: String,
}

impl Fragment {
    fn build(&mut self, document: &mut Document, markup: &str) -> Result<()> {
        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(true);
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let node = self.create(document, &open, &start)?;
                    open.push(node);
                }
                Event::Empty(start) => {
                    self.create(document, &open, &start)?;
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| TwygError::markup(e.to_string()))?;
                    self.append_text(document, &open, &text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data);
                    self.append_text(document, &open, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        match open.last() {
            Some(&unclosed) => Err(TwygError::markup(format!("unclosed element <{}>", document.tag(unclosed)?))),
            None => Ok(()),
        }
    }

    /// Create an element inside the innermost open one, or as a new
    /// top-level node.
    fn create(&mut self, document: &mut Document, open: &[NodeId], start: &BytesStart<'_>) -> Result<NodeId> {
        let node = create_element(document, start)?;
        match open.last() {
            Some(&container) => document.append_child(container, node)?,
            None => self.top_level.push(node),
        }
        Ok(node)
    }

    fn append_text(&mut self, document: &mut Document, open: &[NodeId], text: &str) -> Result<()> {
        match open.last() {
            Some(&container) => document.append_text(container, text)?,
            None => self.text.push_str(text),
        }
        Ok(())
    }
}

fn create_element(document: &mut Document, start: &BytesStart<'_>) -> Result<NodeId> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let node = document.create_element(&name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| TwygError::markup(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| TwygError::markup(e.to_string()))?;
        document.set_attribute(node, key, value.into_owned())?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = r#"
        <div class="chat-room" id="room">
            <div class="chat-stream">
                <div class="chat-row"><p>first &amp; foremost</p></div>
                <div class="chat-row"><p>second</p></div>
            </div>
            <!-- input area -->
            <div class="chat-input" data-twyg-init='{"autoActivate": true}'>
                <div class="chat-input-wrap"><p data-twyg-permaedit="true"/></div>
                <div class="chat-submit">Send</div>
            </div>
        </div>
    "#;

    #[test]
    fn builds_chat_room() {
        let mut doc = Document::new();
        let root = doc.root();
        let top = parse_markup(&mut doc, root, ROOM).unwrap();
        assert_eq!(top.len(), 1);

        let room = top[0];
        assert_eq!(doc.tag(room).unwrap(), "div");
        assert_eq!(doc.element_id(room), Some("room"));
        assert!(doc.has_class(room, "chat-room"));

        let sections = doc.children(room).unwrap().to_vec();
        assert_eq!(sections.len(), 2);
        let rows = doc.children(sections[0]).unwrap().to_vec();
        assert_eq!(rows.len(), 2);
        let first_line = doc.children(rows[0]).unwrap()[0];
        assert_eq!(doc.text(first_line).unwrap(), "first & foremost");

        assert_eq!(doc.attribute(sections[1], "data-twyg-init"), Some(r#"{"autoActivate": true}"#));
        assert_eq!(doc.nodes_with_attribute("data-twyg-permaedit").len(), 1);
    }

    #[test]
    fn appends_after_existing_children() {
        let mut doc = Document::new();
        let root = doc.root();
        let stream = parse_markup(&mut doc, root, r#"<div class="chat-stream"><div class="chat-row"/></div>"#).unwrap()[0];

        let added = parse_markup(&mut doc, stream, r#"<div class="chat-row"><p>new</p></div>"#).unwrap();
        assert_eq!(doc.children(stream).unwrap().len(), 2);
        assert_eq!(doc.children(stream).unwrap()[1], added[0]);
    }

    #[test]
    fn rejects_broken_markup() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(matches!(parse_markup(&mut doc, root, "<div><p></div>"), Err(TwygError::Xml(_))));
        assert!(parse_markup(&mut doc, root, "<div>").is_err());
    }

    #[test]
    fn failed_parse_leaves_document_unchanged() {
        let mut doc = Document::new();
        let root = doc.root();
        let stream = parse_markup(&mut doc, root, r#"<div class="chat-stream"><div class="chat-row"/></div>"#).unwrap()[0];
        let node_count = doc.node_count();

        for broken in [r#"<div><p>x</p><span>"#, "<div><p>x</div>", "lead<div/><p>"] {
            assert!(parse_markup(&mut doc, stream, broken).is_err(), "{broken:?} parsed");
            assert_eq!(doc.node_count(), node_count);
            assert_eq!(doc.children(stream).unwrap().len(), 1);
            assert_eq!(doc.text(stream).unwrap(), "");
        }
    }
}
