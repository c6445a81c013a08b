use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::kml::element::{Element, Node};

/// Parse a KML document into an [`Element`] tree rooted at the document
/// element (conventionally `<kml>`).
///
/// Namespace prefixes are preserved verbatim in element names; lookups on
/// the tree match by local name. Comments, processing instructions, the XML
/// declaration, and whitespace-only text between elements are dropped; text
/// content is kept byte for byte, with entity references resolved in place.
pub fn parse_kml(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);

    // Parent chain of open elements; the document element starts it.
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let el = element_from_start(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.append_child(el),
                    None if root.is_none() => root = Some(el),
                    None => {
                        return Err(Error::InvalidKml(
                            "multiple root elements in document".into(),
                        ));
                    }
                }
            }
            Ok(Event::End(_)) => {
                let Some(mut el) = stack.pop() else {
                    return Err(Error::InvalidKml("unbalanced closing tag".into()));
                };
                drop_formatting_whitespace(&mut el);
                match stack.last_mut() {
                    Some(parent) => parent.append_child(el),
                    None if root.is_none() => root = Some(el),
                    None => {
                        return Err(Error::InvalidKml(
                            "multiple root elements in document".into(),
                        ));
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    push_text(parent, &raw);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    push_text(parent, &raw);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                // Handle entity references like &apos; &lt; etc
                if let Some(parent) = stack.last_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    let resolved = match entity.as_ref() {
                        "apos" => "'",
                        "quot" => "\"",
                        "lt" => "<",
                        "gt" => ">",
                        "amp" => "&",
                        _ => "",
                    };
                    push_text(parent, resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::InvalidKml("unclosed element at end of document".into()));
    }
    root.ok_or_else(|| Error::InvalidKml("document has no root element".into()))
}

fn element_from_start(e: &quick_xml::events::BytesStart) -> Result<Element> {
    let mut el = Element::new(String::from_utf8(e.name().as_ref().to_vec())?);
    for attr in e.attributes().flatten() {
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        let value = attr
            .unescape_value()
            .map_err(|err| Error::InvalidKml(format!("bad attribute value: {err}")))?;
        el.attributes.push((key, value.into_owned()));
    }
    Ok(el)
}

/// Append text, merging into a trailing text node so entity references do
/// not split runs (`A &amp; B` stays one node, interior spaces intact).
fn push_text(parent: &mut Element, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(existing)) = parent.children.last_mut() {
        existing.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}

/// Drop whitespace-only text children of a completed element. Runs after all
/// fragments have been merged, so whitespace adjacent to an entity reference
/// has already been folded into a non-whitespace node and survives; what
/// remains is indentation between child elements.
fn drop_formatting_whitespace(el: &mut Element) {
    el.children
        .retain(|node| !matches!(node, Node::Text(t) if t.trim().is_empty()));
}
