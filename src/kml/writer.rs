use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::error::Result;
use crate::kml::element::{Element, Node};

/// Serialize an [`Element`] tree to UTF-8 XML with a declaration, indented
/// two spaces per level.
pub fn write_kml(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, root)?;
    Ok(writer.into_inner().into_inner())
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}
