// ── XML document model ──
//
// The admon service answers every request with a shallow document:
//
//   <data>
//     <log>...</log>                                   scalar value
//     <meta>                                           section
//       <node group="Default" nodeNumID="1">meta01</node>   row
//     </meta>
//   </data>
//
// Direct children of the root are exposed as scalar values (their text)
// and as sections (their child elements as attribute rows). Anything
// deeper than a row is ignored.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;

/// One tabular row: the attributes of an element plus its text content
/// under the key [`ROW_VALUE_KEY`].
pub type Row = BTreeMap<String, String>;

/// Key under which a row element's text content is stored.
pub const ROW_VALUE_KEY: &str = "value";

/// Name of the element the service uses to report failures.
const ERROR_ELEMENT: &str = "error";

/// A parsed admon response document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    root: String,
    values: BTreeMap<String, String>,
    sections: BTreeMap<String, Vec<Row>>,
}

impl XmlDocument {
    /// Parse a response body.
    ///
    /// Fails with [`Error::Server`] when the document carries an
    /// `<error>` element, and with [`Error::Xml`] when it is malformed.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(body);
        let mut stack: Vec<Frame> = Vec::new();
        let mut doc = Self::default();
        let mut saw_root = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Frame::open(&e)?),
                Event::Empty(e) => {
                    let frame = Frame::open(&e)?;
                    saw_root |= stack.is_empty();
                    doc.close(frame, &mut stack);
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::End(_) => {
                    let frame = stack.pop().ok_or_else(|| Error::Xml {
                        message: "unbalanced closing tag".into(),
                    })?;
                    saw_root |= stack.is_empty();
                    doc.close(frame, &mut stack);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml {
                message: "unexpected end of document".into(),
            });
        }
        if !saw_root {
            return Err(Error::Xml {
                message: "empty document".into(),
            });
        }
        if let Some(message) = doc.values.get(ERROR_ELEMENT) {
            return Err(Error::Server {
                message: message.clone(),
            });
        }

        Ok(doc)
    }

    /// Name of the root element.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Text of the first direct child of the root named `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// All scalar values, keyed by element name.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Rows of the section named `category`.
    ///
    /// An empty section yields an empty slice; a section absent from the
    /// document is an error, so callers can tell "no nodes" from "wrong
    /// answer".
    pub fn rows(&self, category: &str) -> Result<&[Row], Error> {
        self.sections
            .get(category)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingElement {
                name: category.to_owned(),
            })
    }

    /// Whether the document has a section named `category`.
    pub fn has_section(&self, category: &str) -> bool {
        self.sections.contains_key(category)
    }

    fn close(&mut self, frame: Frame, stack: &mut [Frame]) {
        match stack.len() {
            0 => self.root = frame.name,
            1 => {
                let text = frame.text.trim().to_owned();
                self.values.entry(frame.name.clone()).or_insert(text);
                self.sections
                    .entry(frame.name)
                    .or_default()
                    .extend(frame.rows);
            }
            2 => {
                let mut row = frame.attrs;
                row.insert(ROW_VALUE_KEY.into(), frame.text.trim().to_owned());
                if let Some(section) = stack.last_mut() {
                    section.rows.push(row);
                }
            }
            _ => {}
        }
    }
}

/// An element whose closing tag has not been seen yet.
struct Frame {
    name: String,
    attrs: Row,
    text: String,
    rows: Vec<Row>,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, Error> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Row::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            attrs.insert(key, attr.unescape_value()?.into_owned());
        }
        Ok(Self {
            name,
            attrs,
            text: String::new(),
            rows: Vec::new(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NODE_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<data>
  <mgmtd><node group="Default" nodeNumID="1">mgmt01</node></mgmtd>
  <meta>
    <node group="Default" nodeNumID="1">meta01</node>
    <node group="rack-b" nodeNumID="2">meta02</node>
  </meta>
  <storage/>
</data>"#;

    #[test]
    fn parses_sections_into_rows() {
        let doc = XmlDocument::parse(NODE_LIST).unwrap();
        assert_eq!(doc.root(), "data");

        let meta = doc.rows("meta").unwrap();
        assert_eq!(meta.len(), 2);
        assert_eq!(meta[0]["group"], "Default");
        assert_eq!(meta[0]["nodeNumID"], "1");
        assert_eq!(meta[0][ROW_VALUE_KEY], "meta01");
        assert_eq!(meta[1]["group"], "rack-b");
    }

    #[test]
    fn empty_section_is_present_but_has_no_rows() {
        let doc = XmlDocument::parse(NODE_LIST).unwrap();
        assert!(doc.has_section("storage"));
        assert!(doc.rows("storage").unwrap().is_empty());
    }

    #[test]
    fn missing_section_is_an_error() {
        let doc = XmlDocument::parse(NODE_LIST).unwrap();
        assert!(matches!(
            doc.rows("client"),
            Err(Error::MissingElement { ref name }) if name == "client"
        ));
    }

    #[test]
    fn scalar_values_are_unescaped_and_trimmed() {
        let doc = XmlDocument::parse(
            "<data><log>\n line one &amp; two\n</log><success>true</success></data>",
        )
        .unwrap();
        assert_eq!(doc.value("log"), Some("line one & two"));
        assert_eq!(doc.value("success"), Some("true"));
        assert_eq!(doc.value("missing"), None);
    }

    #[test]
    fn cdata_is_kept_verbatim() {
        let doc = XmlDocument::parse("<data><log><![CDATA[a < b]]></log></data>").unwrap();
        assert_eq!(doc.value("log"), Some("a < b"));
    }

    #[test]
    fn error_element_becomes_server_error() {
        let result = XmlDocument::parse("<data><error>Invalid session</error></data>");
        assert!(matches!(
            result,
            Err(Error::Server { ref message }) if message == "Invalid session"
        ));
    }

    #[test]
    fn truncated_document_is_rejected() {
        assert!(matches!(
            XmlDocument::parse("<data><meta><node>x</node>"),
            Err(Error::Xml { .. })
        ));
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(matches!(XmlDocument::parse(""), Err(Error::Xml { .. })));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        assert!(XmlDocument::parse("<data><meta></storage></data>").is_err());
    }
}
