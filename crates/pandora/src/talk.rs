//! Parser for the Pandorabots `talk-xml` response document.
//!
//! A successful exchange looks like:
//!
//! ```xml
//! <result status="0" botid="f5d9..." custid="c1a2...">
//!   <input>hello</input>
//!   <that>Hi there!</that>
//! </result>
//! ```
//!
//! Failures come back with a non-zero `status` and a `<message>` child.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use responder_common::error::{RelayError, Result};

/// Fields of a `talk-xml` result the relay cares about.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TalkResponse {
    pub status: i32,
    pub that: Option<String>,
    pub message: Option<String>,
}

impl TalkResponse {
    /// The bot's reply, or the reason there is none.
    pub fn into_reply(self) -> Result<String> {
        if self.status != 0 {
            return Err(RelayError::Transport(format!(
                "responder rejected request (status {}): {}",
                self.status,
                self.message.as_deref().unwrap_or("no message")
            )));
        }

        self.that
            .map(|t| t.trim().to_string())
            .ok_or_else(|| RelayError::Parse("responder result has no <that> element".into()))
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    That,
    Message,
}

fn field_of(element: &BytesStart<'_>) -> Option<Field> {
    match element.local_name().as_ref() {
        b"that" => Some(Field::That),
        b"message" => Some(Field::Message),
        _ => None,
    }
}

fn parse_error(e: impl std::fmt::Display) -> RelayError {
    RelayError::Parse(format!("responder XML: {e}"))
}

/// Parse a `talk-xml` body.
///
/// Only direct children of the root element are read; text of any markup
/// nested inside them is concatenated.
pub fn parse_talk_response(body: &str) -> Result<TalkResponse> {
    let mut reader = Reader::from_str(body);
    let mut response = TalkResponse::default();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<Field> = None;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(element) => {
                depth += 1;
                match depth {
                    1 => {
                        seen_root = true;
                        response.status = status_of(&element)?;
                    }
                    2 => {
                        current = field_of(&element);
                        if let Some(field) = current {
                            slot(&mut response, field).get_or_insert_with(String::new);
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(element) => match depth {
                0 => {
                    seen_root = true;
                    response.status = status_of(&element)?;
                }
                1 => {
                    if let Some(field) = field_of(&element) {
                        slot(&mut response, field).get_or_insert_with(String::new);
                    }
                }
                _ => {}
            },
            Event::End(_) => {
                if depth == 2 {
                    current = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if let Some(field) = current {
                    let text = text.unescape().map_err(parse_error)?;
                    slot(&mut response, field)
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(field) = current {
                    let raw = data.into_inner();
                    slot(&mut response, field)
                        .get_or_insert_with(String::new)
                        .push_str(&String::from_utf8_lossy(&raw));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(parse_error("no root element"));
    }
    if depth != 0 {
        return Err(parse_error("document ended inside an element"));
    }

    Ok(response)
}

fn slot(response: &mut TalkResponse, field: Field) -> &mut Option<String> {
    match field {
        Field::That => &mut response.that,
        Field::Message => &mut response.message,
    }
}

fn status_of(root: &BytesStart<'_>) -> Result<i32> {
    let Some(attr) = root.try_get_attribute("status").map_err(parse_error)? else {
        return Ok(0);
    };
    let value = attr.unescape_value().map_err(parse_error)?;
    value
        .trim()
        .parse()
        .map_err(|_| parse_error(format!("status attribute {value:?} is not an integer")))
}
