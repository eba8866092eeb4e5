use std::fmt;

use super::EiscpError;
use super::Result;
use super::command;
use super::command::Zone;
use super::packet;

/// Start character and unit type for messages to and from a receiver.
const START: &str = "!1";

/// Any of these may end a message body.
const TERMINATORS: [char; 3] = ['\u{1a}', '\r', '\n'];

/// A command sent to the receiver, e.g. `IRN` with parameter `23`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    code: String,
    param: String,
}

impl Request {
    pub fn new(code: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            param: param.into(),
        }
    }

    /// Message body: `!1<CODE><PARAM>\r`.
    pub fn body(&self) -> Vec<u8> {
        format!("{}{}{}\r", START, self.code, self.param).into_bytes()
    }

    /// The body wrapped in an ISCP packet, ready to write to the socket.
    pub fn to_packet(&self) -> Vec<u8> {
        packet::encode(&self.body())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.code, self.param)
    }
}

/// A message received from the receiver.
///
/// `command` is the long command name for codes we know (IRN becomes
/// `input-selector-rename-input-function-rename`) and the raw code otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub zone: Zone,
    pub command: String,
    pub value: String,
}

impl Message {
    pub fn new(code: &str, value: impl Into<String>) -> Self {
        let (zone, command) = match command::lookup(code) {
            Some((zone, name)) => (zone, name.to_string()),
            None => (Zone::Main, code.to_string()),
        };
        Self {
            zone,
            command,
            value: value.into(),
        }
    }

    /// Decode a message body as found inside an ISCP packet.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(body);
        let text = text.trim_end_matches(TERMINATORS);

        let rest = text
            .strip_prefix('!')
            .ok_or_else(|| EiscpError::Malformed(format!("missing start character: {:?}", text)))?;

        // One character of unit type, then a three letter command code.
        let code = rest
            .get(1..4)
            .filter(|code| code.bytes().all(|b| b.is_ascii_alphanumeric()))
            .ok_or_else(|| EiscpError::Malformed(format!("missing command code: {:?}", text)))?;
        let value = &rest[4..];

        Ok(Self::new(code, value))
    }
}
