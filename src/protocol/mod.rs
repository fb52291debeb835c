//! Protocol codec: the i3bar wire format.
//!
//! Output is one init object on its own line, then an endless JSON array
//! whose elements are complete arrays of blocks, one per line:
//!
//! ```text
//! {"version":1,"stop_signal":10,"cont_signal":12,"click_events":true}
//! [[]
//! ,[{"full_text":"A","name":"0",...},{"full_text":"B","name":"1",...}]
//! ,[...]
//! ```
//!
//! Input (with click events enabled) is the mirror image: an endless array of
//! event objects, one per line.

mod block;
mod event;
mod json;

pub use block::{Align, Block, BorderWidth, Color, MinWidth};
pub use event::{button, parse_line, Event, Line, Modifiers};

use json::push_int;

/// Protocol version announced in the init line.
pub const VERSION: i64 = 1;

/// The init object sent once before any output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Init {
    /// Signal the bar sends to pause us.
    pub stop_signal: Option<i32>,
    /// Signal the bar sends to resume us.
    pub cont_signal: Option<i32>,
    /// Ask the bar to send click events on stdin.
    pub click_events: bool,
}

impl Init {
    /// Serialize as one JSON object, appending to `buf`.
    pub fn append_json(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(br#"{"version":"#);
        push_int(buf, VERSION);
        if let Some(sig) = self.stop_signal.filter(|&s| s != 0) {
            buf.extend_from_slice(br#","stop_signal":"#);
            push_int(buf, i64::from(sig));
        }
        if let Some(sig) = self.cont_signal.filter(|&s| s != 0) {
            buf.extend_from_slice(br#","cont_signal":"#);
            push_int(buf, i64::from(sig));
        }
        if self.click_events {
            buf.extend_from_slice(br#","click_events":true"#);
        }
        buf.push(b'}');
    }

    /// Append the init line followed by the line opening the frame array.
    ///
    /// The array opens with an empty frame so every later frame can be
    /// written with a leading comma.
    pub fn append_header(&self, buf: &mut Vec<u8>) {
        self.append_json(buf);
        buf.extend_from_slice(b"\n[[]\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_minimal() {
        let mut buf = Vec::new();
        Init::default().append_json(&mut buf);
        assert_eq!(buf, br#"{"version":1}"#);
    }

    #[test]
    fn test_header() {
        let init = Init {
            stop_signal: Some(10),
            cont_signal: Some(12),
            click_events: true,
        };
        let mut buf = Vec::new();
        init.append_header(&mut buf);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"version\":1,\"stop_signal\":10,\"cont_signal\":12,\"click_events\":true}\n[[]\n"
        );
    }
}
