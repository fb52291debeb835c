//! Inbound click events.
//!
//! Decoding is best effort: unknown keys are ignored and a field that fails
//! to parse stays at its zero value. A click with a garbled coordinate is
//! still worth delivering.

use bitflags::bitflags;
use serde_json::Value;

bitflags! {
    /// Modifier keys held during a click, using the X11 mask bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Caps Lock.
        const LOCK = 1 << 1;
        /// Control.
        const CONTROL = 1 << 2;
        /// Mod1, usually Alt.
        const MOD1 = 1 << 3;
        /// Mod2, usually Num Lock.
        const MOD2 = 1 << 4;
        /// Mod3.
        const MOD3 = 1 << 5;
        /// Mod4, usually Super.
        const MOD4 = 1 << 6;
        /// Mod5.
        const MOD5 = 1 << 7;
    }
}

impl Modifiers {
    /// Map a modifier name as sent by the bar.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Some(match name {
            "Shift" => Self::SHIFT,
            "Lock" => Self::LOCK,
            "Control" => Self::CONTROL,
            "Mod1" => Self::MOD1,
            "Mod2" => Self::MOD2,
            "Mod3" => Self::MOD3,
            "Mod4" => Self::MOD4,
            "Mod5" => Self::MOD5,
            _ => return None,
        })
    }
}

/// Well-known button numbers.
pub mod button {
    /// Left click.
    pub const LEFT: i32 = 1;
    /// Middle click.
    pub const MIDDLE: i32 = 2;
    /// Right click.
    pub const RIGHT: i32 = 3;
    /// Scroll up.
    pub const SCROLL_UP: i32 = 4;
    /// Scroll down.
    pub const SCROLL_DOWN: i32 = 5;
}

/// A click on a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Event {
    /// Correlation id of the target instance.
    pub name: String,
    /// The clicked block's instance sub-identifier.
    pub instance: String,
    /// Button number, see [`button`].
    pub button: i32,
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// Absolute X coordinate.
    pub x: i32,
    /// Absolute Y coordinate.
    pub y: i32,
    /// X coordinate relative to the block.
    pub relative_x: i32,
    /// Y coordinate relative to the block.
    pub relative_y: i32,
    /// X coordinate relative to the output.
    pub output_x: i32,
    /// Y coordinate relative to the output.
    pub output_y: i32,
    /// Block width.
    pub width: i32,
    /// Block height.
    pub height: i32,
}

impl Event {
    /// Decode one JSON object without failing.
    ///
    /// Anything that is not an object decodes to the default event.
    pub fn from_json(bytes: &[u8]) -> Self {
        let mut event = Self::default();
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(bytes) else {
            return event;
        };

        for (key, value) in &fields {
            match key.as_str() {
                "name" => event.name = string(value),
                "instance" => event.instance = string(value),
                "button" => event.button = int(value),
                "modifiers" => {
                    if let Some(names) = value.as_array() {
                        event.modifiers = names
                            .iter()
                            .filter_map(Value::as_str)
                            .filter_map(Modifiers::from_wire_name)
                            .collect();
                    }
                }
                "x" => event.x = int(value),
                "y" => event.y = int(value),
                "relative_x" => event.relative_x = int(value),
                "relative_y" => event.relative_y = int(value),
                "output_x" => event.output_x = int(value),
                "output_y" => event.output_y = int(value),
                "width" => event.width = int(value),
                "height" => event.height = int(value),
                _ => {}
            }
        }
        event
    }
}

fn string(value: &Value) -> String {
    value.as_str().map(str::to_owned).unwrap_or_default()
}

#[allow(clippy::cast_possible_truncation)]
fn int(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// What one inbound line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Framing (`[`) or a blank line.
    Skip,
    /// Not an object; the caller should log it.
    Invalid,
    /// A decoded click.
    Event(Event),
}

/// Classify and decode one line of the inbound stream.
///
/// One leading `[` or `,` is stripped; the rest must look like an object.
pub fn parse_line(line: &str) -> Line {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() || trimmed == "[" {
        return Line::Skip;
    }

    let body = trimmed
        .strip_prefix('[')
        .or_else(|| trimmed.strip_prefix(','))
        .unwrap_or(trimmed);

    if body.starts_with('{') && body.ends_with('}') {
        Line::Event(Event::from_json(body.as_bytes()))
    } else {
        Line::Invalid
    }
}
