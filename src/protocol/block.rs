//! Block: one renderable status fragment.
//!
//! Blocks are plain values built with `with_*` setters and serialized with
//! [`Block::append_json`]. The correlation id (`name` on the wire) is private:
//! only the owning instance stamps it, right before serialization, so a module
//! cannot claim clicks addressed to another module.

use super::json::{push_hex_color, push_int, push_str};

/// An RGBA color, stored as `0xRRGGBBAA`.
///
/// [`Color::DEFAULT`] (all zero) leaves the color to the host bar.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color(u32);

impl Color {
    /// Use the bar's default color.
    pub const DEFAULT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red, used for error blocks.
    pub const RED: Self = Self::rgb(255, 0, 0);

    /// Create an opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    /// Create a color with an explicit alpha channel.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    /// Create from a packed `0xRRGGBBAA` value.
    #[inline]
    pub const fn from_u32(rrggbbaa: u32) -> Self {
        Self(rrggbbaa)
    }

    /// The packed `0xRRGGBBAA` value.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Whether this is the host default.
    #[inline]
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Color {
    #[inline]
    fn from(rrggbbaa: u32) -> Self {
        Self(rrggbbaa)
    }
}

impl std::fmt::Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// Width of one border side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum BorderWidth {
    /// The bar's default (1px on i3bar). Not serialized.
    #[default]
    Default,
    /// No border on this side. Serialized as `0`.
    Disabled,
    /// An explicit width in pixels. `Pixels(0)` is the same as `Default`.
    Pixels(u32),
}

impl BorderWidth {
    const fn wire(self) -> Option<u32> {
        match self {
            Self::Default | Self::Pixels(0) => None,
            Self::Disabled => Some(0),
            Self::Pixels(px) => Some(px),
        }
    }
}

/// Minimum block width.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub enum MinWidth {
    /// No minimum.
    #[default]
    None,
    /// A width in pixels.
    Pixels(u32),
    /// The rendered width of this reference text.
    Text(String),
}

/// Text alignment inside a block wider than its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

impl Align {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// One status fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    name: String,
    instance: String,
    full_text: String,
    short_text: String,
    color: Color,
    background: Color,
    border: Color,
    border_top: BorderWidth,
    border_right: BorderWidth,
    border_bottom: BorderWidth,
    border_left: BorderWidth,
    min_width: MinWidth,
    align: Option<Align>,
    urgent: bool,
    separator: bool,
    separator_block_width: i32,
    markup: bool,
}

impl Default for Block {
    fn default() -> Self {
        Self::new("")
    }
}

impl Block {
    /// Create a block showing `full_text` with every other field at its default.
    pub fn new(full_text: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            instance: String::new(),
            full_text: full_text.into(),
            short_text: String::new(),
            color: Color::DEFAULT,
            background: Color::DEFAULT,
            border: Color::DEFAULT,
            border_top: BorderWidth::Default,
            border_right: BorderWidth::Default,
            border_bottom: BorderWidth::Default,
            border_left: BorderWidth::Default,
            min_width: MinWidth::None,
            align: None,
            urgent: false,
            separator: false,
            separator_block_width: 0,
            markup: false,
        }
    }

    /// Sub-identifier echoed back in click events for this block.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// Text used when the bar runs out of space.
    #[must_use]
    pub fn with_short_text(mut self, short_text: impl Into<String>) -> Self {
        self.short_text = short_text.into();
        self
    }

    /// Text color.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Background color.
    #[must_use]
    pub const fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Border color.
    #[must_use]
    pub const fn with_border(mut self, color: Color) -> Self {
        self.border = color;
        self
    }

    /// Set all four border widths.
    #[must_use]
    pub const fn with_border_widths(mut self, width: BorderWidth) -> Self {
        self.border_top = width;
        self.border_right = width;
        self.border_bottom = width;
        self.border_left = width;
        self
    }

    /// Top border width.
    #[must_use]
    pub const fn with_border_top(mut self, width: BorderWidth) -> Self {
        self.border_top = width;
        self
    }

    /// Right border width.
    #[must_use]
    pub const fn with_border_right(mut self, width: BorderWidth) -> Self {
        self.border_right = width;
        self
    }

    /// Bottom border width.
    #[must_use]
    pub const fn with_border_bottom(mut self, width: BorderWidth) -> Self {
        self.border_bottom = width;
        self
    }

    /// Left border width.
    #[must_use]
    pub const fn with_border_left(mut self, width: BorderWidth) -> Self {
        self.border_left = width;
        self
    }

    /// Minimum width.
    #[must_use]
    pub fn with_min_width(mut self, min_width: MinWidth) -> Self {
        self.min_width = min_width;
        self
    }

    /// Alignment, used when the text is narrower than the minimum width.
    #[must_use]
    pub const fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Ask the bar to highlight this block.
    #[must_use]
    pub const fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    /// Draw a separator line after this block.
    #[must_use]
    pub const fn with_separator(mut self, separator: bool) -> Self {
        self.separator = separator;
        self
    }

    /// Gap after the block in pixels.
    ///
    /// With a separator, `0` (or less) keeps the bar's default. Without one,
    /// `0` is an explicit zero gap and a negative value keeps the default.
    #[must_use]
    pub const fn with_separator_block_width(mut self, width: i32) -> Self {
        self.separator_block_width = width;
        self
    }

    /// Interpret the text as Pango markup.
    #[must_use]
    pub const fn with_markup(mut self, markup: bool) -> Self {
        self.markup = markup;
        self
    }

    /// The full text.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// The instance sub-identifier.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Whether the block is urgent.
    pub const fn is_urgent(&self) -> bool {
        self.urgent
    }

    /// Overwrite the correlation id. Only the owning instance does this.
    pub(crate) fn stamp(&mut self, owner: &str) {
        self.name.clear();
        self.name.push_str(owner);
    }

    /// Serialize as one JSON object, appending to `buf`.
    ///
    /// `full_text` is always present; other fields are omitted at their
    /// default value. `separator` is always written since the bar's default
    /// differs from ours.
    pub fn append_json(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(br#"{"full_text":"#);
        push_str(buf, &self.full_text);

        if !self.short_text.is_empty() {
            buf.extend_from_slice(br#","short_text":"#);
            push_str(buf, &self.short_text);
        }
        push_color(buf, br#","color":"#, self.color);
        if !self.name.is_empty() {
            buf.extend_from_slice(br#","name":"#);
            push_str(buf, &self.name);
        }
        if !self.instance.is_empty() {
            buf.extend_from_slice(br#","instance":"#);
            push_str(buf, &self.instance);
        }
        push_color(buf, br#","background":"#, self.background);
        push_color(buf, br#","border":"#, self.border);
        push_border(buf, br#","border_top":"#, self.border_top);
        push_border(buf, br#","border_right":"#, self.border_right);
        push_border(buf, br#","border_bottom":"#, self.border_bottom);
        push_border(buf, br#","border_left":"#, self.border_left);

        match &self.min_width {
            MinWidth::None | MinWidth::Pixels(0) => {}
            MinWidth::Pixels(px) => {
                buf.extend_from_slice(br#","min_width":"#);
                push_int(buf, i64::from(*px));
            }
            MinWidth::Text(text) if text.is_empty() => {}
            MinWidth::Text(text) => {
                buf.extend_from_slice(br#","min_width":"#);
                push_str(buf, text);
            }
        }
        if let Some(align) = self.align {
            buf.extend_from_slice(br#","align":"#);
            push_str(buf, align.as_str());
        }
        if self.urgent {
            buf.extend_from_slice(br#","urgent":true"#);
        }
        if self.separator {
            buf.extend_from_slice(br#","separator":true"#);
            if self.separator_block_width > 0 {
                buf.extend_from_slice(br#","separator_block_width":"#);
                push_int(buf, i64::from(self.separator_block_width));
            }
        } else {
            buf.extend_from_slice(br#","separator":false"#);
            if self.separator_block_width >= 0 {
                buf.extend_from_slice(br#","separator_block_width":"#);
                push_int(buf, i64::from(self.separator_block_width));
            }
        }
        if self.markup {
            buf.extend_from_slice(br#","markup":"pango""#);
        }
        buf.push(b'}');
    }

    /// Serialize into a fresh string.
    pub fn to_json(&self) -> String {
        let mut buf = Vec::with_capacity(64 + self.full_text.len());
        self.append_json(&mut buf);
        // Every input is a &str and every escape is ASCII.
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn push_color(buf: &mut Vec<u8>, key: &[u8], color: Color) {
    if color.is_default() {
        return;
    }
    buf.extend_from_slice(key);
    buf.push(b'"');
    push_hex_color(buf, color.to_u32());
    buf.push(b'"');
}

fn push_border(buf: &mut Vec<u8>, key: &[u8], width: BorderWidth) {
    if let Some(px) = width.wire() {
        buf.extend_from_slice(key);
        push_int(buf, i64::from(px));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_block() {
        assert_eq!(
            Block::new("hi").to_json(),
            r#"{"full_text":"hi","separator":false,"separator_block_width":0}"#
        );
        assert_eq!(
            Block::new("hi").with_separator(true).to_json(),
            r#"{"full_text":"hi","separator":true}"#
        );
    }

    #[test]
    fn test_full_block_field_order() {
        let mut block = Block::new("x")
            .with_short_text("s")
            .with_color(Color::rgb(0x11, 0x22, 0x33))
            .with_instance("count")
            .with_background(Color::rgba(0, 0, 0, 0x80))
            .with_border(Color::WHITE)
            .with_border_left(BorderWidth::Pixels(4))
            .with_border_top(BorderWidth::Disabled)
            .with_min_width(MinWidth::Pixels(30))
            .with_align(Align::Center)
            .with_urgent(true)
            .with_separator(true)
            .with_separator_block_width(9)
            .with_markup(true);
        block.stamp("3");

        assert_eq!(
            block.to_json(),
            concat!(
                r##"{"full_text":"x","short_text":"s","color":"#112233","##,
                r##""name":"3","instance":"count","background":"#00000080","##,
                r##""border":"#FFFFFF","border_top":0,"border_left":4,"##,
                r#""min_width":30,"align":"center","urgent":true,"#,
                r#""separator":true,"separator_block_width":9,"markup":"pango"}"#
            )
        );
    }

    #[test]
    fn test_zero_pixel_border_is_default() {
        let block = Block::new("a")
            .with_separator(true)
            .with_border_left(BorderWidth::Pixels(0))
            .with_border_right(BorderWidth::Disabled);
        assert_eq!(
            block.to_json(),
            r#"{"full_text":"a","border_right":0,"separator":true}"#
        );
    }

    #[test]
    fn test_min_width_text_wins() {
        let block = Block::new("1")
            .with_separator(true)
            .with_min_width(MinWidth::Text("0000".into()));
        assert_eq!(
            block.to_json(),
            r#"{"full_text":"1","min_width":"0000","separator":true}"#
        );
    }

    #[test]
    fn test_separator_width_zero_handling() {
        // Without a separator, negative means "bar default".
        let json = Block::new("a").with_separator_block_width(-1).to_json();
        assert!(!json.contains("separator_block_width"));

        // With a separator, zero means "bar default".
        let json = Block::new("a")
            .with_separator(true)
            .with_separator_block_width(0)
            .to_json();
        assert!(!json.contains("separator_block_width"));
    }

    #[test]
    fn test_stamp_overwrites_name() {
        let mut block = Block::new("a").with_separator(true);
        block.stamp("7");
        block.stamp("1");
        assert_eq!(
            block.to_json(),
            r#"{"full_text":"a","name":"1","separator":true}"#
        );
    }

    #[test]
    fn test_disabled_borders_encode_zero() {
        let json = Block::new("e")
            .with_separator(true)
            .with_border_widths(BorderWidth::Disabled)
            .to_json();
        assert!(json.contains(
            r#""border_top":0,"border_right":0,"border_bottom":0,"border_left":0"#
        ));
    }
}
