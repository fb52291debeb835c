//! The write-only renderer handed to update callbacks.

use std::fmt::Display;

use crate::protocol::{Block, BorderWidth, Color};

/// Appends blocks to an instance's draft buffer.
///
/// Each block is stamped with the owning instance's correlation id and
/// serialized immediately, prefixed with a comma, so the committed buffer can
/// be spliced straight into an output frame.
pub struct Renderer<'a> {
    owner: &'a str,
    buf: &'a mut Vec<u8>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(owner: &'a str, buf: &'a mut Vec<u8>) -> Self {
        Self { owner, buf }
    }

    /// Render one block.
    pub fn block(&mut self, mut block: Block) {
        block.stamp(self.owner);
        self.buf.push(b',');
        block.append_json(self.buf);
    }

    /// Render the standard error block.
    pub fn err(&mut self, err: &dyn Display) {
        self.block(error_block(err));
    }
}

/// An urgent, high-contrast block carrying `err`.
pub fn error_block(err: &dyn Display) -> Block {
    Block::new(format!(" error: {err} "))
        .with_short_text("ERR")
        .with_urgent(true)
        .with_separator(true)
        .with_background(Color::RED)
        .with_border_widths(BorderWidth::Disabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_are_comma_prefixed_and_stamped() {
        let mut buf = Vec::new();
        let mut render = Renderer::new("4", &mut buf);
        render.block(Block::new("a").with_separator(true));
        render.block(Block::new("b").with_separator(true));

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            r#",{"full_text":"a","name":"4","separator":true},{"full_text":"b","name":"4","separator":true}"#
        );
    }

    #[test]
    fn test_error_block() {
        let block = error_block(&"boom");
        assert_eq!(block.full_text(), " error: boom ");
        assert!(block.is_urgent());
        let json = block.to_json();
        assert!(json.contains(r#""short_text":"ERR""#));
        assert!(json.contains(r##""background":"#FF0000""##));
        assert!(json.contains(r#""border_left":0"#));
    }
}
