//! `FrameBuffer`: single-write output buffer for status frames.

use std::io::Write;

use crate::protocol::Init;

/// Pre-allocated buffer for building one output line.
///
/// A frame is accumulated here, then written with a single `write_all` so the
/// host never sees half a line.
pub struct FrameBuffer {
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a new frame buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical bar (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Replace the contents with the init line and array opener.
    pub fn header(&mut self, init: &Init) {
        self.data.clear();
        init.append_header(&mut self.data);
    }

    /// Start a new frame, discarding the previous one.
    #[inline]
    pub fn begin_frame(&mut self) {
        self.data.clear();
        self.data.extend_from_slice(b",[");
    }

    /// The raw bytes, for instances to append their blocks.
    #[inline]
    pub fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Close the frame.
    #[inline]
    pub fn end_frame(&mut self) {
        self.data.extend_from_slice(b"]\n");
    }

    /// Flush to a writer in a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(frame: &FrameBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        frame.flush_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_empty_frame() {
        let mut frame = FrameBuffer::new();
        frame.begin_frame();
        frame.end_frame();
        assert_eq!(written(&frame), b",[]\n");
    }

    #[test]
    fn test_frame_reuse() {
        let mut frame = FrameBuffer::with_capacity(16);
        frame.begin_frame();
        frame.body_mut().extend_from_slice(br#"{"full_text":"a"}"#);
        frame.end_frame();
        assert_eq!(written(&frame), b",[{\"full_text\":\"a\"}]\n");

        frame.begin_frame();
        frame.end_frame();
        assert_eq!(written(&frame), b",[]\n");
    }

    #[test]
    fn test_header() {
        let mut frame = FrameBuffer::new();
        frame.header(&Init::default());
        assert_eq!(written(&frame), b"{\"version\":1}\n[[]\n");
    }
}
