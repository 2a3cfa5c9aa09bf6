//! Splits long replies into message-sized chunks.
//!
//! Splits only happen at line boundaries. A fenced code block that has to
//! be split is closed at the end of one chunk and reopened at the start of
//! the next, so every chunk renders as balanced markdown. Lengths are in
//! characters, not bytes, since that is what chat platforms limit.

/// Fence marker that opens and closes a code block.
pub const FENCE: &str = "```";

const FENCE_LINE: &str = "```\n";
const FENCE_LINE_LEN: usize = 4;

/// Discord's per-message character limit.
pub const DEFAULT_MAX_LEN: usize = 2000;

/// Line-based splitter with a fixed maximum chunk length.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_len: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

impl TextChunker {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        split(text, self.max_len)
    }
}

/// Split `text` into chunks of at most `max_len` characters.
///
/// Every line, including the last, is emitted with a trailing newline.
/// Lines are never broken up. A chunk may exceed the limit only when it
/// holds a line that would not fit between a reopening and a closing
/// fence on its own.
pub fn split(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buf = Buffer::default();
    let mut in_block = false;

    for line in text.split('\n') {
        let is_fence = line.contains(FENCE);
        let after = in_block != is_fence;
        let line_len = line.chars().count() + 1;
        // While a block stays open, keep room for a synthetic closing fence.
        let reserve = if after { FENCE_LINE_LEN } else { 0 };

        if buf.len + line_len + reserve > max_len && buf.lines > 0 {
            if !in_block {
                chunks.push(buf.take());
            } else if is_fence && buf.len + line_len <= max_len.max(buf.len + FENCE_LINE_LEN) {
                // The real closing fence costs no more than a synthetic one.
            } else if let Some(open) = buf.bare_open_fence() {
                // Never leave an opening fence without content behind it.
                if open.len + line_len + reserve <= max_len
                    || oversized(open.len, max_len)
                    || oversized(line_len, max_len)
                {
                    if let Some(head) = buf.split_before_open() {
                        chunks.push(head);
                    }
                } else {
                    chunks.push(buf.take_closed());
                }
            } else {
                chunks.push(buf.take_closed());
            }
        }

        buf.push(line, line_len, is_fence && !in_block, is_fence && in_block);
        in_block = after;
    }

    if buf.lines > 0 {
        chunks.push(buf.text);
    }

    chunks.retain(|chunk| !chunk.is_empty());
    chunks
}

/// A line this long cannot fit between two fences within `max_len`.
fn oversized(line_len: usize, max_len: usize) -> bool {
    line_len + 2 * FENCE_LINE_LEN > max_len
}

#[derive(Debug, Clone, Copy)]
struct OpenFence {
    /// Byte offset of the fence line in the buffer.
    at: usize,
    len: usize,
    /// No line follows the fence yet.
    bare: bool,
}

#[derive(Debug, Default)]
struct Buffer {
    text: String,
    /// Length in characters.
    len: usize,
    /// Lines from the input; a synthetic reopening fence is not counted.
    lines: usize,
    /// Opening fence of a block that is still open, if it is in this buffer.
    open: Option<OpenFence>,
}

impl Buffer {
    fn push(&mut self, line: &str, line_len: usize, opens: bool, closes: bool) {
        if let Some(open) = self.open.as_mut() {
            open.bare = false;
        }
        if opens {
            self.open = Some(OpenFence {
                at: self.text.len(),
                len: line_len,
                bare: true,
            });
        }
        if closes {
            self.open = None;
        }
        self.text.push_str(line);
        self.text.push('\n');
        self.len += line_len;
        self.lines += 1;
    }

    fn bare_open_fence(&self) -> Option<OpenFence> {
        self.open.filter(|open| open.bare)
    }

    fn take(&mut self) -> String {
        std::mem::take(self).text
    }

    /// Close the open block and start over with a reopening fence.
    fn take_closed(&mut self) -> String {
        self.text.push_str(FENCE_LINE);
        let chunk = self.take();
        self.text.push_str(FENCE_LINE);
        self.len = FENCE_LINE_LEN;
        chunk
    }

    /// Cut everything before the open block's fence line into its own chunk.
    fn split_before_open(&mut self) -> Option<String> {
        let open = self.open?;
        if open.at == 0 {
            return None;
        }
        let tail = self.text.split_off(open.at);
        let head = std::mem::replace(&mut self.text, tail);
        self.len = open.len;
        self.lines = 1;
        self.open = Some(OpenFence { at: 0, ..open });
        Some(head)
    }
}
