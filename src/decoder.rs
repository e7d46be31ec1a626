//! Incremental UTF-8 decoding for chunked bodies.

/// Replacement for malformed input, as lossy decoding does.
const REPLACEMENT: char = '\u{FFFD}';

/// Stateful byte-to-text decoder.
///
/// Chunk boundaries may fall inside a multi-byte character. The incomplete
/// tail of a chunk is held back and prefixed to the next one, so decoded
/// text never contains half a character. Malformed sequences are replaced
/// with U+FFFD.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently held back waiting for the rest of a character.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Decode the next chunk.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix is UTF-8
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT);
                            rest = &after[bad..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// End of input. Returns how many incomplete trailing bytes were
    /// discarded.
    pub fn finish(&mut self) -> usize {
        std::mem::take(&mut self.pending).len()
    }
}
