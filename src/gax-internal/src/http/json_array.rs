// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Incremental decoding of a JSON array.
//!
//! Server-streaming methods return a single JSON array over HTTP. The array
//! arrives in chunks, and elements may span chunk boundaries. The decoder
//! finds the boundaries of each element without parsing it.

use gax::Result;
use gax::error::Error;

#[derive(Debug, thiserror::Error)]
#[error("the response ended before the JSON array was complete")]
pub struct Truncated;

#[derive(Debug, thiserror::Error)]
#[error("unexpected character {0:?} at offset {1} in the streaming response")]
struct Unexpected(char, usize);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum State {
    #[default]
    Start,
    Elements,
    Done,
}

#[derive(Debug, Default)]
pub struct JsonArrayDecoder {
    buffer: Vec<u8>,
    pos: usize,
    consumed: usize,
    start: Option<usize>,
    depth: usize,
    in_string: bool,
    escaped: bool,
    state: State,
}

impl JsonArrayDecoder {
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// True once the closing bracket was found.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Returns the next complete element, or `None` if more data is needed.
    pub fn next_element(&mut self) -> Result<Option<Vec<u8>>> {
        while self.pos < self.buffer.len() {
            let b = self.buffer[self.pos];
            self.pos += 1;
            match self.state {
                State::Start => match b {
                    b'[' => self.state = State::Elements,
                    b if b.is_ascii_whitespace() => {}
                    b => return Err(self.unexpected(b)),
                },
                State::Done => {
                    if !b.is_ascii_whitespace() {
                        return Err(self.unexpected(b));
                    }
                }
                State::Elements if self.start.is_none() => match b {
                    b',' => {}
                    b']' => self.state = State::Done,
                    b'{' | b'[' => {
                        self.start = Some(self.pos - 1);
                        self.depth = 1;
                    }
                    b if b.is_ascii_whitespace() => {}
                    b => return Err(self.unexpected(b)),
                },
                State::Elements => {
                    if let Some(element) = self.scan(b) {
                        return Ok(Some(element));
                    }
                }
            }
        }
        Ok(None)
    }

    fn scan(&mut self, b: u8) -> Option<Vec<u8>> {
        if self.in_string {
            match b {
                _ if self.escaped => self.escaped = false,
                b'\\' => self.escaped = true,
                b'"' => self.in_string = false,
                _ => {}
            }
            return None;
        }
        match b {
            b'"' => self.in_string = true,
            b'{' | b'[' => self.depth += 1,
            b'}' | b']' => {
                self.depth -= 1;
                if self.depth == 0 {
                    let start = self.start.take().unwrap_or_default();
                    let element = self.buffer[start..self.pos].to_vec();
                    self.buffer.drain(..self.pos);
                    self.consumed += self.pos;
                    self.pos = 0;
                    return Some(element);
                }
            }
            _ => {}
        }
        None
    }

    fn unexpected(&self, b: u8) -> Error {
        Error::deser(Unexpected(char::from(b), self.consumed + self.pos - 1))
    }
}
