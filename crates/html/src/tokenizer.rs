//! Forgiving HTML tokenizer for generated documentation pages.
//!
//! Tag and attribute names are `[A-Za-z0-9:_-]` plus any non-ASCII character, ASCII-lowercased. `<script>` and
//! `<style>` bodies are rawtext. Malformed markup never fails: unterminated constructs run to
//! the end of input.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

/// Bytes >= 0x80 only occur inside multi-byte characters, so a name never ends mid-character.
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' || b >= 0x80
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_ignore_ascii_case(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack
        .get(start..start + needle.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(needle))
}

/// Finds `</name` followed by optional ASCII whitespace and `>`.
/// Returns (start of close tag, end after `>`).
fn find_rawtext_close(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if bytes.get(i + 1) == Some(&b'/')
            && starts_with_ignore_ascii_case(bytes, i + 2, name.as_bytes())
        {
            let mut k = i + 2 + name.len();
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if bytes.get(k) == Some(&b'>') {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).run()
}

pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    out: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<Token> {
        let input = self.input;
        let bytes = input.as_bytes();
        while self.pos < bytes.len() {
            if bytes[self.pos] != b'<' {
                self.text();
                continue;
            }
            if input[self.pos..].starts_with(COMMENT_START) {
                self.comment();
            } else if starts_with_ignore_ascii_case(bytes, self.pos, b"<!doctype") {
                self.doctype();
            } else if bytes.get(self.pos + 1) == Some(&b'/') {
                self.end_tag();
            } else if bytes.get(self.pos + 1).is_some_and(|b| b.is_ascii_alphabetic()) {
                self.start_tag();
            } else {
                // A stray '<' is literal text.
                self.push_text("<");
                self.pos += 1;
            }
        }
        log::trace!(target: "html.tokenizer", "tokenized {} tokens", self.out.len());
        self.out
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        if let Some(Token::Text(prev)) = self.out.last_mut() {
            prev.push_str(&decoded);
        } else {
            self.out.push(Token::Text(decoded));
        }
    }

    fn text(&mut self) {
        let input = self.input;
        let start = self.pos;
        let end = memchr(b'<', &input.as_bytes()[start..])
            .map(|rel| start + rel)
            .unwrap_or(input.len());
        self.push_text(&input[start..end]);
        self.pos = end;
    }

    fn comment(&mut self) {
        let body_start = self.pos + COMMENT_START.len();
        match self.input[body_start..].find(COMMENT_END) {
            Some(rel) => {
                let body = &self.input[body_start..body_start + rel];
                self.out.push(Token::Comment(body.to_string()));
                self.pos = body_start + rel + COMMENT_END.len();
            }
            None => {
                self.out
                    .push(Token::Comment(self.input[body_start..].to_string()));
                self.pos = self.input.len();
            }
        }
    }

    fn doctype(&mut self) {
        let body_start = self.pos + 2;
        match memchr(b'>', &self.input.as_bytes()[body_start..]) {
            Some(rel) => {
                let body = self.input[body_start..body_start + rel].trim();
                // Keep only what follows the keyword, e.g. "html".
                let value = body.get(7..).unwrap_or("").trim();
                self.out.push(Token::Doctype(value.to_string()));
                self.pos = body_start + rel + 1;
            }
            None => self.pos = self.input.len(),
        }
    }

    fn read_name(&mut self) -> String {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && is_name_byte(bytes[self.pos]) {
            self.pos += 1;
        }
        input[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn end_tag(&mut self) {
        self.pos += 2;
        let name = self.read_name();
        self.pos = memchr(b'>', &self.input.as_bytes()[self.pos..])
            .map(|rel| self.pos + rel + 1)
            .unwrap_or(self.input.len());
        if !name.is_empty() {
            self.out.push(Token::EndTag(name));
        }
    }

    fn start_tag(&mut self) {
        self.pos += 1;
        let name = self.read_name();
        let input = self.input;
        let bytes = input.as_bytes();
        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let Some(&b) = bytes.get(self.pos) else {
                break;
            };
            if b == b'>' {
                self.pos += 1;
                break;
            }
            if b == b'/' {
                self.pos += 1;
                if bytes.get(self.pos) == Some(&b'>') {
                    self_closing = true;
                    self.pos += 1;
                    break;
                }
                continue;
            }
            let attr_name = self.read_name();
            if attr_name.is_empty() {
                self.pos += input[self.pos..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            self.skip_whitespace();
            let value = if bytes.get(self.pos) == Some(&b'=') {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.attribute_value())
            } else {
                None
            };
            if !attributes.iter().any(|(k, _)| *k == attr_name) {
                attributes.push((attr_name, value));
            }
        }

        let self_closing = self_closing || is_void_element(&name);
        let rawtext = !self_closing && (name == "script" || name == "style");
        self.out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if rawtext {
            let body = &input[self.pos..];
            let (raw, consumed) = match find_rawtext_close(body, &name) {
                Some((start, end)) => (&body[..start], end),
                None => (body, body.len()),
            };
            if !raw.is_empty() {
                self.out.push(Token::Text(raw.to_string()));
            }
            self.out.push(Token::EndTag(name));
            self.pos += consumed;
        }
    }

    fn attribute_value(&mut self) -> String {
        let input = self.input;
        let bytes = input.as_bytes();
        match bytes.get(self.pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let start = self.pos + 1;
                let end = memchr(quote, &bytes[start..])
                    .map(|rel| start + rel)
                    .unwrap_or(bytes.len());
                self.pos = (end + 1).min(bytes.len());
                decode_entities(&input[start..end])
            }
            _ => {
                let start = self.pos;
                while self.pos < bytes.len()
                    && !bytes[self.pos].is_ascii_whitespace()
                    && bytes[self.pos] != b'>'
                {
                    if bytes[self.pos] == b'/' && bytes.get(self.pos + 1) == Some(&b'>') {
                        break;
                    }
                    self.pos += 1;
                }
                decode_entities(&input[start..self.pos])
            }
        }
    }
}
