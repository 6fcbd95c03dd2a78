//! Self-contained decoder for the Ruby Marshal 4.8 subset used by gem spec
//! indexes.
//!
//! A spec index stream is one marshaled array of `[name, version, platform]`
//! entries, where `version` is a user-marshal `Gem::Version` wrapping a
//! one-element array with the version text. The decoder understands exactly
//! the node types such streams contain and nothing else; it depends on no
//! external registry of types. Unknown tags are decode errors.
//!
//! Subset: nil, booleans, packed integers, raw and ivar-wrapped strings,
//! symbols and symbol links, arrays, object links, and user-marshal
//! `Gem::Version` payloads.

use crate::error::{GemdexError, GemdexResult};

const MARSHAL_MAJOR: u8 = 4;
const MARSHAL_MINOR: u8 = 8;

/// Decoded node from the marshal subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RubyValue {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Sym(String),
    Array(Vec<RubyValue>),
    /// `Gem::Version` user-marshal payload, reduced to its version text
    Version(String),
}

/// Decode one marshal stream into its top-level value
pub(crate) fn decode(bytes: &[u8]) -> GemdexResult<RubyValue> {
    let mut decoder = Decoder::new(bytes);
    decoder.check_header()?;
    let value = decoder.parse_value()?;
    Ok(value)
}

struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    symbols: Vec<String>,
    objects: Vec<RubyValue>,
}

impl<'a> Decoder<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            symbols: Vec::new(),
            objects: Vec::new(),
        }
    }

    fn check_header(&mut self) -> GemdexResult<()> {
        let major = self.read_byte()?;
        let minor = self.read_byte()?;
        if (major, minor) != (MARSHAL_MAJOR, MARSHAL_MINOR) {
            return Err(GemdexError::decode(
                0,
                format!("unsupported marshal version {}.{}", major, minor),
            ));
        }
        Ok(())
    }

    fn parse_value(&mut self) -> GemdexResult<RubyValue> {
        let tag_pos = self.pos;
        let tag = self.read_byte()?;
        match tag {
            b'0' => Ok(RubyValue::Nil),
            b'T' => Ok(RubyValue::Bool(true)),
            b'F' => Ok(RubyValue::Bool(false)),
            b'i' => Ok(RubyValue::Int(self.read_long()?)),
            b'"' => {
                let text = self.read_string()?;
                Ok(self.register(RubyValue::Str(text)))
            }
            b':' => {
                let name = self.read_string()?;
                self.symbols.push(name.clone());
                Ok(RubyValue::Sym(name))
            }
            b';' => {
                let index = self.read_index()?;
                match self.symbols.get(index) {
                    Some(name) => Ok(RubyValue::Sym(name.clone())),
                    None => Err(GemdexError::decode(
                        tag_pos,
                        format!("symbol link {} out of range", index),
                    )),
                }
            }
            b'@' => {
                let index = self.read_index()?;
                match self.objects.get(index) {
                    Some(value) => Ok(value.clone()),
                    None => Err(GemdexError::decode(
                        tag_pos,
                        format!("object link {} out of range", index),
                    )),
                }
            }
            b'I' => {
                // Ivar-wrapped value: the wrapped object, then a counted
                // list of (symbol, value) pairs. Gem indexes only carry the
                // string-encoding ivar; contents are parsed and discarded.
                let inner = self.parse_value()?;
                let count = self.read_count(tag_pos)?;
                for _ in 0..count {
                    self.parse_value()?;
                    self.parse_value()?;
                }
                Ok(inner)
            }
            b'[' => {
                let len = self.read_count(tag_pos)?;
                // Arrays register before their elements so links resolve in
                // stream order.
                let slot = self.reserve();
                let mut elements = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    elements.push(self.parse_value()?);
                }
                let array = RubyValue::Array(elements);
                self.objects[slot] = array.clone();
                Ok(array)
            }
            b'U' => {
                let class = match self.parse_value()? {
                    RubyValue::Sym(name) => name,
                    other => {
                        return Err(GemdexError::decode(
                            tag_pos,
                            format!("user-marshal class is not a symbol: {:?}", other),
                        ))
                    }
                };
                if class != "Gem::Version" {
                    return Err(GemdexError::decode(
                        tag_pos,
                        format!("unsupported user-marshal class '{}'", class),
                    ));
                }
                let slot = self.reserve();
                let text = match self.parse_value()? {
                    RubyValue::Array(elements) => match elements.first() {
                        Some(RubyValue::Str(text)) => text.clone(),
                        _ => {
                            return Err(GemdexError::decode(
                                tag_pos,
                                "version payload has no version string",
                            ))
                        }
                    },
                    other => {
                        return Err(GemdexError::decode(
                            tag_pos,
                            format!("version payload is not an array: {:?}", other),
                        ))
                    }
                };
                let version = RubyValue::Version(text);
                self.objects[slot] = version.clone();
                Ok(version)
            }
            other => Err(GemdexError::decode(
                tag_pos,
                format!("unsupported marshal tag 0x{:02x}", other),
            )),
        }
    }

    /// Packed integer encoding shared by lengths, counts, and fixnums
    fn read_long(&mut self) -> GemdexResult<i64> {
        let c = self.read_byte()? as i8;
        match c {
            0 => Ok(0),
            1..=4 => {
                let mut value: i64 = 0;
                for shift in 0..c as u32 {
                    let byte = self.read_byte()? as i64;
                    value |= byte << (8 * shift);
                }
                Ok(value)
            }
            -4..=-1 => {
                let mut value: i64 = -1;
                for shift in 0..(-c) as u32 {
                    let byte = self.read_byte()? as i64;
                    value &= !(0xff << (8 * shift));
                    value |= byte << (8 * shift);
                }
                Ok(value)
            }
            5..=127 => Ok((c - 5) as i64),
            -128..=-5 => Ok((c + 5) as i64),
        }
    }

    fn read_count(&mut self, at: usize) -> GemdexResult<usize> {
        let value = self.read_long()?;
        usize::try_from(value)
            .map_err(|_| GemdexError::decode(at, format!("negative length {}", value)))
    }

    fn read_index(&mut self) -> GemdexResult<usize> {
        let at = self.pos;
        self.read_count(at)
    }

    fn read_string(&mut self) -> GemdexResult<String> {
        let at = self.pos;
        let len = self.read_count(at)?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| GemdexError::decode(at, "string is not valid UTF-8"))
    }

    fn read_byte(&mut self) -> GemdexResult<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| GemdexError::decode(self.pos, "unexpected end of stream"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> GemdexResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| GemdexError::decode(self.pos, "unexpected end of stream"))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn reserve(&mut self) -> usize {
        self.objects.push(RubyValue::Nil);
        self.objects.len() - 1
    }

    fn register(&mut self, value: RubyValue) -> RubyValue {
        self.objects.push(value.clone());
        value
    }
}
