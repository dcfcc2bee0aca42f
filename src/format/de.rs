use crate::error::{Error, Result};

use serde::de::value::StringDeserializer;
use serde::de::Deserializer as _;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use std::fmt::Display;
use std::io::{BufRead, Cursor};
use std::str::FromStr;

/// Reads values one per line from `reader`.
pub struct Deserializer<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> Deserializer<R> {
    pub fn new(reader: R) -> Self {
        Deserializer {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Fails unless only blank lines remain.
    pub fn end(&mut self) -> Result<()> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(());
            }
            self.line += 1;
            if !self.buf.trim().is_empty() {
                return Err(self.error("unexpected trailing data"));
            }
        }
    }

    fn next_line(&mut self) -> Result<()> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Err(Error::Format(format!(
                "line {}: unexpected end of input",
                self.line + 1
            )));
        }
        self.line += 1;
        let trimmed = self.buf.trim_end_matches(|c| c == '\n' || c == '\r').len();
        self.buf.truncate(trimmed);
        Ok(())
    }

    fn parse_next<T>(&mut self, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.next_line()?;
        let text = self.buf.trim();
        text.parse().map_err(|e| {
            Error::Format(format!(
                "line {}: expected {}, found {:?} ({})",
                self.line, what, text, e
            ))
        })
    }

    fn parse_bool(&mut self) -> Result<bool> {
        self.next_line()?;
        let text = self.buf.trim();
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Error::Format(format!(
                "line {}: expected a boolean, found {:?}",
                self.line, text
            )))
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::Format(format!("line {}: {}", self.line, msg))
    }
}

/// Deserializes a `T` from `reader`, rejecting trailing content.
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut deserializer = Deserializer::new(reader);
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Deserializes a `T` from `text`.
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_reader(Cursor::new(text.as_bytes()))
}

impl<'de, 'a, R: BufRead> de::Deserializer<'de> for &'a mut Deserializer<R> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _: V) -> Result<V::Value> {
        Err(self.error("the line format is not self-describing"))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.parse_bool()?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(self.parse_next("an integer")?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i16(self.parse_next("an integer")?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.parse_next("an integer")?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i64(self.parse_next("an integer")?)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u8(self.parse_next("an unsigned integer")?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u16(self.parse_next("an unsigned integer")?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.parse_next("an unsigned integer")?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u64(self.parse_next("an unsigned integer")?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.parse_next("a number")?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.parse_next("a number")?)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.next_line()?;
        visitor.visit_str(&self.buf)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let len = self.parse_next("a sequence length")?;
        visitor.visit_seq(Counted {
            de: self,
            remaining: len,
        })
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        visitor.visit_seq(Counted {
            de: self,
            remaining: len,
        })
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(fields.len(), visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_enum(Enum { de: self })
    }

    forward_to_deserialize_any! {
        char bytes byte_buf option map identifier ignored_any
    }
}

/// A fixed number of elements read back to back.
struct Counted<'a, R> {
    de: &'a mut Deserializer<R>,
    remaining: usize,
}

impl<'de, 'a, R: BufRead> de::SeqAccess<'de> for Counted<'a, R> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// An enum variant named on its own line, followed by its fields.
struct Enum<'a, R> {
    de: &'a mut Deserializer<R>,
}

impl<'de, 'a, R: BufRead> de::EnumAccess<'de> for Enum<'a, R> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self)>
    where
        V: DeserializeSeed<'de>,
    {
        self.de.next_line()?;
        let name: StringDeserializer<Error> = self.de.buf.trim().to_owned().into_deserializer();
        let line = self.de.line;
        let value = seed.deserialize(name).map_err(|e| match e {
            Error::Format(msg) => Error::Format(format!("line {}: {}", line, msg)),
            other => other,
        })?;
        Ok((value, self))
    }
}

impl<'de, 'a, R: BufRead> de::VariantAccess<'de> for Enum<'a, R> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_tuple(&mut *self.de, len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_tuple(&mut *self.de, fields.len(), visitor)
    }
}
