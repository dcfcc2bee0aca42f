use crate::error::{Error, Result};

use serde::ser::{self, Impossible, Serialize};
use std::fmt::Display;
use std::io::Write;

/// Writes values one per line to `writer`.
pub struct Serializer<W> {
    writer: W,
}

impl<W: Write> Serializer<W> {
    pub fn new(writer: W) -> Self {
        Serializer { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line<T: Display>(&mut self, value: T) -> Result<()> {
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }
}

/// Serializes `value` to `writer`.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let mut serializer = Serializer::new(writer);
    value.serialize(&mut serializer)?;
    serializer.writer.flush()?;
    Ok(())
}

/// Serializes `value` to a string.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    to_writer(&mut buf, value)?;
    String::from_utf8(buf).map_err(|e| Error::Format(e.to_string()))
}

fn unsupported(what: &str) -> Error {
    Error::Format(format!("{} can't be written in the line format", what))
}

impl<'a, W: Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.line(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.line(v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.line(v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.line(v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.line(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.line(v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.line(v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.line(v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.line(v)
    }

    // `Display` for floats prints the shortest text that parses back to the
    // same value.
    fn serialize_f32(self, v: f32) -> Result<()> {
        self.line(v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.line(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.serialize_str(v.encode_utf8(&mut [0; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        if v.contains(|c| c == '\n' || c == '\r') {
            return Err(unsupported("a string containing a line break"));
        }
        self.line(v)
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<()> {
        Err(unsupported("a byte array"))
    }

    fn serialize_none(self) -> Result<()> {
        Err(unsupported("an optional value"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _: &T) -> Result<()> {
        Err(unsupported("an optional value"))
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.line(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.line(variant)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        match len {
            Some(len) => {
                self.line(len)?;
                Ok(self)
            }
            None => Err(unsupported("a sequence of unknown length")),
        }
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported("a tuple variant"))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap> {
        Err(unsupported("a map"))
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported("a struct variant"))
    }
}

impl<'a, W: Write> ser::SerializeSeq for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeTuple for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeTupleStruct for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeStruct for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Record {
        tag: &'static str,
        count: usize,
        values: Vec<f64>,
    }

    #[test]
    fn struct_fields_in_order() {
        let record = Record {
            tag: "RBMBinaryLayer",
            count: 2,
            values: vec![0.25, -3.0],
        };
        assert_eq!(
            to_string(&record).unwrap(),
            "RBMBinaryLayer\n2\n2\n0.25\n-3\n"
        );
    }

    #[test]
    fn nested_sequences_are_length_prefixed() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        assert_eq!(
            to_string(&rows).unwrap(),
            "3\n2\n1\n2\n2\n3\n4\n2\n5\n6\n"
        );
    }

    #[test]
    fn floats_keep_full_precision() {
        let value = 0.1 + 0.2;
        let text = to_string(&value).unwrap();
        assert_eq!(text.trim().parse::<f64>().unwrap(), value);
    }

    #[test]
    fn rejects_unwritable_values() {
        assert!(to_string(&Some(1.0)).is_err());
        assert!(to_string("two\nlines").is_err());
        let mut map = std::collections::BTreeMap::new();
        map.insert(1, 2);
        assert!(to_string(&map).is_err());
    }
}
