//! A line-oriented text format for trained models.
//!
//! Every scalar occupies one line: integers and floats as decimal text,
//! booleans as `true`/`false`, enum variants and strings verbatim. Sequences
//! are prefixed by their length on a line of their own; structs and tuples
//! are their fields in declaration order with no framing. The format is not
//! self-describing, so only types with a fixed shape can be read back.
//!
//! ```
//! # use autoencoder::format;
//! let text = format::to_string(&(vec![0.5, -1.0], true)).unwrap();
//! assert_eq!(text, "2\n0.5\n-1\ntrue\n");
//!
//! let (values, flag): (Vec<f64>, bool) = format::from_str(&text).unwrap();
//! assert_eq!(values, vec![0.5, -1.0]);
//! assert!(flag);
//! ```

mod de;
mod ser;

pub use self::de::{from_reader, from_str, Deserializer};
pub use self::ser::{to_string, to_writer, Serializer};
