//! BCH SDK - Transport codec for transaction skeletons and value trees.
//!
//! Packs dynamically-typed value trees into compact URL-safe base64
//! tokens over a msgpack binary layer, and unpacks them with the shape
//! reconstruction wallet tooling expects (byte strings, absent fields,
//! arbitrary-precision amounts). Also converts between the value tree
//! and the typed transaction model.

pub mod codec;
pub mod convert;
pub mod value;

mod error;
pub use codec::{pack, unpack};
pub use convert::{
    source_outputs_to_value, transaction_to_value, value_to_source_outputs, value_to_transaction,
};
pub use error::CodecError;
pub use value::Value;
