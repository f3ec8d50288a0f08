//! Lexical codecs for the XML Schema (XSD) simple datatypes: parsing and
//! formatting text in each type's canonical or lexical form, plus
//! comparison and lossy coercion between types.
//!
//! Every operation reports success or failure through [`Status`] rather
//! than panicking; callers who prefer `?`-propagation can use
//! [`Status::into_result`]. See [`value`] for the generic, tag-dispatched
//! entry point and the per-type modules for the statically-typed ones.

mod bignat;
pub mod binary;
pub mod boolean;
pub mod coerce;
pub mod date;
pub mod datatype;
pub mod datetime;
mod decimal_parse;
mod floating_decimal;
pub mod duration;
pub mod integer;
mod soft_float;
pub mod status;
mod surface;
pub mod time;
pub mod timezone;
pub mod value;

pub use coerce::CoercionPolicy;
pub use datatype::Datatype;
pub use status::{FixedResult, Status, VariableResult};
pub use value::Value;
