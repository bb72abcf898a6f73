//! The reference adapter pair: `InternalController`, a controller with no
//! external protocol at all, and `DictSource`, a source type with no
//! decoding at all. Together they are the worked example every other
//! controller/source-type implementation follows, and the fixture used
//! by the end-to-end scenario tests.

mod dict_source;
mod internal_controller;

pub use dict_source::{dict_source_class, DICT_SOURCE_TYPE};
pub use internal_controller::InternalController;
