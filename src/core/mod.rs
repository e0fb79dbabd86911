// Core modules implementing the value model, query codec, and error modeling.
pub mod apply;
pub mod encode;
pub mod error;
pub mod literal;
pub mod parse;
pub mod snapshot;
pub mod value;
