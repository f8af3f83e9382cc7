#![doc = include_str!("../README.md")]

mod callable;
mod compat;
mod error;
mod fanout;
mod fold;
mod invoke;
mod promise;
mod value;
mod values;

pub use callable::*;
pub use error::*;
pub use fanout::*;
pub use fold::*;
pub use invoke::*;
pub use promise::*;
pub use value::*;
pub use values::*;
