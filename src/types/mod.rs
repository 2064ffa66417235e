//! Core types used across the RIS Kit.

mod common;
mod fields;
mod payment;

pub use common::*;
pub use fields::*;
pub use payment::*;
