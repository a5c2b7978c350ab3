//! Vector-length-agnostic building blocks.
//!
//! Everything above this layer asks [`VectorCapability`] how many lanes a
//! register holds and drives [`Register`] operations through [`Predicate`]
//! masks, so the same kernel code runs at any width from 128 to 2048 bits.

pub mod capability;
pub mod register;

pub use capability::{ElementWidth, Predicate, VectorCapability};
pub use register::{Lane, Register};
