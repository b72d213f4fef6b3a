//! Format converters
//!
//! This module contains converters from other notation formats to LilyPond.

pub mod mscx;
