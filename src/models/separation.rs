//! Separation models.
//!
//! Units that split one feed into product and waste streams.

pub mod filtration;
