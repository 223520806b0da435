//! Socket setup for the default transport.
//!
//! - [`connectjob`]: DNS → TCP → TLS connection flow
//! - [`stream`]: boxed plain or TLS stream handed to hyper

pub mod connectjob;
pub mod stream;
