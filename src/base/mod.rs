//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): network error codes in the style of `net_error_list.h`
//! - [`LoadState`](loadstate::LoadState): transport handle lifecycle
//! - [`Clock`](clock::Clock): epoch-second time source used for cache expiry

pub mod clock;
pub mod context;
pub mod loadstate;
pub mod neterror;
