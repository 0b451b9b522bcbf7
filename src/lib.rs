//! Calculation dispatch core: validate a typed calculation request, then
//! evaluate it in-process (arithmetic) or hand it to an external financial
//! engine reached through a subprocess CLI protocol.

pub mod consts;
pub mod dispatch;
pub mod engine;
pub mod ops;
pub mod records;
pub mod request;
