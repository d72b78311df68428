// Per-use Lightning payments.
// client: LNURL-pay boundary. service: invoice persistence and status refresh.
// settlement: the bounded polling loop. handlers: HTTP and SSE surface.

pub mod client;
pub mod handlers;
pub mod service;
pub mod settlement;
