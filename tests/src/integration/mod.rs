//! Cross-node flows.
//!
//! Each flow wires two or three `MarketService` instances to one shared
//! `InMemoryOverlay`; RPC answers one node would send another are scripted
//! on the caller's mock transport.

pub mod flows;
