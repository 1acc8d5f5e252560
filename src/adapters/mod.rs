// Adapters layer: concrete implementations for external systems
// (devices, backend HTTP, in-process stores, local disk).

pub mod device;
pub mod http;
pub mod memory;
pub mod storage;
