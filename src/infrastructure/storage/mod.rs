//! Transient storage backend

mod memory;

pub use memory::InMemoryTariffRepository;
