//! Database entities module

pub mod tariff;
