// app/src/services/mod.rs

pub mod shipping;
