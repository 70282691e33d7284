pub mod cli;
pub mod config;
pub mod counter_engine;
pub mod server;
pub mod utils;

pub use config::Settings;
pub use counter_engine::{
    CounterStore, Error, FieldSchema, Geometry, Intent, Result, SlotState, SlotTable,
};
