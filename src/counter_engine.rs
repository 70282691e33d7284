pub mod constants;

mod error;
pub use error::{Error, Result};

pub mod digest;

mod field_schema;
pub use field_schema::FieldSchema;

mod value_codec;
pub use value_codec::{decode_counters, encode_counters};

mod slot_table;
pub use slot_table::{Geometry, SlotState, SlotTable};

mod probe;
pub use probe::{locate, Intent};

mod counter_store;
pub use counter_store::CounterStore;
