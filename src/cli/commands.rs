use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the counter store over TCP
    Serve {
        /// Listen address override, e.g. 0.0.0.0:1200
        #[arg(short, long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Print the counter snapshot for a key as JSON
    Get {
        /// Hex-encoded key
        key: String,
    },

    /// Seed or replace the full counter vector for a key
    Set {
        /// Hex-encoded key
        key: String,

        /// Comma-separated counter values, one per configured field
        values: String,
    },

    /// Add a delta to a single field of an existing key
    Incr {
        /// Hex-encoded key
        key: String,

        /// Field name or wire alias
        field: String,

        /// Signed amount to add
        delta: i32,
    },

    /// Tombstone a key so its slot can be reclaimed
    Del {
        /// Hex-encoded key
        key: String,
    },

    /// Print table geometry, field layout, and occupancy
    Info,
}
