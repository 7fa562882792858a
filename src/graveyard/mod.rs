//! Graveyard log storage

pub mod models;
pub mod store;

pub use models::*;
pub use store::{
    append_record, ensure_log, graveyard_path, list_records, parse_records, read_log,
    render_record, GRAVEYARD_FILE, GRAVEYARD_HEADER, LAST_WORDS_MAX_CHARS,
    NO_GRAVEYARD_MESSAGE,
};
