pub mod prefs;
pub mod projection;
pub mod search;
pub mod selection;
pub mod valid;
