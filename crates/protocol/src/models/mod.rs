mod citekey;
mod collection;
mod date;
mod export;
mod group;
mod note;

pub use self::citekey::{CiteKey, USER_LIBRARY};
pub use self::collection::{CollectionPath, collection_paths};
pub use self::date::IssueDate;
pub use self::export::{CiteKeyExport, parse_export_rows};
pub use self::group::{Group, library_id};
pub use self::note::{Note, notes_for};
