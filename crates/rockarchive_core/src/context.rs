//! Context assembly for generation prompts.
//!
//! # Responsibility
//! - Serialize records into the labeled text blob embedded in chat prompts.
//!
//! # Invariants
//! - Every record is embedded; no truncation or token budgeting happens here.
//! - Blocks follow the input order.
//! - Empty input yields `EMPTY_CONTEXT`, never an empty string.

use crate::model::artist::{ArtistRecord, TRACK_DELIMITER};
use std::fmt::Write;

pub const EMPTY_CONTEXT: &str = "No artist data found.";
pub const CONTEXT_HEADER: &str = "Here is the encyclopedia of Algerian Rock Music:";
pub const PROFILE_DELIMITER: &str = "--- BAND PROFILE ---";

const UNKNOWN: &str = "Unknown";
const NO_BIO: &str = "No bio available";

/// Builds the archive-wide context blob.
pub fn build_global_context(records: &[ArtistRecord]) -> String {
    if records.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    let mut context = format!("{CONTEXT_HEADER}\n\n");
    for record in records {
        write_profile(&mut context, record, false);
    }
    context
}

/// Builds the context block for a single record, including its era.
pub fn build_focus_context(record: &ArtistRecord) -> String {
    let mut context = String::new();
    write_profile(&mut context, record, true);
    context
}

fn write_profile(out: &mut String, record: &ArtistRecord, with_era: bool) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{PROFILE_DELIMITER}");
    let _ = writeln!(out, "Name: {}", or_unknown(&record.name));
    let _ = writeln!(out, "Genre: {}", or_unknown(&record.genre));
    let _ = writeln!(out, "Origin: {}", or_unknown(&record.origin));
    if with_era {
        let _ = writeln!(out, "Era: {}", or_unknown(&record.era));
    }
    let _ = writeln!(out, "Bio: {}", or_default(&record.bio, NO_BIO));
    let _ = writeln!(
        out,
        "Famous Tracks: {}\n",
        record.famous_tracks.join(TRACK_DELIMITER)
    );
}

/// Trimmed `value`, or `Unknown` when it is blank.
pub fn or_unknown(value: &str) -> &str {
    or_default(value, UNKNOWN)
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_focus_context, build_global_context, or_unknown, EMPTY_CONTEXT, PROFILE_DELIMITER,
    };
    use crate::model::artist::ArtistRecord;

    fn record(name: &str) -> ArtistRecord {
        let mut record = ArtistRecord::new(name);
        record.genre = "Kabyle rock".to_string();
        record.famous_tracks = vec!["Song A".to_string(), "Song B".to_string()];
        record
    }

    #[test]
    fn empty_input_returns_sentinel() {
        assert_eq!(build_global_context(&[]), EMPTY_CONTEXT);
    }

    #[test]
    fn one_block_per_record_in_order() {
        let context = build_global_context(&[record("Taknara"), record("Babylone")]);

        assert_eq!(context.matches(PROFILE_DELIMITER).count(), 2);
        let first = context.find("Name: Taknara").unwrap();
        let second = context.find("Name: Babylone").unwrap();
        assert!(first < second);
        assert!(context.contains("Famous Tracks: Song A, Song B"));
    }

    #[test]
    fn blank_fields_render_placeholders() {
        let context = build_global_context(&[ArtistRecord::new("Taknara")]);

        assert!(context.contains("Origin: Unknown"));
        assert!(context.contains("Bio: No bio available"));
        assert!(!context.contains("Era:"));
    }

    #[test]
    fn or_unknown_trims_and_replaces_blank_values() {
        assert_eq!(or_unknown("  "), "Unknown");
        assert_eq!(or_unknown(" Oran "), "Oran");
    }

    #[test]
    fn focus_context_includes_era() {
        let mut focus = record("Taknara");
        focus.era = "2010s".to_string();

        let context = build_focus_context(&focus);
        assert_eq!(context.matches(PROFILE_DELIMITER).count(), 1);
        assert!(context.contains("Era: 2010s"));
    }
}
