//! Fixed bidirectional state-name ⇄ postal-code lookup.
//!
//! Lookups are exact string matches: no trimming, no case folding. A name the
//! table does not know simply resolves to `None`, and callers degrade the
//! affected field rather than fail.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Full name / two-letter postal abbreviation pairs: the 50 states, DC, and
/// the inhabited territories the NYT dataset reports.
pub const STATE_CODES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("American Samoa", "AS"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Guam", "GU"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Northern Mariana Islands", "MP"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Puerto Rico", "PR"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Virgin Islands", "VI"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

fn forward_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| STATE_CODES.iter().copied().collect())
}

fn reverse_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| STATE_CODES.iter().map(|&(name, code)| (code, name)).collect())
}

/// Resolve a full state name to its postal abbreviation.
pub fn name_to_code(name: &str) -> Option<&'static str> {
    forward_map().get(name).copied()
}

/// Resolve a postal abbreviation back to the full state name.
pub fn code_to_name(code: &str) -> Option<&'static str> {
    reverse_map().get(code).copied()
}

/// Tile-grid `(col, row)` position of a postal code in the terminal
/// choropleth (the familiar 11-column square-tile cartogram).
///
/// Territories other than DC and PR have no conventional tile and return
/// `None`; the map widget counts them as off-map instead of drawing them.
pub fn tile_position(code: &str) -> Option<(u16, u16)> {
    let pos = match code {
        "AK" => (0, 0),
        "ME" => (10, 0),
        "WI" => (5, 1),
        "VT" => (9, 1),
        "NH" => (10, 1),
        "WA" => (0, 2),
        "ID" => (1, 2),
        "MT" => (2, 2),
        "ND" => (3, 2),
        "MN" => (4, 2),
        "IL" => (5, 2),
        "MI" => (6, 2),
        "NY" => (8, 2),
        "MA" => (9, 2),
        "RI" => (10, 2),
        "OR" => (0, 3),
        "NV" => (1, 3),
        "WY" => (2, 3),
        "SD" => (3, 3),
        "IA" => (4, 3),
        "IN" => (5, 3),
        "OH" => (6, 3),
        "PA" => (7, 3),
        "NJ" => (8, 3),
        "CT" => (9, 3),
        "CA" => (0, 4),
        "UT" => (1, 4),
        "CO" => (2, 4),
        "NE" => (3, 4),
        "MO" => (4, 4),
        "KY" => (5, 4),
        "WV" => (6, 4),
        "VA" => (7, 4),
        "MD" => (8, 4),
        "DE" => (9, 4),
        "AZ" => (1, 5),
        "NM" => (2, 5),
        "KS" => (3, 5),
        "AR" => (4, 5),
        "TN" => (5, 5),
        "NC" => (6, 5),
        "SC" => (7, 5),
        "DC" => (8, 5),
        "OK" => (3, 6),
        "LA" => (4, 6),
        "MS" => (5, 6),
        "AL" => (6, 6),
        "GA" => (7, 6),
        "HI" => (0, 7),
        "TX" => (3, 7),
        "FL" => (8, 7),
        "PR" => (10, 7),
        _ => return None,
    };
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_entry() {
        for &(name, code) in STATE_CODES {
            assert_eq!(name_to_code(name), Some(code));
            assert_eq!(code_to_name(code), Some(name));
        }
    }

    #[test]
    fn lookups_are_exact_matches() {
        assert_eq!(name_to_code("California"), Some("CA"));
        assert_eq!(name_to_code("california"), None);
        assert_eq!(name_to_code(" California"), None);
        assert_eq!(name_to_code("Calif."), None);
        assert_eq!(code_to_name("ca"), None);
    }

    #[test]
    fn table_covers_states_dc_and_territories() {
        // 50 states + DC + AS/GU/MP/PR/VI.
        assert_eq!(STATE_CODES.len(), 56);
        assert_eq!(name_to_code("District of Columbia"), Some("DC"));
        assert_eq!(name_to_code("Puerto Rico"), Some("PR"));
    }

    #[test]
    fn tile_positions_are_unique_and_in_grid() {
        let mut seen = std::collections::HashSet::new();
        for &(_, code) in STATE_CODES {
            if let Some((col, row)) = tile_position(code) {
                assert!(col < 11, "{code} col out of range");
                assert!(row < 8, "{code} row out of range");
                assert!(seen.insert((col, row)), "{code} overlaps another tile");
            }
        }
        // All 50 states plus DC and PR have a tile.
        assert_eq!(seen.len(), 52);
    }
}
