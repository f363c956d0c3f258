//! Address abbreviation for compact card display.
//!
//! Pure string transformation: each comma-separated part of the address is
//! split on whitespace and every word is replaced through static lookup
//! tables, checked in priority order (states, compass directions, road
//! types, countries). Lookup is a case-sensitive exact match on the whole
//! word; anything unrecognized passes through unchanged.

/// US state names to USPS codes.
static STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
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
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

static DIRECTIONS: &[(&str, &str)] = &[
    ("North", "N"),
    ("South", "S"),
    ("East", "E"),
    ("West", "W"),
    ("Northeast", "NE"),
    ("Northwest", "NW"),
    ("Southeast", "SE"),
    ("Southwest", "SW"),
];

static ROAD_TYPES: &[(&str, &str)] = &[
    ("Street", "St"),
    ("Road", "Rd"),
    ("Avenue", "Ave"),
    ("Boulevard", "Blvd"),
    ("Drive", "Dr"),
    ("Lane", "Ln"),
    ("Court", "Ct"),
    ("Place", "Pl"),
    ("Highway", "Hwy"),
    ("Parkway", "Pkwy"),
    ("Square", "Sq"),
];

/// Country names to ISO 3166-1 alpha-2 codes (plus a few common aliases).
static COUNTRIES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("United States of America", "USA"),
    ("Canada", "CA"),
    ("Mexico", "MX"),
    ("United Kingdom", "UK"),
    ("Great Britain", "GB"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("Italy", "IT"),
    ("Spain", "ES"),
    ("Japan", "JP"),
    ("China", "CN"),
    ("India", "IN"),
    ("Brazil", "BR"),
    ("Australia", "AU"),
    ("New Zealand", "NZ"),
    ("Russia", "RU"),
    ("South Africa", "ZA"),
    ("Argentina", "AR"),
    ("South Korea", "KR"),
    ("Israel", "IL"),
    ("Netherlands", "NL"),
    ("Belgium", "BE"),
    ("Switzerland", "CH"),
    ("Sweden", "SE"),
    ("Norway", "NO"),
    ("Denmark", "DK"),
    ("Finland", "FI"),
    ("Ireland", "IE"),
    ("Portugal", "PT"),
    ("Greece", "GR"),
    ("Poland", "PL"),
    ("Czech Republic", "CZ"),
    ("Austria", "AT"),
    ("Singapore", "SG"),
    ("United Arab Emirates", "AE"),
    ("Saudi Arabia", "SA"),
    ("Turkey", "TR"),
    ("Egypt", "EG"),
    ("Malaysia", "MY"),
    ("Indonesia", "ID"),
    ("Thailand", "TH"),
    ("Philippines", "PH"),
    ("Vietnam", "VN"),
];

/// Street-address parts keep up to this many characters, with an ellipsis
/// when the original part was longer.
const STREET_PART_MAX: usize = 30;
/// Later parts (city, state, country) truncate harder, without an ellipsis.
const REGION_PART_MAX: usize = 20;

/// Abbreviates a full geocoded address for display.
///
/// Comma-separated parts are abbreviated word by word, then the first part
/// is capped at 30 characters (ellipsized when the original exceeded that)
/// and subsequent parts at 20. Empty input yields an empty string.
#[must_use]
pub fn abbreviate(full_address: &str) -> String {
    if full_address.is_empty() {
        return String::new();
    }

    full_address
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(idx, part)| {
            if idx == 0 {
                abbreviate_part(part, STREET_PART_MAX, true)
            } else {
                abbreviate_part(part, REGION_PART_MAX, false)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn abbreviate_part(part: &str, max_chars: usize, ellipsize: bool) -> String {
    let abbreviated = part
        .split_whitespace()
        .map(abbreviate_word)
        .collect::<Vec<_>>()
        .join(" ");

    let mut out: String = abbreviated.chars().take(max_chars).collect();
    // The ellipsis keys off the original part length, not the abbreviated
    // one, so an address that only fits because of abbreviation still
    // signals that it was cut down.
    if ellipsize && part.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

fn abbreviate_word(word: &str) -> &str {
    for table in [STATES, DIRECTIONS, ROAD_TYPES, COUNTRIES] {
        if let Some((_, short)) = table.iter().find(|(full, _)| *full == word) {
            return short;
        }
    }
    word
}
