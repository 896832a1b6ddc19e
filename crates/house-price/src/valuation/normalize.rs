//! Coercion of raw listing text into canonical numbers and category labels.
//!
//! Every function here is total: unparseable input yields `None` (numbers) or the
//! explicit "Other/Unknown" label of the category (labels), never an error.
//!
//! Numeric text follows the Dutch listing convention: `.` separates thousands and `,`
//! is the decimal mark, so `"€ 1.250.000"` is 1 250 000 and `"82,5 m²"` is 82.5.

pub const OTHER_UNKNOWN: &str = "Other/Unknown";
pub const HOUSE_TYPE_OTHER: &str = "Other";
pub const HOUSE_TYPE_APARTMENT: &str = "Apartment";
pub const FLOORS_UNKNOWN: &str = "Unknown";

/// Parses locale-formatted numeric text. Everything except digits, `,` and `.` is dropped.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let canonical = digits.replace('.', "").replace(',', ".");
    canonical.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// First run of digits in free text, e.g. `"5 kamers (3 slaapkamers)"` -> 5.
pub fn parse_rooms(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().map(f64::from)
}

/// Upper-cases and rewrites plus notation: `"a++"` -> `"A2"`. Missing input -> `""`.
pub fn normalize_energy_label(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    raw.trim()
        .to_uppercase()
        .replace("++++", "4")
        .replace("+++", "3")
        .replace("++", "2")
        .replace('+', "1")
}

/// Ordered keyword rules; the first rule with any matching keyword wins.
type KeywordRule = (&'static [&'static str], &'static str);

const HOUSE_TYPE_RULES: &[KeywordRule] = &[
    (&["appartement"], HOUSE_TYPE_APARTMENT),
    (&["hoekwoning"], "Corner"),
    (&["tussenwoning", "eindwoning"], "Terraced"),
    (
        &["2-onder-1-kap", "halfvrijstaande", "geschakelde"],
        "Semi-detached",
    ),
    (
        &["vrijstaande", "villa", "landhuis", "woonboerderij", "bungalow"],
        "Detached",
    ),
    (&["herenhuis"], "Townhouse"),
];

const ROOF_RULES: &[KeywordRule] = &[
    (&["plat dak"], "Flat"),
    (&["zadeldak"], "Gable"),
    (&["schilddak"], "Hip"),
    (&["mansarde"], "Mansard"),
    (&["lessenaardak"], "Shed"),
    (&["tentdak"], "Tent"),
    (&["samengesteld"], "Composite"),
    (&["riet"], "Thatched"),
];

const POSITION_RULES: &[KeywordRule] = &[
    (&["drukke weg"], "Busy road"),
    (&["in centrum"], "Center"),
    (&["aan water"], "Water"),
    (&["bosrijke"], "Forest"),
    (&["aan park"], "Park"),
    (&["vrij uitzicht", "open ligging"], "View/Open"),
    (&["beschutte ligging", "aan rustige weg"], "Quiet/Sheltered"),
    (&["in woonwijk"], "Residential"),
];

fn first_keyword_match(text: &str, rules: &[KeywordRule]) -> Option<&'static str> {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(_, label)| *label)
}

pub fn normalize_house_type(raw: &str) -> &'static str {
    first_keyword_match(&raw.to_lowercase(), HOUSE_TYPE_RULES).unwrap_or(HOUSE_TYPE_OTHER)
}

pub fn normalize_roof(raw: &str) -> &'static str {
    first_keyword_match(&raw.to_lowercase(), ROOF_RULES).unwrap_or(OTHER_UNKNOWN)
}

pub fn normalize_position(raw: &str) -> &'static str {
    first_keyword_match(&raw.to_lowercase(), POSITION_RULES).unwrap_or(OTHER_UNKNOWN)
}

struct GardenSides {
    back: bool,
    front: bool,
    side: bool,
    around: bool,
    terrace: bool,
}

impl GardenSides {
    fn detect(text: &str) -> Self {
        Self {
            back: text.contains("achtertuin"),
            front: text.contains("voortuin"),
            side: text.contains("zijtuin"),
            around: text.contains("tuin rondom"),
            terrace: ["zonneterras", "patio", "atrium"]
                .iter()
                .any(|keyword| text.contains(keyword)),
        }
    }

    fn garden_count(&self) -> usize {
        [self.back, self.front, self.side, self.around]
            .iter()
            .filter(|flag| **flag)
            .count()
    }
}

fn around(sides: &GardenSides) -> bool {
    sides.around
}

fn multiple(sides: &GardenSides) -> bool {
    sides.garden_count() >= 2
}

fn back(sides: &GardenSides) -> bool {
    sides.back
}

fn front(sides: &GardenSides) -> bool {
    sides.front
}

fn side(sides: &GardenSides) -> bool {
    sides.side
}

fn terrace(sides: &GardenSides) -> bool {
    sides.terrace
}

type GardenRule = (fn(&GardenSides) -> bool, &'static str);

/// "Around" and "Multiple" must be checked before the single-side labels.
const GARDEN_RULES: &[GardenRule] = &[
    (around, "Around"),
    (multiple, "Multiple"),
    (back, "Back"),
    (front, "Front"),
    (side, "Side"),
    (terrace, "Terrace/Patio"),
];

pub fn normalize_garden(raw: &str) -> &'static str {
    let sides = GardenSides::detect(&raw.to_lowercase());
    GARDEN_RULES
        .iter()
        .find(|(applies, _)| applies(&sides))
        .map(|(_, label)| *label)
        .unwrap_or(OTHER_UNKNOWN)
}

/// Combined sanitary label from text such as `"1 badkamer en 2 aparte toiletten"`.
pub fn normalize_toilet(raw: &str) -> String {
    let text = raw.to_lowercase();
    let mut baths = 0u32;
    let mut toilets = 0u32;

    for part in text.split("en") {
        let count = part
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse::<u32>()
            .unwrap_or(0);
        if part.contains("badkamer") {
            baths = baths.max(count);
        }
        if part.contains("toilet") {
            toilets = toilets.max(count);
        }
    }

    let bath_label = if baths >= 2 { "2+ bath" } else { "1 bath" };
    let toilet_label = match toilets {
        0 => "0 toilet",
        1 => "1 toilet",
        _ => "2+ toilet",
    };
    format!("{bath_label}, {toilet_label}")
}

/// First integer in the text; four or more floors collapse into `"4+"`.
pub fn normalize_floors(raw: &str) -> String {
    match parse_rooms(raw) {
        Some(floors) if floors >= 4.0 => "4+".to_string(),
        Some(floors) => format!("{}", floors as u32),
        None => FLOORS_UNKNOWN.to_string(),
    }
}

/// Bathroom table key for a numeric count: `0 | 1 | 2 | 3+`.
pub fn bathroom_count_label(count: f64) -> &'static str {
    if count >= 3.0 {
        "3+"
    } else if count >= 2.0 {
        "2"
    } else if count >= 1.0 {
        "1"
    } else {
        "0"
    }
}

/// Toilet table key for a numeric count: `1 | 2 | 3+`.
pub fn toilet_count_label(count: f64) -> &'static str {
    if count >= 3.0 {
        "3+"
    } else if count >= 2.0 {
        "2"
    } else {
        "1"
    }
}
