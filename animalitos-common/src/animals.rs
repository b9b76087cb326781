//! Animal vocabulary for Lotto Activo draws
//!
//! Fixed bidirectional mapping between the two-digit draw number and the
//! animal name. `"0"` (Delfín) and `"00"` (Ballena) are distinct draws.
//! The tables are read-only and safe to share across pipeline instances.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Draw number -> animal name, in draw order.
pub const ANIMALS: &[(&str, &str)] = &[
    ("0", "DELFIN"),
    ("00", "BALLENA"),
    ("01", "CARNERO"),
    ("02", "TORO"),
    ("03", "CIEMPIES"),
    ("04", "ALACRAN"),
    ("05", "LEON"),
    ("06", "RANA"),
    ("07", "PERICO"),
    ("08", "RATON"),
    ("09", "AGUILA"),
    ("10", "TIGRE"),
    ("11", "GATO"),
    ("12", "CABALLO"),
    ("13", "MONO"),
    ("14", "PALOMA"),
    ("15", "ZORRO"),
    ("16", "OSO"),
    ("17", "PAVO"),
    ("18", "BURRO"),
    ("19", "CHIVO"),
    ("20", "COCHINO"),
    ("21", "GALLO"),
    ("22", "CAMELLO"),
    ("23", "CEBRA"),
    ("24", "IGUANA"),
    ("25", "GALLINA"),
    ("26", "VACA"),
    ("27", "PERRO"),
    ("28", "ZAMURO"),
    ("29", "ELEFANTE"),
    ("30", "CAIMAN"),
    ("31", "LAPA"),
    ("32", "ARDILLA"),
    ("33", "PESCADO"),
    ("34", "VENADO"),
    ("35", "JIRAFA"),
    ("36", "CULEBRA"),
];

static NUMBER_TO_ANIMAL: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| ANIMALS.iter().copied().collect());

static ANIMAL_TO_NUMBER: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| ANIMALS.iter().map(|&(n, a)| (a, n)).collect());

/// Look up the animal name for a draw number (`"0"`, `"00"`, `"01".."36"`).
pub fn animal_for_number(number: &str) -> Option<&'static str> {
    NUMBER_TO_ANIMAL.get(number).copied()
}

/// Look up the draw number for an animal name. Case-insensitive.
pub fn number_for_animal(animal: &str) -> Option<&'static str> {
    ANIMAL_TO_NUMBER.get(animal.to_uppercase().as_str()).copied()
}

/// Whether a string is a valid draw number key.
pub fn is_valid_number(number: &str) -> bool {
    NUMBER_TO_ANIMAL.contains_key(number)
}

/// Resolve a scraped animal name against the vocabulary.
///
/// Tries an exact (uppercased) match first, then falls back to substring
/// matching in both directions, which absorbs page variations like
/// "EL LEON" or truncated names.
pub fn find_animal(raw: &str) -> Option<&'static str> {
    let candidate = raw.trim().to_uppercase();
    if candidate.is_empty() {
        return None;
    }

    if let Some(&name) = ANIMAL_TO_NUMBER.get_key_value(candidate.as_str()).map(|(k, _)| k) {
        return Some(name);
    }

    ANIMALS
        .iter()
        .map(|&(_, name)| name)
        .find(|name| candidate.contains(*name) || name.contains(candidate.as_str()))
}
