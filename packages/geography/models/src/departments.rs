//! Peruvian department codes.
//!
//! Maps the two-digit INEI department codes to department names for the
//! 24 departments plus the constitutional province of Callao. Boundary
//! features that carry no code property get theirs from this table.

/// Department codes in INEI order.
pub const DEPARTMENT_CODES: &[&str] = &[
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14", "15", "16",
    "17", "18", "19", "20", "21", "22", "23", "24", "25",
];

/// Maps a department code to its display name.
///
/// Returns `"Desconocido"` for unrecognized codes.
#[must_use]
pub fn department_name(code: &str) -> &'static str {
    match code {
        "01" => "Amazonas",
        "02" => "Áncash",
        "03" => "Apurímac",
        "04" => "Arequipa",
        "05" => "Ayacucho",
        "06" => "Cajamarca",
        "07" => "Callao",
        "08" => "Cusco",
        "09" => "Huancavelica",
        "10" => "Huánuco",
        "11" => "Ica",
        "12" => "Junín",
        "13" => "La Libertad",
        "14" => "Lambayeque",
        "15" => "Lima",
        "16" => "Loreto",
        "17" => "Madre de Dios",
        "18" => "Moquegua",
        "19" => "Pasco",
        "20" => "Piura",
        "21" => "Puno",
        "22" => "San Martín",
        "23" => "Tacna",
        "24" => "Tumbes",
        "25" => "Ucayali",
        _ => "Desconocido",
    }
}

/// Maps a department name to its code.
///
/// Case-insensitive, ignores surrounding whitespace, and accepts names
/// written without accents (`"ANCASH"`, `"Junin"`).
#[must_use]
pub fn department_code(name: &str) -> Option<&'static str> {
    let wanted = fold(name);
    DEPARTMENT_CODES
        .iter()
        .copied()
        .find(|code| fold(department_name(code)) == wanted)
}

/// Lowercases and strips the Spanish diacritics used in department names.
fn fold(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_count() {
        assert_eq!(DEPARTMENT_CODES.len(), 25);
    }

    #[test]
    fn code_roundtrip() {
        for code in DEPARTMENT_CODES {
            let name = department_name(code);
            assert_ne!(name, "Desconocido", "unknown code: {code}");
            assert_eq!(
                department_code(name),
                Some(*code),
                "roundtrip failed for {code} -> {name}"
            );
        }
    }

    #[test]
    fn unknown_values() {
        assert_eq!(department_name("99"), "Desconocido");
        assert_eq!(department_code("Atlantis"), None);
    }

    #[test]
    fn code_lookup_ignores_case_and_accents() {
        assert_eq!(department_code("ANCASH"), Some("02"));
        assert_eq!(department_code(" junin "), Some("12"));
        assert_eq!(department_code("LA LIBERTAD"), Some("13"));
    }
}
