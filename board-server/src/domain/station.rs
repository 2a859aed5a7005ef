//! Station name normalization and matching.
//!
//! Upstream feeds spell the same station several ways ("Gare de Lyon",
//! "GARE DE LYON ", "gare-de-lyon"). Every station comparison in this
//! crate goes through the normalized form: accents stripped, lowercased,
//! punctuation and runs of whitespace collapsed to single spaces.

/// Minimum normalized length for the substring fallback in [`stations_match`].
///
/// Very short fragments ("a", "st") would otherwise match almost anything.
const MIN_SUBSTRING_LEN: usize = 3;

/// Normalize a station name for comparison.
///
/// # Examples
///
/// ```
/// use board_server::domain::normalize_station;
///
/// assert_eq!(normalize_station("  Gare de Lyon "), "gare de lyon");
/// assert_eq!(normalize_station("Saint-Étienne"), "saint etienne");
/// assert_eq!(normalize_station("BESANÇON"), "besancon");
/// ```
pub fn normalize_station(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for c in name.chars().flat_map(|c| c.to_lowercase()) {
        let mapped = match c {
            'à' | 'â' | 'ä' | 'á' => Some('a'),
            'é' | 'è' | 'ê' | 'ë' => Some('e'),
            'î' | 'ï' | 'í' => Some('i'),
            'ô' | 'ö' | 'ó' => Some('o'),
            'ù' | 'û' | 'ü' | 'ú' => Some('u'),
            'ç' => Some('c'),
            'œ' => {
                out.push_str(if pending_space && !out.is_empty() {
                    " oe"
                } else {
                    "oe"
                });
                pending_space = false;
                continue;
            }
            c if c.is_alphanumeric() => Some(c),
            // Hyphens, apostrophes and any other punctuation separate words.
            _ => None,
        };

        match mapped {
            Some(c) => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
            None => pending_space = true,
        }
    }

    out
}

/// Do two station names refer to the same station?
///
/// Compares normalized forms, tolerating one being a substring of the
/// other (feeds disagree on qualifiers like "Gare de" prefixes). Empty
/// names never match.
pub fn stations_match(a: &str, b: &str) -> bool {
    let a = normalize_station(a);
    let b = normalize_station(b);

    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    (a.len() >= MIN_SUBSTRING_LEN && b.contains(&a))
        || (b.len() >= MIN_SUBSTRING_LEN && a.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents() {
        assert_eq!(normalize_station("Besançon"), "besancon");
        assert_eq!(normalize_station("Saint-Étienne"), "saint etienne");
        assert_eq!(normalize_station("Château-Arnoux"), "chateau arnoux");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_station("  Gare   de  Lyon  "), "gare de lyon");
        assert_eq!(normalize_station("Aix - en - Provence"), "aix en provence");
    }

    #[test]
    fn normalize_lowercases() {
        assert_eq!(normalize_station("PARIS NORD"), "paris nord");
    }

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize_station(""), "");
        assert_eq!(normalize_station("   "), "");
        assert_eq!(normalize_station("---"), "");
    }

    #[test]
    fn match_exact_and_case_insensitive() {
        assert!(stations_match("Gare de Lyon", "GARE DE LYON"));
        assert!(stations_match("Besançon", "besancon"));
    }

    #[test]
    fn match_substring_both_directions() {
        assert!(stations_match("Lyon Part-Dieu", "Part-Dieu"));
        assert!(stations_match("Part-Dieu", "Lyon Part-Dieu"));
    }

    #[test]
    fn no_match_for_different_stations() {
        assert!(!stations_match("Marseille", "Toulon"));
    }

    #[test]
    fn no_match_for_empty() {
        assert!(!stations_match("", "Lyon"));
        assert!(!stations_match("Lyon", ""));
        assert!(!stations_match("", ""));
    }

    #[test]
    fn short_fragments_do_not_substring_match() {
        assert!(!stations_match("La", "Lausanne"));
    }
}
