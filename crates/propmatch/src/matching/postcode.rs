//! Postcode-district fallback for local-authority resolution.
//!
//! Listings normally carry `local_authority` assigned at creation time. When
//! that is absent the scorer asks this table instead, which covers London
//! postcode districts only; everywhere else the caller falls back to
//! partial location credit.

const LONDON_DISTRICTS: &[(&str, &str)] = &[
    ("EC1", "Islington"),
    ("EC2", "City of London"),
    ("EC3", "City of London"),
    ("EC4", "City of London"),
    ("WC1", "Camden"),
    ("WC2", "Westminster"),
    ("NW1", "Camden"),
    ("NW3", "Camden"),
    ("SW1", "Westminster"),
    ("SW2", "Lambeth"),
    ("SW9", "Lambeth"),
    ("SE1", "Southwark"),
    ("SE10", "Greenwich"),
    ("SE11", "Lambeth"),
    ("E1", "Tower Hamlets"),
    ("E2", "Tower Hamlets"),
    ("E8", "Hackney"),
    ("N1", "Islington"),
    ("W1", "Westminster"),
    ("W5", "Ealing"),
    ("CR0", "Croydon"),
];

/// Infer the local authority for a listing from its postcode. Only answers
/// for London. The outward code must be a known district, or a known
/// district plus a letter suffix (EC1A still reads as EC1); a longer
/// numeric district such as SE11 never inherits SE1's borough.
pub fn infer_local_authority(city: &str, postcode: &str) -> Option<&'static str> {
    if !city.trim().eq_ignore_ascii_case("London") {
        return None;
    }

    let outward = postcode
        .split_whitespace()
        .next()?
        .to_ascii_uppercase();

    LONDON_DISTRICTS
        .iter()
        .filter(|(district, _)| {
            outward
                .strip_prefix(district)
                .map_or(false, |rest| rest.chars().all(|ch| ch.is_ascii_alphabetic()))
        })
        .max_by_key(|(district, _)| district.len())
        .map(|(_, authority)| *authority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_london_districts() {
        assert_eq!(infer_local_authority("London", "SE1 7PB"), Some("Southwark"));
        assert_eq!(infer_local_authority("london", "e8 2aa"), Some("Hackney"));
    }

    #[test]
    fn prefers_the_longest_district_prefix() {
        // SE10 must win over SE1 for Greenwich postcodes.
        assert_eq!(infer_local_authority("London", "SE10 8EW"), Some("Greenwich"));
        assert_eq!(infer_local_authority("London", "SE1 7PB"), Some("Southwark"));
        assert_eq!(infer_local_authority("London", "SE11 5AW"), Some("Lambeth"));
    }

    #[test]
    fn longer_numeric_districts_never_inherit_a_shorter_prefix() {
        // N16 is Hackney territory; the table only knows N1, so the answer
        // must be "unknown" rather than Islington.
        assert_eq!(infer_local_authority("London", "N16 7AB"), None);
        assert_eq!(infer_local_authority("London", "E14 9GE"), None);
    }

    #[test]
    fn letter_suffixed_subdistricts_resolve_to_their_district() {
        assert_eq!(infer_local_authority("London", "EC1A 1BB"), Some("Islington"));
        assert_eq!(infer_local_authority("London", "W1D 3QF"), Some("Westminster"));
    }

    #[test]
    fn ignores_non_london_cities() {
        assert_eq!(infer_local_authority("Manchester", "M1 2AB"), None);
    }

    #[test]
    fn unknown_district_yields_none() {
        assert_eq!(infer_local_authority("London", "BR1 1AA"), None);
        assert_eq!(infer_local_authority("London", ""), None);
    }
}
