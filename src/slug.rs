//! URL slugs of barbershops.
//!
//! Slugs are lowercase ASCII letters, digits and single hyphens, used as the
//! public path segment of a barbershop's booking pages.

use crate::backend::BarbershopBackend;
use crate::error::{BookingError, BookingResult};
use deunicode::deunicode;

const FALLBACK_SLUG: &str = "barbershop";
const MAX_SUFFIX: u32 = 1000;

/// Transliterates `name` to ASCII, drops punctuation and joins the
/// remaining words with hyphens, the way Django's `slugify` does.
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(name).to_ascii_lowercase();
    let kept: String = ascii
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace() || matches!(ch, '-' | '_'))
        .collect();
    let slug = kept
        .split(|ch: char| ch.is_whitespace() || matches!(ch, '-' | '_'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    match slug.is_empty() {
        true => FALLBACK_SLUG.to_string(),
        false => slug,
    }
}

pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// First free slug for `name`: the plain slug, then `-2`, `-3`, ...
pub fn unique_slug<B: BarbershopBackend>(backend: &B, name: &str) -> BookingResult<String> {
    let base = slugify(name);
    if backend.barbershop_by_slug(&base)?.is_none() {
        return Ok(base);
    }
    for suffix in 2..=MAX_SUFFIX {
        let candidate = format!("{base}-{suffix}");
        if backend.barbershop_by_slug(&candidate)?.is_none() {
            return Ok(candidate);
        }
    }
    Err(BookingError::conflict(format!(
        "Too many barbershops named '{name}'"
    )))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_store::LocalStore;
    use crate::testutils::seed_barbershop;

    #[test_case::test_case("North Cuts", "north-cuts")]
    #[test_case::test_case("  The  Barber's Den!! ", "the-barbers-den")]
    #[test_case::test_case("Barbearia São João", "barbearia-sao-joao")]
    #[test_case::test_case("Corte & Café - Centro", "corte-cafe-centro")]
    #[test_case::test_case("snake_case cuts", "snake-case-cuts")]
    #[test_case::test_case("Studio 54", "studio-54")]
    #[test_case::test_case("¡¡¡", "barbershop")]
    fn test_slugify(name: &str, expected: &str) {
        let slug = slugify(name);
        assert_eq!(slug, expected);
        assert!(is_valid_slug(&slug));
    }

    #[test_case::test_case("north-cuts", true)]
    #[test_case::test_case("North-Cuts", false)]
    #[test_case::test_case("-north", false)]
    #[test_case::test_case("north--cuts", false)]
    #[test_case::test_case("", false)]
    fn test_is_valid_slug(value: &str, expected: bool) {
        assert_eq!(is_valid_slug(value), expected);
    }

    #[test]
    fn test_unique_slug_appends_suffix() {
        let store = LocalStore::default();
        assert_eq!(unique_slug(&store, "North Cuts").unwrap(), "north-cuts");

        seed_barbershop(&store, "North Cuts");
        assert_eq!(unique_slug(&store, "North Cuts").unwrap(), "north-cuts-2");

        seed_barbershop(&store, "North Cuts");
        assert_eq!(unique_slug(&store, "north cuts").unwrap(), "north-cuts-3");
    }
}
