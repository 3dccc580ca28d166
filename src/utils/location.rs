use serde::Serialize;

use crate::entities::city;

/// Minimum prefix length before we offer a "did you mean" suggestion.
const MIN_SUGGESTION_LEN: usize = 3;

#[derive(Debug, Serialize)]
pub struct LocationCheck {
    pub is_valid: bool,
    pub matched_city: Option<String>,
    pub suggestion: Option<String>,
    pub error: Option<String>,
}

impl LocationCheck {
    fn valid(city: &city::Model) -> Self {
        Self {
            is_valid: true,
            matched_city: Some(city.name.clone()),
            suggestion: None,
            error: None,
        }
    }

    fn invalid(error: &str, suggestion: Option<String>) -> Self {
        Self {
            is_valid: false,
            matched_city: None,
            suggestion,
            error: Some(error.to_string()),
        }
    }
}

/// Check whether a free-text location falls inside the serviceable area.
///
/// This is a substring/prefix match against the active city list, not
/// geocoding: "123 King Street, Toronto" validates because it mentions
/// Toronto; "Montreal, Quebec" is rejected because no serviceable city
/// appears in it. Short inputs that prefix a city name get a suggestion.
pub fn validate_location(input: &str, cities: &[city::Model]) -> LocationCheck {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return LocationCheck::invalid("Location is empty", None);
    }

    let needle = trimmed.to_lowercase();

    if let Some(city) = cities
        .iter()
        .filter(|c| c.is_active)
        .find(|c| needle.contains(&c.name.to_lowercase()))
    {
        return LocationCheck::valid(city);
    }

    let suggestion = if needle.len() >= MIN_SUGGESTION_LEN {
        cities
            .iter()
            .filter(|c| c.is_active)
            .find(|c| c.name.to_lowercase().starts_with(&needle))
            .map(|c| c.name.clone())
    } else {
        None
    };

    LocationCheck::invalid("Location is not in a serviceable Ontario city", suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Vec<city::Model> {
        ["Toronto", "Ottawa", "Hamilton"]
            .iter()
            .enumerate()
            .map(|(i, name)| city::Model {
                id: i as i32 + 1,
                name: (*name).to_string(),
                province: "Ontario".to_string(),
                country: "Canada".to_string(),
                latitude: None,
                longitude: None,
                is_active: true,
            })
            .collect()
    }

    #[test]
    fn exact_city_name_is_valid() {
        let check = validate_location("Toronto", &cities());
        assert!(check.is_valid);
        assert_eq!(check.matched_city.as_deref(), Some("Toronto"));
    }

    #[test]
    fn address_mentioning_a_city_is_valid() {
        let check = validate_location("123 King Street, Toronto", &cities());
        assert!(check.is_valid);
        assert_eq!(check.matched_city.as_deref(), Some("Toronto"));

        assert!(validate_location("Hamilton ON", &cities()).is_valid);
        assert!(validate_location("Ottawa City Hall", &cities()).is_valid);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(validate_location("downtown toronto", &cities()).is_valid);
    }

    #[test]
    fn out_of_province_location_is_rejected() {
        assert!(!validate_location("Montreal, Quebec", &cities()).is_valid);
        assert!(!validate_location("New York, USA", &cities()).is_valid);
    }

    #[test]
    fn empty_location_is_rejected() {
        let check = validate_location("   ", &cities());
        assert!(!check.is_valid);
        assert_eq!(check.error.as_deref(), Some("Location is empty"));
    }

    #[test]
    fn short_prefix_gets_a_suggestion() {
        let check = validate_location("Tor", &cities());
        assert!(!check.is_valid);
        assert_eq!(check.suggestion.as_deref(), Some("Toronto"));
    }

    #[test]
    fn inactive_cities_do_not_match() {
        let mut list = cities();
        for c in &mut list {
            c.is_active = false;
        }
        assert!(!validate_location("Toronto", &list).is_valid);
    }
}
