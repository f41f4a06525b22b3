//! Derived postal address and US state-code normalization.

use serde::{Deserialize, Serialize};

/// US states, DC and territories as `(code, full name)`.
const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("AS", "American Samoa"),
    ("GU", "Guam"),
    ("MP", "Northern Mariana Islands"),
    ("PR", "Puerto Rico"),
    ("VI", "U.S. Virgin Islands"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub street2: Option<String>,
    pub city: String,
    /// As stored: either a full name or a code.
    pub state: String,
    /// Always two uppercase letters.
    pub state_code: String,
    pub postal_code: String,
}

impl Address {
    /// Build an address only when every required part is non-empty and the
    /// state resolves to a two-letter code.
    ///
    /// Parts are trimmed; a blank `street2` becomes `None`.
    #[must_use]
    pub fn from_parts(
        street: Option<&str>,
        street2: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        postal_code: Option<&str>,
    ) -> Option<Self> {
        let street = non_empty(street)?;
        let city = non_empty(city)?;
        let state = non_empty(state)?;
        let postal_code = non_empty(postal_code)?;
        let code = state_code(state)?;

        Some(Self {
            street: street.to_string(),
            street2: non_empty(street2).map(str::to_string),
            city: city.to_string(),
            state_code: code,
            state: state.to_string(),
            postal_code: postal_code.to_string(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve a state name or code to its two-letter code.
///
/// Known names and codes match case-insensitively. An unknown value yields
/// its first two ASCII letters upper-cased, or `None` when it has fewer
/// than two.
#[must_use]
pub fn state_code(state: &str) -> Option<String> {
    let trimmed = state.trim();

    if let Some((code, _)) = STATES.iter().find(|(code, name)| {
        code.eq_ignore_ascii_case(trimmed) || name.eq_ignore_ascii_case(trimmed)
    }) {
        return Some((*code).to_string());
    }

    let letters: String = trimmed
        .chars()
        .filter(char::is_ascii_alphabetic)
        .take(2)
        .collect();
    (letters.len() == 2).then(|| letters.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_code_expands_full_names() {
        assert_eq!(state_code("Pennsylvania").as_deref(), Some("PA"));
        assert_eq!(state_code("new york").as_deref(), Some("NY"));
        assert_eq!(state_code("  District of Columbia ").as_deref(), Some("DC"));
    }

    #[test]
    fn state_code_normalizes_codes() {
        assert_eq!(state_code("pa").as_deref(), Some("PA"));
        assert_eq!(state_code("TX").as_deref(), Some("TX"));
    }

    #[test]
    fn state_code_unknown_values_stay_two_letters() {
        assert_eq!(state_code("zz").as_deref(), Some("ZZ"));
        assert_eq!(state_code("Ontario").as_deref(), Some("ON"));
    }

    #[test]
    fn state_code_needs_two_letters() {
        assert_eq!(state_code("1"), None);
        assert_eq!(state_code("X"), None);
        assert_eq!(state_code("12"), None);
        assert_eq!(state_code("N1Y").as_deref(), Some("NY"));
    }

    #[test]
    fn unresolvable_state_means_no_address() {
        for state in ["7", "X", "12"] {
            let address = Address::from_parts(
                Some("10 Main St"),
                None,
                Some("Austin"),
                Some(state),
                Some("73301"),
            );
            assert!(address.is_none(), "state {state:?} should not yield an address");
        }
    }

    #[test]
    fn blank_street2_is_dropped() {
        let address = Address::from_parts(
            Some("10 Main St"),
            Some("  "),
            Some("Austin"),
            Some("TX"),
            Some("73301"),
        )
        .expect("complete address");
        assert!(address.street2.is_none());
        assert_eq!(address.state, "TX");
        assert_eq!(address.state_code, "TX");
    }
}
