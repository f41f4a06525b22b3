//! Index settings pushed by `--configure`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    pub searchable_attributes: Vec<String>,
    pub attributes_for_faceting: Vec<String>,
    pub custom_ranking: Vec<String>,
    pub typo_tolerance: bool,
    #[serde(rename = "minWordSizefor1Typo")]
    pub min_word_size_for_one_typo: u32,
    #[serde(rename = "minWordSizefor2Typos")]
    pub min_word_size_for_two_typos: u32,
    pub attributes_to_highlight: Vec<String>,
    pub attributes_to_snippet: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl IndexSettings {
    /// Settings for the locations index. Name outranks address parts; ties
    /// go to the most recently updated record.
    #[must_use]
    pub fn locations() -> Self {
        Self {
            searchable_attributes: strings(&[
                "name",
                "unordered(address.street)",
                "address.city",
                "address.state,address.stateCode",
                "sports",
            ]),
            attributes_for_faceting: strings(&[
                "searchable(sports)",
                "address.stateCode",
                "address.city",
            ]),
            custom_ranking: strings(&["desc(_updatedAt)"]),
            typo_tolerance: true,
            min_word_size_for_one_typo: 4,
            min_word_size_for_two_typos: 8,
            attributes_to_highlight: strings(&["name", "address.street", "address.city"]),
            attributes_to_snippet: strings(&["name:10"]),
        }
    }
}
