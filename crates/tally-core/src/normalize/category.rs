//! Category assignment.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::record::Category;

lazy_static! {
    static ref BEER: Regex = Regex::new(
        r"(?i)beer|\b(?:budweiser|bud light|coors|miller|michelob|heineken|corona|modelo|stella artois|guinness|pabst|lager|pilsner|stout|porter|ipa|ale|hefeweizen)s?\b"
    ).unwrap();

    static ref WINE: Regex = Regex::new(
        r"(?i)wine|\b(?:cabernet|merlot|chardonnay|pinot|sauvignon|riesling|zinfandel|syrah|shiraz|malbec|moscato|prosecco|champagne|ros[eé]|sangria|chianti)s?\b"
    ).unwrap();

    static ref LIQUOR: Regex = Regex::new(
        r"(?i)liquor|vodka|\b(?:whiske?y|bourbon|scotch|rum|gin|tequila|mezcal|brandy|cognac|liqueur|schnapps|vermouth)s?\b"
    ).unwrap();
}

/// Text available for categorizing one record, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategorySignals<'a> {
    /// Value of an explicit category column.
    pub explicit: Option<&'a str>,
    /// Section header the row appeared under.
    pub section: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub item_name: &'a str,
}

/// Assigns a category to a record.
///
/// Implement this to plug in an external model; returning `None` hands the record
/// back to the keyword rules.
pub trait CategoryClassifier: Send + Sync {
    fn classify(&self, signals: &CategorySignals<'_>) -> Option<Category>;
}

/// Keyword rules. Beer, Wine and Liquor are tried in that order; the first match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl CategoryClassifier for RuleClassifier {
    /// Explicit column first, then the section header, then brand and name together.
    /// The first signal that matches a keyword decides.
    fn classify(&self, signals: &CategorySignals<'_>) -> Option<Category> {
        let brand_and_name = match signals.brand {
            Some(brand) => format!("{} {}", brand, signals.item_name),
            None => signals.item_name.to_string(),
        };

        let category = [signals.explicit, signals.section, Some(brand_and_name.as_str())]
            .into_iter()
            .flatten()
            .map(categorize_text)
            .find(|c| *c != Category::Miscellaneous)
            .unwrap_or(Category::Miscellaneous);

        Some(category)
    }
}

/// Keyword match on free text.
pub fn categorize_text(text: &str) -> Category {
    if BEER.is_match(text) {
        Category::Beer
    } else if WINE.is_match(text) {
        Category::Wine
    } else if LIQUOR.is_match(text) {
        Category::Liquor
    } else {
        Category::Miscellaneous
    }
}
