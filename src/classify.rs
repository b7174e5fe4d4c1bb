//! Label classification.
//!
//! Maps a raw detector label to one of the performative prop categories
//! via a fixed rule table. Classification is pure and label-based only;
//! the confidence score plays no part here.

/// A performative prop category. Predictions that match none of these
/// classify to `None` and never enter the pass set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Drink,
    Book,
    Tin,
}

/// Labels that are always a drink.
const DRINK_CLASSES: &[&str] = &["cup", "wine glass"];
/// Substrings that mark a label as a drink.
const DRINK_KEYWORDS: &[&str] = &["cup", "glass", "wine"];
/// Labels that are a book. Exact match only.
const BOOK_CLASSES: &[&str] = &["book"];
/// Substrings that mark a label as a tin. Heuristic: short keywords like
/// "can" will false-positive on unrelated labels, which is acceptable.
const TIN_KEYWORDS: &[&str] = &["tin", "can", "matcha"];

/// Classify a detector label. Case-insensitive.
///
/// A label can in principle match more than one category; the first match
/// in declaration order (Drink, Book, Tin) wins, so the most specific
/// category is the one used for minimum-score lookup downstream.
pub fn classify(label: &str) -> Option<Category> {
    let label = label.to_lowercase();
    if is_drink(&label) {
        Some(Category::Drink)
    } else if is_book(&label) {
        Some(Category::Book)
    } else if is_tin(&label) {
        Some(Category::Tin)
    } else {
        None
    }
}

fn is_drink(label: &str) -> bool {
    DRINK_CLASSES.contains(&label) || DRINK_KEYWORDS.iter().any(|k| label.contains(k))
}

fn is_book(label: &str) -> bool {
    BOOK_CLASSES.contains(&label)
}

fn is_tin(label: &str) -> bool {
    TIN_KEYWORDS.iter().any(|k| label.contains(k))
}
