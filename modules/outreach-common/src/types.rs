use serde::{Serialize, Serializer};

pub const UNKNOWN_BUSINESS: &str = "Unknown Business";
pub const UNKNOWN_ADDRESS: &str = "Unknown Address";
pub const DEFAULT_CATEGORY: &str = "Business";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_WEBSITE: &str = "No website";

/// Minimum length of a cleaned phone number, leading "+" included.
pub const MIN_PHONE_LEN: usize = 10;

/// A business discovered by the collector. Never mutated after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessRecord {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub category: String,
    pub rating: String,
    pub reviews: String,
    pub website: String,
    #[serde(serialize_with = "or_not_available")]
    pub email: Option<String>,
    #[serde(serialize_with = "or_not_available")]
    pub hours: Option<String>,
    #[serde(serialize_with = "or_not_available")]
    pub description: Option<String>,
}

impl BusinessRecord {
    /// One line of the contact file: `phone,name,address,category,rating,website`.
    /// Embedded commas are written as-is.
    pub fn contact_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.phone, self.name, self.address, self.category, self.rating, self.website
        )
    }
}

fn or_not_available<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(NOT_AVAILABLE))
}

/// Keep digits and a single leading "+"; drop everything else.
pub fn clean_phone(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let mut cleaned = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        cleaned.push('+');
    }
    cleaned.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));
    cleaned
}

/// Whether a cleaned phone is long enough to be dialable.
pub fn is_usable_phone(cleaned: &str) -> bool {
    cleaned.len() >= MIN_PHONE_LEN && cleaned.chars().any(|c| c.is_ascii_digit())
}
