use outreach_common::Contact;

const BUSINESS_NAME: &str = "business_name";
const BUSINESS_ADDRESS: &str = "business_address";
const BUSINESS_CATEGORY: &str = "business_category";
const BUSINESS_RATING: &str = "business_rating";

fn lookup<'a>(contact: &'a Contact, var: &str) -> Option<&'a str> {
    match var {
        BUSINESS_NAME => Some(&contact.name),
        BUSINESS_ADDRESS => Some(&contact.address),
        BUSINESS_CATEGORY => Some(&contact.category),
        BUSINESS_RATING => Some(&contact.rating),
        _ => None,
    }
}

/// Replace `{business_name}`, `{business_address}`, `{business_category}` and
/// `{business_rating}` with the contact's values. Any other `{...}` is left
/// as-is, and substituted values are not scanned again.
pub fn render(template: &str, contact: &Contact) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after
            .find('}')
            .and_then(|close| lookup(contact, &after[..close]).map(|value| (value, close)));

        match replaced {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}
