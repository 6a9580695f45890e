//! Randomized outreach message: one greeting, introduction, pitch and closing,
//! each picked uniformly from a fixed pool, followed by the company and
//! contact blocks from the profile.

use outreach_common::file_config::ProfileConfig;
use outreach_common::BusinessRecord;
use rand::Rng;

const GREETINGS: [&str; 4] = ["Namaste! 🙏", "Hello! 👋", "Hi there! 😊", "Greetings! 🌟"];

const INTRODUCTIONS: [&str; 4] = [
    "I hope this message finds you well.",
    "I hope you're having a great day.",
    "I hope business is going well for you.",
    "I hope everything is running smoothly.",
];

const CLOSINGS: [&str; 4] = [
    "Would love to discuss how we can help grow your business online!",
    "Let's chat about how we can boost your online presence!",
    "Ready to take your business to the next level online?",
    "Let's make your business stand out online!",
];

const PITCH_VARIANTS: usize = 4;

fn pitch(variant: usize, name: &str, category: &str, location: &str) -> String {
    match variant {
        0 => format!(
            "I noticed {name} doesn't have a website yet, and I'd love to help you establish a strong online presence."
        ),
        1 => format!(
            "I came across {name} and thought you might benefit from having a professional website to reach more customers."
        ),
        2 => format!(
            "I believe {name} would really shine with a beautiful website to showcase your {category}."
        ),
        _ => format!(
            "I think {name} deserves a stunning website to attract more customers in {location}."
        ),
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool[rng.random_range(0..pool.len())]
}

/// Compose with the thread-local RNG.
pub fn compose(business: &BusinessRecord, profile: &ProfileConfig) -> String {
    compose_with(&mut rand::rng(), business, profile)
}

pub fn compose_with<R: Rng + ?Sized>(
    rng: &mut R,
    business: &BusinessRecord,
    profile: &ProfileConfig,
) -> String {
    let greeting = pick(rng, &GREETINGS);
    let introduction = pick(rng, &INTRODUCTIONS);
    let pitch = pitch(
        rng.random_range(0..PITCH_VARIANTS),
        &business.name,
        &business.category,
        &business.address,
    );
    let closing = pick(rng, &CLOSINGS);

    let mut features = String::new();
    for feature in &profile.features {
        features.push_str("• ");
        features.push_str(feature);
        features.push('\n');
    }

    format!(
        "{greeting}\n\n\
{introduction}\n\n\
{pitch}\n\n\
🏢 **About {company}:**\n\
{features}\
• {pricing} pricing starting from {starting_price}\n\n\
📞 **Contact:**\n\
• Phone: {phone}\n\
• Email: {email}\n\
• Website: {website}\n\n\
{closing}\n\n\
Best regards,\n\
{signature}",
        company = profile.company_name,
        pricing = profile.pricing,
        starting_price = profile.starting_price,
        phone = profile.phone,
        email = profile.email,
        website = profile.website,
        signature = profile.signature,
    )
}
