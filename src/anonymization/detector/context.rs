//! Label and context checks shared by the detectors

use crate::anonymization::text::{following, preceding, previous_word};
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters inspected before a match when looking for a label
pub const LABEL_WINDOW: usize = 30;

static LEGAL_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)§|\bzákon\w*|\bsb\.|\bodst\.|\bvyhlášk\w*|\bnařízení\b|\bčl\.|\bpísm\.")
        .unwrap()
});

pub static BIRTH_NUMBER_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)rodné\s+číslo|rodného\s+čísla|\br\.\s*č\.|\brč\b|\bnar\.").unwrap()
});

pub static ID_CARD_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bOP\b|občansk\w*\s+průkaz\w*|průkaz\w*\s+totožnosti|\bčíslo\s+dokladu|\bpas\b|\bcestovní\w*\s+pas\w*")
        .unwrap()
});

pub static BANK_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\búčt\w*|\búčet|\biban\b|\bbank\w*|\bč\.\s*ú\.").unwrap()
});

pub static INSURANCE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)pojištěn\w*|pojišťovn\w*|\bičo\b|\bdič\b|\bičp\b|identifikační\w*\s+čísl\w*|\bevidenční\w*\s+čísl\w*",
    )
    .unwrap()
});

pub static ADDRESS_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bbytem\b|bydlišt\w*|\badres\w*|\bsídl\w*|\bulic\w*|trval\w*\s+pobyt\w*|\bmístem\s+podnikání")
        .unwrap()
});

static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Mgr|Ing|JUDr|MUDr|MVDr|PhDr|RNDr|PaedDr|PharmDr|ThDr|Bc|BcA|MgA|Dr|Doc|doc|Prof|prof)$")
        .unwrap()
});

const SALUTATIONS: &[&str] = &[
    "pan", "pana", "panu", "panem", "paní", "slečna", "slečny", "slečnou",
];

const ROLE_WORDS: &[&str] = &[
    "pronajímatel", "pronajímatele", "pronajímateli", "nájemce", "nájemci", "nájemcem",
    "dlužník", "dlužníka", "věřitel", "věřitele", "objednatel", "zhotovitel", "kupující",
    "prodávající", "zaměstnanec", "zaměstnavatel", "ručitel", "jednatel", "svědek",
    "zmocněnec", "zmocnitel", "pojistník",
];

/// Match at `start..end` sits inside a citation such as `§ 15 odst. 2` or
/// `zákona č. 89/2012 Sb.`
pub fn is_legal_reference(text: &str, start: usize, end: usize) -> bool {
    LEGAL_REFERENCE.is_match(preceding(text, start, 25))
        || LEGAL_REFERENCE.is_match(following(text, end, 12))
}

/// A label matching `label` occurs within [`LABEL_WINDOW`] characters before `start`
pub fn has_label_before(label: &Regex, text: &str, start: usize) -> bool {
    label.is_match(preceding(text, start, LABEL_WINDOW))
}

/// The word before `start` is an academic title, a salutation or a
/// contractual role word
pub fn has_person_context(text: &str, start: usize) -> bool {
    let Some(word) = previous_word(text, start) else {
        return false;
    };
    if TITLE.is_match(word) {
        return true;
    }
    let lower = word.to_lowercase();
    SALUTATIONS.contains(&lower.as_str()) || ROLE_WORDS.contains(&lower.as_str())
}
