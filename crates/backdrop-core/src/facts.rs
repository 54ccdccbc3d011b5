//! Small facts about the visitor, used to personalise the rotating greeting.
//!
//! The web host fetches a geo lookup once and gathers the rest from the
//! browser; everything here is a pure function of those inputs.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

pub const GEO_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=status,countryCode,city";

pub const GREETING_WORDS: [&str; 3] = ["there", "world", "friend"];

/// Response body of the geo lookup. Missing fields decode as `None`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoLookup {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// What the browser tells us without a network call.
#[derive(Clone, Debug, Default)]
pub struct VisitorContext {
    pub language: Option<String>,
    pub user_agent: Option<String>,
    pub hour: u32,
    pub referrer: Option<String>,
}

pub fn demonym(country_code: &str) -> Option<&'static str> {
    let d = match country_code {
        "US" => "American",
        "RU" => "Russian",
        "UA" => "Ukrainian",
        "BY" => "Belarusian",
        "KZ" => "Kazakhstani",
        "DE" => "German",
        "FR" => "French",
        "GB" => "British",
        "PL" => "Polish",
        "LV" => "Latvian",
        "LT" => "Lithuanian",
        "EE" => "Estonian",
        "SG" => "Singaporean",
        "JP" => "Japanese",
        "CN" => "Chinese",
        "IN" => "Indian",
        "MD" => "Moldovan",
        "IT" => "Italian",
        "ES" => "Spanish",
        "PT" => "Portuguese",
        "NL" => "Dutch",
        "BE" => "Belgian",
        "CZ" => "Czech",
        "SK" => "Slovak",
        "HU" => "Hungarian",
        "RO" => "Romanian",
        "BG" => "Bulgarian",
        "HR" => "Croatian",
        "SI" => "Slovenian",
        "FI" => "Finnish",
        "SE" => "Swedish",
        "NO" => "Norwegian",
        "DK" => "Danish",
        "AU" => "Australian",
        "NZ" => "New Zealander",
        "CA" => "Canadian",
        "MX" => "Mexican",
        "BR" => "Brazilian",
        "AR" => "Argentinian",
        "CL" => "Chilean",
        "CO" => "Colombian",
        "VE" => "Venezuelan",
        "PE" => "Peruvian",
        "EC" => "Ecuadorian",
        "UY" => "Uruguayan",
        "ZA" => "South African",
        "EG" => "Egyptian",
        "NG" => "Nigerian",
        "KE" => "Kenyan",
        "GH" => "Ghanaian",
        "TZ" => "Tanzanian",
        "SN" => "Senegalese",
        "CI" => "Ivorian",
        "MA" => "Moroccan",
        "DZ" => "Algerian",
        "TN" => "Tunisian",
        "LY" => "Libyan",
        "AE" => "Emirati",
        "SA" => "Saudi",
        "TR" => "Turkish",
        "IR" => "Iranian",
        "IQ" => "Iraqi",
        "IL" => "Israeli",
        "PS" => "Palestinian",
        "SY" => "Syrian",
        "JO" => "Jordanian",
        "LB" => "Lebanese",
        "QA" => "Qatari",
        "KW" => "Kuwaiti",
        "BH" => "Bahraini",
        "OM" => "Omani",
        "YE" => "Yemeni",
        "AF" => "Afghan",
        "PK" => "Pakistani",
        "BD" => "Bangladeshi",
        "LK" => "Sri Lankan",
        "NP" => "Nepalese",
        "MM" => "Burmese",
        "TH" => "Thai",
        "VN" => "Vietnamese",
        "MY" => "Malaysian",
        "ID" => "Indonesian",
        "PH" => "Filipino",
        "KR" => "Korean",
        "TW" => "Taiwanese",
        "HK" => "Hongkonger",
        "MO" => "Macanese",
        _ => return None,
    };
    Some(d)
}

/// English name for the primary subtag of a BCP 47 language tag.
pub fn language_name(tag: &str) -> Option<&'static str> {
    let primary = tag.split('-').next()?.to_ascii_lowercase();
    let name = match primary.as_str() {
        "en" => "English",
        "ru" => "Russian",
        "uk" => "Ukrainian",
        "be" => "Belarusian",
        "kk" => "Kazakh",
        "de" => "German",
        "fr" => "French",
        "pl" => "Polish",
        "lv" => "Latvian",
        "lt" => "Lithuanian",
        "et" => "Estonian",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "hi" => "Hindi",
        "ro" => "Romanian",
        "it" => "Italian",
        "es" => "Spanish",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        "cs" => "Czech",
        "sk" => "Slovak",
        "hu" => "Hungarian",
        "bg" => "Bulgarian",
        "fi" => "Finnish",
        "sv" => "Swedish",
        "nb" | "no" => "Norwegian",
        "da" => "Danish",
        "tr" => "Turkish",
        "ar" => "Arabic",
        "he" => "Hebrew",
        "ko" => "Korean",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "id" => "Indonesian",
        _ => return None,
    };
    Some(name)
}

/// Browser and OS names sniffed from a user-agent string.
pub fn device_names(user_agent: &str) -> (Option<&'static str>, Option<&'static str>) {
    let browser = if user_agent.contains("Edg/") {
        Some("Edge")
    } else if user_agent.contains("OPR/") {
        Some("Opera")
    } else if user_agent.contains("Firefox/") {
        Some("Firefox")
    } else if user_agent.contains("Chrome/") {
        Some("Chrome")
    } else if user_agent.contains("Safari/") {
        Some("Safari")
    } else {
        None
    };
    let os = if user_agent.contains("Android") {
        Some("Android")
    } else if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        Some("iOS")
    } else if user_agent.contains("Windows") {
        Some("Windows")
    } else if user_agent.contains("Mac OS X") {
        Some("Mac OS")
    } else if user_agent.contains("Linux") {
        Some("Linux")
    } else {
        None
    };
    (browser, os)
}

pub fn day_part(hour: u32) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=17 => "day",
        18..=22 => "evening",
        _ => "nightly",
    }
}

fn url_host(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?;
    (!host.is_empty()).then_some(host)
}

/// Well-known site the visitor came from, if any.
pub fn referrer_source(referrer: &str) -> Option<&'static str> {
    let host = url_host(referrer)?;
    if host.contains("google") {
        Some("Google")
    } else if host.contains("github") {
        Some("GitHub")
    } else if host.contains("t.me") {
        Some("Telegram")
    } else {
        None
    }
}

/// Facts from the geo lookup. An unsuccessful lookup contributes nothing.
pub fn facts_from_geo(geo: &GeoLookup) -> Vec<String> {
    let mut facts = Vec::new();
    if geo.status != "success" {
        return facts;
    }
    if let Some(code) = geo.country_code.as_deref().filter(|c| !c.is_empty()) {
        match demonym(code) {
            Some(d) => facts.push(d.to_string()),
            None => facts.push(format!("from {code}")),
        }
    }
    if let Some(city) = geo.city.as_deref().filter(|c| !c.is_empty()) {
        facts.push(city.to_string());
    }
    facts
}

pub fn gather_facts(geo: Option<&GeoLookup>, ctx: &VisitorContext) -> Vec<String> {
    let mut facts = geo.map(facts_from_geo).unwrap_or_default();
    if let Some(lang) = ctx.language.as_deref().and_then(language_name) {
        facts.push(lang.to_string());
    }
    if let Some(ua) = ctx.user_agent.as_deref() {
        let (browser, os) = device_names(ua);
        facts.extend(browser.into_iter().chain(os).map(str::to_string));
    }
    facts.push(day_part(ctx.hour).to_string());
    if let Some(src) = ctx.referrer.as_deref().and_then(referrer_source) {
        facts.push(src.to_string());
    }
    facts
}

/// Greeting words with the facts mixed in. Without facts the stock list is
/// kept as is.
pub fn merge_greeting_words<R: Rng + ?Sized>(
    initial: &[&str],
    facts: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut words: Vec<String> = initial.iter().map(|w| w.to_string()).collect();
    if facts.is_empty() {
        return words;
    }
    words.extend(facts.iter().cloned());
    words.shuffle(rng);
    words
}
