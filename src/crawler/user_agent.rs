//! Randomized client identity
//!
//! Every outbound request carries a freshly generated browser user-agent so
//! that consecutive calls do not share a fingerprint.

use rand::seq::IndexedRandom;
use rand::Rng;

const DESKTOP_PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

const MOBILE_PLATFORMS: &[&str] = &[
    "Linux; Android 13; SM-S911B",
    "Linux; Android 14; Pixel 8",
    "Linux; Android 12; SM-A536E",
];

/// Builds a random, plausible browser user-agent string
pub fn random_user_agent() -> String {
    let mut rng = rand::rng();

    let desktop = *DESKTOP_PLATFORMS.choose(&mut rng).unwrap_or(&DESKTOP_PLATFORMS[0]);
    let chrome_major: u32 = rng.random_range(118..=131);
    let chrome_build: u32 = rng.random_range(5000..=6800);
    let chrome_patch: u32 = rng.random_range(0..=200);

    match rng.random_range(0..4) {
        0 => {
            let firefox: u32 = rng.random_range(115..=133);
            format!(
                "Mozilla/5.0 ({}; rv:{}.0) Gecko/20100101 Firefox/{}.0",
                desktop, firefox, firefox
            )
        }
        1 => format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.{}.{} Safari/537.36 Edg/{}.0.{}.{}",
            desktop, chrome_major, chrome_build, chrome_patch, chrome_major, chrome_build, chrome_patch
        ),
        2 => {
            let mobile = *MOBILE_PLATFORMS.choose(&mut rng).unwrap_or(&MOBILE_PLATFORMS[0]);
            format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.{}.{} Mobile Safari/537.36",
                mobile, chrome_major, chrome_build, chrome_patch
            )
        }
        _ => format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.{}.{} Safari/537.36",
            desktop, chrome_major, chrome_build, chrome_patch
        ),
    }
}
