use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static FIRST_DOLLAR_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

/// Jitter added to every new client score, drawn from this half-open range.
const JITTER: std::ops::Range<i32> = -10..10;

/// Lead score for a newly created client.
///
/// Base 50, +20 when the first `$N` in the deal potential has N > 10 (+10 when N > 5),
/// +15 for `$100M+` revenue (+10 for a `$50M` band), plus random jitter, clamped to 0..=100.
pub fn initial_score(deal_potential: Option<&str>, revenue: Option<&str>) -> u8 {
    let jitter = rand::rng().random_range(JITTER);
    score_with_jitter(deal_potential, revenue, jitter)
}

pub fn score_with_jitter(deal_potential: Option<&str>, revenue: Option<&str>, jitter: i32) -> u8 {
    let mut score = 50;

    if let Some(amount) = deal_potential
        .and_then(|p| FIRST_DOLLAR_AMOUNT.captures(p))
        .and_then(|c| c[1].parse::<u64>().ok())
    {
        if amount > 10 {
            score += 20;
        } else if amount > 5 {
            score += 10;
        }
    }

    if let Some(revenue) = revenue {
        if revenue.contains("$100M+") {
            score += 15;
        } else if revenue.contains("$50M") {
            score += 10;
        }
    }

    (score + jitter).clamp(0, 100) as u8
}
