const CHARS_PER_TOKEN: usize = 4;

/// Rough token count: one token per four characters, rounded up.
pub fn estimate_tokens(chars: usize) -> usize {
    chars.div_ceil(CHARS_PER_TOKEN)
}

/// Input cost in USD, rounded to four decimals.
pub fn estimate_input_cost_usd(tokens: usize, usd_per_million: f64) -> f64 {
    let cost = tokens as f64 / 1_000_000.0 * usd_per_million;
    (cost * 10_000.0).round() / 10_000.0
}
