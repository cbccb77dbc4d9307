/// Two decimals with thousands separators and no currency: -1,234.56
pub fn amount(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    // -0.001 rounds to 0.00; don't print a minus for it.
    if negative && cents != "0.00" {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

/// Amount in `currency`: `$1,234.56`, `-€5.00`, or `1,234.56 XOF` when the
/// currency has no symbol.
pub fn money(val: f64, currency: &str) -> String {
    let text = amount(val);
    match currency_symbol(currency) {
        Some(symbol) => match text.strip_prefix('-') {
            Some(digits) => format!("-{symbol}{digits}"),
            None => format!("{symbol}{text}"),
        },
        None => format!("{text} {}", currency.trim()),
    }
}

/// One decimal place with a percent sign.
pub fn pct(val: f64) -> String {
    format!("{val:.1}%")
}

pub const SEGMENT_GLYPHS: [char; 3] = ['█', '▓', '░'];

/// Render percentage shares as a fixed-width bar, one glyph per segment.
/// Any width left over by flooring is padded with spaces.
pub fn segment_bar(shares: &[u8], width: usize) -> String {
    let mut bar = String::with_capacity(width * 3);
    let mut used = 0usize;
    for (i, &share) in shares.iter().enumerate() {
        let cells = (share as usize * width / 100).min(width - used);
        let glyph = SEGMENT_GLYPHS[i % SEGMENT_GLYPHS.len()];
        bar.extend(std::iter::repeat(glyph).take(cells));
        used += cells;
    }
    bar.extend(std::iter::repeat(' ').take(width - used));
    bar
}
