//! Parsing of human-entered budget strings ("50 Lac", "1.2 Cr", "₹75,00,000").

const THOUSAND: f64 = 1_000.0;
const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Parse a budget display string into whole rupees.
///
/// Returns `None` for empty, zero, negative or unrecognised input so the
/// caller can omit the bound entirely.
pub fn parse_budget(input: &str) -> Option<u64> {
    let lowered = input.trim().to_lowercase();
    let mut text = lowered.as_str();
    for prefix in ["₹", "inr", "rs.", "rs"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
            break;
        }
    }

    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let number = number.replace(',', "");
    if number.is_empty() {
        return None;
    }
    let value: f64 = number.parse().ok()?;

    let multiplier = match unit.trim().trim_end_matches('.') {
        "" => 1.0,
        "k" | "thousand" => THOUSAND,
        "l" | "lac" | "lacs" | "lakh" | "lakhs" => LAKH,
        "cr" | "crore" | "crores" => CRORE,
        _ => return None,
    };

    let rupees = (value * multiplier).round();
    if !rupees.is_finite() || rupees <= 0.0 || rupees >= u64::MAX as f64 {
        return None;
    }
    Some(rupees as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lakh_and_crore_units() {
        assert_eq!(parse_budget("50 Lac"), Some(5_000_000));
        assert_eq!(parse_budget("1 Cr"), Some(10_000_000));
        assert_eq!(parse_budget("1.5 Cr"), Some(15_000_000));
        assert_eq!(parse_budget("75 Lakhs"), Some(7_500_000));
        assert_eq!(parse_budget("0.7 crore"), Some(7_000_000));
        assert_eq!(parse_budget("90L"), Some(9_000_000));
    }

    #[test]
    fn accepts_currency_prefixes_and_grouping() {
        assert_eq!(parse_budget("₹ 50 Lac"), Some(5_000_000));
        assert_eq!(parse_budget("Rs. 2 Cr"), Some(20_000_000));
        assert_eq!(parse_budget("₹75,00,000"), Some(7_500_000));
        assert_eq!(parse_budget("250k"), Some(250_000));
    }

    #[test]
    fn unparseable_or_empty_bounds_are_none() {
        assert_eq!(parse_budget(""), None);
        assert_eq!(parse_budget("   "), None);
        assert_eq!(parse_budget("₹"), None);
        assert_eq!(parse_budget("0 Lac"), None);
        assert_eq!(parse_budget("fifty lac"), None);
        assert_eq!(parse_budget("10 bananas"), None);
        assert_eq!(parse_budget("1.2.3 Cr"), None);
    }

    #[test]
    fn amounts_beyond_u64_are_none() {
        assert_eq!(parse_budget("99999999999999999999 Cr"), None);
        assert_eq!(parse_budget("100000 Cr"), Some(1_000_000_000_000));
    }
}
