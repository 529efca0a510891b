//! Russian number-to-text conversion for monetary amounts.
//!
//! Spells out ruble amounts in Russian with correct grammatical declension:
//! thousands take the feminine gender ("одна тысяча", "две тысячи"), and the
//! noun form follows the 1 / 2-4 / 5+ rule with the 11-14 exception
//! ("тысяча" / "тысячи" / "тысяч", "копейка" / "копейки" / "копеек").
//!
//! Amounts of a million rubles or more, and negative amounts, fall back to
//! the plain numeral string.

const UNITS: [&str; 10] = [
    "", "один", "два", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];

const UNITS_FEMININE: [&str; 10] = [
    "", "одна", "две", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];

const TEENS: [&str; 10] = [
    "десять",
    "одиннадцать",
    "двенадцать",
    "тринадцать",
    "четырнадцать",
    "пятнадцать",
    "шестнадцать",
    "семнадцать",
    "восемнадцать",
    "девятнадцать",
];

const TENS: [&str; 10] = [
    "", "", "двадцать", "тридцать", "сорок", "пятьдесят", "шестьдесят", "семьдесят",
    "восемьдесят", "девяносто",
];

const HUNDREDS: [&str; 10] = [
    "", "сто", "двести", "триста", "четыреста", "пятьсот", "шестьсот", "семьсот",
    "восемьсот", "девятьсот",
];

/// Grammatical noun form selected by a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NounForm {
    /// 1, 21, 31, ... (but not 11).
    One,
    /// 2-4, 22-24, ... (but not 12-14).
    Few,
    /// Everything else, including 0, 5-20, and counts ending in 11-14.
    Many,
}

fn noun_form(n: u64) -> NounForm {
    if (11..=14).contains(&(n % 100)) {
        return NounForm::Many;
    }
    match n % 10 {
        1 => NounForm::One,
        2..=4 => NounForm::Few,
        _ => NounForm::Many,
    }
}

/// Pick the correct noun form for a count: `one` for 1, `few` for 2-4,
/// `many` for 0 and 5-20 (and every count ending in 11-14).
pub fn plural_form<'a>(n: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    match noun_form(n) {
        NounForm::One => one,
        NounForm::Few => few,
        NounForm::Many => many,
    }
}

/// Spell out 1..=999 in Russian. `feminine` selects the gender of units
/// (used for thousands: "одна", "две").
fn triple_to_words(n: u64, feminine: bool) -> String {
    debug_assert!((1..1000).contains(&n));
    let units = if feminine { UNITS_FEMININE } else { UNITS };

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    let hundreds = (n / 100) as usize;
    let rest = n % 100;

    if hundreds > 0 {
        parts.push(HUNDREDS[hundreds]);
    }
    if (10..20).contains(&rest) {
        parts.push(TEENS[(rest - 10) as usize]);
    } else {
        let tens = (rest / 10) as usize;
        let ones = (rest % 10) as usize;
        if tens > 0 {
            parts.push(TENS[tens]);
        }
        if ones > 0 {
            parts.push(units[ones]);
        }
    }
    parts.join(" ")
}

/// Spell out a whole number of rubles in Russian.
///
/// Returns `None` for values of 1,000,000 and above, which are rendered as
/// plain numerals by the caller.
pub fn number_to_words(n: u64) -> Option<String> {
    if n == 0 {
        return Some("ноль".to_string());
    }
    if n < 1000 {
        return Some(triple_to_words(n, false));
    }
    if n < 1_000_000 {
        let thousands = n / 1000;
        let remainder = n % 1000;

        let declension = plural_form(thousands, "тысяча", "тысячи", "тысяч");
        let mut text = format!("{} {declension}", triple_to_words(thousands, true));
        if remainder > 0 {
            text.push(' ');
            text.push_str(&triple_to_words(remainder, false));
        }
        return Some(text);
    }
    None
}

/// The kopecks part of a formatted amount, with declension.
/// Zero kopecks prints as "00 копеек".
pub fn kopecks_text(kopecks: u64) -> String {
    if kopecks == 0 {
        return "00 копеек".to_string();
    }
    let noun = plural_form(kopecks, "копейка", "копейки", "копеек");
    format!("{kopecks} {noun}")
}

/// Decline the currency phrase for the given rubles count.
///
/// Handles the phrases the original documents used: "белорусских рубля",
/// "российских рубля", and plain "рубля". Any trailing " 00 копеек" is
/// stripped first. Unknown currencies pass through unchanged.
pub fn currency_declension(currency: &str, rubles: u64) -> String {
    let clean = currency.replace(" 00 копеек", "");
    let clean = clean.trim();

    for (qualifier, singular) in [
        ("белорусских", "белорусский рубль"),
        ("российских", "российский рубль"),
    ] {
        if clean.contains(qualifier) && clean.contains("рубля") {
            if rubles == 1 {
                return singular.to_string();
            }
            return match noun_form(rubles) {
                NounForm::One | NounForm::Few => clean.to_string(),
                NounForm::Many => clean.replace("рубля", "рублей"),
            };
        }
    }

    if clean.contains("рубля") {
        return match noun_form(rubles) {
            NounForm::One | NounForm::Few => clean.to_string(),
            NounForm::Many => clean.replace("рубля", "рублей"),
        };
    }

    clean.to_string()
}

/// Format a monetary amount with its spelled-out form in parentheses.
///
/// # Examples
///
/// ```
/// use contracts_core::numtext::format_amount_with_words;
///
/// assert_eq!(
///     format_amount_with_words(1234.56, "белорусских рубля"),
///     "1234,56 (одна тысяча двести тридцать четыре белорусских рубля 56 копеек)"
/// );
/// ```
///
/// Negative amounts and amounts of a million or more are returned as plain
/// numerals without a spelled-out form.
pub fn format_amount_with_words(amount: f64, currency: &str) -> String {
    if !amount.is_finite() || amount < 0.0 {
        return format!("{amount}");
    }

    // Work in kopecks to avoid float truncation surprises (0.56 * 100 == 55.999...).
    let total_kopecks = (amount * 100.0).round() as u64;
    let rubles = total_kopecks / 100;
    let kopecks = total_kopecks % 100;

    let formatted = format!("{:.2}", amount).replace('.', ",");

    let Some(rubles_words) = number_to_words(rubles) else {
        return formatted;
    };

    format!(
        "{formatted} ({rubles_words} {} {})",
        currency_declension(currency, rubles),
        kopecks_text(kopecks)
    )
}
