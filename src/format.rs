//! Display formatting for money, phone numbers and dates.

/// Brazilian real amounts stored as integer cents.
pub mod currency {
    /// Format cents as `R$ 1.234,56`.
    pub fn format_brl(cents: i64) -> String {
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        let reais = abs / 100;
        let centavos = abs % 100;

        let digits = reais.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("{}R$ {},{:02}", sign, grouped, centavos)
    }

    /// Convert an amount in reais to cents, rounding to the nearest cent.
    pub fn to_cents(reais: f64) -> i64 {
        (reais * 100.0).round() as i64
    }

    /// Parse a typed amount such as `150`, `150.50`, `150,50` or
    /// `R$ 1.234,56` into cents.
    ///
    /// When a comma is present it is the decimal separator and dots group
    /// thousands.
    pub fn parse_brl(input: &str) -> Option<i64> {
        let mut text = input.trim();
        text = text.strip_prefix("R$").unwrap_or(text).trim();
        if text.is_empty() {
            return None;
        }
        let normalized = if text.contains(',') {
            text.replace('.', "").replace(',', ".")
        } else {
            text.to_string()
        };
        let reais: f64 = normalized.parse().ok()?;
        reais.is_finite().then(|| to_cents(reais))
    }
}

/// Brazilian phone numbers with country code (`55` + area + 9 digits).
pub mod phone {
    /// Number of digits in a complete phone number.
    pub const DIGITS: usize = 13;

    /// Strip everything except digits.
    pub fn to_api(phone: &str) -> String {
        phone.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Whether the number has exactly 13 digits.
    pub fn is_valid(phone: &str) -> bool {
        to_api(phone).len() == DIGITS
    }

    /// Format 13 digits as `+55 (11) 98765-4321`.
    ///
    /// Anything that is not exactly 13 digits is returned unchanged.
    pub fn to_human_readable(phone: &str) -> String {
        if phone.len() != DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
            return phone.to_string();
        }
        format!(
            "+{} ({}) {}-{}",
            &phone[0..2],
            &phone[2..4],
            &phone[4..9],
            &phone[9..13]
        )
    }
}

/// Date display helpers.
pub mod date {
    use chrono::{DateTime, Utc};

    /// Format as `dd/mm/yyyy`.
    pub fn format_date(date: &DateTime<Utc>) -> String {
        date.format("%d/%m/%Y").to_string()
    }

    /// Format as `dd/mm/yyyy HH:MM`.
    pub fn format_date_time(date: &DateTime<Utc>) -> String {
        date.format("%d/%m/%Y %H:%M").to_string()
    }

    /// Short month label.
    pub fn month_label(month: u32) -> &'static str {
        match month {
            1 => "Jan",
            2 => "Feb",
            3 => "Mar",
            4 => "Apr",
            5 => "May",
            6 => "Jun",
            7 => "Jul",
            8 => "Aug",
            9 => "Sep",
            10 => "Oct",
            11 => "Nov",
            12 => "Dec",
            _ => "?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_brl() {
        assert_eq!(currency::format_brl(0), "R$ 0,00");
        assert_eq!(currency::format_brl(5), "R$ 0,05");
        assert_eq!(currency::format_brl(123456), "R$ 1.234,56");
        assert_eq!(currency::format_brl(100000000), "R$ 1.000.000,00");
        assert_eq!(currency::format_brl(-2550), "-R$ 25,50");
    }

    #[test]
    fn test_to_cents_rounds() {
        assert_eq!(currency::to_cents(12.34), 1234);
        assert_eq!(currency::to_cents(0.1 + 0.2), 30);
        assert_eq!(currency::to_cents(99.999), 10000);
    }

    #[test]
    fn test_parse_brl() {
        assert_eq!(currency::parse_brl("150"), Some(15000));
        assert_eq!(currency::parse_brl("150.5"), Some(15050));
        assert_eq!(currency::parse_brl("150,50"), Some(15050));
        assert_eq!(currency::parse_brl("R$ 1.234,56"), Some(123456));
        assert_eq!(currency::parse_brl(""), None);
        assert_eq!(currency::parse_brl("abc"), None);
    }

    #[test]
    fn test_phone_round_trip_formats() {
        assert_eq!(
            phone::to_human_readable("5511987654321"),
            "+55 (11) 98765-4321"
        );
        assert_eq!(phone::to_api("+55 (11) 98765-4321"), "5511987654321");
        assert!(phone::is_valid("+55 (11) 98765-4321"));
        assert!(!phone::is_valid("11987654321"));
    }

    #[test]
    fn test_phone_human_readable_passes_through_other_input() {
        assert_eq!(phone::to_human_readable("12345"), "12345");
    }

    #[test]
    fn test_format_date() {
        let d = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(date::format_date(&d), "07/03/2025");
        assert_eq!(date::format_date_time(&d), "07/03/2025 09:05");
    }
}
