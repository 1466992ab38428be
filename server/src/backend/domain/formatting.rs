//! pt-BR display helpers for money and dates.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

const WEEKDAYS: [&str; 7] = [
    "domingo",
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
];

/// Round half away from zero to cents
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// "450.5" -> "450.50"
pub fn fixed2(amount: Decimal) -> String {
    format!("{:.2}", round_cents(amount))
}

/// "1234.5" -> "R$ 1.234,50"
pub fn format_brl(amount: Decimal) -> String {
    let fixed = fixed2(amount.abs());
    let (integer, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !round_cents(amount).is_zero() {
        "-"
    } else {
        ""
    };
    format!("R$ {}{},{}", sign, grouped, cents)
}

/// 1-based month number to its long lowercase name
pub fn month_name(month: u32) -> &'static str {
    MONTHS[((month.clamp(1, 12)) - 1) as usize]
}

pub fn short_month_name(month: u32) -> &'static str {
    SHORT_MONTHS[((month.clamp(1, 12)) - 1) as usize]
}

/// "05/01/2025"
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// "Janeiro de 2025"
pub fn month_label(date: NaiveDate) -> String {
    capitalize(&format!("{} de {}", month_name(date.month()), date.year()))
}

/// "domingo, 5 de janeiro"
pub fn day_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    format!("{}, {} de {}", weekday, date.day(), month_name(date.month()))
}

/// Sunday starting the week that contains `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(45.9)), "R$ 45,90");
        assert_eq!(format_brl(dec!(1234567.891)), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec!(-10)), "R$ -10,00");
    }

    #[test]
    fn test_fixed2_rounds_half_away_from_zero() {
        assert_eq!(fixed2(dec!(2.005)), "2.01");
        assert_eq!(fixed2(dec!(450.5)), "450.50");
    }

    #[test]
    fn test_labels() {
        assert_eq!(month_label(date(2025, 1, 20)), "Janeiro de 2025");
        assert_eq!(month_label(date(2025, 3, 1)), "Março de 2025");
        assert_eq!(day_label(date(2025, 1, 5)), "domingo, 5 de janeiro");
        assert_eq!(day_label(date(2025, 1, 11)), "sábado, 11 de janeiro");
        assert_eq!(format_date_br(date(2025, 1, 5)), "05/01/2025");
        assert_eq!(short_month_name(2), "Fev");
    }

    #[test]
    fn test_week_starts_on_sunday() {
        assert_eq!(week_start(date(2025, 1, 8)), date(2025, 1, 5));
        assert_eq!(week_start(date(2025, 1, 5)), date(2025, 1, 5));
        // Crosses a year boundary
        assert_eq!(week_start(date(2025, 1, 1)), date(2024, 12, 29));
    }
}
