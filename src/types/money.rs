//! Money arithmetic. All amounts are integer cents; no floats anywhere.

/// Amount in cents (CAD).
pub type Cents = i64;

/// Ontario HST, percent.
pub const HST_PERCENT: i64 = 13;

/// Tax on a taxable amount. Truncates toward zero, matching how the
/// storefront displays tax lines.
pub fn hst(taxable: Cents) -> Cents {
    if taxable <= 0 {
        return 0;
    }
    taxable * HST_PERCENT / 100
}

/// Percentage of an amount, rounded half-up to the nearest cent.
/// Used for percentage promos.
pub fn percent_of(amount: Cents, pct: i64) -> Cents {
    if amount <= 0 || pct <= 0 {
        return 0;
    }
    (amount * pct + 50) / 100
}

/// Render cents as a dollar string for receipts and emails.
pub fn format_cents(amount: Cents) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
