use rust_decimal::{Decimal, RoundingStrategy};

use tradetracker_core::ParsedTransaction;

pub const NOT_UNDERSTOOD: &str = "I couldn't understand that transaction. Please try again.";

/// "2.5 thousand shillings" from 1000 up, "750 shillings" below.
pub fn format_amount_for_voice(amount: Decimal) -> String {
    if amount >= Decimal::ONE_THOUSAND {
        let mut thousands =
            (amount / Decimal::ONE_THOUSAND).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        thousands.rescale(1);
        format!("{thousands} thousand shillings")
    } else {
        format!("{} shillings", amount.normalize())
    }
}

/// Sentence read back to the user for confirmation.
pub fn voice_feedback(result: &ParsedTransaction) -> String {
    match (result.success, result.kind, result.amount) {
        (true, Some(kind), Some(amount)) => format!(
            "I heard {kind} of {}. {}. Is this correct?",
            format_amount_for_voice(amount),
            result.description
        ),
        _ => NOT_UNDERSTOOD.to_string(),
    }
}
