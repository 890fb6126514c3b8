//! Per-model token prices (USD per token).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Look up (input, output) cost per token for a model id.
///
/// Unknown models cost zero rather than failing; accounting is informational.
pub fn model_cost(model: &str) -> (Decimal, Decimal) {
    match model {
        "gpt-4" | "gpt-4-0613" => (dec!(0.00003), dec!(0.00006)),
        "gpt-4-turbo" => (dec!(0.00001), dec!(0.00003)),
        "gpt-4o" => (dec!(0.0000025), dec!(0.00001)),
        "gpt-4o-mini" => (dec!(0.00000015), dec!(0.0000006)),
        "gpt-3.5-turbo" => (dec!(0.0000005), dec!(0.0000015)),
        _ => (Decimal::ZERO, Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_has_nonzero_cost() {
        let (input, output) = model_cost("gpt-4");
        assert!(input > Decimal::ZERO);
        assert!(output > input);
    }

    #[test]
    fn unknown_model_is_free() {
        assert_eq!(model_cost("llama-local"), (Decimal::ZERO, Decimal::ZERO));
    }
}
