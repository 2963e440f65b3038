use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Inputs for one line's tax computation. Quantity, price, and rate are
/// validated non-negative upstream in the request validators.
#[derive(Debug, Clone)]
pub struct LineTaxInput<'a> {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_amount: Decimal,
    pub tax_rate: Decimal,
    pub buyer_jurisdiction: &'a str,
    pub seller_jurisdiction: &'a str,
}

/// Jurisdiction-aware GST split for a single line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub base_amount: Decimal,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
}

/// Rounds a currency amount to 2 decimal places, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn same_jurisdiction(buyer: &str, seller: &str) -> bool {
    buyer.trim().eq_ignore_ascii_case(seller.trim())
}

/// Computes the GST split for one line item. Pure; no side effects.
///
/// Intra-state supplies split the rate evenly into CGST and SGST;
/// inter-state supplies levy the full rate as IGST. A discount larger than
/// the line subtotal clamps the base to zero.
pub fn calculate_line_tax(input: &LineTaxInput<'_>) -> TaxBreakdown {
    let hundred = Decimal::ONE_HUNDRED;
    let base_amount =
        round_money((input.quantity * input.unit_price - input.discount_amount).max(Decimal::ZERO));

    let (cgst_rate, sgst_rate, igst_rate) =
        if same_jurisdiction(input.buyer_jurisdiction, input.seller_jurisdiction) {
            let half = input.tax_rate / Decimal::TWO;
            (half, half, Decimal::ZERO)
        } else {
            (Decimal::ZERO, Decimal::ZERO, input.tax_rate)
        };

    let cgst_amount = round_money(base_amount * cgst_rate / hundred);
    let sgst_amount = round_money(base_amount * sgst_rate / hundred);
    let igst_amount = round_money(base_amount * igst_rate / hundred);
    let tax_amount = cgst_amount + sgst_amount + igst_amount;

    TaxBreakdown {
        base_amount,
        cgst_rate,
        sgst_rate,
        igst_rate,
        cgst_amount,
        sgst_amount,
        igst_amount,
        tax_amount,
        line_total: base_amount + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn input<'a>(
        quantity: Decimal,
        unit_price: Decimal,
        discount: Decimal,
        rate: Decimal,
        buyer: &'a str,
        seller: &'a str,
    ) -> LineTaxInput<'a> {
        LineTaxInput {
            quantity,
            unit_price,
            discount_amount: discount,
            tax_rate: rate,
            buyer_jurisdiction: buyer,
            seller_jurisdiction: seller,
        }
    }

    #[test]
    fn intra_state_splits_rate_evenly() {
        // qty=2 @ 100.00, 18% GST, both sides Tamil Nadu
        let result = calculate_line_tax(&input(
            dec!(2),
            dec!(100.00),
            Decimal::ZERO,
            dec!(18),
            "Tamil Nadu",
            "Tamil Nadu",
        ));

        assert_eq!(result.base_amount, dec!(200.00));
        assert_eq!(result.cgst_rate, dec!(9));
        assert_eq!(result.sgst_rate, dec!(9));
        assert_eq!(result.igst_rate, Decimal::ZERO);
        assert_eq!(result.cgst_amount, dec!(18.00));
        assert_eq!(result.sgst_amount, dec!(18.00));
        assert_eq!(result.igst_amount, Decimal::ZERO);
        assert_eq!(result.tax_amount, dec!(36.00));
        assert_eq!(result.line_total, dec!(236.00));
    }

    #[test]
    fn inter_state_levies_full_rate_as_igst() {
        let result = calculate_line_tax(&input(
            dec!(2),
            dec!(100.00),
            Decimal::ZERO,
            dec!(18),
            "Karnataka",
            "Tamil Nadu",
        ));

        assert_eq!(result.base_amount, dec!(200.00));
        assert_eq!(result.igst_rate, dec!(18));
        assert_eq!(result.igst_amount, dec!(36.00));
        assert_eq!(result.cgst_amount, Decimal::ZERO);
        assert_eq!(result.sgst_amount, Decimal::ZERO);
        assert_eq!(result.tax_amount, dec!(36.00));
        assert_eq!(result.line_total, dec!(236.00));
    }

    #[test_case("tamil nadu", "Tamil Nadu" ; "case differs")]
    #[test_case("  Tamil Nadu  ", "Tamil Nadu" ; "padded with whitespace")]
    #[test_case("TAMIL NADU", "tamil nadu" ; "both shifted")]
    fn jurisdiction_comparison_is_normalized(buyer: &str, seller: &str) {
        let result =
            calculate_line_tax(&input(dec!(1), dec!(100), Decimal::ZERO, dec!(18), buyer, seller));
        assert_eq!(result.igst_rate, Decimal::ZERO);
        assert_eq!(result.cgst_rate, dec!(9));
    }

    #[test]
    fn discount_reduces_base_before_tax() {
        let result = calculate_line_tax(&input(
            dec!(2),
            dec!(100.00),
            dec!(50.00),
            dec!(18),
            "Kerala",
            "Kerala",
        ));
        assert_eq!(result.base_amount, dec!(150.00));
        assert_eq!(result.cgst_amount, dec!(13.50));
        assert_eq!(result.sgst_amount, dec!(13.50));
        assert_eq!(result.line_total, dec!(177.00));
    }

    #[test]
    fn oversized_discount_clamps_base_to_zero() {
        let result = calculate_line_tax(&input(
            dec!(1),
            dec!(100.00),
            dec!(500.00),
            dec!(18),
            "Kerala",
            "Kerala",
        ));
        assert_eq!(result.base_amount, Decimal::ZERO);
        assert_eq!(result.tax_amount, Decimal::ZERO);
        assert_eq!(result.line_total, Decimal::ZERO);
    }

    #[test]
    fn odd_rate_rounds_each_component() {
        // 5% on 99.99 intra-state: each half is 2.4997... -> 2.50
        let result = calculate_line_tax(&input(
            dec!(1),
            dec!(99.99),
            Decimal::ZERO,
            dec!(5),
            "Goa",
            "Goa",
        ));
        assert_eq!(result.cgst_amount, dec!(2.50));
        assert_eq!(result.sgst_amount, dec!(2.50));
        assert_eq!(result.tax_amount, dec!(5.00));
    }

    #[test]
    fn zero_rate_produces_no_tax_either_way() {
        for (buyer, seller) in [("Goa", "Goa"), ("Goa", "Kerala")] {
            let result = calculate_line_tax(&input(
                dec!(3),
                dec!(10),
                Decimal::ZERO,
                Decimal::ZERO,
                buyer,
                seller,
            ));
            assert_eq!(result.tax_amount, Decimal::ZERO);
            assert_eq!(result.line_total, result.base_amount);
        }
    }

    #[test]
    fn components_always_sum_to_tax_amount() {
        let result = calculate_line_tax(&input(
            dec!(7),
            dec!(13.37),
            dec!(4.2),
            dec!(12),
            "Punjab",
            "Haryana",
        ));
        assert_eq!(
            result.tax_amount,
            result.cgst_amount + result.sgst_amount + result.igst_amount
        );
        // IGST and CGST are mutually exclusive for a non-zero rate.
        assert!(result.cgst_rate.is_zero() || result.igst_rate.is_zero());
    }
}
