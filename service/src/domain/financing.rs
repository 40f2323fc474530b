//! Loan amortization definitions.

use common::{Money, Percent};
use derive_more::{Display, Error};
use rust_decimal::{Decimal, MathematicalOps as _};
use serde::{Deserialize, Serialize};

use crate::domain::{customer, vehicle, CreditDecision};

/// Single amortization quote for a loan.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct FinancingOption {
    /// Number of monthly installments.
    pub term_months: u16,

    /// Annual interest rate.
    pub interest_rate: Percent,

    /// Installment paid every month, rounded to cents.
    pub monthly_payment: Money,

    /// Total amount paid over the whole term.
    pub total_cost: Money,
}

impl FinancingOption {
    /// Computes the [`FinancingOption`] of an amortizing loan.
    ///
    /// Zero `rate` splits the `loan` evenly across the `term_months`.
    ///
    /// [`None`] is returned if the `loan` is negative, the `term_months` is
    /// zero, or the computation overflows.
    #[must_use]
    pub fn compute(
        loan: Money,
        rate: Percent,
        term_months: u16,
    ) -> Option<Self> {
        if loan.is_negative() || term_months == 0 {
            return None;
        }
        let n = Decimal::from(term_months);
        let principal = loan.amount();

        let monthly_rate = rate.fraction().checked_div(Decimal::from(12))?;
        let payment = if monthly_rate.is_zero() {
            principal.checked_div(n)?
        } else {
            let growth = (Decimal::ONE + monthly_rate)
                .checked_powu(u64::from(term_months))?;
            principal
                .checked_mul(monthly_rate)?
                .checked_mul(growth)?
                .checked_div(growth - Decimal::ONE)?
        };
        let monthly_payment = Money::new(payment).round();

        Some(Self {
            term_months,
            interest_rate: rate,
            monthly_payment,
            total_cost: Money::new(monthly_payment.amount().checked_mul(n)?),
        })
    }
}

/// Standard loan term offered by the dealership.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(into = "u16", try_from = "u16")]
pub enum StandardTerm {
    /// 36 months at the base rate.
    Months36,

    /// 48 months at the base rate plus `0.5%`.
    Months48,

    /// 60 months at the base rate plus `1%`.
    Months60,

    /// 72 months at the base rate plus `1.5%`.
    Months72,
}

impl StandardTerm {
    /// All the [`StandardTerm`]s, from the shortest to the longest.
    pub const ALL: [Self; 4] =
        [Self::Months36, Self::Months48, Self::Months60, Self::Months72];

    /// Returns the number of months of this [`StandardTerm`].
    #[must_use]
    pub const fn months(self) -> u16 {
        match self {
            Self::Months36 => 36,
            Self::Months48 => 48,
            Self::Months60 => 60,
            Self::Months72 => 72,
        }
    }

    /// Returns the rate surcharge of this [`StandardTerm`] in basis points.
    const fn surcharge_bps(self) -> u32 {
        match self {
            Self::Months36 => 0,
            Self::Months48 => 50,
            Self::Months60 => 100,
            Self::Months72 => 150,
        }
    }

    /// Returns the interest rate of this [`StandardTerm`] over the provided
    /// `base` one.
    ///
    /// [`None`] is returned if the rate exceeds `100%`.
    #[must_use]
    pub fn rate_over(self, base: Percent) -> Option<Percent> {
        base.checked_add(Percent::from_basis_points(self.surcharge_bps())?)
    }

    /// Computes the [`FinancingOption`] of this [`StandardTerm`] for the
    /// provided `loan` and `base` rate.
    #[must_use]
    pub fn quote(self, loan: Money, base: Percent) -> Option<FinancingOption> {
        FinancingOption::compute(loan, self.rate_over(base)?, self.months())
    }
}

impl From<StandardTerm> for u16 {
    fn from(term: StandardTerm) -> Self {
        term.months()
    }
}

impl TryFrom<u16> for StandardTerm {
    type Error = &'static str;

    fn try_from(months: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.months() == months)
            .ok_or("term must be one of 36, 48, 60 or 72 months")
    }
}

/// Builds the menu of [`FinancingOption`]s for every [`StandardTerm`].
///
/// [`None`] is returned if any of the options cannot be computed.
#[must_use]
pub fn build_menu(loan: Money, base: Percent) -> Option<[FinancingOption; 4]> {
    let [t36, t48, t60, t72] = StandardTerm::ALL;
    Some([
        t36.quote(loan, base)?,
        t48.quote(loan, base)?,
        t60.quote(loan, base)?,
        t72.quote(loan, base)?,
    ])
}

/// Computes the amount to be financed when buying for the provided `price`
/// with the provided `down_payment`, under the provided [`CreditDecision`].
///
/// # Errors
///
/// - If the `down_payment` is negative or exceeds the `price`.
/// - If the credit is not approved or the loan exceeds the credit limit.
pub fn loan_amount(
    price: Money,
    down_payment: Money,
    credit: &CreditDecision,
) -> Result<Money, Refusal> {
    if down_payment.is_negative() {
        return Err(Refusal::NegativeDownPayment(down_payment));
    }
    if down_payment > price {
        return Err(Refusal::DownPaymentExceedsPrice(down_payment));
    }
    if !credit.approved {
        return Err(Refusal::NotApproved);
    }
    let loan = price - down_payment;
    if loan > credit.credit_limit {
        return Err(Refusal::ExceedsCreditLimit {
            loan,
            limit: credit.credit_limit,
        });
    }
    Ok(loan)
}

/// Reason of refusing to finance a purchase.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum Refusal {
    /// Down payment is negative.
    #[display("down payment cannot be negative: {_0}")]
    NegativeDownPayment(#[error(not(source))] Money),

    /// Down payment is greater than the price.
    #[display("down payment {_0} exceeds the price")]
    DownPaymentExceedsPrice(#[error(not(source))] Money),

    /// [`CreditDecision`] is not approved.
    #[display("customer is not approved for financing")]
    NotApproved,

    /// Loan is greater than the credit limit.
    #[display("loan amount {loan} exceeds credit limit {limit}")]
    ExceedsCreditLimit {
        /// Requested loan amount.
        loan: Money,

        /// Credit limit of the [`CreditDecision`].
        limit: Money,
    },
}

impl Refusal {
    /// Indicates whether this [`Refusal`] is caused by malformed input rather
    /// than by the creditworthiness.
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(
            self,
            Self::NegativeDownPayment(_) | Self::DownPaymentExceedsPrice(_),
        )
    }
}

/// Financing menu offered to a [`Customer`] for a [`Vehicle`].
///
/// [`Customer`]: crate::domain::Customer
/// [`Vehicle`]: crate::domain::Vehicle
#[derive(Clone, Copy, Debug, Serialize)]
pub struct FinancingOptions {
    /// ID of the quoted [`Customer`](crate::domain::Customer).
    pub customer_id: customer::Id,

    /// ID of the quoted [`Vehicle`](crate::domain::Vehicle).
    pub vehicle_id: vehicle::Id,

    /// Amount to be financed.
    pub loan_amount: Money,

    /// [`CreditDecision`] the menu is based on.
    pub credit: CreditDecision,

    /// [`FinancingOption`] for every [`StandardTerm`].
    pub options: [FinancingOption; 4],
}
