//! [`Sale`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, define_text, unit, DateTimeOf, Money, Percent};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{customer, salesperson, vehicle};

/// Durable record of a [`Vehicle`] sale.
///
/// [`Vehicle`]: crate::domain::Vehicle
#[derive(Clone, Debug, Serialize)]
pub struct Sale {
    /// ID of this [`Sale`].
    pub id: Id,

    /// ID of the sold [`Vehicle`](crate::domain::Vehicle).
    pub vehicle_id: vehicle::Id,

    /// ID of the buying [`Customer`](crate::domain::Customer).
    pub customer_id: customer::Id,

    /// ID of the [`Salesperson`](crate::domain::Salesperson) closing this
    /// [`Sale`].
    pub salesperson_id: salesperson::Id,

    /// Final price of the sold vehicle.
    pub price: Money,

    /// Amount paid upfront.
    pub down_payment: Money,

    /// Amount covered by a loan or a lease.
    pub financed_amount: Money,

    /// Financing term in months, if financed.
    pub financing_term: Option<u16>,

    /// Annual interest rate of the financing, if financed.
    pub interest_rate: Option<Percent>,

    /// [`PaymentMethod`] of this [`Sale`].
    pub payment_method: PaymentMethod,

    /// [`Status`] of this [`Sale`].
    pub status: Status,

    /// Free-form [`Notes`] on this [`Sale`].
    pub notes: Option<Notes>,

    /// [`DateTime`] when this [`Sale`] happened.
    pub sold_at: SaleDateTime,

    /// [`DateTime`] when this [`Sale`] was recorded.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Sale`] was last modified.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Sale`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Free-form notes on a [`Sale`]."]
    struct Notes(max_len = 4096);
}

define_kind! {
    #[doc = "Way a [`Sale`] is paid."]
    enum PaymentMethod {
        #[doc = "Paid in full upfront."]
        Cash = 1,

        #[doc = "Paid with a loan."]
        Finance = 2,

        #[doc = "Paid with a lease."]
        Lease = 3,
    }
}

impl PaymentMethod {
    /// Indicates whether this [`PaymentMethod`] involves a credit.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Finance | Self::Lease)
    }
}

define_kind! {
    #[doc = "Status of a [`Sale`]."]
    enum Status {
        #[doc = "[`Sale`] awaits completion."]
        Pending = 1,

        #[doc = "[`Sale`] is completed."]
        Completed = 2,

        #[doc = "[`Sale`] is cancelled."]
        Cancelled = 3,
    }
}

/// Commission paid for every completed [`Sale`], regardless of its price.
pub const FIXED_COMMISSION: Money =
    Money::new(Decimal::from_parts(1000, 0, 0, false, 0));

/// Boilerplate terms every [`Contract`] carries.
pub const STANDARD_TERMS: &str = "The buyer acquires the vehicle in its \
    current condition. Title passes to the buyer once the price is paid in \
    full or, for financed and leased vehicles, as stated in the financing \
    agreement. The dealership warrants that the vehicle is free of liens.";

/// Contract generated for a completed [`Sale`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: ContractId,

    /// ID of the [`Sale`] this [`Contract`] is generated for.
    pub sale_id: Id,

    /// Terms of this [`Contract`].
    pub terms: &'static str,

    /// [`DateTime`] when this [`Contract`] was generated.
    pub generated_at: DateTimeOf<Contract>,
}

impl Contract {
    /// Generates a new [`Contract`] with [`STANDARD_TERMS`] for the provided
    /// [`Sale`].
    #[must_use]
    pub fn standard(sale: &Sale) -> Self {
        Self {
            id: ContractId::new(),
            sale_id: sale.id,
            terms: STANDARD_TERMS,
            generated_at: sale.created_at.coerce(),
        }
    }
}

/// ID of a [`Contract`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct ContractId(Uuid);

impl ContractId {
    /// Creates a new random [`ContractId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Financing terms a [`Sale`] is closed with.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct FinancingDetails {
    /// Amount of the loan.
    pub loan_amount: Money,

    /// Annual interest rate.
    pub interest_rate: Percent,

    /// Installment paid every month.
    pub monthly_payment: Money,

    /// Number of monthly installments.
    pub term_months: u16,
}

/// Marker type indicating a [`Sale`] happening.
#[derive(Clone, Copy, Debug)]
pub struct Selling;

/// [`DateTime`] when a [`Sale`] happened.
pub type SaleDateTime = DateTimeOf<(Sale, Selling)>;

/// [`DateTime`] when a [`Sale`] was recorded.
pub type CreationDateTime = DateTimeOf<(Sale, unit::Creation)>;

/// [`DateTime`] when a [`Sale`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Sale, unit::Modification)>;
