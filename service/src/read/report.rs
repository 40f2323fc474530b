//! Report read models definitions.
//!
//! Reports are never stored: every one is aggregated from the history on
//! request.

use std::collections::{BTreeMap, HashMap};

use common::{DateTime, DateTimeOf, Money, Percent};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{sale, vehicle, Sale, Salesperson, Vehicle};

/// Time window a report covers, exclusive on both ends.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Period {
    /// Start of this [`Period`].
    #[serde(rename = "start_date")]
    start: DateTime,

    /// End of this [`Period`].
    #[serde(rename = "end_date")]
    end: DateTime,
}

impl Period {
    /// Creates a new [`Period`] between the provided moments.
    ///
    /// [`None`] is returned if the `start` is later than the `end`.
    #[must_use]
    pub fn new(start: DateTime, end: DateTime) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Returns the start of this [`Period`].
    #[must_use]
    pub const fn start(&self) -> DateTime {
        self.start
    }

    /// Returns the end of this [`Period`].
    #[must_use]
    pub const fn end(&self) -> DateTime {
        self.end
    }

    /// Indicates whether the provided moment lies strictly inside this
    /// [`Period`].
    #[must_use]
    pub fn contains<Of: ?Sized>(&self, at: DateTimeOf<Of>) -> bool {
        let at: DateTime = at.coerce();
        self.start < at && at < self.end
    }
}

/// Sales made within a [`Period`].
#[derive(Clone, Debug, Serialize)]
pub struct SalesReport {
    /// [`Period`] this [`SalesReport`] covers.
    pub period: Period,

    /// Number of [`Sale`]s, whatever their status.
    pub total_sales: usize,

    /// Sum of the [`Sale`] prices.
    pub total_revenue: Money,

    /// Mean [`Sale`] price, zero if there are no [`Sale`]s.
    pub average_revenue: Money,

    /// Sales per distinct make, model and year, the most profitable first.
    pub top_vehicles: Vec<VehicleSales>,

    /// Number of [`Sale`]s per [`sale::Status`].
    pub sales_by_status: BTreeMap<sale::Status, usize>,
}

/// Sales of a single make, model and year.
#[derive(Clone, Debug, Serialize)]
pub struct VehicleSales {
    /// First sold [`Vehicle`] of this kind.
    pub vehicle: Vehicle,

    /// Number of sold [`Vehicle`]s of this kind.
    pub units_sold: usize,

    /// Revenue from the [`Vehicle`]s of this kind.
    pub total_revenue: Money,
}

impl SalesReport {
    /// Aggregates the [`Sale`]s happened within the provided [`Period`].
    ///
    /// `vehicles` are used to group the [`Sale`]s by kind, so [`Sale`]s of
    /// unknown [`Vehicle`]s are counted, but not grouped.
    #[must_use]
    pub fn aggregate(
        period: Period,
        sales: &[Sale],
        vehicles: &HashMap<vehicle::Id, Vehicle>,
    ) -> Self {
        let sales: Vec<_> =
            sales.iter().filter(|s| period.contains(s.sold_at)).collect();

        let total_sales = sales.len();
        let total_revenue: Money = sales.iter().map(|s| s.price).sum();
        let average_revenue = if total_sales == 0 {
            Money::ZERO
        } else {
            (total_revenue / Decimal::from(total_sales)).round()
        };

        let mut groups = BTreeMap::<_, VehicleSales>::new();
        for s in &sales {
            let Some(v) = vehicles.get(&s.vehicle_id) else {
                continue;
            };
            _ = groups
                .entry((&v.make, &v.model, v.year))
                .and_modify(|g| {
                    g.units_sold += 1;
                    g.total_revenue += s.price;
                })
                .or_insert_with(|| VehicleSales {
                    vehicle: v.clone(),
                    units_sold: 1,
                    total_revenue: s.price,
                });
        }
        let mut top_vehicles: Vec<_> = groups.into_values().collect();
        top_vehicles.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));

        let mut sales_by_status = BTreeMap::new();
        for s in &sales {
            *sales_by_status.entry(s.status).or_default() += 1;
        }

        Self {
            period,
            total_sales,
            total_revenue,
            average_revenue,
            top_vehicles,
            sales_by_status,
        }
    }
}

/// Rate of the commission accounted in a [`PerformanceReport`].
pub const PERFORMANCE_COMMISSION_RATE: Percent =
    match Percent::from_basis_points(200) {
        Some(p) => p,
        None => Percent::ZERO,
    };

/// Results of every [`Salesperson`] within a [`Period`].
#[derive(Clone, Debug, Serialize)]
pub struct PerformanceReport {
    /// [`Period`] this [`PerformanceReport`] covers.
    pub period: Period,

    /// [`Salesperson`] with the highest revenue.
    pub top_salesperson: Salesperson,

    /// [`SalespersonPerformance`] of every [`Salesperson`].
    pub salespeople: Vec<SalespersonPerformance>,
}

/// Results of a single [`Salesperson`].
#[derive(Clone, Debug, Serialize)]
pub struct SalespersonPerformance {
    /// [`Salesperson`] these results belong to.
    pub salesperson: Salesperson,

    /// Number of [`Sale`]s closed.
    pub total_sales: usize,

    /// Sum of the closed [`Sale`] prices.
    pub total_revenue: Money,

    /// [`PERFORMANCE_COMMISSION_RATE`] of the revenue.
    pub commission: Money,
}

impl PerformanceReport {
    /// Aggregates the results of the provided [`Salesperson`]s for the
    /// [`Sale`]s happened within the provided [`Period`].
    ///
    /// The top performer is the earliest [`Salesperson`] among the ones with
    /// the highest revenue, so the first one wins if nobody sold anything.
    ///
    /// [`None`] is returned if there are no [`Salesperson`]s.
    #[must_use]
    pub fn aggregate(
        period: Period,
        salespeople: Vec<Salesperson>,
        sales: &[Sale],
    ) -> Option<Self> {
        let mut performance: Vec<_> = salespeople
            .into_iter()
            .map(|salesperson| SalespersonPerformance {
                salesperson,
                total_sales: 0,
                total_revenue: Money::ZERO,
                commission: Money::ZERO,
            })
            .collect();
        let index: HashMap<_, _> = performance
            .iter()
            .enumerate()
            .map(|(i, p)| (p.salesperson.id, i))
            .collect();

        for s in sales.iter().filter(|s| period.contains(s.sold_at)) {
            if let Some(&i) = index.get(&s.salesperson_id) {
                performance[i].total_sales += 1;
                performance[i].total_revenue += s.price;
            }
        }
        for p in &mut performance {
            p.commission = (p.total_revenue
                * PERFORMANCE_COMMISSION_RATE.fraction())
            .round();
        }

        let mut top = performance.first()?;
        for p in &performance {
            if p.total_revenue > top.total_revenue {
                top = p;
            }
        }

        Some(Self {
            period,
            top_salesperson: top.salesperson.clone(),
            salespeople: performance,
        })
    }
}

/// Price a [`Vehicle`] must exceed to be a top-value one.
pub const TOP_VALUE_THRESHOLD: Money =
    Money::new(Decimal::from_parts(30_000, 0, 0, false, 0));

/// Snapshot of the whole inventory.
#[derive(Clone, Debug, Serialize)]
pub struct InventoryReport {
    /// Number of [`Vehicle`]s.
    pub total_vehicles: usize,

    /// Summed price of the [`Vehicle`]s per [`vehicle::Make`].
    pub value_by_make: BTreeMap<vehicle::Make, Money>,

    /// Number of [`Vehicle`]s per [`vehicle::Status`].
    pub vehicles_by_status: BTreeMap<vehicle::Status, usize>,

    /// Mean age of the [`Vehicle`]s in whole years, rounded towards zero.
    pub average_age: i32,

    /// [`Vehicle`]s priced above [`TOP_VALUE_THRESHOLD`].
    pub top_value_vehicles: Vec<Vehicle>,
}

impl InventoryReport {
    /// Aggregates the provided [`Vehicle`]s as of the provided
    /// `current_year`.
    #[must_use]
    pub fn aggregate(vehicles: Vec<Vehicle>, current_year: i32) -> Self {
        let total_vehicles = vehicles.len();

        let mut value_by_make = BTreeMap::<_, Money>::new();
        let mut vehicles_by_status = BTreeMap::new();
        let mut total_age = 0_i64;
        for v in &vehicles {
            *value_by_make.entry(v.make.clone()).or_default() += v.price;
            *vehicles_by_status.entry(v.status).or_default() += 1;
            total_age += i64::from(v.age_in(current_year));
        }

        let average_age = i64::try_from(total_vehicles)
            .ok()
            .filter(|n| *n > 0)
            .and_then(|n| i32::try_from(total_age / n).ok())
            .unwrap_or_default();

        let top_value_vehicles = vehicles
            .into_iter()
            .filter(|v| v.price > TOP_VALUE_THRESHOLD)
            .collect();

        Self {
            total_vehicles,
            value_by_make,
            vehicles_by_status,
            average_age,
            top_value_vehicles,
        }
    }
}
