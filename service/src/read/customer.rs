//! [`Customer`] read model definitions.

use std::collections::{BTreeMap, HashMap};

use common::Money;
use serde::Serialize;

use crate::domain::{sale, vehicle, CreditDecision, Customer, Sale, Vehicle};

/// Selector of all the [`Customer`]s in the registration order.
#[derive(Clone, Copy, Debug, Default)]
pub struct All;

/// [`Customer`] along with the credit and purchase facts about it.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    /// [`Customer`] itself.
    pub customer: Customer,

    /// Current [`CreditDecision`] about the [`Customer`].
    pub credit_status: CreditDecision,

    /// All the [`Sale`]s the [`Customer`] took part in.
    pub purchase_history: Vec<Sale>,

    /// Total price of the completed [`Sale`]s.
    pub total_spent: Money,

    /// [`Vehicle`]s bought in the completed [`Sale`]s.
    pub owned_vehicles: Vec<Vehicle>,

    /// [`vehicle::Make`]s of the owned [`Vehicle`]s, the most frequent
    /// first.
    pub preferred_makes: Vec<vehicle::Make>,
}

impl Profile {
    /// Assembles a [`Profile`] out of the provided [`Customer`] facts.
    ///
    /// `vehicles` are looked up for the completed `sales`, missing ones are
    /// skipped.
    #[must_use]
    pub fn assemble(
        customer: Customer,
        credit_status: CreditDecision,
        sales: Vec<Sale>,
        mut vehicles: HashMap<vehicle::Id, Vehicle>,
    ) -> Self {
        let completed = sales
            .iter()
            .filter(|s| s.status == sale::Status::Completed);

        let total_spent = completed.clone().map(|s| s.price).sum();

        let owned_vehicles: Vec<_> = completed
            .filter_map(|s| vehicles.remove(&s.vehicle_id))
            .collect();

        let mut frequency = BTreeMap::<&vehicle::Make, usize>::new();
        for v in &owned_vehicles {
            *frequency.entry(&v.make).or_default() += 1;
        }
        let mut preferred_makes: Vec<_> = frequency.into_iter().collect();
        preferred_makes.sort_by(|(_, a), (_, b)| b.cmp(a));
        let preferred_makes =
            preferred_makes.into_iter().map(|(m, _)| m.clone()).collect();

        Self {
            customer,
            credit_status,
            purchase_history: sales,
            total_spent,
            owned_vehicles,
            preferred_makes,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::collections::HashMap;

    use common::{DateTime, Money};

    use super::Profile;
    use crate::domain::{
        credit, customer::spec::customer, sale, salesperson,
        vehicle::spec::vehicle, CreditDecision,
    };

    #[test]
    fn sums_only_completed_purchases() {
        let c = customer();
        let seller = salesperson::Id::new();
        let now = DateTime::now();

        let honda = vehicle("Honda", 2020, 20_000);
        let toyota = vehicle("Toyota", 2021, 25_000);
        let other_honda = vehicle("Honda", 2022, 30_000);

        let mut cancelled = sale::spec::sale(toyota.id, seller, 25_000, now);
        cancelled.status = sale::Status::Cancelled;
        let sales = vec![
            sale::spec::sale(honda.id, seller, 20_000, now),
            cancelled,
            sale::spec::sale(other_honda.id, seller, 30_000, now),
        ];
        let vehicles: HashMap<_, _> = [honda, toyota, other_honda]
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let credit =
            CreditDecision::for_score(c.id, credit::Score::new(700).unwrap());
        let profile = Profile::assemble(c, credit, sales, vehicles);

        assert_eq!(profile.purchase_history.len(), 3);
        assert_eq!(profile.total_spent, Money::from(50_000));
        assert_eq!(profile.owned_vehicles.len(), 2);
        assert_eq!(
            profile
                .preferred_makes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["Honda"],
        );
    }

    #[test]
    fn empty_history() {
        let c = customer();
        let credit =
            CreditDecision::for_score(c.id, credit::Score::new(600).unwrap());

        let profile = Profile::assemble(c, credit, vec![], HashMap::new());

        assert!(profile.purchase_history.is_empty());
        assert!(profile.owned_vehicles.is_empty());
        assert!(profile.preferred_makes.is_empty());
        assert_eq!(profile.total_spent, Money::ZERO);
    }
}
