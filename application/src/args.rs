//! [`Args`] definitions.

use clap::{Parser, Subcommand};
use common::{DateTime, Money};
use service::domain::{
    contact::{Email, Phone},
    credit, customer,
    financing::StandardTerm,
    sale, salesperson, vehicle,
};

/// Command line front end of the dealership core.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Operation to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Operation of the dealership core.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Registers a new customer.
    RegisterCustomer {
        /// First name.
        #[arg(long)]
        first_name: customer::Name,

        /// Last name.
        #[arg(long)]
        last_name: customer::Name,

        /// Email address.
        #[arg(long)]
        email: Email,

        /// Phone number.
        #[arg(long)]
        phone: Option<Phone>,

        /// Street address.
        #[arg(long)]
        address: Option<customer::Address>,

        /// City.
        #[arg(long)]
        city: Option<customer::City>,

        /// State.
        #[arg(long)]
        state: Option<customer::State>,

        /// Zip code.
        #[arg(long)]
        zip_code: Option<customer::ZipCode>,

        /// Birth date as an RFC 3339 timestamp.
        #[arg(long, value_parser = datetime)]
        born_at: Option<DateTime>,

        /// Already known credit score.
        #[arg(long, value_parser = score)]
        credit_score: Option<credit::Score>,

        /// Preference in `key=value` form, may be repeated.
        #[arg(long = "preference", value_parser = key_value)]
        preferences: Vec<(String, String)>,
    },

    /// Lists all the registered customers.
    ListCustomers,

    /// Shows the profile of a customer.
    CustomerProfile {
        /// ID of the customer.
        id: customer::Id,
    },

    /// Decides upon the credit for a customer.
    CreditApplication {
        /// ID of the customer.
        customer_id: customer::Id,
    },

    /// Adds a new vehicle to the inventory.
    AddVehicle {
        /// Vehicle Identification Number.
        #[arg(long)]
        vin: vehicle::Vin,

        /// Manufacturer.
        #[arg(long)]
        make: vehicle::Make,

        /// Model name.
        #[arg(long)]
        model: vehicle::Model,

        /// Model year.
        #[arg(long, value_parser = year)]
        year: vehicle::Year,

        /// Exterior color.
        #[arg(long)]
        color: vehicle::Color,

        /// Odometer reading.
        #[arg(long, value_parser = mileage, default_value = "0")]
        mileage: vehicle::Mileage,

        /// Asking price.
        #[arg(long, allow_hyphen_values = true)]
        price: Money,

        /// Engine description.
        #[arg(long)]
        engine_type: Option<vehicle::EngineType>,

        /// Transmission kind.
        #[arg(long)]
        transmission: Option<vehicle::Transmission>,

        /// Fuel the vehicle runs on.
        #[arg(long)]
        fuel_type: Option<vehicle::FuelType>,
    },

    /// Shows a vehicle.
    GetVehicle {
        /// ID of the vehicle.
        id: vehicle::Id,
    },

    /// Lists the whole inventory.
    ListVehicles,

    /// Searches the inventory by buyer preferences.
    SearchVehicles {
        /// Lowest acceptable price, zero for none.
        #[arg(long)]
        min_price: Option<Money>,

        /// Highest acceptable price, zero for none.
        #[arg(long)]
        max_price: Option<Money>,

        /// Earliest acceptable model year.
        #[arg(long, value_parser = year)]
        min_year: Option<vehicle::Year>,

        /// Latest acceptable model year.
        #[arg(long, value_parser = year)]
        max_year: Option<vehicle::Year>,

        /// Highest acceptable mileage, zero for none.
        #[arg(long, value_parser = mileage)]
        max_mileage: Option<vehicle::Mileage>,

        /// Acceptable manufacturer, may be repeated.
        #[arg(long = "make")]
        makes: Vec<vehicle::Make>,

        /// Acceptable fuel, may be repeated.
        #[arg(long = "fuel-type")]
        fuel_types: Vec<vehicle::FuelType>,
    },

    /// Reserves an available vehicle for a customer.
    ReserveVehicle {
        /// ID of the vehicle.
        vehicle_id: vehicle::Id,

        /// ID of the customer.
        customer_id: customer::Id,
    },

    /// Hires a new salesperson.
    HireSalesperson {
        /// Personnel number.
        #[arg(long)]
        employee_number: salesperson::EmployeeNumber,

        /// First name.
        #[arg(long)]
        first_name: salesperson::Name,

        /// Last name.
        #[arg(long)]
        last_name: salesperson::Name,

        /// Email address.
        #[arg(long)]
        email: Email,

        /// Phone number.
        #[arg(long)]
        phone: Option<Phone>,

        /// Department.
        #[arg(long)]
        department: Option<salesperson::Department>,

        /// Commission rate in percents.
        #[arg(long)]
        commission_rate: common::Percent,

        /// Hiring date as an RFC 3339 timestamp, defaults to now.
        #[arg(long, value_parser = datetime)]
        hired_at: Option<DateTime>,
    },

    /// Checks whether a sale may be started.
    StartSale {
        /// ID of the buying customer.
        customer_id: customer::Id,

        /// ID of the vehicle.
        vehicle_id: vehicle::Id,

        /// ID of the salesperson.
        salesperson_id: salesperson::Id,
    },

    /// Quotes the financing options of a vehicle for a customer.
    QuoteFinancing {
        /// ID of the vehicle.
        vehicle_id: vehicle::Id,

        /// ID of the customer.
        customer_id: customer::Id,

        /// Amount paid upfront.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        down_payment: Money,
    },

    /// Sells a vehicle, starting and completing a sales session at once.
    Sell {
        /// ID of the buying customer.
        customer_id: customer::Id,

        /// ID of the vehicle.
        vehicle_id: vehicle::Id,

        /// ID of the salesperson.
        salesperson_id: salesperson::Id,

        /// Payment method: `cash`, `finance` or `lease`.
        #[arg(long, default_value = "cash")]
        payment_method: sale::PaymentMethod,

        /// Amount paid upfront.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        down_payment: Money,

        /// Financing term in months: 36, 48, 60 or 72.
        #[arg(long, value_parser = term)]
        term: Option<StandardTerm>,

        /// Free-form notes.
        #[arg(long)]
        notes: Option<sale::Notes>,
    },

    /// Reports the sales made strictly between two moments.
    SalesReport {
        /// Start of the period as an RFC 3339 timestamp.
        #[arg(value_parser = datetime)]
        start: DateTime,

        /// End of the period as an RFC 3339 timestamp.
        #[arg(value_parser = datetime)]
        end: DateTime,
    },

    /// Reports the performance of every salesperson between two moments.
    PerformanceReport {
        /// Start of the period as an RFC 3339 timestamp.
        #[arg(value_parser = datetime)]
        start: DateTime,

        /// End of the period as an RFC 3339 timestamp.
        #[arg(value_parser = datetime)]
        end: DateTime,
    },

    /// Reports the state of the whole inventory.
    InventoryReport,
}

fn datetime(s: &str) -> Result<DateTime, String> {
    DateTime::from_rfc3339(s).map_err(|e| e.to_string())
}

fn key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("`{s}` is not in `key=value` form"))
}

fn score(s: &str) -> Result<credit::Score, String> {
    s.parse::<u16>()
        .map_err(|e| e.to_string())
        .and_then(|v| credit::Score::try_from(v).map_err(Into::into))
}

fn year(s: &str) -> Result<vehicle::Year, String> {
    s.parse()
        .ok()
        .and_then(vehicle::Year::new)
        .ok_or_else(|| format!("year must be {} or later", vehicle::Year::MIN))
}

fn mileage(s: &str) -> Result<vehicle::Mileage, String> {
    s.parse()
        .ok()
        .and_then(vehicle::Mileage::new)
        .ok_or_else(|| "mileage must be a non-negative integer".to_owned())
}

fn term(s: &str) -> Result<StandardTerm, String> {
    s.parse::<u16>()
        .map_err(|e| e.to_string())
        .and_then(|m| StandardTerm::try_from(m).map_err(Into::into))
}
