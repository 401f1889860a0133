pub mod codewise_budgets;
pub mod distributions;
pub mod economic_codes;
pub mod expenses;
pub mod health;
pub mod imports;
pub mod messages;
pub mod upazilas;
pub mod users;
