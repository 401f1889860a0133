//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the budget ledger service here.
//! The structure mirrors the document collections of the original deployment
//! (users, upazila directory, economic codes, budget distributions, messages)
//! adapted for Rust's type system and the SeaORM framework.

pub mod budget_distribution;
pub mod codewise_allocation;
pub mod codewise_budget;
pub mod economic_code;
pub mod message;
pub mod upazila;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::budget_distribution::Entity as BudgetDistribution;
    pub use super::codewise_allocation::Entity as CodewiseAllocation;
    pub use super::codewise_budget::Entity as CodewiseBudget;
    pub use super::economic_code::Entity as EconomicCode;
    pub use super::message::Entity as Message;
    pub use super::upazila::Entity as Upazila;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        // Create users
        let admin = user::ActiveModel {
            uid: Set("uid-admin-1".to_string()),
            name: Set("District Admin".to_string()),
            email: Set("admin@example.org".to_string()),
            role: Set("admin".to_string()),
            photo_url: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let officer = user::ActiveModel {
            uid: Set("uid-officer-1".to_string()),
            name: Set("Field Officer".to_string()),
            email: Set("officer@example.org".to_string()),
            role: Set("user".to_string()),
            photo_url: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create an upazila directory entry
        let upazila = upazila::ActiveModel {
            upazila_name: Set("Sadar".to_string()),
            institute_code: Set("120".to_string()),
            field_office_code: Set("045".to_string()),
            full_office_code: Set("120045".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create an economic code with an untouched running total
        let code = economic_code::ActiveModel {
            economic_code: Set("3111101".to_string()),
            code_title: Set("Basic pay of officers".to_string()),
            total_budget: Set(Decimal::new(100_000, 0)),
            distributed_budget: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a distribution held by the officer
        let distribution = budget_distribution::ActiveModel {
            upazila_id: Set(upazila.id),
            user_uid: Set(officer.uid.clone()),
            economic_code: Set(code.economic_code.clone()),
            distributed_budget: Set(Decimal::new(25_000, 0)),
            expense_budget: Set(Decimal::ZERO),
            serial_code: Set(Some("SER-0001".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a codewise ledger with two allocation entries
        let ledger = codewise_budget::ActiveModel {
            upazila_id: Set(upazila.id),
            upazila_name: Set(upazila.upazila_name.clone()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        codewise_allocation::ActiveModel {
            budget_id: Set(ledger.id),
            economic_code: Set("3111101".to_string()),
            amount: Set(Decimal::new(25_000, 0)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        codewise_allocation::ActiveModel {
            budget_id: Set(ledger.id),
            economic_code: Set("3211106".to_string()),
            amount: Set(Decimal::new(4_000, 0)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a message
        let message = message::ActiveModel {
            sender_uid: Set(Some(admin.uid.clone())),
            subject: Set(Some("Quarterly release".to_string())),
            body: Set("Q3 allocations have been released.".to_string()),
            created_at: Set(NaiveDate::from_ymd_opt(2024, 7, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data

        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.uid == "uid-admin-1"));
        assert!(users.iter().any(|u| u.role == "user"));

        let upazilas = Upazila::find().all(&db).await?;
        assert_eq!(upazilas.len(), 1);
        assert_eq!(upazilas[0].full_office_code, "120045");

        let codes = EconomicCode::find().all(&db).await?;
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].distributed_budget, Decimal::ZERO);

        let distributions = BudgetDistribution::find()
            .filter(budget_distribution::Column::UserUid.eq("uid-officer-1"))
            .all(&db)
            .await?;
        assert_eq!(distributions.len(), 1);
        assert_eq!(distributions[0].id, distribution.id);
        assert_eq!(distributions[0].serial_code.as_deref(), Some("SER-0001"));

        let messages = Message::find().all(&db).await?;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, message.id);

        // Ledger entries are reachable through the has_many relation
        let entries = ledger.find_related(CodewiseAllocation).all(&db).await?;
        assert_eq!(entries.len(), 2);

        // Duplicate uid must be rejected by the unique constraint
        let duplicate = user::ActiveModel {
            uid: Set("uid-admin-1".to_string()),
            name: Set("Impostor".to_string()),
            email: Set("impostor@example.org".to_string()),
            role: Set("user".to_string()),
            photo_url: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(duplicate.is_err());

        // Deleting a ledger cascades to its allocation entries
        ledger.delete(&db).await?;
        let remaining = CodewiseAllocation::find().all(&db).await?;
        assert!(remaining.is_empty());

        Ok(())
    }
}
