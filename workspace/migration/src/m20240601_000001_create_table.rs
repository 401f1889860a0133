use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Uid).unique_key())
                    .col(string(Users::Name))
                    .col(string(Users::Email))
                    .col(string(Users::Role).default("user"))
                    .col(string_null(Users::PhotoUrl))
                    .to_owned(),
            )
            .await?;

        // Create upazilas table
        manager
            .create_table(
                Table::create()
                    .table(Upazilas::Table)
                    .if_not_exists()
                    .col(pk_auto(Upazilas::Id))
                    .col(string(Upazilas::UpazilaName))
                    .col(string(Upazilas::InstituteCode))
                    .col(string(Upazilas::FieldOfficeCode))
                    .col(string(Upazilas::FullOfficeCode))
                    .to_owned(),
            )
            .await?;

        // Create economic_codes table
        manager
            .create_table(
                Table::create()
                    .table(EconomicCodes::Table)
                    .if_not_exists()
                    .col(pk_auto(EconomicCodes::Id))
                    .col(string(EconomicCodes::EconomicCode).unique_key())
                    .col(string(EconomicCodes::CodeTitle))
                    .col(decimal(EconomicCodes::TotalBudget).decimal_len(16, 4))
                    .col(
                        decimal(EconomicCodes::DistributedBudget)
                            .decimal_len(16, 4)
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Create budget_distributions table
        manager
            .create_table(
                Table::create()
                    .table(BudgetDistributions::Table)
                    .if_not_exists()
                    .col(pk_auto(BudgetDistributions::Id))
                    .col(integer(BudgetDistributions::UpazilaId))
                    .col(string(BudgetDistributions::UserUid))
                    .col(string(BudgetDistributions::EconomicCode))
                    .col(decimal(BudgetDistributions::DistributedBudget).decimal_len(16, 4))
                    .col(
                        decimal(BudgetDistributions::ExpenseBudget)
                            .decimal_len(16, 4)
                            .default(0),
                    )
                    .col(string_null(BudgetDistributions::SerialCode).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create codewise_budgets table
        manager
            .create_table(
                Table::create()
                    .table(CodewiseBudgets::Table)
                    .if_not_exists()
                    .col(pk_auto(CodewiseBudgets::Id))
                    .col(integer(CodewiseBudgets::UpazilaId).unique_key())
                    .col(string(CodewiseBudgets::UpazilaName))
                    .to_owned(),
            )
            .await?;

        // Create codewise_allocations table
        manager
            .create_table(
                Table::create()
                    .table(CodewiseAllocations::Table)
                    .if_not_exists()
                    .col(pk_auto(CodewiseAllocations::Id))
                    .col(integer(CodewiseAllocations::BudgetId))
                    .col(string(CodewiseAllocations::EconomicCode))
                    .col(decimal(CodewiseAllocations::Amount).decimal_len(16, 4))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_codewise_allocation_budget")
                            .from(CodewiseAllocations::Table, CodewiseAllocations::BudgetId)
                            .to(CodewiseBudgets::Table, CodewiseBudgets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One allocation entry per economic code per ledger
        manager
            .create_index(
                Index::create()
                    .name("idx_codewise_allocations_budget_code")
                    .table(CodewiseAllocations::Table)
                    .col(CodewiseAllocations::BudgetId)
                    .col(CodewiseAllocations::EconomicCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create messages table
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(pk_auto(Messages::Id))
                    .col(string_null(Messages::SenderUid))
                    .col(string_null(Messages::Subject))
                    .col(text(Messages::Body))
                    .col(date_time(Messages::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CodewiseAllocations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CodewiseBudgets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BudgetDistributions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EconomicCodes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Upazilas::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Uid,
    Name,
    Email,
    Role,
    PhotoUrl,
}

#[derive(DeriveIden)]
enum Upazilas {
    Table,
    Id,
    UpazilaName,
    InstituteCode,
    FieldOfficeCode,
    FullOfficeCode,
}

#[derive(DeriveIden)]
enum EconomicCodes {
    Table,
    Id,
    EconomicCode,
    CodeTitle,
    TotalBudget,
    DistributedBudget,
}

#[derive(DeriveIden)]
enum BudgetDistributions {
    Table,
    Id,
    UpazilaId,
    UserUid,
    EconomicCode,
    DistributedBudget,
    ExpenseBudget,
    SerialCode,
}

#[derive(DeriveIden)]
enum CodewiseBudgets {
    Table,
    Id,
    UpazilaId,
    UpazilaName,
}

#[derive(DeriveIden)]
enum CodewiseAllocations {
    Table,
    Id,
    BudgetId,
    EconomicCode,
    Amount,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    SenderUid,
    Subject,
    Body,
    CreatedAt,
}
