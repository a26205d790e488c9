use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create integrations table
        manager
            .create_table(
                Table::create()
                    .table(Integrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Integrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Integrations::Name).string().not_null())
                    .col(
                        ColumnDef::new(Integrations::Provider)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Integrations::Description).string())
                    .col(
                        ColumnDef::new(Integrations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Integrations::Config).json().not_null())
                    .col(ColumnDef::new(Integrations::Triggers).json().not_null())
                    .col(
                        ColumnDef::new(Integrations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Integrations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create integration_secrets table
        manager
            .create_table(
                Table::create()
                    .table(IntegrationSecrets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IntegrationSecrets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IntegrationSecrets::IntegrationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationSecrets::KeyName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IntegrationSecrets::Value).string().not_null())
                    .col(
                        ColumnDef::new(IntegrationSecrets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One value per (integration, key)
        manager
            .create_index(
                Index::create()
                    .name("idx_secrets_integration_key")
                    .table(IntegrationSecrets::Table)
                    .col(IntegrationSecrets::IntegrationId)
                    .col(IntegrationSecrets::KeyName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create integration_logs table
        manager
            .create_table(
                Table::create()
                    .table(IntegrationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IntegrationLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IntegrationLogs::IntegrationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IntegrationLogs::Event).string().not_null())
                    .col(ColumnDef::new(IntegrationLogs::Status).string().not_null())
                    .col(ColumnDef::new(IntegrationLogs::Payload).json().not_null())
                    .col(ColumnDef::new(IntegrationLogs::Response).json().not_null())
                    .col(
                        ColumnDef::new(IntegrationLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IntegrationLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IntegrationSecrets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Integrations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Integrations {
    Table,
    Id,
    Name,
    Provider,
    Description,
    IsActive,
    Config,
    Triggers,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IntegrationSecrets {
    Table,
    Id,
    IntegrationId,
    KeyName,
    Value,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IntegrationLogs {
    Table,
    Id,
    IntegrationId,
    Event,
    Status,
    Payload,
    Response,
    CreatedAt,
}
