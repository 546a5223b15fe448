use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlockSummaries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlockSummaries::TimeInterval).text().not_null())
                    .col(
                        ColumnDef::new(BlockSummaries::TimeBucket)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BlockSummaries::IndexVersion).big_integer().not_null())
                    .col(ColumnDef::new(BlockSummaries::Count).big_integer().not_null())
                    .col(ColumnDef::new(BlockSummaries::BlockTimeAvg).double().not_null())
                    .primary_key(
                        Index::create()
                            .col(BlockSummaries::TimeInterval)
                            .col(BlockSummaries::TimeBucket),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValidatorSummaries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ValidatorSummaries::TimeInterval).text().not_null())
                    .col(
                        ColumnDef::new(ValidatorSummaries::TimeBucket)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ValidatorSummaries::StashAccount).text().not_null())
                    .col(ColumnDef::new(ValidatorSummaries::IndexVersion).big_integer().not_null())
                    .col(ColumnDef::new(ValidatorSummaries::UptimeAvg).double().not_null())
                    .col(ColumnDef::new(ValidatorSummaries::UptimeMax).big_integer().not_null())
                    .col(ColumnDef::new(ValidatorSummaries::UptimeMin).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ValidatorSummaries::TimeInterval)
                            .col(ValidatorSummaries::TimeBucket)
                            .col(ValidatorSummaries::StashAccount),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ValidatorSummaries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlockSummaries::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum BlockSummaries {
    Table,
    TimeInterval,
    TimeBucket,
    IndexVersion,
    Count,
    BlockTimeAvg,
}

#[derive(Iden)]
enum ValidatorSummaries {
    Table,
    TimeInterval,
    TimeBucket,
    StashAccount,
    IndexVersion,
    UptimeAvg,
    UptimeMax,
    UptimeMin,
}
