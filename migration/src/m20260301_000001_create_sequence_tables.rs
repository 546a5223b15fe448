use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Syncables::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Syncables::Height).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(Syncables::Session).big_integer().not_null())
                    .col(ColumnDef::new(Syncables::Era).big_integer().not_null())
                    .col(ColumnDef::new(Syncables::LastInSession).boolean().not_null())
                    .col(ColumnDef::new(Syncables::LastInEra).boolean().not_null())
                    .col(ColumnDef::new(Syncables::SpecVersion).text().not_null())
                    .col(ColumnDef::new(Syncables::IndexVersion).big_integer().not_null())
                    .col(ColumnDef::new(Syncables::Time).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Syncables::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Syncables::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_syncables_index_version")
                    .table(Syncables::Table)
                    .col(Syncables::IndexVersion)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlockSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlockSequences::Height).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(BlockSequences::Time).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(BlockSequences::ExtrinsicsCount).big_integer().not_null())
                    .col(ColumnDef::new(BlockSequences::SignedExtrinsicsCount).big_integer().not_null())
                    .col(ColumnDef::new(BlockSequences::UnsignedExtrinsicsCount).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_block_sequences_time")
                    .table(BlockSequences::Table)
                    .col(BlockSequences::Time)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValidatorSessionSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ValidatorSessionSequences::Session).big_integer().not_null())
                    .col(ColumnDef::new(ValidatorSessionSequences::StashAccount).text().not_null())
                    .col(ColumnDef::new(ValidatorSessionSequences::Height).big_integer().not_null())
                    .col(
                        ColumnDef::new(ValidatorSessionSequences::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ValidatorSessionSequences::Online).boolean().not_null())
                    .primary_key(
                        Index::create()
                            .col(ValidatorSessionSequences::Session)
                            .col(ValidatorSessionSequences::StashAccount),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_validator_session_sequences_time")
                    .table(ValidatorSessionSequences::Table)
                    .col(ValidatorSessionSequences::Time)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValidatorEraSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ValidatorEraSequences::Era).big_integer().not_null())
                    .col(ColumnDef::new(ValidatorEraSequences::StashAccount).text().not_null())
                    .col(ColumnDef::new(ValidatorEraSequences::Height).big_integer().not_null())
                    .col(
                        ColumnDef::new(ValidatorEraSequences::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ValidatorEraSequences::ControllerAccount).text().not_null())
                    .col(ColumnDef::new(ValidatorEraSequences::TotalStake).text().not_null())
                    .col(ColumnDef::new(ValidatorEraSequences::OwnStake).text().not_null())
                    .col(ColumnDef::new(ValidatorEraSequences::StakersCount).big_integer().not_null())
                    .col(ColumnDef::new(ValidatorEraSequences::RewardPoints).big_integer().not_null())
                    .col(ColumnDef::new(ValidatorEraSequences::Commission).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ValidatorEraSequences::Era)
                            .col(ValidatorEraSequences::StashAccount),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValidatorSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ValidatorSequences::Height).big_integer().not_null())
                    .col(ColumnDef::new(ValidatorSequences::StashAccount).text().not_null())
                    .col(ColumnDef::new(ValidatorSequences::Time).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ValidatorSequences::ActiveBalance).text().not_null())
                    .primary_key(
                        Index::create()
                            .col(ValidatorSequences::Height)
                            .col(ValidatorSequences::StashAccount),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValidatorAggregates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ValidatorAggregates::StashAccount).text().not_null().primary_key())
                    .col(ColumnDef::new(ValidatorAggregates::DisplayName).text().not_null())
                    .col(ColumnDef::new(ValidatorAggregates::StartedAtHeight).big_integer().not_null())
                    .col(
                        ColumnDef::new(ValidatorAggregates::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ValidatorAggregates::RecentAtHeight).big_integer().not_null())
                    .col(
                        ColumnDef::new(ValidatorAggregates::RecentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ValidatorAggregates::AccumulatedUptime).big_integer().not_null())
                    .col(
                        ColumnDef::new(ValidatorAggregates::AccumulatedUptimeCount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidatorAggregates::RecentAsValidatorHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventSequences::Height).big_integer().not_null())
                    .col(ColumnDef::new(EventSequences::Index).big_integer().not_null())
                    .col(ColumnDef::new(EventSequences::Time).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(EventSequences::ExtrinsicIndex).big_integer().not_null())
                    .col(ColumnDef::new(EventSequences::Section).text().not_null())
                    .col(ColumnDef::new(EventSequences::Method).text().not_null())
                    .col(ColumnDef::new(EventSequences::Phase).text().not_null())
                    .col(ColumnDef::new(EventSequences::Data).json_binary().not_null())
                    .primary_key(
                        Index::create()
                            .col(EventSequences::Height)
                            .col(EventSequences::Index),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountEraSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccountEraSequences::Era).big_integer().not_null())
                    .col(ColumnDef::new(AccountEraSequences::StashAccount).text().not_null())
                    .col(ColumnDef::new(AccountEraSequences::ValidatorStashAccount).text().not_null())
                    .col(ColumnDef::new(AccountEraSequences::Height).big_integer().not_null())
                    .col(
                        ColumnDef::new(AccountEraSequences::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountEraSequences::Stake).text().not_null())
                    .primary_key(
                        Index::create()
                            .col(AccountEraSequences::Era)
                            .col(AccountEraSequences::StashAccount)
                            .col(AccountEraSequences::ValidatorStashAccount),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TransactionSequences::Height).big_integer().not_null())
                    .col(ColumnDef::new(TransactionSequences::Index).big_integer().not_null())
                    .col(
                        ColumnDef::new(TransactionSequences::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionSequences::Hash).text().not_null())
                    .col(ColumnDef::new(TransactionSequences::Signer).text().not_null())
                    .col(ColumnDef::new(TransactionSequences::Section).text().not_null())
                    .col(ColumnDef::new(TransactionSequences::Method).text().not_null())
                    .col(ColumnDef::new(TransactionSequences::IsSuccess).boolean().not_null())
                    .col(ColumnDef::new(TransactionSequences::Args).json_binary().not_null())
                    .primary_key(
                        Index::create()
                            .col(TransactionSequences::Height)
                            .col(TransactionSequences::Index),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RewardEraSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RewardEraSequences::Era).big_integer().not_null())
                    .col(ColumnDef::new(RewardEraSequences::StashAccount).text().not_null())
                    .col(ColumnDef::new(RewardEraSequences::ValidatorStashAccount).text().not_null())
                    .col(ColumnDef::new(RewardEraSequences::Kind).text().not_null())
                    .col(ColumnDef::new(RewardEraSequences::Height).big_integer().not_null())
                    .col(
                        ColumnDef::new(RewardEraSequences::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RewardEraSequences::Amount).text().not_null())
                    .col(
                        ColumnDef::new(RewardEraSequences::Claimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(RewardEraSequences::Era)
                            .col(RewardEraSequences::StashAccount)
                            .col(RewardEraSequences::ValidatorStashAccount)
                            .col(RewardEraSequences::Kind),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SystemEvents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SystemEvents::Height).big_integer().not_null())
                    .col(ColumnDef::new(SystemEvents::Actor).text().not_null())
                    .col(ColumnDef::new(SystemEvents::Kind).text().not_null())
                    .col(ColumnDef::new(SystemEvents::Time).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(SystemEvents::Data).json_binary().not_null())
                    .primary_key(
                        Index::create()
                            .col(SystemEvents::Height)
                            .col(SystemEvents::Actor)
                            .col(SystemEvents::Kind),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::Kind).text().not_null())
                    .col(ColumnDef::new(Reports::Status).text().not_null())
                    .col(ColumnDef::new(Reports::IndexVersion).big_integer().not_null())
                    .col(ColumnDef::new(Reports::StartHeight).big_integer().not_null())
                    .col(ColumnDef::new(Reports::EndHeight).big_integer().not_null())
                    .col(ColumnDef::new(Reports::SuccessCount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Reports::ErrorCount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Reports::ErrorMsg).text().null())
                    .col(ColumnDef::new(Reports::Duration).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Reports::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Reports::CompletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reports_kind")
                    .table(Reports::Table)
                    .col(Reports::Kind)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reports::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SystemEvents::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(RewardEraSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TransactionSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AccountEraSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(EventSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ValidatorAggregates::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ValidatorSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ValidatorEraSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ValidatorSessionSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(BlockSequences::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Syncables::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Syncables {
    Table,
    Height,
    Session,
    Era,
    LastInSession,
    LastInEra,
    SpecVersion,
    IndexVersion,
    Time,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BlockSequences {
    Table,
    Height,
    Time,
    ExtrinsicsCount,
    SignedExtrinsicsCount,
    UnsignedExtrinsicsCount,
}

#[derive(Iden)]
enum ValidatorSessionSequences {
    Table,
    Session,
    StashAccount,
    Height,
    Time,
    Online,
}

#[derive(Iden)]
enum ValidatorEraSequences {
    Table,
    Era,
    StashAccount,
    Height,
    Time,
    ControllerAccount,
    TotalStake,
    OwnStake,
    StakersCount,
    RewardPoints,
    Commission,
}

#[derive(Iden)]
enum ValidatorSequences {
    Table,
    Height,
    StashAccount,
    Time,
    ActiveBalance,
}

#[derive(Iden)]
enum ValidatorAggregates {
    Table,
    StashAccount,
    DisplayName,
    StartedAtHeight,
    StartedAt,
    RecentAtHeight,
    RecentAt,
    AccumulatedUptime,
    AccumulatedUptimeCount,
    RecentAsValidatorHeight,
}

#[derive(Iden)]
enum EventSequences {
    Table,
    Height,
    Index,
    Time,
    ExtrinsicIndex,
    Section,
    Method,
    Phase,
    Data,
}

#[derive(Iden)]
enum AccountEraSequences {
    Table,
    Era,
    StashAccount,
    ValidatorStashAccount,
    Height,
    Time,
    Stake,
}

#[derive(Iden)]
enum TransactionSequences {
    Table,
    Height,
    Index,
    Time,
    Hash,
    Signer,
    Section,
    Method,
    IsSuccess,
    Args,
}

#[derive(Iden)]
enum RewardEraSequences {
    Table,
    Era,
    StashAccount,
    ValidatorStashAccount,
    Kind,
    Height,
    Time,
    Amount,
    Claimed,
}

#[derive(Iden)]
enum SystemEvents {
    Table,
    Height,
    Actor,
    Kind,
    Time,
    Data,
}

#[derive(Iden)]
enum Reports {
    Table,
    Id,
    Kind,
    Status,
    IndexVersion,
    StartHeight,
    EndHeight,
    SuccessCount,
    ErrorCount,
    ErrorMsg,
    Duration,
    CreatedAt,
    CompletedAt,
}
