//! Initial schema: accounts, teams, team members, organization members

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Accounts (individuals and organizations)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(User::LowerName)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(User::FullName)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(User::LowerFullName)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(User::Email)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(User::Location)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(User::Website)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(User::Description).text().not_null().default(""))
                    .col(
                        ColumnDef::new(User::MaxRepoCreation)
                            .integer()
                            .not_null()
                            .default(-1),
                    )
                    .col(ColumnDef::new(User::NumTeams).integer().not_null().default(0))
                    .col(ColumnDef::new(User::NumMembers).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_kind")
                    .table(User::Table)
                    .col(User::Kind)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Teams
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Team::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Team::OrgId).big_integer().not_null())
                    .col(ColumnDef::new(Team::LowerName).string_len(255).not_null())
                    .col(ColumnDef::new(Team::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Team::Description).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Team::Authorize)
                            .string_len(16)
                            .not_null()
                            .default("read"),
                    )
                    .col(ColumnDef::new(Team::NumMembers).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_org_id")
                            .from(Team::Table, Team::OrgId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_org_id_lower_name")
                    .table(Team::Table)
                    .col(Team::OrgId)
                    .col(Team::LowerName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Team members
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(TeamUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamUser::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeamUser::OrgId).big_integer().not_null())
                    .col(ColumnDef::new(TeamUser::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(TeamUser::Uid).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_users_team_id")
                            .from(TeamUser::Table, TeamUser::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_users_uid")
                            .from(TeamUser::Table, TeamUser::Uid)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_users_team_id_uid")
                    .table(TeamUser::Table)
                    .col(TeamUser::TeamId)
                    .col(TeamUser::Uid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_users_org_id")
                    .table(TeamUser::Table)
                    .col(TeamUser::OrgId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Organization members
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(OrgUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrgUser::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrgUser::Uid).big_integer().not_null())
                    .col(ColumnDef::new(OrgUser::OrgId).big_integer().not_null())
                    .col(
                        ColumnDef::new(OrgUser::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OrgUser::IsOwner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(OrgUser::NumTeams).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_org_users_uid")
                            .from(OrgUser::Table, OrgUser::Uid)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_org_users_org_id")
                            .from(OrgUser::Table, OrgUser::OrgId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_org_users_uid_org_id")
                    .table(OrgUser::Table)
                    .col(OrgUser::Uid)
                    .col(OrgUser::OrgId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_org_users_org_id")
                    .table(OrgUser::Table)
                    .col(OrgUser::OrgId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrgUser::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamUser::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    LowerName,
    Kind,
    FullName,
    LowerFullName,
    Email,
    Location,
    Website,
    Description,
    MaxRepoCreation,
    NumTeams,
    NumMembers,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    OrgId,
    LowerName,
    Name,
    Description,
    Authorize,
    NumMembers,
}

#[derive(DeriveIden)]
enum TeamUser {
    #[sea_orm(iden = "team_users")]
    Table,
    Id,
    OrgId,
    TeamId,
    Uid,
}

#[derive(DeriveIden)]
enum OrgUser {
    #[sea_orm(iden = "org_users")]
    Table,
    Id,
    Uid,
    OrgId,
    IsPublic,
    IsOwner,
    NumTeams,
}
