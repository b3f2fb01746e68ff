use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lobby_id: Uuid,
    pub name: String,
    pub seat: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lobbies::Entity",
        from = "Column::LobbyId",
        to = "super::lobbies::Column::Id"
    )]
    Lobby,
    #[sea_orm(has_many = "super::timelines::Entity")]
    Timelines,
}

impl Related<super::lobbies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lobby.def()
    }
}

impl Related<super::timelines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timelines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
