use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "game_states")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub lobby_id: Uuid,
    pub round_number: i32,
    pub current_guesser_seat: i32,
    pub current_dj_seat: i32,
    pub current_attempt_seat: i32,
    pub show_id: Option<Uuid>,
    pub round_state: String,
    pub revision: i32,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lobbies::Entity",
        from = "Column::LobbyId",
        to = "super::lobbies::Column::Id"
    )]
    Lobby,
    #[sea_orm(
        belongs_to = "super::shows::Entity",
        from = "Column::ShowId",
        to = "super::shows::Column::Id"
    )]
    Show,
}

impl Related<super::lobbies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lobby.def()
    }
}

impl Related<super::shows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Show.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
