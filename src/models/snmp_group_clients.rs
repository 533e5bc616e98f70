use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "snmp_group_clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub snmp_group_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::snmp_group::Entity",
        from = "Column::SnmpGroupId",
        to = "super::snmp_group::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SnmpGroup,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Client,
}

impl ActiveModelBehavior for ActiveModel {}
