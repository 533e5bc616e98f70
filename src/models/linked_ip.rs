use sea_orm::entity::prelude::*;

/// Symmetric IP-to-IP link. The smaller id is always stored in `ip_id_a`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "linked_ips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ip_id_a: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ip_id_b: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ip::Entity",
        from = "Column::IpIdA",
        to = "super::ip::Column::Id",
        on_delete = "Cascade"
    )]
    IpA,
    #[sea_orm(
        belongs_to = "super::ip::Entity",
        from = "Column::IpIdB",
        to = "super::ip::Column::Id",
        on_delete = "Cascade"
    )]
    IpB,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The id on the other side of the link.
    pub fn peer_of(&self, ip_id: i32) -> i32 {
        if self.ip_id_a == ip_id {
            self.ip_id_b
        } else {
            self.ip_id_a
        }
    }
}
