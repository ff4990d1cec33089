//! Database entities

pub mod org_user;
pub mod team;
pub mod team_user;
pub mod user;

pub use org_user::Entity as OrgUser;
pub use team::Entity as Team;
pub use team_user::Entity as TeamUser;
pub use user::Entity as User;

pub mod prelude {
    pub use super::org_user::Entity as OrgUser;
    pub use super::team::Entity as Team;
    pub use super::team_user::Entity as TeamUser;
    pub use super::user::Entity as User;
}
