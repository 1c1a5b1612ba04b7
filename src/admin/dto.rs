use serde::Deserialize;

use crate::entities::Role;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Role,
}
