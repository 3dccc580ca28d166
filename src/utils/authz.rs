use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;

/// The authenticated principal acting on the booking core. Carries the
/// capability flags supplied by the identity provider; the core trusts them.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub is_driver: bool,
    pub is_traveller: bool,
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            is_driver: claims.is_driver,
            is_traveller: claims.is_traveller,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Driver,
    Traveller,
}

/// Single authorization check used everywhere a role is required.
pub fn require_capability(actor: &Actor, capability: Capability) -> AppResult<()> {
    let granted = match capability {
        Capability::Driver => actor.is_driver,
        Capability::Traveller => actor.is_traveller,
    };

    if granted {
        Ok(())
    } else {
        let role = match capability {
            Capability::Driver => "driver",
            Capability::Traveller => "traveller",
        };
        Err(AppError::Authorization(format!(
            "This action requires a {} account",
            role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            is_driver: true,
            is_traveller: false,
        }
    }

    fn traveller() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            is_driver: false,
            is_traveller: true,
        }
    }

    #[test]
    fn driver_capability_granted_only_to_drivers() {
        assert!(require_capability(&driver(), Capability::Driver).is_ok());
        assert!(matches!(
            require_capability(&traveller(), Capability::Driver),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn traveller_capability_granted_only_to_travellers() {
        assert!(require_capability(&traveller(), Capability::Traveller).is_ok());
        assert!(matches!(
            require_capability(&driver(), Capability::Traveller),
            Err(AppError::Authorization(_))
        ));
    }
}
