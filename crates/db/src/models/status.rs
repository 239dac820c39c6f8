//! Status helper enum mapping to the SMALLSERIAL `deployment_statuses`
//! lookup table. Variant discriminants match the seed data order (1-based).

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Deployment lifecycle status.
///
/// Legal transitions: `Pending -> Building -> {Live, Failed}`;
/// `Live -> RolledBack` (superseded or explicitly rolled back);
/// `RolledBack -> Live` (rollback). `Failed` is terminal; a retry
/// requires a new deployment row with a new version.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Pending = 1,
    Building = 2,
    Live = 3,
    Failed = 4,
    RolledBack = 5,
}

impl DeploymentStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Database `name` column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::Live => "live",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
        }
    }
}

impl From<DeploymentStatus> for StatusId {
    fn from(value: DeploymentStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(DeploymentStatus::Pending.id(), 1);
        assert_eq!(DeploymentStatus::Building.id(), 2);
        assert_eq!(DeploymentStatus::Live.id(), 3);
        assert_eq!(DeploymentStatus::Failed.id(), 4);
        assert_eq!(DeploymentStatus::RolledBack.id(), 5);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = DeploymentStatus::Live.into();
        assert_eq!(id, 3);
    }

    #[test]
    fn status_names_match_seed_data() {
        assert_eq!(DeploymentStatus::Pending.name(), "pending");
        assert_eq!(DeploymentStatus::RolledBack.name(), "rolled_back");
    }
}
