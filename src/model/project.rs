use crate::model::{Amount, Item, Items};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The projects collection.
pub type Projects = Items<Project>;

/// A hotel asset whose finances are tracked.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub status: ProjectStatus,
    pub budget: Amount,
}

impl Item for Project {
    const KIND: &'static str = "project";

    fn id(&self) -> &str {
        &self.id
    }
}

/// The lifecycle stage of a hotel project.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum ProjectStatus {
    #[default]
    Planning,
    Construction,
    Operational,
    Renovating,
}

serde_plain::derive_display_from_serialize!(ProjectStatus);
serde_plain::derive_fromstr_from_deserialize!(ProjectStatus);
