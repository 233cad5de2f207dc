//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{long_date, Draft, Entity, EntityKind};
use crate::validation::FormValues;

/// Full author record from the store
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// `lastName, firstName`
    pub fn name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// `May 14th, 1990 - June 1st, 2050`, open-ended while alive, `-` without a birth date
    pub fn lifespan(&self) -> String {
        match (self.date_of_birth, self.date_of_death) {
            (Some(birth), Some(death)) => format!("{} - {}", long_date(birth), long_date(death)),
            (Some(birth), None) => format!("{} -", long_date(birth)),
            (None, _) => "-".to_string(),
        }
    }
}

impl Entity for Author {
    const KIND: EntityKind = EntityKind::Author;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Shape handed to views, with the derived fields
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorView<'a> {
    id: Uuid,
    first_name: &'a str,
    last_name: &'a str,
    date_of_birth: Option<NaiveDate>,
    date_of_death: Option<NaiveDate>,
    name: String,
    lifespan: String,
    url: String,
}

impl Serialize for Author {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AuthorView {
            id: self.id,
            first_name: &self.first_name,
            last_name: &self.last_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
            name: self.name(),
            lifespan: self.lifespan(),
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Validated author form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDraft {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorDraft {
    pub fn from_values(values: &FormValues) -> Self {
        Self {
            first_name: values.text("firstName").to_string(),
            last_name: values.text("lastName").to_string(),
            date_of_birth: values.date("dateOfBirth"),
            date_of_death: values.date("dateOfDeath"),
        }
    }
}

impl Draft for AuthorDraft {
    type Record = Author;
}
