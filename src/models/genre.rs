//! Genre model

use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{Draft, Entity, EntityKind};
use crate::validation::FormValues;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Entity for Genre {
    const KIND: EntityKind = EntityKind::Genre;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Serialize)]
struct GenreView<'a> {
    id: Uuid,
    name: &'a str,
    url: String,
}

impl Serialize for Genre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GenreView {
            id: self.id,
            name: &self.name,
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Validated genre form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreDraft {
    pub name: String,
}

impl GenreDraft {
    pub fn from_values(values: &FormValues) -> Self {
        Self {
            name: values.text("name").to_string(),
        }
    }
}

impl Draft for GenreDraft {
    type Record = Genre;
}
