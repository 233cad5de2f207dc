//! Book copy model

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{long_date, Book, Draft, Entity, EntityKind, Ref};
use crate::{
    error::{AppError, AppResult},
    validation::FormValues,
};

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    pub const NAMES: [&'static str; 4] = ["Available", "Maintenance", "Loaned", "Reserved"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }
}

impl std::str::FromStr for BookInstanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookInstanceStatus::Available),
            "Maintenance" => Ok(BookInstanceStatus::Maintenance),
            "Loaned" => Ok(BookInstanceStatus::Loaned),
            "Reserved" => Ok(BookInstanceStatus::Reserved),
            other => Err(AppError::BadRequest(format!("Unknown status: {}", other))),
        }
    }
}

/// A physical copy of a book
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInstance {
    pub id: Uuid,
    pub book: Ref<Book>,
    pub imprint: String,
    #[serde(default)]
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
}

impl BookInstance {
    pub fn due_back_formatted(&self) -> String {
        long_date(self.due_back)
    }
}

impl Entity for BookInstance {
    const KIND: EntityKind = EntityKind::BookInstance;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookInstanceView<'a> {
    id: Uuid,
    book: &'a Ref<Book>,
    imprint: &'a str,
    status: BookInstanceStatus,
    due_back: NaiveDate,
    due_back_formatted: String,
    url: String,
}

impl Serialize for BookInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BookInstanceView {
            id: self.id,
            book: &self.book,
            imprint: &self.imprint,
            status: self.status,
            due_back: self.due_back,
            due_back_formatted: self.due_back_formatted(),
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Validated copy form; status falls back to Maintenance, due date to today
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInstanceDraft {
    pub book: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
}

impl BookInstanceDraft {
    pub fn from_values(values: &FormValues) -> AppResult<Self> {
        let status = match values.text("status") {
            "" => BookInstanceStatus::default(),
            name => name.parse()?,
        };
        Ok(Self {
            book: values.id("book")?,
            imprint: values.text("imprint").to_string(),
            status,
            due_back: values
                .date("dueBack")
                .unwrap_or_else(|| Utc::now().date_naive()),
        })
    }
}

impl Draft for BookInstanceDraft {
    type Record = BookInstance;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{rules, FormInput};
    use chrono::Days;

    #[test]
    fn test_status_names_match_variants() {
        for name in BookInstanceStatus::NAMES {
            let status: BookInstanceStatus = name.parse().unwrap();
            assert_eq!(status.as_str(), name);
        }
        assert!("Lost".parse::<BookInstanceStatus>().is_err());
    }

    #[test]
    fn test_draft_defaults() {
        let input = FormInput::new()
            .with("book", "1b4e28ba-2fa1-11d2-883f-0016d3cca427")
            .with("imprint", "Ace, 1990");
        let values = rules::BOOK_INSTANCE.validate(&input).into_result().unwrap();
        let today = Utc::now().date_naive();
        let draft = BookInstanceDraft::from_values(&values).unwrap();

        assert_eq!(draft.status, BookInstanceStatus::Maintenance);
        // The clock may cross midnight between the two reads
        assert!((today..=today + Days::new(1)).contains(&draft.due_back));
    }
}
