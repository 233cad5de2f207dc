//! Rule tables for every catalog form

use super::{CrossRule, FieldKind, FieldRules, Rule, RuleSet};
use crate::models::book_instance::BookInstanceStatus;

/// Longest accepted author first or last name
pub const NAME_MAX_LENGTH: usize = 100;

pub static AUTHOR: RuleSet = RuleSet {
    fields: &[
        FieldRules {
            name: "firstName",
            kind: FieldKind::Text,
            rules: &[
                Rule::Required("First name must be specified"),
                Rule::MaxLength(NAME_MAX_LENGTH, "First name must be at most 100 characters"),
                Rule::Alphanumeric("First name has non-alphanumeric characters"),
            ],
        },
        FieldRules {
            name: "lastName",
            kind: FieldKind::Text,
            rules: &[
                Rule::Required("Last name must be specified"),
                Rule::MaxLength(NAME_MAX_LENGTH, "Last name must be at most 100 characters"),
                Rule::Alphanumeric("Last name has non-alphanumeric characters"),
            ],
        },
        FieldRules {
            name: "dateOfBirth",
            kind: FieldKind::Date,
            rules: &[Rule::IsoDate("Invalid date of birth")],
        },
        FieldRules {
            name: "dateOfDeath",
            kind: FieldKind::Date,
            rules: &[Rule::IsoDate("Invalid date of death")],
        },
    ],
    cross: &[CrossRule::NotBefore {
        earlier: "dateOfBirth",
        later: "dateOfDeath",
        message: "Date of death must not be before date of birth",
    }],
};

pub static GENRE: RuleSet = RuleSet {
    fields: &[FieldRules {
        name: "name",
        kind: FieldKind::Text,
        rules: &[
            Rule::Required("Name must be specified"),
            Rule::Alphanumeric("Name has non-alphanumeric characters"),
        ],
    }],
    cross: &[],
};

pub static BOOK: RuleSet = RuleSet {
    fields: &[
        FieldRules {
            name: "title",
            kind: FieldKind::Text,
            rules: &[Rule::Required("Title must be specified")],
        },
        FieldRules {
            name: "author",
            kind: FieldKind::Text,
            rules: &[
                Rule::Required("Author must be specified"),
                Rule::Identifier("Author must be a valid identifier"),
            ],
        },
        FieldRules {
            name: "summary",
            kind: FieldKind::Text,
            rules: &[Rule::Required("Summary must be specified")],
        },
        FieldRules {
            name: "isbn",
            kind: FieldKind::Text,
            rules: &[Rule::Required("ISBN must be specified")],
        },
        FieldRules {
            name: "genre",
            kind: FieldKind::List,
            rules: &[Rule::Identifier("Genre must be a valid identifier")],
        },
    ],
    cross: &[],
};

pub static BOOK_INSTANCE: RuleSet = RuleSet {
    fields: &[
        FieldRules {
            name: "book",
            kind: FieldKind::Text,
            rules: &[
                Rule::Required("Book must be specified"),
                Rule::Identifier("Book must be a valid identifier"),
            ],
        },
        FieldRules {
            name: "imprint",
            kind: FieldKind::Text,
            rules: &[Rule::Required("Imprint must be specified")],
        },
        FieldRules {
            name: "status",
            kind: FieldKind::Text,
            rules: &[Rule::OneOf(&BookInstanceStatus::NAMES, "Invalid status")],
        },
        FieldRules {
            name: "dueBack",
            kind: FieldKind::Date,
            rules: &[Rule::IsoDate("Invalid date")],
        },
    ],
    cross: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FormInput;

    fn author_form(first: &str, last: &str) -> FormInput {
        FormInput::new().with("firstName", first).with("lastName", last)
    }

    fn fields_in_error(rules: &RuleSet, input: &FormInput) -> Vec<String> {
        rules
            .validate(input)
            .errors
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_required_fields_reject_blank_values() {
        for blank in ["", "   ", "\t"] {
            let errors = fields_in_error(&AUTHOR, &author_form(blank, "Herbert"));
            assert_eq!(errors, vec!["firstName"]);

            let errors = fields_in_error(&GENRE, &FormInput::new().with("name", blank));
            assert_eq!(errors, vec!["name"]);
        }
        let errors = fields_in_error(&BOOK, &FormInput::new());
        assert_eq!(errors, vec!["title", "author", "summary", "isbn"]);

        let errors = fields_in_error(&BOOK_INSTANCE, &FormInput::new());
        assert_eq!(errors, vec!["book", "imprint"]);
    }

    #[test]
    fn test_names_must_be_alphanumeric() {
        let result = AUTHOR.validate(&author_form("Jo@n", "Smith"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "firstName");
        assert_eq!(result.errors[0].message, "First name has non-alphanumeric characters");

        assert!(AUTHOR.validate(&author_form("John", "Smith")).is_valid());
        assert!(AUTHOR.validate(&author_form("  John ", "Smith2")).is_valid());
    }

    #[test]
    fn test_name_length_is_bounded() {
        let long = "a".repeat(NAME_MAX_LENGTH + 1);
        let errors = fields_in_error(&AUTHOR, &author_form("Frank", &long));
        assert_eq!(errors, vec!["lastName"]);

        let exact = "a".repeat(NAME_MAX_LENGTH);
        assert!(AUTHOR.validate(&author_form("Frank", &exact)).is_valid());
    }

    #[test]
    fn test_author_dates_are_optional_but_checked() {
        let input = author_form("Frank", "Herbert").with("dateOfBirth", "");
        assert!(AUTHOR.validate(&input).is_valid());

        let input = author_form("Frank", "Herbert").with("dateOfBirth", "2020-02-30");
        assert_eq!(fields_in_error(&AUTHOR, &input), vec!["dateOfBirth"]);

        let input = author_form("Frank", "Herbert").with("dateOfDeath", "not-a-date");
        assert_eq!(fields_in_error(&AUTHOR, &input), vec!["dateOfDeath"]);

        let input = author_form("Frank", "Herbert").with("dateOfBirth", "1920-10-08");
        let result = AUTHOR.validate(&input);
        assert!(result.is_valid());
        assert_eq!(
            result.values.date("dateOfBirth").map(|d| d.to_string()),
            Some("1920-10-08".to_string())
        );
    }

    #[test]
    fn test_death_before_birth_is_rejected() {
        let input = author_form("Frank", "Herbert")
            .with("dateOfBirth", "1986-02-11")
            .with("dateOfDeath", "1920-10-08");
        assert_eq!(fields_in_error(&AUTHOR, &input), vec!["dateOfDeath"]);
    }

    #[test]
    fn test_book_genre_references_must_be_identifiers() {
        let input = FormInput::new()
            .with("title", "Dune")
            .with("author", "1b4e28ba-2fa1-11d2-883f-0016d3cca427")
            .with("summary", "desc")
            .with("isbn", "0441013597")
            .with("genre", "g1");
        assert_eq!(fields_in_error(&BOOK, &input), vec!["genre"]);
    }

    #[test]
    fn test_book_instance_status_must_be_known() {
        let input = FormInput::new()
            .with("book", "1b4e28ba-2fa1-11d2-883f-0016d3cca427")
            .with("imprint", "Ace, 1990")
            .with("status", "Lost");
        assert_eq!(fields_in_error(&BOOK_INSTANCE, &input), vec!["status"]);

        for status in BookInstanceStatus::NAMES {
            let input = FormInput::new()
                .with("book", "1b4e28ba-2fa1-11d2-883f-0016d3cca427")
                .with("imprint", "Ace, 1990")
                .with("status", status);
            assert!(BOOK_INSTANCE.validate(&input).is_valid());
        }
    }
}
