//! TOML Persona Catalog
//!
//! Loads the persona catalog from a TOML file. A copy of the household's
//! catalog is embedded in the binary and used when no path is configured.

use serde::Deserialize;
use std::path::Path;

use meowchat::{DomainError, Household, Persona, PersonaCatalog};

const EMBEDDED_CATALOG: &str = include_str!("../../data/personas.toml");

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    default_persona: String,
    #[serde(default)]
    household: Household,
    personas: Vec<Persona>,
}

/// Parse a catalog from TOML text
pub fn parse_catalog(source: &str) -> Result<PersonaCatalog, DomainError> {
    let file: CatalogFile = toml::from_str(source)
        .map_err(|e| DomainError::Configuration(format!("Invalid persona catalog: {e}")))?;

    PersonaCatalog::new(file.personas, file.default_persona, file.household)
}

/// The catalog compiled into the binary
pub fn embedded_catalog() -> Result<PersonaCatalog, DomainError> {
    parse_catalog(EMBEDDED_CATALOG)
}

/// Load a catalog from `path`
pub async fn load_catalog(path: &Path) -> Result<PersonaCatalog, DomainError> {
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::Configuration(format!(
            "Failed to read persona catalog {}: {e}",
            path.display()
        ))
    })?;

    parse_catalog(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog() {
        let catalog = embedded_catalog().unwrap();

        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.default_persona().id, "Molly");
        assert_eq!(
            catalog.list_ids_by_age(),
            vec!["Kuni", "Snowy", "Ciko", "Lily", "Molly", "Bushy", "Oyen"]
        );

        let kuni = catalog.lookup("Kuni").unwrap();
        assert_eq!(kuni.age_actual, 11);
        assert_eq!(kuni.age_human_equivalent, 60);
        assert_eq!(kuni.since_year, Some(2014));
        assert_eq!(kuni.species, "cat");
        assert!(!kuni.display_facts.is_empty());

        let household = catalog.household();
        assert_eq!(household.owners_display(), "Zaidah & Faza");
        assert_eq!(household.location, "Semenyih, Malaysia");
        assert_eq!(household.conversation_starters.len(), 4);
    }

    #[test]
    fn test_minimal_catalog() {
        let source = r#"
            default_persona = "Tom"

            [[personas]]
            id = "Tom"
            profile = "A grey tabby."
            age_actual = 3
            age_human_equivalent = 28
        "#;

        let catalog = parse_catalog(source).unwrap();
        let tom = catalog.lookup("Tom").unwrap();
        assert_eq!(tom.species, "cat");
        assert!(tom.display_facts.is_empty());
        assert!(catalog.household().conversation_starters.is_empty());
    }

    #[test]
    fn test_invalid_catalogs() {
        let missing_default = r#"
            default_persona = "Garfield"

            [[personas]]
            id = "Tom"
            profile = "A grey tabby."
            age_actual = 3
            age_human_equivalent = 28
        "#;
        assert!(matches!(
            parse_catalog(missing_default),
            Err(DomainError::Configuration(_))
        ));

        let missing_age = r#"
            default_persona = "Tom"

            [[personas]]
            id = "Tom"
            profile = "A grey tabby."
        "#;
        assert!(matches!(
            parse_catalog(missing_age),
            Err(DomainError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_catalog(Path::new("/nonexistent/meowchat/personas.toml")).await;
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }
}
