//! `SQLite` schema definitions for placebook.
//!
//! The store is a single table. Column names follow the layout used by the
//! existing `places` databases (`imageUri`, `long`) so they open unchanged.

/// Name of the places table.
pub const PLACES_TABLE: &str = "places";

/// SQL statement to create the places table.
pub const CREATE_PLACES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS places (
    id INTEGER PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    imageUri TEXT NOT NULL,
    address TEXT NOT NULL,
    lat REAL NOT NULL,
    long REAL NOT NULL
)
";

/// Insert one place. Bound values: title, imageUri, address, lat, long.
pub const INSERT_PLACE: &str = r"
INSERT INTO places (title, imageUri, address, lat, long) VALUES (?1, ?2, ?3, ?4, ?5)
";

/// Unconditional full-table read, in storage order.
pub const SELECT_ALL_PLACES: &str = r"
SELECT id, title, imageUri, address, lat, long FROM places ORDER BY id
";

/// Read one place by primary key.
pub const SELECT_PLACE_BY_ID: &str = r"
SELECT id, title, imageUri, address, lat, long FROM places WHERE id = ?1
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_PLACES_TABLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_places_table_contains_required_columns() {
        assert!(CREATE_PLACES_TABLE.contains("id INTEGER PRIMARY KEY NOT NULL"));
        assert!(CREATE_PLACES_TABLE.contains("title TEXT NOT NULL"));
        assert!(CREATE_PLACES_TABLE.contains("imageUri TEXT NOT NULL"));
        assert!(CREATE_PLACES_TABLE.contains("address TEXT NOT NULL"));
        assert!(CREATE_PLACES_TABLE.contains("lat REAL NOT NULL"));
        assert!(CREATE_PLACES_TABLE.contains("long REAL NOT NULL"));
        assert!(CREATE_PLACES_TABLE.contains("IF NOT EXISTS"));
    }

    #[test]
    fn test_insert_binds_five_values_in_order() {
        assert!(INSERT_PLACE.contains("(title, imageUri, address, lat, long)"));
        assert!(INSERT_PLACE.contains("?5"));
        assert!(!INSERT_PLACE.contains("?6"));
    }

    #[test]
    fn test_selects_share_column_order() {
        let columns = "id, title, imageUri, address, lat, long";
        assert!(SELECT_ALL_PLACES.contains(columns));
        assert!(SELECT_PLACE_BY_ID.contains(columns));
    }
}
