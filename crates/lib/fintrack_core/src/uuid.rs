// Helper for generating UUIDv7 (timestamp-sortable UUIDs).
//
// Credential ids are generated app-side so both the PostgreSQL and the
// in-memory store hand out the same kind of identifier.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
