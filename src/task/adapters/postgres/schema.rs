//! Diesel schema for versioned task items.

diesel::table! {
    /// Composite-key items with a per-item revision counter.
    task_items (partition_key, sort_key) {
        /// Entity class discriminator.
        #[max_length = 64]
        partition_key -> Varchar,
        /// Item key within the partition.
        #[max_length = 255]
        sort_key -> Varchar,
        /// Revision counter checked by conditional updates.
        row_version -> Int8,
        /// Item payload.
        row_value -> Jsonb,
        /// Item creation timestamp.
        created_at -> Timestamptz,
        /// Item latest write timestamp.
        last_updated_at -> Timestamptz,
    }
}
