use mongodb::bson::{doc, Document};

/// Filter documents on an integer `_id`. Our entity ids are `u32`s allocated
/// from the [`super::Counter`] collection rather than ObjectIds.
pub fn id_filter(id: u32) -> Document {
    doc! { "_id": id }
}
