pub mod model;
pub mod sanitize;
pub mod variants;

pub use model::{
    AbilityScores, CharacterDetails, ItemDetails, Record, RecordDetails, RecordKind, SpellDetails,
};
pub use sanitize::{sanitize, strip_markup, RawFields};
