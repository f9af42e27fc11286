use serde::{Deserialize, Serialize};

/// The uniform output unit of extraction.
///
/// Every parser produces `Record`s through the sanitizer, so all string fields
/// are free of markup and trimmed. `details` is only set by variant coercion;
/// the format parsers leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<RecordDetails>,
}

impl Record {
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    pub fn with_details(mut self, details: RecordDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn kind(&self) -> Option<RecordKind> {
        self.details.as_ref().map(RecordDetails::kind)
    }
}

/// Discriminant of the variant payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Character,
    Spell,
    Item,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Spell => "spell",
            Self::Item => "item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordDetails {
    Character(CharacterDetails),
    Spell(SpellDetails),
    Item(ItemDetails),
}

impl RecordDetails {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Character(_) => RecordKind::Character,
            Self::Spell(_) => RecordKind::Spell,
            Self::Item(_) => RecordKind::Item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDetails {
    pub class: String,
    pub level: u32,
    pub race: String,
    pub alignment: String,
    pub abilities: AbilityScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDetails {
    pub level: u32,
    pub school: String,
    pub casting_time: String,
    pub range: String,
    pub components: Vec<String>,
    pub duration: String,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub rarity: String,
    pub category: String,
    pub attunement: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}
