//! Best-effort promotion of raw field maps into the specialized record
//! variants. Nothing here fails: malformed values fall back to defaults.

use crate::record::model::{
    AbilityScores, CharacterDetails, ItemDetails, Record, RecordDetails, RecordKind, SpellDetails,
};
use crate::record::sanitize::{strip_markup, RawFields};
use serde_json::Value;

/// Attach the payload for the variant named by `record.record_type`, read from `raw`.
/// Records of any other type come back unchanged.
pub fn promote(record: Record, raw: &RawFields) -> Record {
    match infer_kind(&record.record_type) {
        Some(kind) => record.with_details(details_for(raw, kind)),
        None => record,
    }
}

pub fn details_for(raw: &RawFields, kind: RecordKind) -> RecordDetails {
    match kind {
        RecordKind::Character => RecordDetails::Character(character_details(raw)),
        RecordKind::Spell => RecordDetails::Spell(spell_details(raw)),
        RecordKind::Item => RecordDetails::Item(item_details(raw)),
    }
}

/// Guess the variant from the free-form `type` field.
pub fn infer_kind(record_type: &str) -> Option<RecordKind> {
    match record_type.trim().to_lowercase().as_str() {
        "character" | "npc" | "pc" | "player character" => Some(RecordKind::Character),
        "spell" | "cantrip" => Some(RecordKind::Spell),
        "item" | "magic item" | "weapon" | "armor" | "armour" | "equipment" => {
            Some(RecordKind::Item)
        }
        _ => None,
    }
}

pub fn character_details(raw: &RawFields) -> CharacterDetails {
    let score = |key: &str| {
        lenient_int(raw.get(key))
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(10)
    };

    CharacterDetails {
        class: text(raw.get("class")),
        level: lenient_int(raw.get("level"))
            .filter(|level| *level > 0)
            .and_then(|level| u32::try_from(level).ok())
            .unwrap_or(1),
        race: text(raw.get("race")),
        alignment: text(raw.get("alignment")),
        abilities: AbilityScores {
            strength: score("strength"),
            dexterity: score("dexterity"),
            constitution: score("constitution"),
            intelligence: score("intelligence"),
            wisdom: score("wisdom"),
            charisma: score("charisma"),
        },
    }
}

pub fn spell_details(raw: &RawFields) -> SpellDetails {
    SpellDetails {
        level: lenient_int(raw.get("level"))
            .filter(|level| *level >= 0)
            .and_then(|level| u32::try_from(level).ok())
            .unwrap_or(0),
        school: text(raw.get("school")),
        casting_time: text(raw.get("castingTime").or_else(|| raw.get("casting_time"))),
        range: text(raw.get("range")),
        components: list(raw.get("components")),
        duration: text(raw.get("duration")),
        classes: list(raw.get("classes")),
    }
}

pub fn item_details(raw: &RawFields) -> ItemDetails {
    let optional = |key: &str| Some(text(raw.get(key))).filter(|s| !s.is_empty());

    ItemDetails {
        rarity: text(raw.get("rarity")),
        category: text(raw.get("category")),
        attunement: flag(raw.get("attunement")),
        cost: optional("cost"),
        weight: optional("weight"),
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => strip_markup(s).trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Integer from a number or the leading digits of a string ("3rd" -> 3).
fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .map(f64::trunc)
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

fn list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().map(|v| text(Some(v))).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| strip_markup(part).trim().to_string())
            .collect(),
        _ => Vec::new(),
    };
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "required"
        ),
        _ => false,
    }
}
