use tracing::debug;

use super::offsets::CharOffsets;
use super::{MaskedEmail, MaskedEntity, ResolvedEntity};

/// Replaces each entity span with its `[type]` placeholder.
///
/// Entities are applied in ascending start order while `offset` tracks the
/// net length change introduced so far, so each span is shifted onto the
/// partially masked text before splicing. Reported positions always refer
/// to the original text, in codepoints.
///
/// Entities must be non-overlapping, as produced by the resolver.
pub fn mask(text: &str, entities: &[ResolvedEntity]) -> MaskedEmail {
    let mut ordered: Vec<&ResolvedEntity> = entities.iter().collect();
    ordered.sort_by_key(|e| e.start);

    let mut masked_text = text.to_string();
    let mut offset: isize = 0;
    let mut chars = CharOffsets::new(text);
    let mut masked = Vec::with_capacity(ordered.len());

    for entity in ordered {
        let placeholder = entity.entity_type.placeholder();
        let adj_start = (entity.start as isize + offset) as usize;
        let adj_end = (entity.end as isize + offset) as usize;

        masked_text.replace_range(adj_start..adj_end, &placeholder);
        offset += placeholder.len() as isize - (entity.end - entity.start) as isize;

        masked.push(MaskedEntity {
            original_start: chars.char_index(entity.start),
            original_end: chars.char_index(entity.end),
            entity_type: entity.entity_type.clone(),
            original_text: entity.text.clone(),
        });
    }

    debug!("Masked {} entit(ies)", masked.len());
    MaskedEmail {
        masked_text,
        entities: masked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii::{Candidate, EntityType};

    fn entity(text: &str, needle: &str, ty: EntityType) -> Candidate {
        let start = text.find(needle).unwrap();
        Candidate {
            start,
            end: start + needle.len(),
            entity_type: ty,
            text: needle.to_string(),
        }
    }

    #[test]
    fn test_positions_refer_to_original_text() {
        let text = "Hi, I'm Al Li, mail al@li.org, card 4111111111111111.";
        let entities = vec![
            entity(text, "4111111111111111", EntityType::CREDIT_DEBIT_NO),
            entity(text, "Al Li", EntityType::FULL_NAME),
            entity(text, "al@li.org", EntityType::EMAIL),
        ];

        let result = mask(text, &entities);
        assert_eq!(
            result.masked_text,
            "Hi, I'm [full_name], mail [email], card [credit_debit_no]."
        );
        let spans: Vec<(usize, usize, &str)> = result
            .entities
            .iter()
            .map(|e| (e.original_start, e.original_end, e.original_text.as_str()))
            .collect();
        assert_eq!(
            spans,
            vec![(8, 13, "Al Li"), (20, 29, "al@li.org"), (36, 52, "4111111111111111")]
        );
    }

    #[test]
    fn test_shrinking_and_growing_masks() {
        // "[cvv_no]" is longer than "123"; "[email]" is shorter than the address
        let text = "123 then averyveryverylongaddress@example.com then 456";
        let entities = vec![
            entity(text, "123", EntityType::CVV_NO),
            entity(text, "averyveryverylongaddress@example.com", EntityType::EMAIL),
            entity(text, "456", EntityType::CVV_NO),
        ];
        let result = mask(text, &entities);
        assert_eq!(result.masked_text, "[cvv_no] then [email] then [cvv_no]");
    }

    #[test]
    fn test_multibyte_positions_are_in_codepoints() {
        let text = "Señor Ramón Pérez, rp@ejemplo.es";
        let entities = vec![entity(text, "rp@ejemplo.es", EntityType::EMAIL)];
        let result = mask(text, &entities);
        assert_eq!(result.masked_text, "Señor Ramón Pérez, [email]");
        assert_eq!(result.entities[0].original_start, 19);
        assert_eq!(result.entities[0].original_end, 32);
    }

    #[test]
    fn test_no_entities_leaves_text_unchanged() {
        let result = mask("nothing here", &[]);
        assert_eq!(result.masked_text, "nothing here");
        assert!(result.entities.is_empty());
    }
}
