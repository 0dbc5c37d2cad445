//! Prompt construction and index resolution for outfit recommendations.

use std::fmt::Write;

use super::dto::WeatherInput;
use crate::profile::UserProfile;
use crate::wardrobe::WardrobeItem;

/// Items that can take part in an outfit: everything but sentinel categories.
pub fn eligible(items: Vec<WardrobeItem>) -> Vec<WardrobeItem> {
    items.into_iter().filter(|i| !i.category.is_sentinel()).collect()
}

pub fn build_prompt(
    profile: &UserProfile,
    items: &[WardrobeItem],
    occasion: &str,
    weather: &WeatherInput,
) -> String {
    let context = profile.context_lines();
    let context = if context.is_empty() {
        "No profile information provided".to_string()
    } else {
        context.join("\n")
    };

    let mut listing = String::new();
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(
            listing,
            "[{}] {} - {} ({})",
            idx + 1,
            item.category,
            item.color,
            item.description.as_deref().unwrap_or("No description")
        );
    }

    format!(
        r#"You are an expert AI fashion stylist with deep understanding of style, culture, and personal context.

USER PROFILE:
{context}

AVAILABLE WARDROBE ITEMS:
{listing}
CONTEXT:
Weather: {temp}°C, {condition}
Occasion: {occasion}

TASK:
1. Analyze the user's profile to understand their style needs
2. Consider the weather and occasion requirements
3. Select 3-5 items from the AVAILABLE WARDROBE that create a COMPLETE, wearable outfit
4. Identify any missing items that would complete or enhance this outfit
5. Provide culturally sensitive and age-appropriate suggestions

CRITICAL OUTFIT RULES:
- A complete outfit MUST include:
  * EXACTLY ONE upper body item (shirt, t-shirt, OR jacket - NOT multiple tops)
  * AT MOST ONE lower body item (pants, jeans, OR skirt), required unless wearing a full dress
  * Optional additions: shoes, accessories, or an outer layer jacket
- DO NOT select multiple base layer tops
- DO NOT suggest only accessories without core clothing items
- If the wardrobe lacks lower body clothing, add it to missing_items as REQUIRED

IMPORTANT:
- ONLY pick items from the numbered list above, referencing them by number
- Keep the explanation concise (2-3 sentences)

Respond with valid JSON:
{{
  "selected_items": [1, 2, 3],
  "explanation": "Why this outfit works for this person and context",
  "missing_items": ["Item type 1", "Item type 2"],
  "missing_items_explanation": "Why these items are needed"
}}"#,
        temp = weather.temperature,
        condition = weather.condition,
    )
}

/// Items for the 1-based `indices`, in the order given; out-of-range entries are dropped.
pub fn resolve_selection(items: &[WardrobeItem], indices: &[i64]) -> Vec<WardrobeItem> {
    indices
        .iter()
        .filter_map(|&i| {
            let zero_based = usize::try_from(i).ok()?.checked_sub(1)?;
            items.get(zero_based).cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::Map;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::wardrobe::Category;

    fn item(category: Category, color: &str) -> WardrobeItem {
        WardrobeItem {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            category,
            color: color.into(),
            gender: None,
            image_path: "uploads/x.png".into(),
            description: None,
            created_at: OffsetDateTime::now_utc(),
            last_worn: None,
            wear_count: 0,
        }
    }

    fn wardrobe() -> Vec<WardrobeItem> {
        vec![
            item(Category::Shirt, "White"),
            item(Category::Jeans, "Blue"),
            item(Category::Shoes, "Brown"),
        ]
    }

    #[test]
    fn out_of_range_indices_are_dropped() {
        let items = wardrobe();
        assert!(resolve_selection(&items, &[7, -1, 0]).is_empty());
        assert!(resolve_selection(&items, &[i64::MIN, i64::MAX]).is_empty());
        assert!(resolve_selection(&[], &[1]).is_empty());
    }

    #[test]
    fn valid_indices_keep_order() {
        let items = wardrobe();
        let picked = resolve_selection(&items, &[3, 9, 1]);
        let ids: Vec<_> = picked.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![items[2].id, items[0].id]);
    }

    #[test]
    fn sentinels_are_not_eligible() {
        let mut items = wardrobe();
        items.push(item(Category::NotClothing, "N/A"));
        items.push(item(Category::Unknown, "N/A"));
        items.push(item(Category::Other("Scarf".into()), "Red"));
        let kept = eligible(items);
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|i| !i.category.is_sentinel()));
    }

    #[test]
    fn prompt_lists_items_profile_and_context() {
        let mut items = wardrobe();
        items[0].description = Some("linen, short sleeves".into());
        let profile = UserProfile {
            occupation: Some("Nurse".into()),
            ..UserProfile::default()
        };
        let weather = WeatherInput {
            temperature: 31.0,
            condition: "clear".into(),
            extra: Map::new(),
        };

        let p = build_prompt(&profile, &items, "office", &weather);
        assert!(p.contains("[1] Shirt - White (linen, short sleeves)"));
        assert!(p.contains("[2] Jeans - Blue (No description)"));
        assert!(p.contains("[3] Shoes - Brown"));
        assert!(p.contains("Occupation: Nurse"));
        assert!(p.contains("Weather: 31°C, clear"));
        assert!(p.contains("Occasion: office"));
        assert!(p.contains("\"selected_items\""));
    }

    #[test]
    fn prompt_without_profile_says_so() {
        let weather = WeatherInput {
            temperature: 20.5,
            condition: "rain".into(),
            extra: Map::new(),
        };
        let p = build_prompt(&UserProfile::default(), &wardrobe(), "date", &weather);
        assert!(p.contains("No profile information provided"));
        assert!(p.contains("20.5°C"));
    }
}
