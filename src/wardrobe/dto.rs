use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::category::Category;
use crate::ai::parser::lenient;

/// What the classifier says about an uploaded photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingAnalysis {
    #[serde(default, deserialize_with = "category")]
    pub category: Category,
    #[serde(default = "not_applicable", deserialize_with = "color")]
    pub color: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
}

fn not_applicable() -> String {
    "N/A".into()
}

fn category<'de, D: Deserializer<'de>>(d: D) -> Result<Category, D::Error> {
    lenient::text(d).map(|label| Category::parse(&label))
}

fn color<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let color = lenient::text(d)?;
    Ok(if color.trim().is_empty() {
        not_applicable()
    } else {
        color
    })
}

impl ClothingAnalysis {
    /// Used when the reply has no usable JSON; the reply itself becomes the description.
    pub fn fallback(raw: &str) -> Self {
        let raw = raw.trim();
        Self {
            category: Category::Unknown,
            color: not_applicable(),
            gender: Some(not_applicable()),
            description: if raw.is_empty() {
                "The AI got confused - maybe try a clearer image?".into()
            } else {
                raw.to_string()
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub id: Uuid,
    pub ai_analysis: ClothingAnalysis,
    pub image_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_rows: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_reply_gets_defaults() {
        let a: ClothingAnalysis = serde_json::from_str(r#"{"category":"Shirt"}"#).unwrap();
        assert_eq!(a.category, Category::Shirt);
        assert_eq!(a.color, "N/A");
        assert!(a.gender.is_none());
    }

    #[test]
    fn mistyped_fields_do_not_discard_the_reply() {
        let a: ClothingAnalysis = serde_json::from_str(
            r#"{"category":"t-shirt","color":null,"gender":3,"description":["odd"]}"#,
        )
        .unwrap();
        assert_eq!(a.category, Category::TShirt);
        assert_eq!(a.color, "N/A");
        assert!(a.gender.is_none());
        assert_eq!(a.description, "");

        let a: ClothingAnalysis = serde_json::from_str(r#"{"category":null,"color":"Red"}"#).unwrap();
        assert_eq!(a.category, Category::Unknown);
        assert_eq!(a.color, "Red");
    }

    #[test]
    fn fallback_keeps_raw_text() {
        let a = ClothingAnalysis::fallback("  I think this is a cat.  ");
        assert_eq!(a.category, Category::Unknown);
        assert_eq!(a.description, "I think this is a cat.");
        assert!(ClothingAnalysis::fallback("").description.contains("clearer image"));
    }

    #[test]
    fn upload_response_is_camel_case() {
        let r = UploadResponse {
            success: true,
            id: Uuid::nil(),
            ai_analysis: ClothingAnalysis::fallback("x"),
            image_path: "uploads/a.png".into(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["imagePath"], "uploads/a.png");
        assert_eq!(v["aiAnalysis"]["category"], "Unknown");
    }
}
