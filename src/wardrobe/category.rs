use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Clothing taxonomy the classifier is asked to use, the sentinel labels it
/// returns for non-clothing photos, and anything else it invents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Category {
    Shirt,
    TShirt,
    Pants,
    Jeans,
    Skirt,
    Dress,
    Shoes,
    Jacket,
    Accessories,
    NotClothing,
    #[default]
    Unknown,
    NotApplicable,
    Other(String),
}

impl Category {
    pub fn parse(label: &str) -> Self {
        let key: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "shirt" | "shirts" | "blouse" => Category::Shirt,
            "tshirt" | "tshirts" | "tee" => Category::TShirt,
            "pants" | "trousers" => Category::Pants,
            "jeans" | "denim" => Category::Jeans,
            "skirt" | "skirts" => Category::Skirt,
            "dress" | "dresses" => Category::Dress,
            "shoes" | "shoe" | "sneakers" | "footwear" => Category::Shoes,
            "jacket" | "jackets" | "blazer" | "coat" => Category::Jacket,
            "accessories" | "accessory" => Category::Accessories,
            "notclothing" => Category::NotClothing,
            "unknown" | "" => Category::Unknown,
            "na" => Category::NotApplicable,
            _ => Category::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Shirt => "Shirt",
            Category::TShirt => "T-Shirt",
            Category::Pants => "Pants",
            Category::Jeans => "Jeans",
            Category::Skirt => "Skirt",
            Category::Dress => "Dress",
            Category::Shoes => "Shoes",
            Category::Jacket => "Jacket",
            Category::Accessories => "Accessories",
            Category::NotClothing => "Not Clothing",
            Category::Unknown => "Unknown",
            Category::NotApplicable => "N/A",
            Category::Other(label) => label,
        }
    }

    /// Reserved labels meaning "not a real wardrobe item".
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            Category::NotClothing | Category::Unknown | Category::NotApplicable
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.map(|s| Category::parse(&s)).unwrap_or_default())
    }
}
