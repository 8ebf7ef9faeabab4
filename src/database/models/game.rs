use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog entry. Wire names are camelCase to match the upstream product feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Product id from the upstream feed; unrelated to the document `_id`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub bops_promo_callout_search_tile: Option<String>,
    #[serde(default)]
    pub bops_promo_callout_search_tile_alternate: Option<String>,
    #[serde(default)]
    pub price: Option<Map<String, Value>>,
    #[serde(default)]
    pub bops_promo_alternate: Option<String>,
    #[serde(default)]
    pub image: Option<Map<String, Value>>,
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub ratings: Option<Map<String, Value>>,
    #[serde(default)]
    pub availability: Option<Map<String, Value>>,
    #[serde(default)]
    pub url: Option<String>,
    pub name: String,
    #[serde(default)]
    pub product_platform: Option<Vec<Value>>,
    #[serde(default)]
    pub provider_grade: Option<String>,
    #[serde(default)]
    pub map_pro_price: Option<f64>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub grading_provider: Option<String>,
}

/// Partial update. Absent and null fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bops_promo_callout_search_tile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bops_promo_callout_search_tile_alternate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bops_promo_alternate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_platform: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_pro_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_provider: Option<String>,
}

impl GameUpdate {
    pub fn is_empty(&self) -> bool {
        *self == GameUpdate::default()
    }
}

impl Game {
    /// Overwrite every field that is set in `update`.
    pub fn apply(&mut self, update: GameUpdate) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut self.id, update.id);
        set(&mut self.bops_promo_callout_search_tile, update.bops_promo_callout_search_tile);
        set(
            &mut self.bops_promo_callout_search_tile_alternate,
            update.bops_promo_callout_search_tile_alternate,
        );
        set(&mut self.price, update.price);
        set(&mut self.bops_promo_alternate, update.bops_promo_alternate);
        set(&mut self.image, update.image);
        set(&mut self.market_price, update.market_price);
        set(&mut self.release_date, update.release_date);
        set(&mut self.ratings, update.ratings);
        set(&mut self.availability, update.availability);
        set(&mut self.url, update.url);
        if let Some(name) = update.name {
            self.name = name;
        }
        set(&mut self.product_platform, update.product_platform);
        set(&mut self.provider_grade, update.provider_grade);
        set(&mut self.map_pro_price, update.map_pro_price);
        set(&mut self.badge, update.badge);
        set(&mut self.grading_provider, update.grading_provider);
    }
}

/// A game together with its document identifier, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredGame {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    #[serde(flatten)]
    pub game: Game,
}
