//! Recipe data model and the producer's static catalog.
//!
//! The catalog is built once at startup and never mutated; handlers only ever
//! borrow from it.

use serde::{Deserialize, Serialize};

/// The only recipe id the catalog answers for.
pub const TIKKA_MASALA_ID: i64 = 42;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub steps: String,
    /// Ordered as they should be listed to the reader.
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn tikka_masala() -> Self {
        Self {
            id: TIKKA_MASALA_ID,
            name: "Chicken Tikka Masala".into(),
            steps: "Throw it in a pot...".into(),
            ingredients: vec![
                Ingredient {
                    id: 1,
                    name: "Chicken".into(),
                    quantity: "1 lb".into(),
                },
                Ingredient {
                    id: 2,
                    name: "Sauce".into(),
                    quantity: "2 cups".into(),
                },
            ],
        }
    }
}

/// One element of the `GET /recipes/{id}` response array.
///
/// The consumer also deserializes into this type to check that the producer
/// answered with the shape it expects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecipeEnvelope {
    pub producer_pid: u32,
    pub recipe: Recipe,
}

/// Read-only set of recipes served by the producer.
#[derive(Debug, Clone)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    /// The catalog shipped with `recipe-api`: exactly one recipe, id 42.
    pub fn builtin() -> Self {
        Self {
            recipes: vec![Recipe::tikka_masala()],
        }
    }

    pub fn get(&self, id: i64) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self::builtin()
    }
}
