use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::{CatalogStore, Category, Meal, MealRecord, NewCategory};
use crate::storage::StoreError;

/// Insertion-ordered, like the Postgres listing by creation time.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    categories: RwLock<Vec<Category>>,
    meals: RwLock<Vec<Meal>>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn meal_from(id: Uuid, record: MealRecord) -> Meal {
    Meal {
        id,
        name: record.name,
        description: record.description,
        price: record.price,
        image: record.image,
        category: record.category,
        status: record.status,
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn insert_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().await;
        if categories.iter().any(|existing| existing.name == category.name) {
            return Err(StoreError::Conflict);
        }
        let record = Category {
            id: Uuid::new_v4(),
            name: category.name,
            description: category.description,
            image: category.image,
            status: category.status,
        };
        categories.push(record.clone());
        Ok(record)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.read().await.clone())
    }

    async fn find_category(&self, name: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .categories
            .read()
            .await
            .iter()
            .find(|category| category.name == name)
            .cloned())
    }

    async fn insert_meal(&self, meal: MealRecord) -> Result<Meal, StoreError> {
        let meal = meal_from(Uuid::new_v4(), meal);
        self.meals.write().await.push(meal.clone());
        Ok(meal)
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        Ok(self.meals.read().await.clone())
    }

    async fn meals_in_category(&self, category: &str) -> Result<Vec<Meal>, StoreError> {
        Ok(self
            .meals
            .read()
            .await
            .iter()
            .filter(|meal| meal.category == category)
            .cloned()
            .collect())
    }

    async fn find_meal(&self, id: Uuid) -> Result<Option<Meal>, StoreError> {
        Ok(self
            .meals
            .read()
            .await
            .iter()
            .find(|meal| meal.id == id)
            .cloned())
    }

    async fn update_meal(&self, id: Uuid, meal: MealRecord) -> Result<Option<Meal>, StoreError> {
        let mut meals = self.meals.write().await;
        Ok(meals.iter_mut().find(|existing| existing.id == id).map(|existing| {
            *existing = meal_from(id, meal);
            existing.clone()
        }))
    }

    async fn delete_meal(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut meals = self.meals.write().await;
        let before = meals.len();
        meals.retain(|meal| meal.id != id);
        Ok(meals.len() != before)
    }
}
