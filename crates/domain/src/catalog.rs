//! Starter catalog, menu layout and catalog operations.

use std::collections::HashMap;

use serde::Serialize;
use store::{NewProduct, OrderStore, Product};

use crate::{DomainError, Money, ProductId};

/// Products loaded by [`CatalogService::seed`], with prices in cents.
pub const STARTER_CATALOG: &[(&str, i64)] = &[
    ("Pupusa Revuelta", 75),
    ("Pupusa de Queso", 75),
    ("Soda Coca Cola", 100),
    ("Soda Fanta", 100),
    ("Soda Tropical Uva", 100),
    ("Jugo valle Mandarina", 75),
    ("Botella Agua Cristal 600ml", 75),
    ("Jugo de Naranja", 125),
    ("Café", 50),
    ("Chocolate", 75),
];

/// Menu sections in display order, each listing product names.
pub const MENU_SECTIONS: &[(&str, &[&str])] = &[
    ("Pupusas", &["Pupusa Revuelta", "Pupusa de Queso"]),
    ("Sodas", &["Soda Coca Cola", "Soda Fanta", "Soda Tropical Uva"]),
    ("Bebidas Calientes", &["Café", "Chocolate"]),
    ("Jugos", &["Jugo valle Mandarina", "Jugo de Naranja"]),
    ("Agua", &["Botella Agua Cristal 600ml"]),
];

/// Returns the starter catalog as insertable rows.
pub fn starter_products() -> Vec<NewProduct> {
    STARTER_CATALOG
        .iter()
        .map(|(name, cents)| NewProduct::new(*name, Money::from_cents(*cents)))
        .collect()
}

/// One titled group of products on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub title: &'static str,
    pub products: Vec<Product>,
}

/// Service for reading and loading the product catalog.
pub struct CatalogService<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts the starter catalog.
    ///
    /// Every call appends a full copy of the starter list, even when the
    /// products already exist, so seeding twice leaves duplicate rows.
    /// Lookups by name resolve duplicates to the newest row.
    #[tracing::instrument(skip(self))]
    pub async fn seed(&self) -> Result<usize, DomainError> {
        let existing = self.store.count_products().await?;
        if existing > 0 {
            tracing::warn!(
                existing,
                "catalog already has products; seeding again will duplicate them"
            );
        }

        let ids = self.store.insert_products(&starter_products()).await?;
        metrics::counter!("catalog_seeded_total").increment(1);
        tracing::info!(inserted = ids.len(), "starter catalog loaded");
        Ok(ids.len())
    }

    /// Lists purchasable products.
    pub async fn products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.list_active_products().await?)
    }

    /// Finds a purchasable product by exact name.
    ///
    /// When several active rows share the name, the newest one is returned.
    pub async fn find_active(&self, name: &str) -> Result<Option<Product>, DomainError> {
        let products = self.store.list_active_products().await?;
        Ok(products.into_iter().rev().find(|p| p.name == name))
    }

    /// Groups purchasable products into menu sections.
    ///
    /// Names missing from the catalog are skipped; sections stay in menu
    /// order even when empty.
    pub async fn menu(&self) -> Result<Vec<MenuSection>, DomainError> {
        let by_name: HashMap<String, Product> = self
            .store
            .list_active_products()
            .await?
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        Ok(MENU_SECTIONS
            .iter()
            .map(|&(title, names)| MenuSection {
                title,
                products: names
                    .iter()
                    .filter_map(|name| by_name.get(*name).cloned())
                    .collect(),
            })
            .collect())
    }

    /// Marks a product as purchasable or not.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(&self, product_id: ProductId, active: bool) -> Result<(), DomainError> {
        self.store.set_product_active(product_id, active).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryOrderStore;

    #[test]
    fn menu_only_references_starter_products() {
        for (_, names) in MENU_SECTIONS {
            for name in *names {
                assert!(
                    STARTER_CATALOG.iter().any(|(n, _)| n == name),
                    "{name} is on the menu but not in the starter catalog"
                );
            }
        }
    }

    #[tokio::test]
    async fn seed_loads_starter_catalog() {
        let service = CatalogService::new(InMemoryOrderStore::new());
        let inserted = service.seed().await.unwrap();
        assert_eq!(inserted, STARTER_CATALOG.len());

        let cafe = service.find_active("Café").await.unwrap().unwrap();
        assert_eq!(cafe.price, Money::from_cents(50));
    }

    #[tokio::test]
    async fn seeding_twice_duplicates_rows() {
        let store = InMemoryOrderStore::new();
        let service = CatalogService::new(store.clone());
        service.seed().await.unwrap();
        service.seed().await.unwrap();

        assert_eq!(
            store.count_products().await.unwrap(),
            2 * STARTER_CATALOG.len() as u64
        );
        let cafe = service.find_active("Café").await.unwrap().unwrap();
        assert_eq!(cafe.id, ProductId::new(STARTER_CATALOG.len() as i64 + 9));
    }

    #[tokio::test]
    async fn menu_groups_products_and_skips_missing() {
        let store = InMemoryOrderStore::new();
        store
            .insert_products(&[
                NewProduct::new("Café", Money::from_cents(50)),
                NewProduct::new("Soda Fanta", Money::from_cents(100)),
            ])
            .await
            .unwrap();
        let service = CatalogService::new(store);

        let menu = service.menu().await.unwrap();
        assert_eq!(menu.len(), MENU_SECTIONS.len());
        assert_eq!(menu[0].title, "Pupusas");
        assert!(menu[0].products.is_empty());
        assert_eq!(menu[1].products.len(), 1);
        assert_eq!(menu[1].products[0].name, "Soda Fanta");
        assert_eq!(menu[2].products[0].name, "Café");
    }

    #[tokio::test]
    async fn deactivated_product_leaves_menu() {
        let service = CatalogService::new(InMemoryOrderStore::new());
        service.seed().await.unwrap();
        let cafe = service.find_active("Café").await.unwrap().unwrap();

        service.set_active(cafe.id, false).await.unwrap();
        assert!(service.find_active("Café").await.unwrap().is_none());
        let menu = service.menu().await.unwrap();
        assert_eq!(menu[2].products.len(), 1);
        assert_eq!(menu[2].products[0].name, "Chocolate");
    }
}
