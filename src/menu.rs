//! Menu data: the baked-in default, immutable edits and the in-memory holder.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::error::Result;
use crate::forms::ValidMenuItem;
use crate::models::{Category, Menu, MenuItem};
use crate::store::SharedStore;

fn item(id: &str, name: &str, price: f64) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        price,
        description: None,
        options: None,
    }
}

fn described(id: &str, name: &str, description: &str, price: f64) -> MenuItem {
    MenuItem {
        description: Some(description.to_string()),
        ..item(id, name, price)
    }
}

fn category(id: &str, label: &str, items: Vec<MenuItem>) -> Category {
    Category {
        id: id.to_string(),
        label: label.to_string(),
        items,
    }
}

/// Menu used the first time the store holds none.
pub fn default_menu() -> Menu {
    let flavored = MenuItem {
        options: Some(
            ["Vanille", "Caramel", "Caramel salé", "Noisette", "Pumpkin spice"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        ..item("flavored-latte", "Grand Latte aromatisé", 5.5)
    };

    Menu {
        cafe_name: "Café Aimée".to_string(),
        location: "60 Rue Bayen, 75017 Paris".to_string(),
        categories: vec![
            category(
                "espresso",
                "Espresso",
                vec![
                    item("espresso", "Espresso / Allongé", 2.5),
                    item("americano", "Double / Americano", 3.5),
                    item("noisette", "Noisette", 3.0),
                    item("macchiato", "Macchiato", 3.5),
                    item("cappuccino", "Cappuccino / Latte", 4.5),
                    item("latte-large", "Latte (grand)", 5.0),
                    item("flat-white", "Flat White", 5.0),
                    item("mocha", "Mocha", 5.5),
                ],
            ),
            category("flavored-latte", "Grand Latte aromatisé", vec![flavored]),
            category(
                "matcha",
                "Matcha",
                vec![
                    item("matcha-latte", "Matcha Latte", 5.5),
                    item("iced-matcha-latte", "Iced Matcha Latte", 5.5),
                    item("matcha-fraise", "Matcha fraise (glacé)", 6.0),
                    item("matcha-mangue", "Matcha mangue (glacé)", 6.0),
                    item("matcha-myrtille", "Matcha myrtille (glacé)", 6.0),
                    item("matcha-framboise", "Matcha framboise (glacé)", 6.0),
                    item("cremeux-matcha-coco", "Crémeux matcha coco", 6.0),
                ],
            ),
            category(
                "brew",
                "Brew",
                vec![
                    item("cold-brew", "Cold brew", 5.0),
                    item("batch-brew", "Batch brew", 4.2),
                    item("cascara", "Cascara", 4.0),
                ],
            ),
            category(
                "tea",
                "Thé",
                vec![
                    described(
                        "infusion-itany",
                        "Infusion — Itany x L'artisan parfumeur",
                        "Rose, eucalyptus, menthe suave, feuille d’oranger",
                        4.5,
                    ),
                    described(
                        "the-vert-alamo",
                        "Thé vert \"Alamo\"",
                        "Amande et sarrasin grillé",
                        4.5,
                    ),
                    described(
                        "the-noir-serio",
                        "Thé noir \"Sério\"",
                        "Thé noir, Cerise, Amande, Piment",
                        4.5,
                    ),
                ],
            ),
            category(
                "cookies",
                "Cookies",
                vec![item("cookie", "Cookies (au choix)", 3.8)],
            ),
        ],
    }
}

impl Menu {
    pub fn find_item(&self, item_id: &str) -> Option<&MenuItem> {
        self.categories
            .iter()
            .flat_map(|category| category.items.iter())
            .find(|item| item.id == item_id)
    }

    pub fn with_category(&self, id: String, label: String) -> Menu {
        let mut next = self.clone();
        next.categories.push(Category {
            id,
            label,
            items: Vec::new(),
        });
        next
    }

    /// Drops the category and every item in it.
    pub fn without_category(&self, category_id: &str) -> Menu {
        let mut next = self.clone();
        next.categories.retain(|category| category.id != category_id);
        next
    }

    pub fn with_item(&self, category_id: &str, id: String, item: &ValidMenuItem) -> Menu {
        let mut next = self.clone();
        if let Some(category) = next.categories.iter_mut().find(|c| c.id == category_id) {
            category.items.push(MenuItem {
                id,
                name: item.name.clone(),
                price: item.price,
                description: None,
                options: None,
            });
        }
        next
    }

    /// Renames and reprices; description and options are kept.
    pub fn with_item_updated(&self, category_id: &str, item_id: &str, item: &ValidMenuItem) -> Menu {
        let mut next = self.clone();
        if let Some(existing) = next
            .categories
            .iter_mut()
            .filter(|c| c.id == category_id)
            .flat_map(|c| c.items.iter_mut())
            .find(|i| i.id == item_id)
        {
            existing.name = item.name.clone();
            existing.price = item.price;
        }
        next
    }

    pub fn without_item(&self, category_id: &str, item_id: &str) -> Menu {
        let mut next = self.clone();
        if let Some(category) = next.categories.iter_mut().find(|c| c.id == category_id) {
            category.items.retain(|i| i.id != item_id);
        }
        next
    }

    /// Categories in the given order. Unknown ids are skipped; categories not
    /// named keep their relative order after the named ones.
    pub fn reordered(&self, category_ids: &[String]) -> Menu {
        let mut remaining = self.categories.clone();
        let mut categories = Vec::with_capacity(remaining.len());
        for id in category_ids {
            if let Some(pos) = remaining.iter().position(|c| &c.id == id) {
                categories.push(remaining.remove(pos));
            }
        }
        categories.extend(remaining);
        Menu {
            categories,
            ..self.clone()
        }
    }
}

/// The menu as currently known to this process. Every edit goes through
/// [`MenuHolder::apply`], which persists first and then swaps the value.
pub struct MenuHolder {
    current: RwLock<Arc<Menu>>,
}

impl MenuHolder {
    /// Read the stored menu, falling back to the default. The default is only
    /// written back by the first edit.
    pub fn load_or_bootstrap(store: &SharedStore) -> Result<Self> {
        let menu = match store.menu()? {
            Some(menu) => menu,
            None => {
                info!("no stored menu, using default");
                default_menu()
            }
        };
        Ok(Self {
            current: RwLock::new(Arc::new(menu)),
        })
    }

    pub fn current(&self) -> Result<Arc<Menu>> {
        Ok(self.current.read()?.clone())
    }

    pub fn apply<F>(&self, store: &SharedStore, edit: F) -> Result<Arc<Menu>>
    where
        F: FnOnce(&Menu) -> Menu,
    {
        let mut guard = self.current.write()?;
        let next = Arc::new(edit(&**guard));
        if *next == **guard {
            return Ok(next);
        }
        store.set_menu(&next)?;
        *guard = next.clone();
        Ok(next)
    }

    /// Pick up a menu written elsewhere.
    pub fn reload(&self, store: &SharedStore) -> Result<Arc<Menu>> {
        let menu = Arc::new(store.menu()?.unwrap_or_else(default_menu));
        *self.current.write()? = menu.clone();
        Ok(menu)
    }
}
