//! Menu filtering and grouping applied to fetched menu lists.

use choplink_api_types::{DishType, MenuItem, MenuItemStatus};
use serde::Serialize;

/// Predicates applied to a restaurant's menu. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub search: String,
    pub dish_type: Option<DishType>,
    pub status: Option<MenuItemStatus>,
}

impl MenuFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.dish_type.is_none() && self.status.is_none()
    }

    pub fn matches(&self, item: &MenuItem) -> bool {
        self.matches_search(item)
            && self.dish_type.is_none_or(|dish| item.dish_type == dish)
            && self.status.is_none_or(|status| item.status == status)
    }

    /// Items matching every predicate, in their original order.
    pub fn apply(&self, items: &[MenuItem]) -> Vec<MenuItem> {
        items
            .iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }

    fn matches_search(&self, item: &MenuItem) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        item.name.to_lowercase().contains(&needle)
            || item
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub dish_type: DishType,
    pub items: Vec<MenuItem>,
}

/// Groups items under main, side, dessert and drink (always in that order,
/// empty groups included), preserving relative order within each group.
pub fn group_by_dish_type(items: &[MenuItem]) -> Vec<MenuGroup> {
    DishType::ALL
        .into_iter()
        .map(|dish_type| MenuGroup {
            dish_type,
            items: items
                .iter()
                .filter(|item| item.dish_type == dish_type)
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, dish_type: DishType, status: MenuItemStatus) -> MenuItem {
        MenuItem {
            id,
            name: name.to_string(),
            price: 500,
            max_portion: Some(2),
            dish_type,
            status,
            description: None,
            restaurant_id: 1,
        }
    }

    fn sample_menu() -> Vec<MenuItem> {
        use DishType::*;
        use MenuItemStatus::*;
        vec![
            item(1, "JOLLOF RICE", Main, Available),
            item(2, "POUNDED YAM", Side, Unavailable),
            item(3, "PLANTAIN", Side, Available),
            item(4, "CHAPMAN", Drink, Available),
            item(5, "SEMO", Side, Unavailable),
            item(6, "COLESLAW", Side, Available),
            item(7, "PUFF PUFF", Dessert, Available),
            item(8, "FRIED RICE", Main, Available),
            item(9, "MOI MOI", Side, Available),
            item(10, "ZOBO", Drink, Unavailable),
        ]
    }

    #[test]
    fn dish_type_and_status_filters_combine_in_order() {
        let filter = MenuFilter {
            dish_type: Some(DishType::Side),
            status: Some(MenuItemStatus::Available),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&sample_menu()).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 6, 9]);
    }

    #[test]
    fn search_matches_name_or_description_case_insensitively() {
        let mut menu = sample_menu();
        menu[3].description = Some("Sparkling fruit punch".to_string());

        let filter = MenuFilter {
            search: "rice".to_string(),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&menu).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 8]);

        let filter = MenuFilter {
            search: "PUNCH".to_string(),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&menu).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn whitespace_search_is_matched_literally() {
        let filter = MenuFilter {
            search: "  ".to_string(),
            ..Default::default()
        };
        assert!(!filter.is_empty());
        assert!(filter.apply(&sample_menu()).is_empty());
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = MenuFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sample_menu()).len(), 10);
    }

    #[test]
    fn grouping_keeps_fixed_order_and_relative_order() {
        let groups = group_by_dish_type(&sample_menu());
        let order: Vec<_> = groups.iter().map(|g| g.dish_type).collect();
        assert_eq!(
            order,
            vec![DishType::Main, DishType::Side, DishType::Dessert, DishType::Drink]
        );
        let sides: Vec<_> = groups[1].items.iter().map(|i| i.id).collect();
        assert_eq!(sides, vec![2, 3, 5, 6, 9]);
    }

    #[test]
    fn grouping_empty_menu_yields_empty_groups() {
        let groups = group_by_dish_type(&[]);
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| g.items.is_empty()));
    }
}
