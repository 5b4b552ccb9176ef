/// Inventory stack arithmetic for the storage ring (储物戒).
///
/// The store keeps one [`InventoryEntry`] per (player, item). These helpers compute the
/// next state of an entry; persisting it is the caller's job.
use crate::xiuxian::types::{InventoryEntry, InventoryResult};

/// Grow an existing stack or start a new one.
pub fn add_to_stack(
    existing: Option<InventoryEntry>,
    item_name: &str,
    quantity: u32,
) -> (InventoryEntry, InventoryResult) {
    match existing {
        Some(mut entry) => {
            entry.quantity = entry.quantity.saturating_add(quantity);
            (
                entry,
                InventoryResult::Added {
                    quantity,
                    stacked: true,
                },
            )
        }
        None => (
            InventoryEntry::new(item_name, quantity),
            InventoryResult::Added {
                quantity,
                stacked: false,
            },
        ),
    }
}

/// Take `quantity` units out of a stack.
///
/// Returns the entry to write back (`None` once the stack is empty). When the stack holds
/// fewer units than requested nothing changes and the result is `Insufficient`.
pub fn remove_from_stack(
    entry: Option<InventoryEntry>,
    quantity: u32,
) -> (Option<InventoryEntry>, InventoryResult) {
    let Some(mut entry) = entry else {
        return (None, InventoryResult::Insufficient { available: 0 });
    };
    if entry.quantity < quantity {
        let available = entry.quantity;
        return (Some(entry), InventoryResult::Insufficient { available });
    }
    entry.quantity -= quantity;
    let remaining = entry.quantity;
    let result = InventoryResult::Removed {
        quantity,
        remaining,
    };
    if remaining == 0 {
        (None, result)
    } else {
        (Some(entry), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_creates_then_stacks() {
        let (entry, result) = add_to_stack(None, "聚气丹", 1);
        assert_eq!(
            result,
            InventoryResult::Added {
                quantity: 1,
                stacked: false
            }
        );
        let (entry, result) = add_to_stack(Some(entry), "聚气丹", 2);
        assert_eq!(entry.quantity, 3);
        assert_eq!(
            result,
            InventoryResult::Added {
                quantity: 2,
                stacked: true
            }
        );
    }

    #[test]
    fn test_remove_partial_stack() {
        let entry = InventoryEntry::new("聚气丹", 3);
        let (entry, result) = remove_from_stack(Some(entry), 1);
        assert_eq!(entry.map(|e| e.quantity), Some(2));
        assert_eq!(
            result,
            InventoryResult::Removed {
                quantity: 1,
                remaining: 2
            }
        );
    }

    #[test]
    fn test_remove_last_unit_deletes_entry() {
        let entry = InventoryEntry::new("聚气丹", 1);
        let (entry, result) = remove_from_stack(Some(entry), 1);
        assert!(entry.is_none());
        assert!(result.is_removed());
    }

    #[test]
    fn test_remove_more_than_held_changes_nothing() {
        let entry = InventoryEntry::new("聚气丹", 2);
        let (entry, result) = remove_from_stack(Some(entry), 5);
        assert_eq!(entry.map(|e| e.quantity), Some(2));
        assert_eq!(result, InventoryResult::Insufficient { available: 2 });

        let (entry, result) = remove_from_stack(None, 1);
        assert!(entry.is_none());
        assert_eq!(result, InventoryResult::Insufficient { available: 0 });
    }
}
