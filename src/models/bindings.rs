use indexmap::IndexMap;
use thiserror::Error;

use crate::models::{CommandSlot, GestureSymbol};

/// Errors reported by [`BindingStore`] mutations.
///
/// These are caller errors and always recoverable; the store itself is left
/// unchanged whenever an error is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    #[error("command {slot} is already triggered by {held_by}")]
    SlotOccupied {
        slot: CommandSlot,
        held_by: GestureSymbol,
    },

    #[error("gesture {symbol} already triggers {bound_to}; unbind it first")]
    SymbolOccupied {
        symbol: GestureSymbol,
        bound_to: CommandSlot,
    },

    #[error("the {symbol} -> {slot} binding is reserved and cannot be changed")]
    ProtectedViolation {
        symbol: GestureSymbol,
        slot: CommandSlot,
    },
}

/// The live gesture-to-command assignment.
///
/// Invariants, enforced by every mutation:
/// - at most one command per gesture and one gesture per command,
/// - the (protected symbol, protected slot) pair is always present and can
///   never be removed or redirected.
///
/// Iteration order is insertion order, which is also the order entries are
/// serialized in.
#[derive(Debug, Clone)]
pub struct BindingStore {
    bindings: IndexMap<GestureSymbol, CommandSlot>,
}

impl BindingStore {
    /// Create a store containing only the protected binding.
    pub fn new() -> Self {
        let mut store = Self {
            bindings: IndexMap::new(),
        };
        store.ensure_protected_binding();
        store
    }

    /// Idempotently install the reserved cancel binding.
    pub fn ensure_protected_binding(&mut self) {
        self.bindings
            .insert(GestureSymbol::PROTECTED, CommandSlot::PROTECTED);
    }

    /// Assign `slot` to `symbol`.
    ///
    /// Re-binding the exact pair that is already present succeeds and returns
    /// the previous slot, so callers can hand it back to availability lists.
    ///
    /// # Errors
    /// - [`BindingError::ProtectedViolation`] when the request touches the
    ///   protected symbol or slot with anything but the reserved pair itself
    /// - [`BindingError::SlotOccupied`] when another gesture holds `slot`
    /// - [`BindingError::SymbolOccupied`] when `symbol` holds a different slot
    pub fn bind(
        &mut self,
        symbol: GestureSymbol,
        slot: CommandSlot,
    ) -> Result<Option<CommandSlot>, BindingError> {
        let is_reserved_pair = symbol.is_protected() && slot.is_protected();
        if (symbol.is_protected() || slot.is_protected()) && !is_reserved_pair {
            return Err(BindingError::ProtectedViolation { symbol, slot });
        }

        if let Some(holder) = self.lookup_by_slot(slot) {
            if holder != symbol {
                return Err(BindingError::SlotOccupied {
                    slot,
                    held_by: holder,
                });
            }
        }

        if let Some(current) = self.lookup(symbol) {
            if current != slot {
                return Err(BindingError::SymbolOccupied {
                    symbol,
                    bound_to: current,
                });
            }
        }

        let previous = self.bindings.insert(symbol, slot);
        tracing::debug!("bound {} -> {}", symbol, slot);
        Ok(previous)
    }

    /// Remove the binding for `symbol`, returning the freed slot.
    ///
    /// # Errors
    /// [`BindingError::ProtectedViolation`] when `symbol` is protected.
    pub fn unbind(
        &mut self,
        symbol: GestureSymbol,
    ) -> Result<Option<CommandSlot>, BindingError> {
        if symbol.is_protected() {
            return Err(BindingError::ProtectedViolation {
                symbol,
                slot: CommandSlot::PROTECTED,
            });
        }

        let freed = self.bindings.shift_remove(&symbol);
        if let Some(slot) = freed {
            tracing::debug!("unbound {} (freed {})", symbol, slot);
        }
        Ok(freed)
    }

    /// Command currently triggered by `symbol`, if any.
    pub fn lookup(&self, symbol: GestureSymbol) -> Option<CommandSlot> {
        self.bindings.get(&symbol).copied()
    }

    /// Gesture currently assigned to `slot`, if any.
    pub fn lookup_by_slot(&self, slot: CommandSlot) -> Option<GestureSymbol> {
        self.bindings
            .iter()
            .find(|(_, s)| **s == slot)
            .map(|(symbol, _)| *symbol)
    }

    /// All active bindings in insertion order.
    pub fn all_bindings(&self) -> impl Iterator<Item = (GestureSymbol, CommandSlot)> + '_ {
        self.bindings.iter().map(|(s, c)| (*s, *c))
    }

    /// Slots not assigned to any gesture, in catalog order.
    pub fn unbound_slots(&self) -> Vec<CommandSlot> {
        CommandSlot::ALL
            .iter()
            .copied()
            .filter(|slot| self.lookup_by_slot(*slot).is_none())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drop every binding and reinstall the protected one.
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.ensure_protected_binding();
        tracing::debug!("binding store reset");
    }
}

impl Default for BindingStore {
    fn default() -> Self {
        Self::new()
    }
}
