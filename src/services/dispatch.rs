//! Maps a confirmed gesture through the binding store and invokes the bound
//! desktop action.

use thiserror::Error;

use crate::models::{BindingStore, CommandSlot, GestureSymbol};
use crate::services::actions::{ActionError, AutomationCapability};

/// Errors from one dispatch attempt. Neither variant halts the frame loop;
/// one frame's failure must not affect the next.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("gesture {0} has no bound command")]
    Unbound(GestureSymbol),

    #[error("command {slot} failed")]
    ActionFailed {
        slot: CommandSlot,
        #[source]
        source: ActionError,
    },
}

/// Resolves confirmed symbols to command slots and fires the action behind
/// them.
pub struct CommandDispatcher {
    bindings: BindingStore,
    automation: Box<dyn AutomationCapability>,
}

impl CommandDispatcher {
    pub fn new(bindings: BindingStore, automation: Box<dyn AutomationCapability>) -> Self {
        Self {
            bindings,
            automation,
        }
    }

    /// The slot bound to `symbol`, if any. Pure lookup, no side effects;
    /// the frame loop uses this to pick the right cooldown gate before
    /// committing to an invocation.
    pub fn resolve(&self, symbol: GestureSymbol) -> Option<CommandSlot> {
        self.bindings.lookup(symbol)
    }

    /// Invoke the action behind an already-resolved slot.
    pub fn invoke(&mut self, slot: CommandSlot) -> Result<(), DispatchError> {
        self.automation
            .invoke(slot)
            .map_err(|source| DispatchError::ActionFailed { slot, source })
    }

    /// Resolve and invoke in one step.
    ///
    /// # Errors
    /// [`DispatchError::Unbound`] when the gesture has no binding,
    /// [`DispatchError::ActionFailed`] when the action reports a failure.
    pub fn dispatch(&mut self, symbol: GestureSymbol) -> Result<CommandSlot, DispatchError> {
        let slot = self
            .resolve(symbol)
            .ok_or(DispatchError::Unbound(symbol))?;
        self.invoke(slot)?;
        Ok(slot)
    }

    pub fn bindings(&self) -> &BindingStore {
        &self.bindings
    }
}
