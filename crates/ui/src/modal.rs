//! Modal notification scope.
//!
//! While a modal dialog is up, the host suppresses its menu so the
//! background window cannot be driven from the menu bar. Wrapping the
//! dialog in [`with_modal`] guarantees the closed notification is sent
//! even when the dialog body bails out early.

use ipc::{RendererEvent, UiEndpoint};
use log::error;

/// Emits `ModalOpened`, runs `body`, then emits `ModalClosed`.
pub fn with_modal<T>(bus: &mut UiEndpoint, body: impl FnOnce(&mut UiEndpoint) -> T) -> T {
    if let Err(err) = bus.emit_event(&RendererEvent::ModalOpened) {
        error!("Failed to announce modal open: {err}");
    }

    let result = body(bus);

    if let Err(err) = bus.emit_event(&RendererEvent::ModalClosed) {
        error!("Failed to announce modal close: {err}");
    }

    result
}
