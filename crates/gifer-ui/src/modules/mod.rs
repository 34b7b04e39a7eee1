// crates/gifer-ui/src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing GiferModule
//   2. Add `pub mod mypanel;` below
//   3. Own it in GiferApp and call its ui() from update()

pub mod params_panel;
pub mod player_module;
pub mod setup_overlay;

use egui::Ui;
use gifer_core::commands::GiferCommand;

use crate::state::SessionState;

/// Every docked panel implements this trait.
/// Panels read state and emit commands; they never mutate state directly.
pub trait GiferModule {
    fn name(&self) -> &str;
    fn ui(&mut self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<GiferCommand>);
}
