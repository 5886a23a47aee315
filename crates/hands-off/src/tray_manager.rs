//! System tray icon with state-based updates.
//!
//! Manages a system tray icon with three states (Offline, Online,
//! Restarting) and a context menu for monitoring control, help, updates,
//! and quitting.

use crate::{AppError, AppResult, MenuAction, TrayIconState};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::menu::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Menu item ids shared with the controller for event dispatch.
#[derive(Debug, Clone)]
pub struct MenuIds {
    pub(crate) on: MenuId,
    pub(crate) off: MenuId,
    pub(crate) help: MenuId,
    pub(crate) update: MenuId,
    pub(crate) quit: MenuId,
}

impl MenuIds {
    /// Map a menu event id to its action.
    pub fn action(&self, id: &MenuId) -> Option<MenuAction> {
        if *id == self.on {
            Some(MenuAction::TurnOn)
        } else if *id == self.off {
            Some(MenuAction::TurnOff)
        } else if *id == self.help {
            Some(MenuAction::OpenHelp)
        } else if *id == self.update {
            Some(MenuAction::CheckForUpdates)
        } else if *id == self.quit {
            Some(MenuAction::Quit)
        } else {
            None
        }
    }
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    on_item: CheckMenuItem,
    off_item: CheckMenuItem,
    menu_ids: MenuIds,
}

impl TrayManager {
    /// Create a new tray manager in the offline state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let on_item = CheckMenuItem::new("On", true, false, None);
        let off_item = CheckMenuItem::new("Off", true, true, None);
        let help_item = MenuItem::new("Help", true, None);
        let update_item = MenuItem::new("Check for updates...", true, None);
        let quit_item = MenuItem::new("Quit", true, None);

        let menu_ids = MenuIds {
            on: on_item.id().clone(),
            off: off_item.id().clone(),
            help: help_item.id().clone(),
            update: update_item.id().clone(),
            quit: quit_item.id().clone(),
        };

        menu.append(&on_item).map_err(|e| AppError::Tray {
            reason: format!("Failed to add on menu item: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        menu.append(&off_item).map_err(|e| AppError::Tray {
            reason: format!("Failed to add off menu item: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| AppError::Tray {
                reason: format!("Failed to add menu separator: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        menu.append(&help_item).map_err(|e| AppError::Tray {
            reason: format!("Failed to add help menu item: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        menu.append(&update_item).map_err(|e| AppError::Tray {
            reason: format!("Failed to add update menu item: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        menu.append(&quit_item).map_err(|e| AppError::Tray {
            reason: format!("Failed to add quit menu item: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let icon = Self::load_icon(TrayIconState::Offline)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip("Hands Off - off")
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::Tray {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            on_item,
            off_item,
            menu_ids,
        })
    }

    /// Update the tray icon state with new icon, tooltip, and checkmarks.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        let (icon, tooltip) = match state {
            TrayIconState::Offline => (Self::load_icon(state)?, "Hands Off - off"),
            TrayIconState::Online => (Self::load_icon(state)?, "Hands Off - monitoring"),
            TrayIconState::Restarting => (Self::load_icon(state)?, "Hands Off - restarting..."),
        };

        // The check marks read as "monitoring is (on|off)", so a pending
        // relaunch still counts as on.
        let monitoring = !matches!(state, TrayIconState::Offline);
        self.on_item.set_checked(monitoring);
        self.off_item.set_checked(!monitoring);

        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| AppError::Tray {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(tooltip))
            .map_err(|e| AppError::Tray {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    /// Load icon from compile-time embedded PNG bytes.
    ///
    /// Icons are embedded via include_bytes! so they work regardless of
    /// install location, with no hardcoded filesystem paths.
    #[track_caller]
    fn load_icon(state: TrayIconState) -> AppResult<Icon> {
        let png_bytes: &[u8] = match state {
            TrayIconState::Offline => include_bytes!("../resources/icons/offline.png"),
            TrayIconState::Online => include_bytes!("../resources/icons/online.png"),
            TrayIconState::Restarting => include_bytes!("../resources/icons/restarting.png"),
        };

        let img = image::load_from_memory(png_bytes).map_err(|e| AppError::Tray {
            reason: format!("Failed to decode embedded icon: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let rgba = img.into_rgba8();
        let (width, height) = (rgba.width(), rgba.height());

        Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| AppError::Tray {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Menu ids for dispatching menu events on the runtime thread.
    pub fn menu_ids(&self) -> MenuIds {
        self.menu_ids.clone()
    }
}
