use log::warn;

use crate::settings::{SETTINGS_KEY, Settings};

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn load_settings() -> Settings {
    let raw = local_storage().and_then(|store| store.get_item(SETTINGS_KEY).ok().flatten());
    Settings::from_stored(raw.as_deref())
}

pub fn save_settings(settings: &Settings) {
    let Some(store) = local_storage() else {
        return;
    };
    if store.set_item(SETTINGS_KEY, &settings.to_stored()).is_err() {
        warn!("could not persist settings");
    }
}
