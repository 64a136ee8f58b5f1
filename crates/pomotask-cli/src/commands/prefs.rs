use clap::Subcommand;
use pomotask_core::Preferences;

use crate::common::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show dark mode and background music settings
    Get,
    /// Change one preference
    Set {
        /// darkMode, musicEnabled or musicVolume
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: PrefsAction, json: bool) -> CliResult {
    let store = open_store();
    let mut prefs = Preferences::load(store.as_ref());

    if let PrefsAction::Set { key, value } = action {
        prefs.set(store.as_ref(), &key, &value)?;
    }

    if json {
        print_json(&prefs)?;
    } else {
        println!("darkMode      {}", prefs.dark_mode);
        println!("musicEnabled  {}", prefs.music_enabled);
        println!("musicVolume   {}", prefs.music_volume);
    }
    Ok(())
}
