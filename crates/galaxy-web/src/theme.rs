use galaxy_engine::{GalaxyError, Theme, ThemePreference, ThemeStorage};
use web_sys::{Document, Storage, Window};

/// `window.localStorage`, or nothing when the browser denies it.
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn new(window: &Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            log::warn!("localStorage unavailable, theme will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, GalaxyError> {
        self.storage
            .as_ref()
            .ok_or_else(|| GalaxyError::Storage("localStorage unavailable".into()))
    }
}

impl ThemeStorage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, GalaxyError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| GalaxyError::Storage(format!("{:?}", e)))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), GalaxyError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| GalaxyError::Storage(format!("{:?}", e)))
    }
}

/// Put `theme`'s class on the document element and drop the other one.
pub fn apply(document: &Document, theme: Theme) {
    let Some(root) = document.document_element() else {
        return;
    };
    let classes = root.class_list();
    let result = classes
        .remove_1(theme.toggled().as_str())
        .and_then(|_| classes.add_1(theme.as_str()));
    if let Err(err) = result {
        log::warn!("could not apply theme {}: {:?}", theme, err);
    }
}

pub fn load(window: &Window) -> ThemePreference<LocalStorage> {
    ThemePreference::load(LocalStorage::new(window))
}
